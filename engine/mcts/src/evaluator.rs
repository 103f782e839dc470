//! Evaluator trait for position evaluation.
//!
//! The evaluator is the model boundary of the prior-guided driver: given a
//! fixed-length feature vector it returns one raw score per slot of the
//! action index and a scalar value. The search restricts and renormalises the
//! scores over the legal slots itself. For testing, we provide a uniform
//! evaluator that returns flat scores.

use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("Evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Model error: {0}")]
    ModelError(String),
}

/// Result of evaluating a game state.
#[derive(Debug, Clone)]
pub struct EvalResult {
    /// Raw scores, one per action index slot. Illegal slots may hold anything.
    pub logits: Vec<f32>,

    /// Value estimate for the player to move.
    /// Range: -1.0 (certain loss) to +1.0 (certain win). The search clamps it.
    pub value: f32,
}

/// Trait for position evaluators.
///
/// Implementations could be:
/// - UniformEvaluator: Returns flat scores (for testing)
/// - OnnxEvaluator: Neural network inference (feature `onnx`)
pub trait Evaluator: Send + Sync {
    /// Evaluate a single encoded state.
    ///
    /// # Arguments
    /// * `features` - Output of the game's feature encoder
    /// * `num_actions` - Size of the action index (expected logits length)
    fn evaluate(&self, features: &[f32], num_actions: usize)
        -> Result<EvalResult, EvaluatorError>;

    /// Batch evaluate multiple encoded states (optional optimization).
    /// Default implementation calls evaluate() in a loop.
    fn evaluate_batch(
        &self,
        batch: &[&[f32]],
        num_actions: usize,
    ) -> Result<Vec<EvalResult>, EvaluatorError> {
        batch
            .iter()
            .map(|features| self.evaluate(features, num_actions))
            .collect()
    }
}

/// Evaluator with flat scores and a neutral value. Useful for testing the
/// search without a model.
#[derive(Debug, Clone, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl Evaluator for UniformEvaluator {
    fn evaluate(
        &self,
        _features: &[f32],
        num_actions: usize,
    ) -> Result<EvalResult, EvaluatorError> {
        Ok(EvalResult {
            logits: vec![0.0; num_actions],
            value: 0.0,
        })
    }
}
