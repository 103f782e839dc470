//! ONNX Runtime evaluator for neural network inference.
//!
//! # Model Format
//!
//! The ONNX model is expected to have:
//! - Input: "observation" - shape (batch_size, feature_size) float32
//! - Output: "policy_logits" - shape (batch_size, action_size) float32
//! - Output: "value" - shape (batch_size, 1) float32
//!
//! `feature_size` is the game encoder's width and `action_size` the length of
//! its action index. Logits are returned raw; the search masks and
//! normalises them over the legal slots.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use ort::{session::Session, value::Value};
use tracing::debug;

use crate::evaluator::{EvalResult, Evaluator, EvaluatorError};

/// ONNX Runtime evaluator that loads and runs neural network models.
///
/// Uses a Mutex internally because `Session::run` requires `&mut self`,
/// but the `Evaluator` trait uses `&self` for thread-safe sharing.
pub struct OnnxEvaluator {
    session: Mutex<Session>,
    feature_size: usize,
    /// Number of inferences performed (for diagnostics)
    inference_count: AtomicU64,
    /// Total inference time in microseconds (for diagnostics)
    total_inference_time_us: AtomicU64,
}

impl std::fmt::Debug for OnnxEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxEvaluator")
            .field("feature_size", &self.feature_size)
            .finish_non_exhaustive()
    }
}

/// Diagnostic counters of an evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnnxStats {
    pub inferences: u64,
    pub avg_inference_us: f64,
}

impl OnnxEvaluator {
    /// Load an ONNX model from the given path.
    pub fn load<P: AsRef<Path>>(model_path: P, feature_size: usize) -> Result<Self, EvaluatorError> {
        let session = Session::builder()
            .map_err(|e| {
                EvaluatorError::ModelError(format!("Failed to create session builder: {}", e))
            })?
            .with_intra_threads(4)
            .map_err(|e| EvaluatorError::ModelError(format!("Failed to set intra threads: {}", e)))?
            .commit_from_file(model_path)
            .map_err(|e| EvaluatorError::ModelError(format!("Failed to load model: {}", e)))?;

        Ok(Self::with_session(session, feature_size))
    }

    /// Load an ONNX model from memory.
    pub fn load_from_memory(model_data: &[u8], feature_size: usize) -> Result<Self, EvaluatorError> {
        let session = Session::builder()
            .map_err(|e| {
                EvaluatorError::ModelError(format!("Failed to create session builder: {}", e))
            })?
            .with_intra_threads(1)
            .map_err(|e| EvaluatorError::ModelError(format!("Failed to set intra threads: {}", e)))?
            .commit_from_memory(model_data)
            .map_err(|e| {
                EvaluatorError::ModelError(format!("Failed to load model from memory: {}", e))
            })?;

        Ok(Self::with_session(session, feature_size))
    }

    fn with_session(session: Session, feature_size: usize) -> Self {
        Self {
            session: Mutex::new(session),
            feature_size,
            inference_count: AtomicU64::new(0),
            total_inference_time_us: AtomicU64::new(0),
        }
    }

    pub fn feature_size(&self) -> usize {
        self.feature_size
    }

    pub fn stats(&self) -> OnnxStats {
        let inferences = self.inference_count.load(Ordering::Relaxed);
        let total_us = self.total_inference_time_us.load(Ordering::Relaxed);
        OnnxStats {
            inferences,
            avg_inference_us: if inferences == 0 {
                0.0
            } else {
                total_us as f64 / inferences as f64
            },
        }
    }

    fn check_width(&self, features: &[f32]) -> Result<(), EvaluatorError> {
        if features.len() != self.feature_size {
            return Err(EvaluatorError::InvalidInput(format!(
                "Expected {} features, got {}",
                self.feature_size,
                features.len()
            )));
        }
        Ok(())
    }

    /// Run the model on a flattened `(batch, feature_size)` input.
    /// Returns flattened logits, values and the logits row width.
    fn infer(
        &self,
        flat: Vec<f32>,
        batch_size: usize,
        num_actions: usize,
    ) -> Result<(Vec<f32>, Vec<f32>, usize), EvaluatorError> {
        let input_array = ndarray::Array2::from_shape_vec((batch_size, self.feature_size), flat)
            .map_err(|e| {
                EvaluatorError::InvalidInput(format!("Failed to create input array: {}", e))
            })?;

        let input_value = Value::from_array(input_array).map_err(|e| {
            EvaluatorError::ModelError(format!("Failed to create input tensor: {}", e))
        })?;

        // Run inference - extract all data inside the lock scope
        let inference_start = Instant::now();
        let (logits, values, action_size) = {
            let mut session = self.session.lock().map_err(|e| {
                EvaluatorError::EvaluationFailed(format!("Failed to acquire session lock: {}", e))
            })?;
            let outputs = session
                .run(ort::inputs!["observation" => input_value])
                .map_err(|e| {
                    EvaluatorError::EvaluationFailed(format!("Inference failed: {}", e))
                })?;

            let policy_output = outputs.get("policy_logits").ok_or_else(|| {
                EvaluatorError::ModelError("Missing policy_logits output".to_string())
            })?;

            let (policy_shape, policy_data) =
                policy_output.try_extract_tensor::<f32>().map_err(|e| {
                    EvaluatorError::ModelError(format!("Failed to extract policy tensor: {}", e))
                })?;

            let action_size = if policy_shape.len() > 1 {
                policy_shape[1] as usize
            } else {
                num_actions
            };

            let value_output = outputs
                .get("value")
                .ok_or_else(|| EvaluatorError::ModelError("Missing value output".to_string()))?;

            let (_shape, value_data) = value_output.try_extract_tensor::<f32>().map_err(|e| {
                EvaluatorError::ModelError(format!("Failed to extract value tensor: {}", e))
            })?;

            (policy_data.to_vec(), value_data.to_vec(), action_size)
        };

        // Track inference timing for diagnostics (per-sample accounting)
        let elapsed_us = inference_start.elapsed().as_micros() as u64;
        let batch = batch_size as u64;
        let total_us = self
            .total_inference_time_us
            .fetch_add(elapsed_us * batch, Ordering::Relaxed)
            + elapsed_us * batch;
        let count = self.inference_count.fetch_add(batch, Ordering::Relaxed) + batch;

        // Log stats periodically (every 10,000 inferences)
        if count % 10_000 < batch {
            debug!(
                calls = count,
                avg_ms = (total_us / count) as f64 / 1000.0,
                "ONNX inference stats"
            );
        }

        Ok((logits, values, action_size))
    }
}

impl Evaluator for OnnxEvaluator {
    fn evaluate(&self, features: &[f32], num_actions: usize) -> Result<EvalResult, EvaluatorError> {
        self.check_width(features)?;
        let (logits, values, _) = self.infer(features.to_vec(), 1, num_actions)?;
        Ok(EvalResult {
            logits,
            value: values.first().copied().unwrap_or(0.0),
        })
    }

    fn evaluate_batch(
        &self,
        batch: &[&[f32]],
        num_actions: usize,
    ) -> Result<Vec<EvalResult>, EvaluatorError> {
        if batch.is_empty() {
            return Ok(Vec::new());
        }

        let mut flat = Vec::with_capacity(batch.len() * self.feature_size);
        for features in batch {
            self.check_width(features)?;
            flat.extend_from_slice(features);
        }

        let (logits, values, action_size) = self.infer(flat, batch.len(), num_actions)?;
        if logits.len() < batch.len() * action_size {
            return Err(EvaluatorError::ModelError(format!(
                "Expected {} logits, got {}",
                batch.len() * action_size,
                logits.len()
            )));
        }

        Ok(logits
            .chunks_exact(action_size.max(1))
            .take(batch.len())
            .enumerate()
            .map(|(i, row)| EvalResult {
                logits: row.to_vec(),
                value: values.get(i).copied().unwrap_or(0.0),
            })
            .collect())
    }
}

/// A cheaply cloneable handle to one loaded model, for sharing across
/// self-play workers.
#[derive(Debug, Clone)]
pub struct SharedOnnxEvaluator {
    inner: Arc<OnnxEvaluator>,
}

impl SharedOnnxEvaluator {
    pub fn new(evaluator: OnnxEvaluator) -> Self {
        Self {
            inner: Arc::new(evaluator),
        }
    }

    /// Load a shared ONNX model from the given path.
    pub fn load<P: AsRef<Path>>(model_path: P, feature_size: usize) -> Result<Self, EvaluatorError> {
        Ok(Self::new(OnnxEvaluator::load(model_path, feature_size)?))
    }

    pub fn stats(&self) -> OnnxStats {
        self.inner.stats()
    }
}

impl Evaluator for SharedOnnxEvaluator {
    fn evaluate(&self, features: &[f32], num_actions: usize) -> Result<EvalResult, EvaluatorError> {
        self.inner.evaluate(features, num_actions)
    }

    fn evaluate_batch(
        &self,
        batch: &[&[f32]],
        num_actions: usize,
    ) -> Result<Vec<EvalResult>, EvaluatorError> {
        self.inner.evaluate_batch(batch, num_actions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_missing_model_fails() {
        let result = OnnxEvaluator::load("/nonexistent/model.onnx", 29);
        assert!(matches!(result, Err(EvaluatorError::ModelError(_))));
    }

    #[test]
    fn test_load_garbage_bytes_fails() {
        let result = OnnxEvaluator::load_from_memory(b"not a model", 29);
        assert!(result.is_err());
    }
}
