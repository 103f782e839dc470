//! Monte Carlo Tree Search over the `engine-core` adapter contract.
//!
//! This crate provides two game-agnostic search drivers that work with any
//! game implementing [`engine_core::GameAdapter`]:
//!
//! - [`MctsSearch`]: plain UCT with progressive widening, a shared
//!   transposition table and heuristic rollouts.
//! - [`PuctSearch`]: prior-guided search that asks an [`Evaluator`] for move
//!   priors and a leaf value instead of rolling out.
//!
//! # Overview
//!
//! Each simulation consists of five phases:
//!
//! 1. **Selection**: Traverse the tree with UCB1 (plain) or PUCT (prior-guided)
//! 2. **Expansion**: Add one child (plain) or evaluate a new node (prior-guided)
//! 3. **Evaluation**: Roll out, or use the evaluator's value
//! 4. **Backpropagation**: Update visit counts and value estimates along the
//!    path from leaf to root
//! 5. **Undo**: Rewind the shared working state with the game's undo tokens
//!
//! # Usage
//!
//! ```rust
//! use games_tictactoe::{State, TicTacToe};
//! use mcts::{MctsConfig, MctsSearch};
//!
//! let config = MctsConfig::for_testing().with_iterations(200);
//! let mut search = MctsSearch::new(TicTacToe::new(), config).unwrap();
//!
//! let (action, stats) = search.select_action(&State::new()).unwrap();
//! assert_eq!(stats.root_visits, 200);
//! println!("Best action: {:?} ({} visits)", action, stats.best_action_visits);
//! ```
//!
//! # Evaluators
//!
//! - [`UniformEvaluator`]: flat scores and a neutral value (for testing)
//! - `OnnxEvaluator`: ONNX Runtime inference, behind the `onnx` feature
//!
//! # Architecture
//!
//! ```text
//! +-------------------------------------------------------------+
//! |               MctsSearch            PuctSearch              |
//! +-------------------------------------------------------------+
//! |  +-----------+  +------------+  +------------------------+  |
//! |  | MctsTree  |  | GameAdapter|  | Evaluator + Encoder    |  |
//! |  | PuctTree  |  | (mutate /  |  | (priors / value)       |  |
//! |  | (arenas)  |  |   undo)    |  | RolloutPolicy (plain)  |  |
//! |  +-----+-----+  +-----+------+  +-----------+------------+  |
//! |        |              |                     |               |
//! |        v              v                     v               |
//! |  +-------------------------------------------------------+  |
//! |  |    select -> expand -> evaluate -> backpropagate       |  |
//! |  |              -> undo     (TranspositionTable)          |  |
//! |  +-------------------------------------------------------+  |
//! +-------------------------------------------------------------+
//! ```

pub mod config;
pub mod evaluator;
pub mod node;
pub mod policy;
pub mod puct;
pub mod puct_tree;
pub mod rollout;
pub mod search;
pub mod transposition;
pub mod tree;

#[cfg(feature = "onnx")]
pub mod onnx;

// Re-export main types
pub use config::{MctsConfig, PuctConfig, ValuePerspective};
pub use evaluator::{EvalResult, Evaluator, EvaluatorError, UniformEvaluator};
pub use node::{MctsNode, NodeId};
pub use policy::{dirichlet_noise, legal_softmax, sample_index, visit_policy};
pub use puct::{PuctResult, PuctSearch};
pub use puct_tree::{PuctEdge, PuctNode, PuctTree};
pub use rollout::RolloutPolicy;
pub use search::{MctsSearch, SearchError, SearchStats};
pub use transposition::{TranspositionEntry, TranspositionTable};
pub use tree::{MctsTree, TreeStats};

#[cfg(feature = "onnx")]
pub use onnx::{OnnxEvaluator, OnnxStats, SharedOnnxEvaluator};
