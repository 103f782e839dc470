//! Core traits and types for the Satellites search engine
//!
//! This crate provides the fundamental abstractions the search drivers consume:
//! - `GameAdapter`: the capability interface a host game implements (mutate/undo,
//!   legal moves, terminal scoring, optional heuristic hooks)
//! - `ActionIndex`: a stable bijection between structured actions and model slots
//! - `FeatureEncoder`: the state-to-features boundary of a learned model
//! - `HeuristicWeights`: named tunable weights with JSON persistence

pub mod action_index;
pub mod adapter;
pub mod encode;
pub mod game_utils;
pub mod weights;

// Re-export main types for convenience
pub use action_index::{ActionIndex, ActionIndexError, BoardLayout};
pub use adapter::{GameAdapter, Hooks, PlayerId};
pub use encode::FeatureEncoder;
pub use game_utils::{opponent, outcome_for_player, GameResult};
pub use weights::{HeuristicWeights, WeightsError};
