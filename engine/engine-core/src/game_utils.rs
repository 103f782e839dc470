//! Shared utilities for two-player game adapters
//!
//! This module provides common functionality used across multiple game implementations
//! to reduce code duplication and ensure consistent behavior.

use crate::adapter::{GameAdapter, PlayerId};

/// How a game stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GameResult {
    #[default]
    Ongoing,
    Won(PlayerId),
    Draw,
}

impl GameResult {
    #[inline]
    pub fn is_over(self) -> bool {
        self != GameResult::Ongoing
    }
}

/// The other player in a two-player game.
#[inline]
pub fn opponent(player: PlayerId) -> PlayerId {
    1 - player
}

/// Outcome of a two-player zero-sum game from `player`'s perspective.
///
/// # Returns
/// * `1.0` if `player` won
/// * `-1.0` if `player` lost
/// * `0.0` for draws or ongoing games
///
/// # Example
/// ```
/// use engine_core::game_utils::{outcome_for_player, GameResult};
///
/// assert_eq!(outcome_for_player(GameResult::Won(0), 0), 1.0);
/// assert_eq!(outcome_for_player(GameResult::Won(0), 1), -1.0);
/// assert_eq!(outcome_for_player(GameResult::Draw, 1), 0.0);
/// assert_eq!(outcome_for_player(GameResult::Ongoing, 0), 0.0);
/// ```
#[inline]
pub fn outcome_for_player(result: GameResult, player: PlayerId) -> f32 {
    match result {
        GameResult::Won(winner) if winner == player => 1.0,
        GameResult::Won(_) => -1.0,
        GameResult::Draw | GameResult::Ongoing => 0.0,
    }
}

/// Append several f32 slices to a feature buffer.
///
/// # Example
/// ```
/// use engine_core::game_utils::extend_features;
///
/// let board = [1.0f32, 0.0, 0.0];
/// let player = [1.0f32, 0.0];
///
/// let mut buf = Vec::new();
/// extend_features(&mut buf, [&board[..], &player[..]]);
/// assert_eq!(buf.len(), 5);
/// ```
pub fn extend_features<'a>(out: &mut Vec<f32>, slices: impl IntoIterator<Item = &'a [f32]>) {
    for slice in slices {
        out.extend_from_slice(slice);
    }
}

/// Apply every legal action of `state` with undo tracking, undo it, and check
/// the state is restored exactly. Returns the first action that breaks the
/// round trip, if any.
///
/// Used by adapter test suites to check undo exactness.
pub fn find_undo_violation<G>(game: &G, state: &G::State) -> Option<G::Action>
where
    G: GameAdapter,
    G::State: PartialEq,
{
    let mut work = game.clone_state(state);
    for action in game.legal_actions(state) {
        match game.apply_action_with_undo(&mut work, &action) {
            Some(token) => {
                game.undo_action(&mut work, token);
                if work != *state {
                    return Some(action);
                }
            }
            None => {
                if work != *state {
                    return Some(action);
                }
            }
        }
    }
    None
}
