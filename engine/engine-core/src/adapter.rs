//! The adapter contract a host game implements so the search engines can drive it.
//!
//! The search never inspects game rules. It clones the root state once, then
//! mutates that working copy in place with [`GameAdapter::apply_action_with_undo`]
//! and rewinds it with [`GameAdapter::undo_action`] after every simulation.
//!
//! # Undo tokens
//!
//! A token returned by `apply_action_with_undo` is only valid against the state
//! instance it was produced from, and only once, in strict LIFO order. The search
//! upholds this; it is not checked at runtime.
//!
//! # Optional hooks
//!
//! Heuristic hooks (leaf evaluation, move priors, tactical priority) have default
//! no-op implementations. A game advertises which ones are meaningful through
//! [`GameAdapter::hooks`]; the engines skip the calls entirely for hooks that are
//! switched off.

use std::fmt::Debug;
use std::hash::Hash;

/// Player identifier. Two-player games use 0 and 1.
pub type PlayerId = u8;

/// Which optional heuristic hooks an adapter actually implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Hooks {
    /// `evaluate` scores non-terminal rollout leaves.
    pub evaluate: bool,
    /// `action_prior` scores candidate moves for ordering and rollouts.
    pub action_prior: bool,
    /// `tactical_priority` gives a coarse priority that dominates the prior.
    pub tactical_priority: bool,
}

impl Hooks {
    /// No optional hooks.
    pub const NONE: Hooks = Hooks {
        evaluate: false,
        action_prior: false,
        tactical_priority: false,
    };

    /// Every optional hook.
    pub const ALL: Hooks = Hooks {
        evaluate: true,
        action_prior: true,
        tactical_priority: true,
    };
}

/// Capability interface a host game provides to the search.
///
/// # Example
///
/// ```rust
/// use engine_core::{GameAdapter, PlayerId};
///
/// /// Take 1 or 2 stones; whoever takes the last stone wins.
/// struct Nim;
///
/// #[derive(Clone, Debug)]
/// struct Pile { stones: u8, to_move: PlayerId, last_mover: Option<PlayerId> }
///
/// impl GameAdapter for Nim {
///     type State = Pile;
///     type Action = u8;
///     type Undo = (u8, PlayerId, Option<PlayerId>);
///
///     fn legal_actions(&self, s: &Pile) -> Vec<u8> {
///         (1..=2).filter(|&n| n <= s.stones).collect()
///     }
///     fn apply_action_with_undo(&self, s: &mut Pile, a: &u8) -> Option<Self::Undo> {
///         if *a == 0 || *a > s.stones { return None; }
///         let token = (s.stones, s.to_move, s.last_mover);
///         s.stones -= a;
///         s.last_mover = Some(s.to_move);
///         s.to_move = 1 - s.to_move;
///         Some(token)
///     }
///     fn undo_action(&self, s: &mut Pile, (stones, to_move, last): Self::Undo) {
///         s.stones = stones;
///         s.to_move = to_move;
///         s.last_mover = last;
///     }
///     fn is_terminal(&self, s: &Pile) -> bool { s.stones == 0 }
///     fn current_player(&self, s: &Pile) -> PlayerId { s.to_move }
///     fn outcome_for_player(&self, s: &Pile, p: PlayerId) -> f32 {
///         if s.last_mover == Some(p) { 1.0 } else { -1.0 }
///     }
/// }
///
/// let mut pile = Pile { stones: 3, to_move: 0, last_mover: None };
/// let token = Nim.apply_action_with_undo(&mut pile, &2).unwrap();
/// assert_eq!(pile.stones, 1);
/// Nim.undo_action(&mut pile, token);
/// assert_eq!(pile.stones, 3);
/// ```
pub trait GameAdapter {
    /// Full mutable game state. Cloning must produce an independent deep copy.
    type State: Clone;

    /// Opaque, hashable move value. The search only compares and hashes it.
    type Action: Clone + Eq + Hash + Debug;

    /// Token that exactly reverses one successful `apply_action_with_undo`.
    type Undo;

    /// Deep, independent copy of `state`.
    fn clone_state(&self, state: &Self::State) -> Self::State {
        state.clone()
    }

    /// All legal actions. Empty for terminal or stalled states.
    fn legal_actions(&self, state: &Self::State) -> Vec<Self::Action>;

    /// Apply `action` in place.
    ///
    /// Returns `None` when the game rejects the action; the state must then be
    /// left untouched and no token exists to undo.
    fn apply_action_with_undo(
        &self,
        state: &mut Self::State,
        action: &Self::Action,
    ) -> Option<Self::Undo>;

    /// Exact inverse of the `apply_action_with_undo` call that produced `token`.
    fn undo_action(&self, state: &mut Self::State, token: Self::Undo);

    /// Apply `action` without keeping an undo token. Returns `false` if rejected.
    fn apply_action(&self, state: &mut Self::State, action: &Self::Action) -> bool {
        self.apply_action_with_undo(state, action).is_some()
    }

    fn is_terminal(&self, state: &Self::State) -> bool;

    fn current_player(&self, state: &Self::State) -> PlayerId;

    /// Outcome in `[-1, 1]` from `player`'s point of view. Only meaningful on
    /// terminal states.
    fn outcome_for_player(&self, state: &Self::State, player: PlayerId) -> f32;

    /// Which of the optional hooks below carry real information.
    fn hooks(&self) -> Hooks {
        Hooks::NONE
    }

    /// Heuristic value of a non-terminal state for `player`, in `[-1, 1]`.
    fn evaluate(&self, _state: &Self::State, _player: PlayerId) -> f32 {
        0.0
    }

    /// Unnormalised preference for `action`; larger is better.
    fn action_prior(&self, _state: &Self::State, _action: &Self::Action, _player: PlayerId) -> f32 {
        0.0
    }

    /// Coarse priority that dominates the prior in move ordering, e.g. 100 for
    /// a move that wins on the spot.
    fn tactical_priority(
        &self,
        _state: &Self::State,
        _action: &Self::Action,
        _player: PlayerId,
    ) -> i32 {
        0
    }

    /// Cheap fingerprint of the full mutable state, used for transposition
    /// reuse. `None` keeps the state out of any shared cache.
    fn state_key(&self, _state: &Self::State) -> Option<u64> {
        None
    }
}
