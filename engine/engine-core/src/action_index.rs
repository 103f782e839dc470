//! Dense integer indexing of structured actions.
//!
//! A policy network emits one score per slot of a fixed-size output vector, so
//! every action a game can ever produce needs a stable slot. The layout is a
//! contract with the training pipeline and is enumerated in exactly this order:
//!
//! ```text
//! [ global choices ][ place @ cell 0 .. cell N-1 ][ move src->dst x amount 1..=max ]
//! ```
//!
//! Movement slots iterate source cells in ascending order, then that cell's
//! neighbours in the order the layout reports them, then amounts `1..=max`.

use std::collections::HashMap;
use std::hash::Hash;

use thiserror::Error;

use crate::adapter::GameAdapter;

/// Errors from strict index lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionIndexError {
    #[error("Action is not part of the index space")]
    UnknownAction,

    #[error("Index {0} is outside the action space")]
    IndexOutOfRange(usize),
}

/// Board topology and action constructors used to enumerate the index space.
pub trait BoardLayout {
    type Action: Clone + Eq + Hash;

    /// Discrete choices that do not target a cell, in their fixed order.
    fn global_actions(&self) -> Vec<Self::Action>;

    fn num_cells(&self) -> usize;

    /// Directed neighbours of `cell`, in a deterministic order.
    fn neighbors(&self, cell: usize) -> Vec<usize>;

    fn place_action(&self, cell: usize) -> Self::Action;

    fn move_action(&self, from: usize, to: usize, amount: u32) -> Self::Action;
}

/// Bijection between actions and `[0, len())`.
#[derive(Debug, Clone)]
pub struct ActionIndex<A> {
    index_to_action: Vec<A>,
    action_to_index: HashMap<A, usize>,
    max_move_amount: u32,
    num_globals: usize,
    num_cells: usize,
}

impl<A: Clone + Eq + Hash> ActionIndex<A> {
    /// Enumerate the index space from a template layout.
    pub fn build<L>(layout: &L, max_move_amount: u32) -> Self
    where
        L: BoardLayout<Action = A>,
    {
        let globals = layout.global_actions();
        let num_cells = layout.num_cells();

        let mut index = Self {
            index_to_action: Vec::new(),
            action_to_index: HashMap::new(),
            max_move_amount,
            num_globals: 0,
            num_cells,
        };

        for action in globals {
            index.push(action);
        }
        index.num_globals = index.len();
        for cell in 0..num_cells {
            index.push(layout.place_action(cell));
        }
        for src in 0..num_cells {
            for dst in layout.neighbors(src) {
                for amount in 1..=max_move_amount {
                    index.push(layout.move_action(src, dst, amount));
                }
            }
        }

        index
    }

    /// Index an explicit action list for games without a cell topology.
    /// Slots follow the iteration order; all actions count as globals.
    pub fn from_enumeration<I>(actions: I) -> Self
    where
        I: IntoIterator<Item = A>,
    {
        let mut index = Self {
            index_to_action: Vec::new(),
            action_to_index: HashMap::new(),
            max_move_amount: 0,
            num_globals: 0,
            num_cells: 0,
        };
        for action in actions {
            index.push(action);
        }
        index.num_globals = index.len();
        index
    }

    fn push(&mut self, action: A) {
        // Duplicates keep their first slot; the index stays a bijection.
        if self.action_to_index.contains_key(&action) {
            return;
        }
        self.action_to_index
            .insert(action.clone(), self.index_to_action.len());
        self.index_to_action.push(action);
    }

    /// Size of the action space (model output width).
    #[inline]
    pub fn len(&self) -> usize {
        self.index_to_action.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.index_to_action.is_empty()
    }

    pub fn max_move_amount(&self) -> u32 {
        self.max_move_amount
    }

    /// First slot of the placement block.
    pub fn placement_offset(&self) -> usize {
        self.num_globals
    }

    /// First slot of the movement block.
    pub fn movement_offset(&self) -> usize {
        self.num_globals + self.num_cells
    }

    #[inline]
    pub fn to_index(&self, action: &A) -> Option<usize> {
        self.action_to_index.get(action).copied()
    }

    #[inline]
    pub fn from_index(&self, index: usize) -> Option<&A> {
        self.index_to_action.get(index)
    }

    pub fn index_of(&self, action: &A) -> Result<usize, ActionIndexError> {
        self.to_index(action).ok_or(ActionIndexError::UnknownAction)
    }

    pub fn action_at(&self, index: usize) -> Result<&A, ActionIndexError> {
        self.from_index(index)
            .ok_or(ActionIndexError::IndexOutOfRange(index))
    }

    /// Indices of the legal actions in `state`, in the game's legal-action order.
    /// Legal actions with no slot (e.g. a move larger than `max_move_amount`)
    /// are skipped.
    pub fn legal_indices<G>(&self, game: &G, state: &G::State) -> Vec<usize>
    where
        G: GameAdapter<Action = A>,
    {
        game.legal_actions(state)
            .iter()
            .filter_map(|action| self.to_index(action))
            .collect()
    }

    /// Boolean mask over the full index space.
    pub fn legal_mask<G>(&self, game: &G, state: &G::State) -> Vec<bool>
    where
        G: GameAdapter<Action = A>,
    {
        let mut mask = vec![false; self.len()];
        for idx in self.legal_indices(game, state) {
            mask[idx] = true;
        }
        mask
    }
}
