//! Search tree node representation.
//!
//! Each node represents the game state reached by the actions on the path from
//! the root. Nodes store visit statistics used for UCB selection and the list
//! of actions not yet expanded into children.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use engine_core::PlayerId;

/// Index into the node arena. Using a newtype for type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u32);

impl NodeId {
    pub const NONE: NodeId = NodeId(u32::MAX);

    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

/// An expanded edge: the action taken and the node it leads to.
#[derive(Debug, Clone)]
pub struct Child<A> {
    pub action: A,
    /// Ordering prior the action carried when it was expanded.
    pub prior: f32,
    pub node: NodeId,
}

/// A node in the plain search tree.
#[derive(Debug, Clone)]
pub struct MctsNode<A> {
    /// Parent node index (NONE for root)
    pub parent: NodeId,

    /// Player whose choices this node's children represent.
    pub player: PlayerId,

    /// State fingerprint, present only when transposition reuse is on.
    pub key: Option<u64>,

    /// Number of times this node has been visited
    pub visits: u32,

    /// Sum of values backpropagated through this node, from `player`'s
    /// perspective.
    pub value_sum: f32,

    /// Expanded children in expansion order (modulo swap-removals).
    pub children: Vec<Child<A>>,

    /// Action -> slot in `children`.
    pub child_index: HashMap<A, usize>,

    /// Candidate actions not yet expanded, best first.
    pub untried: VecDeque<(A, f32)>,
}

impl<A: Clone + Eq + Hash> MctsNode<A> {
    pub fn new(
        parent: NodeId,
        player: PlayerId,
        key: Option<u64>,
        untried: VecDeque<(A, f32)>,
    ) -> Self {
        Self {
            parent,
            player,
            key,
            visits: 0,
            value_sum: 0.0,
            children: Vec::new(),
            child_index: HashMap::new(),
            untried,
        }
    }

    /// Calculate mean value = value_sum / visits.
    /// Returns 0.0 if never visited.
    #[inline]
    pub fn mean_value(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f32
        }
    }

    /// Whether every candidate action has become a child.
    #[inline]
    pub fn is_fully_expanded(&self) -> bool {
        self.untried.is_empty()
    }

    pub fn child_for(&self, action: &A) -> Option<&Child<A>> {
        self.child_index.get(action).map(|&slot| &self.children[slot])
    }

    pub(crate) fn push_child(&mut self, action: A, prior: f32, node: NodeId) {
        self.child_index.insert(action.clone(), self.children.len());
        self.children.push(Child {
            action,
            prior,
            node,
        });
    }

    /// Remove the child in `slot` by swapping the last child into its place.
    /// The moved child's lookup entry is repointed to `slot`.
    pub(crate) fn swap_remove_child(&mut self, slot: usize) -> Child<A> {
        let removed = self.children.swap_remove(slot);
        self.child_index.remove(&removed.action);
        if let Some(moved) = self.children.get(slot) {
            self.child_index.insert(moved.action.clone(), slot);
        }
        removed
    }
}

/// UCB1 score of a child, given its value already converted to the parent's
/// perspective. Unvisited children score `+inf`.
///
/// `parent_log_visits` is `ln(max(1, N_parent))`, computed once per selection.
#[inline]
pub fn ucb1_score(value_for_parent: f32, visits: u32, parent_log_visits: f32, c: f32) -> f32 {
    if visits == 0 {
        return f32::INFINITY;
    }
    value_for_parent + c * (parent_log_visits / visits as f32).sqrt()
}
