//! Plain search tree with arena allocation.
//!
//! The tree uses arena allocation for efficient node storage and
//! cache-friendly traversal. Nodes are stored in a contiguous Vec
//! and referenced by NodeId indices. A node removed from its parent by
//! defensive pruning stays in the arena, unreachable, until the tree is
//! dropped at the end of the search call.

use std::collections::VecDeque;
use std::hash::Hash;

use engine_core::PlayerId;

use crate::config::ValuePerspective;
use crate::node::{ucb1_score, Child, MctsNode, NodeId};
use crate::transposition::TranspositionTable;

/// Search tree with arena-based node storage.
#[derive(Debug)]
pub struct MctsTree<A> {
    /// Arena storing all nodes
    nodes: Vec<MctsNode<A>>,

    /// Root node index (always 0 after initialization)
    root: NodeId,
}

impl<A: Clone + Eq + Hash> MctsTree<A> {
    /// Create a new tree whose root is `player` to move.
    pub fn new(player: PlayerId, key: Option<u64>, untried: VecDeque<(A, f32)>) -> Self {
        let root_node = MctsNode::new(NodeId::NONE, player, key, untried);
        Self {
            nodes: vec![root_node],
            root: NodeId(0),
        }
    }

    /// Get the root node ID.
    #[inline]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Get a reference to a node by ID.
    #[inline]
    pub fn get(&self, id: NodeId) -> &MctsNode<A> {
        &self.nodes[id.0 as usize]
    }

    /// Get a mutable reference to a node by ID.
    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut MctsNode<A> {
        &mut self.nodes[id.0 as usize]
    }

    /// Get the total number of nodes in the tree.
    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if tree is empty (should never be true after construction).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a child to a parent node.
    /// Returns the new child's NodeId.
    pub fn add_child(
        &mut self,
        parent_id: NodeId,
        action: A,
        prior: f32,
        player: PlayerId,
        key: Option<u64>,
        untried: VecDeque<(A, f32)>,
    ) -> NodeId {
        let child_id = NodeId(self.nodes.len() as u32);
        self.nodes
            .push(MctsNode::new(parent_id, player, key, untried));
        self.get_mut(parent_id).push_child(action, prior, child_id);
        child_id
    }

    /// Drop the edge in `slot` from `parent_id` (swap-with-last).
    pub fn remove_child_at(&mut self, parent_id: NodeId, slot: usize) -> Child<A> {
        self.get_mut(parent_id).swap_remove_child(slot)
    }

    /// Select the best child of a node using UCB1.
    ///
    /// Each child's mean value is converted into the parent's perspective
    /// before scoring. Ties go to the earliest slot.
    /// Returns the child's slot, or None if the node has no children.
    pub fn select_child(
        &self,
        node_id: NodeId,
        c: f32,
        perspective: ValuePerspective,
    ) -> Option<usize> {
        let node = self.get(node_id);
        // Pre-compute the log once instead of per-child comparison
        let log_n = (node.visits.max(1) as f32).ln();

        let mut best: Option<(usize, f32)> = None;
        for (slot, child) in node.children.iter().enumerate() {
            let stats = self.get(child.node);
            let q = perspective.to_parent(stats.mean_value(), stats.player, node.player);
            let score = ucb1_score(q, stats.visits, log_n, c);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((slot, score)),
            }
        }
        best.map(|(slot, _)| slot)
    }

    /// Seed a fresh node with cached statistics.
    pub fn seed(&mut self, id: NodeId, visits: u32, value_sum: f32) {
        let node = self.get_mut(id);
        node.visits = visits;
        node.value_sum = value_sum;
    }

    /// Backpropagate a value from a leaf to the root.
    ///
    /// `value` is from the leaf's player-to-move perspective and is converted
    /// at every step with `perspective`. Every node carrying a fingerprint
    /// also updates its entry in `table`.
    pub fn backpropagate(
        &mut self,
        leaf_id: NodeId,
        value: f32,
        perspective: ValuePerspective,
        table: Option<&TranspositionTable<A>>,
    ) {
        let mut current_id = leaf_id;
        let mut current_value = value;

        loop {
            let node = self.get_mut(current_id);
            node.visits += 1;
            node.value_sum += current_value;

            if let (Some(table), Some(key)) = (table, node.key) {
                table.record(key, current_value);
            }

            let parent_id = node.parent;
            if parent_id.is_none() {
                break;
            }
            let child_player = node.player;
            current_value =
                perspective.to_parent(current_value, child_player, self.get(parent_id).player);
            current_id = parent_id;
        }
    }

    /// Most visited child of the root, first slot on ties.
    pub fn best_child(&self) -> Option<&Child<A>> {
        let root = self.get(self.root);
        let mut best: Option<&Child<A>> = None;
        for child in &root.children {
            let visits = self.get(child.node).visits;
            match best {
                Some(b) if visits <= self.get(b.node).visits => {}
                _ => best = Some(child),
            }
        }
        best
    }

    /// Get statistics about the tree for debugging.
    pub fn stats(&self) -> TreeStats {
        let root = self.get(self.root);
        TreeStats {
            total_nodes: self.nodes.len(),
            root_visits: root.visits,
            root_value: root.mean_value(),
            max_depth: self.compute_max_depth(),
        }
    }

    fn compute_max_depth(&self) -> u32 {
        let mut max_depth = 0;
        let mut stack = vec![(self.root, 0u32)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            for child in &self.get(id).children {
                stack.push((child.node, depth + 1));
            }
        }
        max_depth
    }
}

/// Statistics about a search tree.
#[derive(Debug, Clone)]
pub struct TreeStats {
    pub total_nodes: usize,
    pub root_visits: u32,
    pub root_value: f32,
    pub max_depth: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn untried(actions: &[u8]) -> VecDeque<(u8, f32)> {
        actions.iter().map(|&a| (a, 0.0)).collect()
    }

    #[test]
    fn test_new_tree() {
        let tree = MctsTree::new(0, Some(5), untried(&[1, 2, 3]));

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.root(), NodeId(0));

        let root = tree.get(tree.root());
        assert!(root.parent.is_none());
        assert_eq!(root.key, Some(5));
        assert_eq!(root.untried.len(), 3);
    }

    #[test]
    fn test_add_child() {
        let mut tree = MctsTree::new(0, None, untried(&[]));
        let child_id = tree.add_child(tree.root(), 1, 0.5, 1, None, untried(&[]));

        assert_eq!(tree.len(), 2);
        assert_eq!(child_id, NodeId(1));

        let root = tree.get(tree.root());
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.child_for(&1).map(|c| c.node), Some(NodeId(1)));

        let child = tree.get(child_id);
        assert_eq!(child.parent, tree.root());
        assert_eq!(child.player, 1);
    }

    #[test]
    fn test_backpropagate_alternates_sign() {
        let mut tree = MctsTree::new(0, None, untried(&[]));

        // Create a chain: root -> child -> grandchild
        let child_id = tree.add_child(tree.root(), 0, 0.0, 1, None, untried(&[]));
        let grandchild_id = tree.add_child(child_id, 1, 0.0, 0, None, untried(&[]));

        tree.backpropagate(grandchild_id, 1.0, ValuePerspective::AlternatingPlies, None);

        // Check visits
        assert_eq!(tree.get(grandchild_id).visits, 1);
        assert_eq!(tree.get(child_id).visits, 1);
        assert_eq!(tree.get(tree.root()).visits, 1);

        // Check values (negated at each level)
        assert!((tree.get(grandchild_id).value_sum - 1.0).abs() < 1e-6);
        assert!((tree.get(child_id).value_sum - (-1.0)).abs() < 1e-6);
        assert!((tree.get(tree.root()).value_sum - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_backpropagate_by_player_keeps_sign_within_turn() {
        let mut tree = MctsTree::new(0, None, untried(&[]));

        // Player 0 acts twice in a row, then player 1 is to move.
        let same_turn = tree.add_child(tree.root(), 0, 0.0, 0, None, untried(&[]));
        let next_turn = tree.add_child(same_turn, 1, 0.0, 1, None, untried(&[]));

        tree.backpropagate(next_turn, 0.5, ValuePerspective::ByPlayer, None);

        assert!((tree.get(next_turn).value_sum - 0.5).abs() < 1e-6);
        assert!((tree.get(same_turn).value_sum + 0.5).abs() < 1e-6);
        assert!((tree.get(tree.root()).value_sum + 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_backpropagate_updates_table() {
        let table = TranspositionTable::new();
        let mut tree = MctsTree::new(0, Some(100), untried(&[]));
        let child_id = tree.add_child(tree.root(), 7u8, 0.0, 1, Some(200), untried(&[]));
        let leaf_id = tree.add_child(child_id, 8, 0.0, 0, None, untried(&[]));

        tree.backpropagate(leaf_id, -1.0, ValuePerspective::AlternatingPlies, Some(&table));

        assert_eq!(table.len(), 2);
        let child_entry = table.lookup(200).unwrap();
        assert_eq!(child_entry.visits, 1);
        assert!((child_entry.value_sum - 1.0).abs() < 1e-6);
        assert!((table.lookup(100).unwrap().value_sum + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_select_child_prefers_unvisited() {
        let mut tree = MctsTree::new(0, None, untried(&[]));
        let a = tree.add_child(tree.root(), 0, 0.0, 1, None, untried(&[]));
        tree.add_child(tree.root(), 1, 0.0, 1, None, untried(&[]));

        tree.seed(a, 10, -10.0);
        tree.seed(tree.root(), 10, 10.0);

        let slot = tree
            .select_child(tree.root(), 1.4, ValuePerspective::AlternatingPlies)
            .unwrap();
        assert_eq!(slot, 1);
    }

    #[test]
    fn test_select_child_uses_parent_perspective() {
        let mut tree = MctsTree::new(0, None, untried(&[]));
        let good = tree.add_child(tree.root(), 0, 0.0, 1, None, untried(&[]));
        let bad = tree.add_child(tree.root(), 1, 0.0, 1, None, untried(&[]));

        // Values are stored from the child's mover (player 1) perspective:
        // `good` is losing for player 1, so it is winning for the root.
        tree.seed(good, 10, -8.0);
        tree.seed(bad, 10, 8.0);
        tree.seed(tree.root(), 20, 0.0);

        let slot = tree
            .select_child(tree.root(), 0.1, ValuePerspective::AlternatingPlies)
            .unwrap();
        assert_eq!(tree.get(tree.root()).children[slot].node, good);
    }

    #[test]
    fn test_best_child_and_stats() {
        let mut tree = MctsTree::new(0, None, untried(&[]));
        let c1 = tree.add_child(tree.root(), 0, 0.0, 1, None, untried(&[]));
        let c2 = tree.add_child(tree.root(), 1, 0.0, 1, None, untried(&[]));
        tree.add_child(c2, 2, 0.0, 0, None, untried(&[]));

        tree.seed(c1, 30, 0.0);
        tree.seed(c2, 70, 0.0);

        assert_eq!(tree.best_child().map(|c| c.action), Some(1));

        let stats = tree.stats();
        assert_eq!(stats.total_nodes, 4);
        assert_eq!(stats.max_depth, 2);
    }

    #[test]
    fn test_remove_child_at() {
        let mut tree = MctsTree::new(0, None, untried(&[]));
        tree.add_child(tree.root(), 0, 0.0, 1, None, untried(&[]));
        tree.add_child(tree.root(), 1, 0.0, 1, None, untried(&[]));
        let last = tree.add_child(tree.root(), 2, 0.0, 1, None, untried(&[]));

        let removed = tree.remove_child_at(tree.root(), 0);
        assert_eq!(removed.action, 0);

        let root = tree.get(tree.root());
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[0].node, last);
        assert_eq!(root.child_index.get(&2), Some(&0));
    }
}
