//! Search tree for the prior-guided driver.
//!
//! Statistics live on edges: each edge carries the prior it was expanded with
//! and a running value sum from the perspective of the player choosing at the
//! edge's parent. Child nodes are allocated the first time an edge is walked.

use engine_core::PlayerId;

use crate::config::ValuePerspective;
use crate::node::NodeId;

/// One candidate action at an expanded node.
#[derive(Debug, Clone)]
pub struct PuctEdge<A> {
    /// Slot in the action index.
    pub action_index: usize,
    pub action: A,
    pub prior: f32,
    pub visits: u32,
    /// Sum of backed-up values, from the parent's perspective.
    pub value_sum: f32,
    /// `NodeId::NONE` until the edge is first traversed.
    pub child: NodeId,
}

impl<A> PuctEdge<A> {
    pub fn new(action_index: usize, action: A, prior: f32) -> Self {
        Self {
            action_index,
            action,
            prior,
            visits: 0,
            value_sum: 0.0,
            child: NodeId::NONE,
        }
    }

    /// Mean backed-up value; 0 for an unvisited edge.
    #[inline]
    pub fn q_value(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f32
        }
    }
}

/// A node of the prior-guided tree.
#[derive(Debug, Clone)]
pub struct PuctNode<A> {
    pub player: PlayerId,
    pub visits: u32,
    /// Sum of values reaching this node, from `player`'s perspective.
    pub value_sum: f32,
    /// Model value from this node's expansion, reused when it is a stalled leaf.
    pub eval_value: f32,
    pub expanded: bool,
    pub edges: Vec<PuctEdge<A>>,
}

impl<A> PuctNode<A> {
    pub fn new(player: PlayerId) -> Self {
        Self {
            player,
            visits: 0,
            value_sum: 0.0,
            eval_value: 0.0,
            expanded: false,
            edges: Vec::new(),
        }
    }

    #[inline]
    pub fn mean_value(&self) -> f32 {
        if self.visits == 0 {
            0.0
        } else {
            self.value_sum / self.visits as f32
        }
    }
}

/// PUCT score: `Q + c * P * sqrt(max(1, N)) / (1 + n)`.
#[inline]
pub fn puct_score(q: f32, prior: f32, edge_visits: u32, parent_sqrt_visits: f32, c: f32) -> f32 {
    q + c * prior * parent_sqrt_visits / (1.0 + edge_visits as f32)
}

/// Arena of [`PuctNode`]s. The root is always `NodeId(0)`.
#[derive(Debug)]
pub struct PuctTree<A> {
    nodes: Vec<PuctNode<A>>,
}

impl<A> PuctTree<A> {
    pub fn new(root_player: PlayerId) -> Self {
        Self {
            nodes: vec![PuctNode::new(root_player)],
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn get(&self, id: NodeId) -> &PuctNode<A> {
        &self.nodes[id.0 as usize]
    }

    #[inline]
    pub fn get_mut(&mut self, id: NodeId) -> &mut PuctNode<A> {
        &mut self.nodes[id.0 as usize]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Attach edges and the model value to a node.
    pub fn expand(&mut self, id: NodeId, edges: Vec<PuctEdge<A>>, value: f32) {
        let node = self.get_mut(id);
        node.edges = edges;
        node.eval_value = value;
        node.expanded = true;
    }

    /// Child reached through `slot`, allocating it on first use.
    pub fn child_or_insert(&mut self, id: NodeId, slot: usize, player: PlayerId) -> NodeId {
        let existing = self.get(id).edges[slot].child;
        if existing.is_some() {
            return existing;
        }
        let child = NodeId(self.nodes.len() as u32);
        self.nodes.push(PuctNode::new(player));
        self.get_mut(id).edges[slot].child = child;
        child
    }

    /// Drop the edge in `slot` (swap-with-last).
    pub fn remove_edge(&mut self, id: NodeId, slot: usize) -> PuctEdge<A> {
        self.get_mut(id).edges.swap_remove(slot)
    }

    /// Edge slot with the highest PUCT score; first slot on ties.
    pub fn select_edge(&self, id: NodeId, c_puct: f32) -> Option<usize> {
        let node = self.get(id);
        let sqrt_n = (node.visits.max(1) as f32).sqrt();

        let mut best: Option<(usize, f32)> = None;
        for (slot, edge) in node.edges.iter().enumerate() {
            let score = puct_score(edge.q_value(), edge.prior, edge.visits, sqrt_n, c_puct);
            match best {
                Some((_, best_score)) if score <= best_score => {}
                _ => best = Some((slot, score)),
            }
        }
        best.map(|(slot, _)| slot)
    }

    /// Back up `value` (from `leaf`'s perspective) along `path`.
    ///
    /// `path` lists `(node, edge slot)` pairs from the root down to the leaf's
    /// parent.
    pub fn backpropagate(
        &mut self,
        path: &[(NodeId, usize)],
        leaf: NodeId,
        value: f32,
        perspective: ValuePerspective,
    ) {
        let leaf_node = self.get_mut(leaf);
        leaf_node.visits += 1;
        leaf_node.value_sum += value;

        let mut child_player = leaf_node.player;
        let mut current_value = value;
        for &(id, slot) in path.iter().rev() {
            let node = self.get_mut(id);
            current_value = perspective.to_parent(current_value, child_player, node.player);
            node.visits += 1;
            node.value_sum += current_value;
            if let Some(edge) = node.edges.get_mut(slot) {
                edge.visits += 1;
                edge.value_sum += current_value;
            }
            child_player = node.player;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(priors: &[f32]) -> Vec<PuctEdge<u8>> {
        priors
            .iter()
            .enumerate()
            .map(|(i, &p)| PuctEdge::new(i, i as u8, p))
            .collect()
    }

    #[test]
    fn test_puct_score() {
        // Unvisited edge: Q = 0, bonus = c * P * sqrt(N)
        let score = puct_score(0.0, 0.5, 0, 10.0, 1.0);
        assert!((score - 5.0).abs() < 1e-6);

        // Visited edge: bonus shrinks with 1 + n
        let score = puct_score(0.3, 0.5, 4, 10.0, 1.0);
        assert!((score - (0.3 + 1.0)).abs() < 1e-6);
    }

    #[test]
    fn test_first_selection_follows_prior() {
        let mut tree = PuctTree::new(0);
        tree.expand(tree.root(), edges(&[0.2, 0.7, 0.1]), 0.0);

        // With zero parent visits, sqrt(max(1, 0)) keeps the prior term alive.
        assert_eq!(tree.select_edge(tree.root(), 1.5), Some(1));
    }

    #[test]
    fn test_child_allocated_once() {
        let mut tree = PuctTree::new(0);
        tree.expand(tree.root(), edges(&[0.5, 0.5]), 0.0);

        let a = tree.child_or_insert(tree.root(), 1, 1);
        let b = tree.child_or_insert(tree.root(), 1, 1);
        assert_eq!(a, b);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.get(tree.root()).edges[1].child, a);
    }

    #[test]
    fn test_backpropagate_stores_parent_perspective() {
        let mut tree = PuctTree::new(0);
        tree.expand(tree.root(), edges(&[0.5, 0.5]), 0.0);
        let child = tree.child_or_insert(tree.root(), 0, 1);

        // Leaf (player 1) thinks it is losing.
        tree.backpropagate(
            &[(tree.root(), 0)],
            child,
            -0.8,
            ValuePerspective::AlternatingPlies,
        );

        let root = tree.get(tree.root());
        assert_eq!(root.visits, 1);
        assert_eq!(root.edges[0].visits, 1);
        assert!((root.edges[0].q_value() - 0.8).abs() < 1e-6);
        assert!((root.mean_value() - 0.8).abs() < 1e-6);
        assert!((tree.get(child).mean_value() + 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_remove_edge_swaps_last() {
        let mut tree = PuctTree::new(0);
        tree.expand(tree.root(), edges(&[0.1, 0.2, 0.7]), 0.0);

        let removed = tree.remove_edge(tree.root(), 0);
        assert_eq!(removed.action, 0);
        let root = tree.get(tree.root());
        assert_eq!(root.edges.len(), 2);
        assert_eq!(root.edges[0].action, 2);
        assert_eq!(root.edges[0].action_index, 2);
    }
}
