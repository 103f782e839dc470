//! Plain MCTS driver.
//!
//! Each simulation runs Select -> Expand -> Simulate -> Backpropagate -> Undo
//! against a single working copy of the root state:
//! 1. Selection: descend with UCB1 among the children progressive widening allows
//! 2. Expansion: pop the next ordered untried action and create its child
//! 3. Simulation: roll out on a scratch clone with the [`RolloutPolicy`]
//! 4. Backpropagation: update statistics from the leaf up to the root
//! 5. Undo: unwind every undo token pushed during steps 1 and 2
//!
//! Values are stored from each node's own perspective and converted into the
//! parent's perspective with [`ValuePerspective`] during selection and
//! backpropagation.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use engine_core::{opponent, GameAdapter, PlayerId};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, trace};

use crate::config::{MctsConfig, ValuePerspective};
use crate::evaluator::EvaluatorError;
use crate::node::NodeId;
use crate::rollout::RolloutPolicy;
use crate::transposition::TranspositionTable;
use crate::tree::MctsTree;

/// Errors that can occur during search.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("No legal actions available")]
    NoLegalActions,

    #[error("Evaluator error: {0}")]
    Evaluator(#[from] EvaluatorError),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Model output has {actual} entries, action index has {expected}")]
    IndexSizeMismatch { expected: usize, actual: usize },
}

/// Statistics reported with every chosen action.
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    /// Visits at the root, including any seeded from the transposition table.
    pub root_visits: u32,

    /// Visits of the chosen action's child.
    pub best_action_visits: u32,

    /// Mean value of the chosen action, from the root player's perspective.
    pub best_action_value: f32,

    /// Simulations actually completed.
    pub iterations: u32,

    /// Nodes allocated in the tree (pruned subtrees included).
    pub tree_nodes: usize,

    pub elapsed: Duration,

    /// Edges dropped because the game rejected them.
    pub pruned_edges: u32,
}

/// When to stop simulating.
#[derive(Debug, Clone, Copy)]
enum Budget {
    Iterations(u32),
    Deadline { until: Instant, min_iterations: u32 },
}

impl Budget {
    fn exhausted(&self, iterations: u32) -> bool {
        match *self {
            Budget::Iterations(n) => iterations >= n,
            Budget::Deadline {
                until,
                min_iterations,
            } => iterations >= min_iterations && Instant::now() >= until,
        }
    }
}

/// Plain UCT search over a [`GameAdapter`].
///
/// The driver owns its RNG and a transposition table handle. Each call builds
/// a fresh tree; only the table survives between calls.
pub struct MctsSearch<G: GameAdapter> {
    game: G,
    config: MctsConfig,
    rollout: RolloutPolicy,
    table: TranspositionTable<G::Action>,
    rng: ChaCha20Rng,
    pruned: u32,
}

impl<G: GameAdapter> MctsSearch<G> {
    /// Create a driver with a private transposition table.
    pub fn new(game: G, config: MctsConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        Ok(Self {
            game,
            rollout: RolloutPolicy::from(&config),
            config,
            table: TranspositionTable::new(),
            rng,
            pruned: 0,
        })
    }

    /// Replace the table with a shared handle.
    pub fn with_transposition_table(mut self, table: TranspositionTable<G::Action>) -> Self {
        self.table = table;
        self
    }

    pub fn transposition_table(&self) -> &TranspositionTable<G::Action> {
        &self.table
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn config(&self) -> &MctsConfig {
        &self.config
    }

    /// Choose an action with the configured iteration budget.
    pub fn select_action(
        &mut self,
        state: &G::State,
    ) -> Result<(G::Action, SearchStats), SearchError> {
        let budget = Budget::Iterations(self.config.iterations.max(1));
        self.select_with(state, budget)
    }

    /// Choose an action within `max_time_secs` of wall-clock time.
    ///
    /// The deadline is floored at 10 ms and at least `min_iterations`
    /// (minimum 1) simulations always complete. The deadline is checked only
    /// between simulations.
    pub fn select_action_for_time(
        &mut self,
        state: &G::State,
        max_time_secs: f64,
        min_iterations: u32,
    ) -> Result<(G::Action, SearchStats), SearchError> {
        let secs = if max_time_secs.is_finite() {
            max_time_secs.max(0.01)
        } else {
            0.01
        };
        let budget = Budget::Deadline {
            until: Instant::now() + Duration::from_secs_f64(secs),
            min_iterations: min_iterations.max(1),
        };
        self.select_with(state, budget)
    }

    fn select_with(
        &mut self,
        state: &G::State,
        budget: Budget,
    ) -> Result<(G::Action, SearchStats), SearchError> {
        let started = Instant::now();
        let (tree, iterations) = self.run(state, budget)?;

        let root = tree.get(tree.root());
        let best = tree.best_child().ok_or(SearchError::NoLegalActions)?;
        let child = tree.get(best.node);
        let stats = SearchStats {
            root_visits: root.visits,
            best_action_visits: child.visits,
            best_action_value: self.config.perspective.to_parent(
                child.mean_value(),
                child.player,
                root.player,
            ),
            iterations,
            tree_nodes: tree.len(),
            elapsed: started.elapsed(),
            pruned_edges: self.pruned,
        };

        debug!(
            iterations = stats.iterations,
            root_visits = stats.root_visits,
            best_visits = stats.best_action_visits,
            best_value = stats.best_action_value,
            tree_nodes = stats.tree_nodes,
            pruned = stats.pruned_edges,
            action = ?best.action,
            "MCTS search complete"
        );

        Ok((best.action.clone(), stats))
    }

    /// Build a tree from `root_state` until `budget` runs out.
    fn run(
        &mut self,
        root_state: &G::State,
        budget: Budget,
    ) -> Result<(MctsTree<G::Action>, u32), SearchError> {
        if self.game.legal_actions(root_state).is_empty() {
            return Err(SearchError::NoLegalActions);
        }
        self.pruned = 0;

        let mut state = self.game.clone_state(root_state);
        let player = self.game.current_player(&state);
        let key = self.node_key(&state);
        let untried = self.ordered_candidates(&state, player, key);
        let mut tree = MctsTree::new(player, key, untried);
        let root = tree.root();
        self.seed_from_table(&mut tree, root);

        let mut iterations = 0;
        let mut undo_stack = Vec::new();
        while !budget.exhausted(iterations) {
            self.simulate(&mut tree, &mut state, &mut undo_stack);
            iterations += 1;
        }

        Ok((tree, iterations))
    }

    /// Run one simulation. `state` is back at the root position on return.
    fn simulate(
        &mut self,
        tree: &mut MctsTree<G::Action>,
        state: &mut G::State,
        undo_stack: &mut Vec<G::Undo>,
    ) {
        let leaf = self.descend(tree, state, undo_stack);
        let perspective_player = self.leaf_perspective(tree, leaf);

        let value = if self.game.is_terminal(state) {
            self.game.outcome_for_player(state, perspective_player)
        } else {
            let mut scratch = self.game.clone_state(state);
            self.rollout
                .run(&self.game, &mut scratch, perspective_player, &mut self.rng)
        };

        let table = self.config.use_transposition.then_some(&self.table);
        tree.backpropagate(leaf, value, self.config.perspective, table);

        trace!(
            leaf = leaf.0,
            depth = undo_stack.len(),
            value,
            "MCTS simulation complete"
        );

        while let Some(token) = undo_stack.pop() {
            self.game.undo_action(state, token);
        }
    }

    /// Select and expand, applying every edge to `state`. Returns the leaf.
    fn descend(
        &mut self,
        tree: &mut MctsTree<G::Action>,
        state: &mut G::State,
        undo_stack: &mut Vec<G::Undo>,
    ) -> NodeId {
        let mut current = tree.root();
        loop {
            if self.game.is_terminal(state) {
                return current;
            }

            let node = tree.get(current);
            let allowance = self.config.widening_allowance(node.visits);
            if !node.untried.is_empty() && node.children.len() < allowance {
                let Some((action, prior)) = tree.get_mut(current).untried.pop_front() else {
                    continue;
                };
                match self.game.apply_action_with_undo(state, &action) {
                    Some(token) => {
                        undo_stack.push(token);
                        return self.expand(tree, current, action, prior, state);
                    }
                    None => {
                        self.pruned += 1;
                        debug!(action = ?action, node = current.0, "Expansion rejected, discarding action");
                        continue;
                    }
                }
            }

            let Some(slot) = tree.select_child(current, self.config.c_uct, self.config.perspective)
            else {
                // Stalled: nothing left to expand or select.
                return current;
            };
            let child = &tree.get(current).children[slot];
            let (action, next) = (child.action.clone(), child.node);
            match self.game.apply_action_with_undo(state, &action) {
                Some(token) => {
                    undo_stack.push(token);
                    current = next;
                }
                None => {
                    tree.remove_child_at(current, slot);
                    self.pruned += 1;
                    debug!(action = ?action, node = current.0, "Edge rejected on re-traversal, pruned");
                }
            }
        }
    }

    /// Create the child reached by `action`; `state` is already past it.
    fn expand(
        &mut self,
        tree: &mut MctsTree<G::Action>,
        parent: NodeId,
        action: G::Action,
        prior: f32,
        state: &G::State,
    ) -> NodeId {
        let player = self.game.current_player(state);
        let key = self.node_key(state);
        let untried = self.ordered_candidates(state, player, key);
        let child = tree.add_child(parent, action, prior, player, key, untried);
        self.seed_from_table(tree, child);
        child
    }

    fn node_key(&self, state: &G::State) -> Option<u64> {
        if self.config.use_transposition {
            self.game.state_key(state)
        } else {
            None
        }
    }

    fn seed_from_table(&self, tree: &mut MctsTree<G::Action>, id: NodeId) {
        if let Some(key) = tree.get(id).key {
            if let Some(entry) = self.table.lookup(key) {
                tree.seed(id, entry.visits, entry.value_sum);
            }
        }
    }

    /// Player whose point of view the leaf's value is taken from.
    ///
    /// Under alternating plies this is the opponent of the parent's mover,
    /// which stays correct on terminal states whose side to move is stale.
    fn leaf_perspective(&self, tree: &MctsTree<G::Action>, leaf: NodeId) -> PlayerId {
        let node = tree.get(leaf);
        match self.config.perspective {
            ValuePerspective::AlternatingPlies if node.parent.is_some() => {
                opponent(tree.get(node.parent).player)
            }
            _ => node.player,
        }
    }

    /// Legal actions in expansion order.
    ///
    /// With a prior or tactical hook the list is stable-sorted by descending
    /// `(tactical, prior)`; otherwise it keeps the game's legal order. When
    /// the state has a fingerprint the ordering is cached per
    /// `(fingerprint, player)`.
    fn ordered_candidates(
        &self,
        state: &G::State,
        player: PlayerId,
        key: Option<u64>,
    ) -> VecDeque<(G::Action, f32)> {
        if self.game.is_terminal(state) {
            return VecDeque::new();
        }
        if let Some(key) = key {
            if let Some(cached) = self.table.ordered_actions(key, player) {
                return cached.iter().cloned().collect();
            }
        }

        let hooks = self.game.hooks();
        let legal = self.game.legal_actions(state);
        let ordered: Vec<(G::Action, f32)> = if hooks.action_prior || hooks.tactical_priority {
            let mut scored: Vec<(G::Action, i32, f32)> = legal
                .into_iter()
                .map(|action| {
                    let tactical = if hooks.tactical_priority {
                        self.game.tactical_priority(state, &action, player)
                    } else {
                        0
                    };
                    let prior = if hooks.action_prior {
                        self.game.action_prior(state, &action, player)
                    } else {
                        0.0
                    };
                    (action, tactical, prior)
                })
                .collect();
            scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.2.total_cmp(&a.2)));
            scored
                .into_iter()
                .map(|(action, _, prior)| (action, prior))
                .collect()
        } else {
            legal.into_iter().map(|action| (action, 0.0)).collect()
        };

        if let Some(key) = key {
            self.table
                .store_ordered(key, player, Arc::from(ordered.clone()));
        }
        ordered.into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transposition::TranspositionEntry;
    use engine_core::Hooks;
    use games_skirmish::{Skirmish, SkirmishConfig};
    use games_tictactoe::{Action, State, TicTacToe};
    use std::cell::Cell;

    /// One decision with `outcomes.len()` actions, each ending the game with a
    /// fixed outcome for player 0.
    struct Fan {
        outcomes: Vec<f32>,
        keyed: bool,
    }

    impl Fan {
        fn new(outcomes: Vec<f32>) -> Self {
            Self {
                outcomes,
                keyed: false,
            }
        }

        fn keyed(mut self) -> Self {
            self.keyed = true;
            self
        }
    }

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct FanState {
        picked: Option<usize>,
        to_move: PlayerId,
    }

    const FAN_ROOT: FanState = FanState {
        picked: None,
        to_move: 0,
    };

    impl GameAdapter for Fan {
        type State = FanState;
        type Action = usize;
        type Undo = FanState;

        fn legal_actions(&self, state: &FanState) -> Vec<usize> {
            match state.picked {
                None => (0..self.outcomes.len()).collect(),
                Some(_) => Vec::new(),
            }
        }

        fn apply_action_with_undo(&self, state: &mut FanState, action: &usize) -> Option<FanState> {
            if state.picked.is_some() || *action >= self.outcomes.len() {
                return None;
            }
            let token = *state;
            state.picked = Some(*action);
            state.to_move = opponent(state.to_move);
            Some(token)
        }

        fn undo_action(&self, state: &mut FanState, token: FanState) {
            *state = token;
        }

        fn is_terminal(&self, state: &FanState) -> bool {
            state.picked.is_some()
        }

        fn current_player(&self, state: &FanState) -> PlayerId {
            state.to_move
        }

        fn outcome_for_player(&self, state: &FanState, player: PlayerId) -> f32 {
            let value = state.picked.map_or(0.0, |a| self.outcomes[a]);
            if player == 0 {
                value
            } else {
                -value
            }
        }

        fn state_key(&self, state: &FanState) -> Option<u64> {
            self.keyed
                .then(|| state.picked.map_or(0, |a| a as u64 + 1))
        }
    }

    /// A fan whose action 0 is accepted once and rejected afterwards.
    struct Flaky {
        inner: Fan,
        applied_zero: Cell<u32>,
    }

    impl GameAdapter for Flaky {
        type State = FanState;
        type Action = usize;
        type Undo = FanState;

        fn legal_actions(&self, state: &FanState) -> Vec<usize> {
            self.inner.legal_actions(state)
        }

        fn apply_action_with_undo(&self, state: &mut FanState, action: &usize) -> Option<FanState> {
            if *action == 0 {
                let n = self.applied_zero.get();
                self.applied_zero.set(n + 1);
                if n > 0 {
                    return None;
                }
            }
            self.inner.apply_action_with_undo(state, action)
        }

        fn undo_action(&self, state: &mut FanState, token: FanState) {
            *state = token;
        }

        fn is_terminal(&self, state: &FanState) -> bool {
            self.inner.is_terminal(state)
        }

        fn current_player(&self, state: &FanState) -> PlayerId {
            state.to_move
        }

        fn outcome_for_player(&self, state: &FanState, player: PlayerId) -> f32 {
            self.inner.outcome_for_player(state, player)
        }
    }

    fn play(game: &TicTacToe, moves: &[u8]) -> State {
        let mut state = State::new();
        for &m in moves {
            assert!(game.apply_action(&mut state, &Action::Place(m)));
        }
        state
    }

    #[test]
    fn test_visit_conservation() {
        let game = TicTacToe::new();
        let config = MctsConfig::for_testing()
            .with_iterations(100)
            .with_transposition(false);
        let mut search = MctsSearch::new(game, config).unwrap();

        let (_, stats) = search.select_action(&State::new()).unwrap();
        assert_eq!(stats.iterations, 100);
        assert_eq!(stats.root_visits, 100);
        assert!(stats.best_action_visits <= 100);
    }

    #[test]
    fn test_three_actions_expanded_before_fourth_iteration() {
        let game = Fan::new(vec![0.0, 0.0, 0.0]);
        let mut search = MctsSearch::new(game, MctsConfig::for_testing()).unwrap();

        let (tree, _) = search.run(&FAN_ROOT, Budget::Iterations(3)).unwrap();
        let root = tree.get(tree.root());
        assert_eq!(root.children.len(), 3);
        for child in &root.children {
            assert_eq!(tree.get(child.node).visits, 1);
        }

        let (_, stats) = search.select_action(&FAN_ROOT).unwrap();
        assert_eq!(stats.tree_nodes, 4);
    }

    #[test]
    fn test_picks_best_outcome() {
        let game = Fan::new(vec![-1.0, 1.0, 0.0, -1.0]);
        let config = MctsConfig::for_testing().with_iterations(200);
        let mut search = MctsSearch::new(game, config).unwrap();

        let (action, stats) = search.select_action(&FAN_ROOT).unwrap();
        assert_eq!(action, 1);
        assert!((stats.best_action_value - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_frozen_widening_only_uses_base_actions() {
        let game = Fan::new(vec![0.0, 0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let config = MctsConfig::for_testing()
            .with_iterations(300)
            .with_widening(2, 0, 1);
        let mut search = MctsSearch::new(game, config).unwrap();

        let (action, stats) = search.select_action(&FAN_ROOT).unwrap();
        assert!(action < 2, "chose {action}, outside the base allowance");
        assert_eq!(stats.tree_nodes, 3);
        assert_eq!(stats.root_visits, 300);
    }

    #[test]
    fn test_widening_admits_more_children_with_visits() {
        let game = Fan::new(vec![0.0; 8]);
        let config = MctsConfig::for_testing().with_widening(2, 1, 10);
        let mut search = MctsSearch::new(game, config).unwrap();

        let (tree, _) = search.run(&FAN_ROOT, Budget::Iterations(25)).unwrap();
        // Allowance after 24 visits is 2 + 24 / 10 = 4.
        assert_eq!(tree.get(tree.root()).children.len(), 4);
    }

    #[test]
    fn test_seeded_entry_initialises_new_node() {
        let game = Fan::new(vec![0.0, 0.0, 0.0]).keyed();
        let table = TranspositionTable::new();
        // Key of the state after action 0.
        table.store(
            1,
            TranspositionEntry {
                visits: 50,
                value_sum: 40.0,
            },
        );
        let mut search = MctsSearch::new(game, MctsConfig::for_testing())
            .unwrap()
            .with_transposition_table(table.clone());

        let (tree, _) = search.run(&FAN_ROOT, Budget::Iterations(1)).unwrap();
        let child = tree.get(tree.root()).children[0].node;
        assert_eq!(tree.get(child).visits, 51);
        assert_eq!(table.lookup(1).map(|e| e.visits), Some(51));
    }

    #[test]
    fn test_seeded_entry_steers_final_choice() {
        let game = Fan::new(vec![0.0, 0.0, 0.0]).keyed();
        let table = TranspositionTable::new();
        table.store(
            3,
            TranspositionEntry {
                visits: 1000,
                value_sum: -900.0,
            },
        );
        let config = MctsConfig::for_testing().with_iterations(30);
        let mut search = MctsSearch::new(game, config)
            .unwrap()
            .with_transposition_table(table);

        let (action, stats) = search.select_action(&FAN_ROOT).unwrap();
        assert_eq!(action, 2);
        assert!(stats.best_action_visits > 1000);
    }

    #[test]
    fn test_rejected_edge_is_pruned() {
        let game = Flaky {
            inner: Fan::new(vec![1.0, 0.0, 0.0]),
            applied_zero: Cell::new(0),
        };
        let config = MctsConfig::for_testing().with_iterations(50);
        let mut search = MctsSearch::new(game, config).unwrap();

        let (tree, _) = search.run(&FAN_ROOT, Budget::Iterations(50)).unwrap();
        let root = tree.get(tree.root());
        assert_eq!(root.children.len(), 2);
        assert!(root.child_for(&0).is_none());
        for (slot, child) in root.children.iter().enumerate() {
            assert_eq!(root.child_index.get(&child.action), Some(&slot));
        }
        assert!(search.pruned >= 1);
    }

    #[test]
    fn test_rejected_expansion_is_discarded() {
        let game = Flaky {
            inner: Fan::new(vec![0.0, 0.5, -0.5]),
            // Already used up: action 0 is always rejected.
            applied_zero: Cell::new(1),
        };
        let mut search = MctsSearch::new(game, MctsConfig::for_testing()).unwrap();

        let (action, stats) = search.select_action(&FAN_ROOT).unwrap();
        assert_eq!(action, 1);
        assert_eq!(stats.pruned_edges, 1);
        assert_eq!(stats.tree_nodes, 3);
    }

    #[test]
    fn test_no_legal_actions() {
        let game = TicTacToe::new();
        // X wins on the top row.
        let state = play(&game, &[0, 3, 1, 4, 2]);
        let mut search = MctsSearch::new(game, MctsConfig::for_testing()).unwrap();

        assert!(matches!(
            search.select_action(&state),
            Err(SearchError::NoLegalActions)
        ));
    }

    #[test]
    fn test_finds_winning_move_with_positive_value() {
        let game = TicTacToe::new();
        // X | X | _
        // O | O | _
        // _ | _ | _
        let state = play(&game, &[0, 3, 1, 4]);
        let config = MctsConfig::for_testing().with_iterations(800);
        let mut search = MctsSearch::new(game, config).unwrap();

        let (action, stats) = search.select_action(&state).unwrap();
        assert_eq!(action, Action::Place(2));
        assert!(stats.best_action_value > 0.0);
    }

    #[test]
    fn test_blocks_with_heuristics() {
        let game = TicTacToe::new().with_heuristics(true);
        // X | _ | _
        // O | O | _
        // X | _ | _
        let state = play(&game, &[0, 3, 6, 4]);
        let config = MctsConfig::for_testing().with_iterations(400);
        let mut search = MctsSearch::new(game, config).unwrap();

        // X to move: the only non-losing move is 5.
        let (action, _) = search.select_action(&state).unwrap();
        assert_eq!(action, Action::Place(5));
    }

    #[test]
    fn test_values_stay_bounded() {
        let game = TicTacToe::new();
        let mut search = MctsSearch::new(game, MctsConfig::for_testing()).unwrap();

        let (tree, _) = search
            .run(&State::new(), Budget::Iterations(300))
            .unwrap();
        for id in 0..tree.len() {
            let node = tree.get(NodeId(id as u32));
            assert!(node.value_sum.abs() <= node.visits as f32 + 1e-4);
        }
    }

    #[test]
    fn test_state_restored_after_search() {
        let game = TicTacToe::new().with_heuristics(true);
        let state = play(&game, &[4]);
        let mut search = MctsSearch::new(game, MctsConfig::for_testing()).unwrap();

        let (mut tree, _) = search.run(&state, Budget::Iterations(64)).unwrap();
        assert!(tree.len() > 1);
        let mut working = state;
        let mut undo = Vec::new();
        search.simulate(&mut tree, &mut working, &mut undo);
        assert_eq!(working, state);
        assert!(undo.is_empty());
    }

    #[test]
    fn test_ordering_cached_in_shared_table() {
        let game = TicTacToe::new().with_heuristics(true);
        let table = TranspositionTable::new();
        let mut search = MctsSearch::new(game, MctsConfig::for_testing())
            .unwrap()
            .with_transposition_table(table.clone());

        search.select_action(&State::new()).unwrap();
        assert!(table.ordered_len() > 0);
        assert!(!table.is_empty());
        assert!(search.transposition_table().shares_storage_with(&table));
    }

    #[test]
    fn test_transposition_off_leaves_table_empty() {
        let game = TicTacToe::new().with_heuristics(true);
        let config = MctsConfig::for_testing().with_transposition(false);
        let mut search = MctsSearch::new(game, config).unwrap();

        search.select_action(&State::new()).unwrap();
        assert!(search.transposition_table().is_empty());
        assert_eq!(search.transposition_table().ordered_len(), 0);
    }

    #[test]
    fn test_by_player_perspective_on_multi_action_turns() {
        let game = Skirmish::new(SkirmishConfig::small());
        assert_eq!(game.hooks(), Hooks::ALL);
        let state = game.initial_state();
        let config = MctsConfig::for_testing()
            .with_iterations(200)
            .with_perspective(ValuePerspective::ByPlayer);
        let mut search = MctsSearch::new(game, config).unwrap();

        let (action, stats) = search.select_action(&state).unwrap();
        assert!(search.game().legal_actions(&state).contains(&action));
        assert!(stats.best_action_value.abs() <= 1.0 + 1e-4);
        assert_eq!(stats.iterations, 200);
    }

    #[test]
    fn test_deadline_runs_minimum_iterations() {
        let game = TicTacToe::new();
        let mut search = MctsSearch::new(game, MctsConfig::for_testing()).unwrap();

        let (_, stats) = search
            .select_action_for_time(&State::new(), 0.0, 5)
            .unwrap();
        assert!(stats.iterations >= 5);
        assert!(stats.elapsed >= Duration::from_millis(10));
    }

    #[test]
    fn test_same_seed_same_choice() {
        let state = play(&TicTacToe::new(), &[4]);
        let pick = || {
            let config = MctsConfig::for_testing().with_transposition(false);
            let mut search = MctsSearch::new(TicTacToe::new(), config).unwrap();
            search.select_action(&state).unwrap().0
        };
        assert_eq!(pick(), pick());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = MctsConfig::default().with_widening(0, 1, 1);
        assert!(matches!(
            MctsSearch::new(TicTacToe::new(), config),
            Err(SearchError::InvalidConfig(_))
        ));
    }
}
