//! Prior-guided (PUCT) driver.
//!
//! The root is expanded once up front with a single evaluator call. Every
//! later expansion calls the evaluator once for both the priors over the
//! legal moves and the value of the new state; that value is the leaf
//! estimate, so there are no rollouts. Terminal leaves use the exact outcome.
//!
//! Like the plain driver, a simulation mutates one working copy of the root
//! state and unwinds its undo tokens before the next simulation starts.

use std::time::{Duration, Instant};

use engine_core::{opponent, ActionIndex, FeatureEncoder, GameAdapter, PlayerId};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use tracing::{debug, trace};

use crate::config::{PuctConfig, ValuePerspective};
use crate::evaluator::Evaluator;
use crate::node::NodeId;
use crate::policy::{dirichlet_noise, legal_softmax, sample_index, visit_policy, GREEDY_TEMPERATURE};
use crate::puct_tree::{PuctEdge, PuctTree};
use crate::search::{SearchError, SearchStats};

/// Outcome of a prior-guided search.
#[derive(Debug, Clone)]
pub struct PuctResult<A> {
    pub action: A,

    /// Slot of `action` in the action index.
    pub action_index: usize,

    /// Temperature-scaled visit distribution over the full index space.
    pub policy: Vec<f32>,

    /// Mean backed-up value at the root, from the root player's perspective.
    pub root_value: f32,

    pub stats: SearchStats,
}

/// PUCT search over a [`GameAdapter`] with a learned (or stand-in) evaluator.
pub struct PuctSearch<G, E, V>
where
    G: GameAdapter,
{
    game: G,
    encoder: E,
    evaluator: V,
    index: ActionIndex<G::Action>,
    config: PuctConfig,
    rng: ChaCha20Rng,
    features: Vec<f32>,
    pruned: u32,
}

impl<G, E, V> PuctSearch<G, E, V>
where
    G: GameAdapter,
    E: FeatureEncoder<G::State>,
    V: Evaluator,
{
    pub fn new(
        game: G,
        encoder: E,
        evaluator: V,
        index: ActionIndex<G::Action>,
        config: PuctConfig,
    ) -> Result<Self, SearchError> {
        config.validate()?;
        if index.is_empty() {
            return Err(SearchError::InvalidConfig("action index is empty".into()));
        }
        let rng = match config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };
        let features = Vec::with_capacity(encoder.feature_size());
        Ok(Self {
            game,
            encoder,
            evaluator,
            index,
            config,
            rng,
            features,
            pruned: 0,
        })
    }

    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn index(&self) -> &ActionIndex<G::Action> {
        &self.index
    }

    pub fn config(&self) -> &PuctConfig {
        &self.config
    }

    /// Change the temperature between moves (e.g. greedy after the opening).
    pub fn set_temperature(&mut self, temperature: f32) {
        self.config.temperature = temperature.max(0.0);
    }

    /// Choose an action with the configured simulation budget.
    pub fn select_action(
        &mut self,
        state: &G::State,
    ) -> Result<(G::Action, SearchStats), SearchError> {
        let result = self.search(state)?;
        Ok((result.action, result.stats))
    }

    /// Choose an action within `max_time_secs`, running at least
    /// `min_simulations` simulations.
    pub fn select_action_for_time(
        &mut self,
        state: &G::State,
        max_time_secs: f64,
        min_simulations: u32,
    ) -> Result<(G::Action, SearchStats), SearchError> {
        let secs = if max_time_secs.is_finite() {
            max_time_secs.max(0.01)
        } else {
            0.01
        };
        let until = Instant::now() + Duration::from_secs_f64(secs);
        let floor = min_simulations.max(1);
        let result = self.run(state, |done| done >= floor && Instant::now() >= until)?;
        Ok((result.action, result.stats))
    }

    /// Full search with the configured simulation budget.
    pub fn search(&mut self, state: &G::State) -> Result<PuctResult<G::Action>, SearchError> {
        let budget = self.config.simulations.max(self.config.min_simulations).max(1);
        self.run(state, |done| done >= budget)
    }

    fn run<F>(
        &mut self,
        root_state: &G::State,
        mut exhausted: F,
    ) -> Result<PuctResult<G::Action>, SearchError>
    where
        F: FnMut(u32) -> bool,
    {
        let started = Instant::now();
        self.pruned = 0;

        let mut state = self.game.clone_state(root_state);
        if self.game.is_terminal(&state) || self.index.legal_indices(&self.game, &state).is_empty()
        {
            return Err(SearchError::NoLegalActions);
        }

        let mut tree = PuctTree::new(self.game.current_player(&state));
        let root = tree.root();
        self.expand(&mut tree, root, &state)?;
        self.add_root_noise(&mut tree);

        let mut simulations = 0;
        let mut undo_stack = Vec::new();
        let mut path = Vec::new();
        while !exhausted(simulations) {
            let outcome = self.simulate(&mut tree, &mut state, &mut undo_stack, &mut path);
            while let Some(token) = undo_stack.pop() {
                self.game.undo_action(&mut state, token);
            }
            outcome?;
            simulations += 1;
        }

        self.finish(&tree, root_state, simulations, started)
    }

    /// One simulation. Undo tokens are left on `undo_stack` for the caller.
    fn simulate(
        &mut self,
        tree: &mut PuctTree<G::Action>,
        state: &mut G::State,
        undo_stack: &mut Vec<G::Undo>,
        path: &mut Vec<(NodeId, usize)>,
    ) -> Result<(), SearchError> {
        path.clear();
        let mut current = tree.root();

        let value = loop {
            if self.game.is_terminal(state) {
                let player = self.leaf_perspective(tree, current, path);
                break self.game.outcome_for_player(state, player);
            }

            let node = tree.get(current);
            if !node.expanded {
                break self.expand(tree, current, state)?;
            }

            let Some(slot) = tree.select_edge(current, self.config.c_puct) else {
                // Stalled or fully pruned: reuse the expansion estimate.
                break tree.get(current).eval_value;
            };

            let action = tree.get(current).edges[slot].action.clone();
            match self.game.apply_action_with_undo(state, &action) {
                Some(token) => {
                    undo_stack.push(token);
                    path.push((current, slot));
                    let player = self.game.current_player(state);
                    current = tree.child_or_insert(current, slot, player);
                }
                None => {
                    tree.remove_edge(current, slot);
                    self.pruned += 1;
                    debug!(action = ?action, node = current.0, "PUCT edge rejected, pruned");
                }
            }
        };

        tree.backpropagate(path, current, value, self.config.perspective);
        trace!(depth = path.len(), value, "PUCT simulation complete");
        Ok(())
    }

    /// Evaluate `state` and attach its legal edges to `id`. Returns the clamped
    /// value from the player to move's perspective.
    fn expand(
        &mut self,
        tree: &mut PuctTree<G::Action>,
        id: NodeId,
        state: &G::State,
    ) -> Result<f32, SearchError> {
        self.features.clear();
        self.encoder.encode_into(state, &mut self.features);
        let eval = self.evaluator.evaluate(&self.features, self.index.len())?;
        if eval.logits.len() != self.index.len() {
            return Err(SearchError::IndexSizeMismatch {
                expected: self.index.len(),
                actual: eval.logits.len(),
            });
        }

        let legal: Vec<(usize, G::Action)> = self
            .game
            .legal_actions(state)
            .into_iter()
            .filter_map(|action| self.index.to_index(&action).map(|i| (i, action)))
            .collect();
        let slots: Vec<usize> = legal.iter().map(|(i, _)| *i).collect();
        let priors = legal_softmax(&eval.logits, &slots);

        let edges = legal
            .into_iter()
            .zip(priors)
            .map(|((i, action), prior)| PuctEdge::new(i, action, prior))
            .collect();

        let value = if eval.value.is_nan() {
            0.0
        } else {
            eval.value.clamp(-1.0, 1.0)
        };
        tree.expand(id, edges, value);
        Ok(value)
    }

    fn add_root_noise(&mut self, tree: &mut PuctTree<G::Action>) {
        let alpha = self.config.dirichlet_alpha;
        let eps = self.config.dirichlet_epsilon;
        let root = tree.root();
        let n = tree.get(root).edges.len();
        if alpha <= 0.0 || eps <= 0.0 || n <= 1 {
            return;
        }

        let noise = dirichlet_noise(n, alpha, &mut self.rng);
        for (edge, eta) in tree.get_mut(root).edges.iter_mut().zip(noise) {
            edge.prior = (1.0 - eps) * edge.prior + eps * eta;
        }
    }

    /// Perspective of a terminal leaf's outcome.
    fn leaf_perspective(
        &self,
        tree: &PuctTree<G::Action>,
        leaf: NodeId,
        path: &[(NodeId, usize)],
    ) -> PlayerId {
        match (self.config.perspective, path.last()) {
            (ValuePerspective::AlternatingPlies, Some(&(parent, _))) => {
                opponent(tree.get(parent).player)
            }
            _ => tree.get(leaf).player,
        }
    }

    fn finish(
        &mut self,
        tree: &PuctTree<G::Action>,
        root_state: &G::State,
        simulations: u32,
        started: Instant,
    ) -> Result<PuctResult<G::Action>, SearchError> {
        let root = tree.get(tree.root());
        let counts: Vec<u32> = root.edges.iter().map(|e| e.visits).collect();
        let distribution = visit_policy(&counts, self.config.temperature);

        let mut policy = vec![0.0; self.index.len()];
        for (edge, p) in root.edges.iter().zip(&distribution) {
            policy[edge.action_index] = *p;
        }

        let chosen = if self.config.temperature < GREEDY_TEMPERATURE {
            distribution.iter().position(|&p| p > 0.0)
        } else {
            sample_index(&distribution, &mut self.rng)
        };

        let (action, action_index, best_visits, best_value) = match chosen {
            Some(slot) => {
                let edge = &root.edges[slot];
                (edge.action.clone(), edge.action_index, edge.visits, edge.q_value())
            }
            None => {
                let (action, action_index) = self.uniform_legal(root_state)?;
                debug!(action = ?action, "Degenerate visit distribution, uniform fallback");
                (action, action_index, 0, 0.0)
            }
        };

        let stats = SearchStats {
            root_visits: root.visits,
            best_action_visits: best_visits,
            best_action_value: best_value,
            iterations: simulations,
            tree_nodes: tree.len(),
            elapsed: started.elapsed(),
            pruned_edges: self.pruned,
        };

        debug!(
            simulations,
            root_visits = stats.root_visits,
            best_visits = stats.best_action_visits,
            root_value = root.mean_value(),
            tree_nodes = stats.tree_nodes,
            pruned = stats.pruned_edges,
            action = ?action,
            "PUCT search complete"
        );

        Ok(PuctResult {
            action,
            action_index,
            policy,
            root_value: root.mean_value(),
            stats,
        })
    }

    fn uniform_legal(&mut self, state: &G::State) -> Result<(G::Action, usize), SearchError> {
        let mut legal: Vec<(G::Action, usize)> = self
            .game
            .legal_actions(state)
            .into_iter()
            .filter_map(|action| self.index.to_index(&action).map(|i| (action, i)))
            .collect();
        if legal.is_empty() {
            return Err(SearchError::NoLegalActions);
        }
        let pick = self.rng.gen_range(0..legal.len());
        Ok(legal.swap_remove(pick))
    }
}
