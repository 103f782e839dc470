//! Search configuration parameters.

use engine_core::PlayerId;

use crate::search::SearchError;

/// How a child's value is converted into its parent's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValuePerspective {
    /// Negate at every ply. Correct for games where the mover alternates
    /// every action.
    #[default]
    AlternatingPlies,

    /// Negate only when the player to move differs between parent and child.
    /// Use for games where one player takes several actions per turn.
    ByPlayer,
}

impl ValuePerspective {
    /// Convert a value held from `child_player`'s view into `parent_player`'s.
    #[inline]
    pub fn to_parent(self, value: f32, child_player: PlayerId, parent_player: PlayerId) -> f32 {
        match self {
            ValuePerspective::AlternatingPlies => -value,
            ValuePerspective::ByPlayer if child_player == parent_player => value,
            ValuePerspective::ByPlayer => -value,
        }
    }
}

/// Configuration for the plain UCT driver (rollouts, progressive widening,
/// transposition reuse).
#[derive(Debug, Clone)]
pub struct MctsConfig {
    /// Simulations per `select_action` call.
    pub iterations: u32,

    /// Exploration constant in the UCB1 bonus `c * sqrt(ln(N) / n)`.
    pub c_uct: f32,

    /// Maximum plies per rollout before falling back to `evaluate`.
    pub rollout_depth: u32,

    /// Probability a rollout ply plays the best-prior action outright.
    pub rollout_greedy_prob: f32,

    /// Shortlist size for rollout sampling.
    pub rollout_top_k: usize,

    /// Tactical priority at or above which a rollout plays the tactical move
    /// without sampling.
    pub tactical_override: i32,

    /// Progressive widening: children allowed = base + (visits / every) * step.
    pub widening_base: u32,
    pub widening_step: u32,
    pub widening_every: u32,

    /// Reuse statistics and move orderings across branches and calls.
    pub use_transposition: bool,

    /// Floor on simulations for deadline-bounded searches.
    pub min_iterations: u32,

    pub perspective: ValuePerspective,

    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: 400,
            c_uct: 1.41,
            rollout_depth: 60,
            rollout_greedy_prob: 0.85,
            rollout_top_k: 6,
            tactical_override: 80,
            widening_base: 8,
            widening_step: 5,
            widening_every: 25,
            use_transposition: true,
            min_iterations: 1,
            perspective: ValuePerspective::AlternatingPlies,
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Create config for strength evaluation (deterministic seed, full budget).
    pub fn for_evaluation() -> Self {
        Self {
            seed: Some(0),
            ..Self::default()
        }
    }

    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            iterations: 64,
            rollout_depth: 20,
            seed: Some(42),
            ..Self::default()
        }
    }

    /// Builder pattern: set number of iterations.
    pub fn with_iterations(mut self, n: u32) -> Self {
        self.iterations = n;
        self
    }

    pub fn with_c_uct(mut self, c: f32) -> Self {
        self.c_uct = c;
        self
    }

    pub fn with_rollout_depth(mut self, depth: u32) -> Self {
        self.rollout_depth = depth;
        self
    }

    /// Builder pattern: set progressive widening (base, step, every).
    pub fn with_widening(mut self, base: u32, step: u32, every: u32) -> Self {
        self.widening_base = base;
        self.widening_step = step;
        self.widening_every = every;
        self
    }

    pub fn with_transposition(mut self, enabled: bool) -> Self {
        self.use_transposition = enabled;
        self
    }

    pub fn with_perspective(mut self, perspective: ValuePerspective) -> Self {
        self.perspective = perspective;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Children a node with `visits` visits may have.
    #[inline]
    pub fn widening_allowance(&self, visits: u32) -> usize {
        let every = self.widening_every.max(1);
        let grown = (visits / every).saturating_mul(self.widening_step);
        self.widening_base.saturating_add(grown) as usize
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if self.widening_base == 0 {
            return Err(SearchError::InvalidConfig(
                "widening_base must be at least 1".into(),
            ));
        }
        if self.widening_every == 0 {
            return Err(SearchError::InvalidConfig(
                "widening_every must be at least 1".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.rollout_greedy_prob) {
            return Err(SearchError::InvalidConfig(format!(
                "rollout_greedy_prob {} outside [0, 1]",
                self.rollout_greedy_prob
            )));
        }
        if self.rollout_top_k == 0 {
            return Err(SearchError::InvalidConfig(
                "rollout_top_k must be at least 1".into(),
            ));
        }
        if !self.c_uct.is_finite() || self.c_uct < 0.0 {
            return Err(SearchError::InvalidConfig(format!(
                "c_uct {} must be finite and non-negative",
                self.c_uct
            )));
        }
        Ok(())
    }
}

/// Configuration for the prior-guided PUCT driver.
#[derive(Debug, Clone)]
pub struct PuctConfig {
    /// Number of simulations to run per search.
    pub simulations: u32,

    /// Exploration constant for the PUCT formula.
    /// Higher values encourage exploration, lower values favor exploitation.
    pub c_puct: f32,

    /// Dirichlet noise alpha for root node exploration.
    /// Set to 0.0 to disable noise (for evaluation/inference).
    pub dirichlet_alpha: f32,

    /// Fraction of the root prior that comes from Dirichlet noise.
    pub dirichlet_epsilon: f32,

    /// Temperature for action selection after search.
    /// 1.0 = sample proportional to visit counts
    /// 0.0 = always pick most-visited (argmax)
    pub temperature: f32,

    /// Floor on simulations for deadline-bounded searches.
    pub min_simulations: u32,

    pub perspective: ValuePerspective,

    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for PuctConfig {
    fn default() -> Self {
        Self {
            simulations: 200,
            c_puct: 1.5,
            dirichlet_alpha: 0.3,
            dirichlet_epsilon: 0.25,
            temperature: 1.0,
            min_simulations: 1,
            perspective: ValuePerspective::AlternatingPlies,
            seed: None,
        }
    }
}

impl PuctConfig {
    /// Create config for self-play training (with exploration noise).
    pub fn for_training() -> Self {
        Self::default()
    }

    /// Create config for evaluation/inference (no noise, greedy selection).
    pub fn for_evaluation() -> Self {
        Self {
            dirichlet_alpha: 0.0, // No noise
            dirichlet_epsilon: 0.0,
            temperature: 0.0, // Greedy
            ..Self::default()
        }
    }

    /// Create a fast config for testing.
    pub fn for_testing() -> Self {
        Self {
            simulations: 50,
            dirichlet_alpha: 0.0,
            dirichlet_epsilon: 0.0,
            temperature: 0.0,
            seed: Some(42),
            ..Self::default()
        }
    }

    /// Builder pattern: set number of simulations.
    pub fn with_simulations(mut self, n: u32) -> Self {
        self.simulations = n;
        self
    }

    /// Builder pattern: set c_puct exploration constant.
    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }

    /// Builder pattern: set temperature.
    pub fn with_temperature(mut self, t: f32) -> Self {
        self.temperature = t;
        self
    }

    pub fn with_dirichlet(mut self, alpha: f32, epsilon: f32) -> Self {
        self.dirichlet_alpha = alpha;
        self.dirichlet_epsilon = epsilon;
        self
    }

    pub fn with_perspective(mut self, perspective: ValuePerspective) -> Self {
        self.perspective = perspective;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        if !self.c_puct.is_finite() || self.c_puct < 0.0 {
            return Err(SearchError::InvalidConfig(format!(
                "c_puct {} must be finite and non-negative",
                self.c_puct
            )));
        }
        if self.dirichlet_alpha < 0.0 {
            return Err(SearchError::InvalidConfig(format!(
                "dirichlet_alpha {} must be non-negative",
                self.dirichlet_alpha
            )));
        }
        if !(0.0..=1.0).contains(&self.dirichlet_epsilon) {
            return Err(SearchError::InvalidConfig(format!(
                "dirichlet_epsilon {} outside [0, 1]",
                self.dirichlet_epsilon
            )));
        }
        if self.temperature < 0.0 || !self.temperature.is_finite() {
            return Err(SearchError::InvalidConfig(format!(
                "temperature {} must be finite and non-negative",
                self.temperature
            )));
        }
        Ok(())
    }
}
