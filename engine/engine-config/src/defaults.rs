//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time so the binary and any
//! tooling reading the same file agree on every value.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    mcts: MctsDefaults,
    puct: PuctDefaults,
    arena: ArenaDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
    data_dir: String,
}

#[derive(Debug, Deserialize)]
struct MctsDefaults {
    iterations: u32,
    c_uct: f64,
    rollout_depth: u32,
    rollout_greedy_prob: f64,
    rollout_top_k: usize,
    tactical_override: i32,
    widening_base: u32,
    widening_step: u32,
    widening_every: u32,
    use_transposition: bool,
    min_iterations: u32,
    think_time_secs: f64,
}

#[derive(Debug, Deserialize)]
struct PuctDefaults {
    simulations: u32,
    c_puct: f64,
    dirichlet_alpha: f64,
    dirichlet_epsilon: f64,
    temperature: f64,
    max_move_amount: u32,
}

#[derive(Debug, Deserialize)]
struct ArenaDefaults {
    games: u32,
    seed: u64,
    weights_path: String,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}
pub fn data_dir() -> &'static str {
    &DEFAULTS.common.data_dir
}

// Plain driver
pub fn iterations() -> u32 {
    DEFAULTS.mcts.iterations
}
pub fn c_uct() -> f64 {
    DEFAULTS.mcts.c_uct
}
pub fn rollout_depth() -> u32 {
    DEFAULTS.mcts.rollout_depth
}
pub fn rollout_greedy_prob() -> f64 {
    DEFAULTS.mcts.rollout_greedy_prob
}
pub fn rollout_top_k() -> usize {
    DEFAULTS.mcts.rollout_top_k
}
pub fn tactical_override() -> i32 {
    DEFAULTS.mcts.tactical_override
}
pub fn widening_base() -> u32 {
    DEFAULTS.mcts.widening_base
}
pub fn widening_step() -> u32 {
    DEFAULTS.mcts.widening_step
}
pub fn widening_every() -> u32 {
    DEFAULTS.mcts.widening_every
}
pub fn use_transposition() -> bool {
    DEFAULTS.mcts.use_transposition
}
pub fn min_iterations() -> u32 {
    DEFAULTS.mcts.min_iterations
}
pub fn think_time_secs() -> f64 {
    DEFAULTS.mcts.think_time_secs
}

// Prior-guided driver
pub fn simulations() -> u32 {
    DEFAULTS.puct.simulations
}
pub fn c_puct() -> f64 {
    DEFAULTS.puct.c_puct
}
pub fn dirichlet_alpha() -> f64 {
    DEFAULTS.puct.dirichlet_alpha
}
pub fn dirichlet_epsilon() -> f64 {
    DEFAULTS.puct.dirichlet_epsilon
}
pub fn temperature() -> f64 {
    DEFAULTS.puct.temperature
}
pub fn max_move_amount() -> u32 {
    DEFAULTS.puct.max_move_amount
}

// Arena
pub fn games() -> u32 {
    DEFAULTS.arena.games
}
pub fn seed() -> u64 {
    DEFAULTS.arena.seed
}
pub fn weights_path() -> &'static str {
    &DEFAULTS.arena.weights_path
}
