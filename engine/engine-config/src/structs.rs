//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_data_dir() -> String {
    defaults::data_dir().into()
}
fn d_iterations() -> u32 {
    defaults::iterations()
}
fn d_c_uct() -> f64 {
    defaults::c_uct()
}
fn d_rollout_depth() -> u32 {
    defaults::rollout_depth()
}
fn d_rollout_greedy_prob() -> f64 {
    defaults::rollout_greedy_prob()
}
fn d_rollout_top_k() -> usize {
    defaults::rollout_top_k()
}
fn d_tactical_override() -> i32 {
    defaults::tactical_override()
}
fn d_widening_base() -> u32 {
    defaults::widening_base()
}
fn d_widening_step() -> u32 {
    defaults::widening_step()
}
fn d_widening_every() -> u32 {
    defaults::widening_every()
}
fn d_use_transposition() -> bool {
    defaults::use_transposition()
}
fn d_min_iterations() -> u32 {
    defaults::min_iterations()
}
fn d_think_time_secs() -> f64 {
    defaults::think_time_secs()
}
fn d_simulations() -> u32 {
    defaults::simulations()
}
fn d_c_puct() -> f64 {
    defaults::c_puct()
}
fn d_dirichlet_alpha() -> f64 {
    defaults::dirichlet_alpha()
}
fn d_dirichlet_epsilon() -> f64 {
    defaults::dirichlet_epsilon()
}
fn d_temperature() -> f64 {
    defaults::temperature()
}
fn d_max_move_amount() -> u32 {
    defaults::max_move_amount()
}
fn d_games() -> u32 {
    defaults::games()
}
fn d_seed() -> u64 {
    defaults::seed()
}
fn d_weights_path() -> String {
    defaults::weights_path().into()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub mcts: MctsConfig,
    #[serde(default)]
    pub puct: PuctConfig,
    #[serde(default)]
    pub arena: ArenaConfig,
}

/// Settings shared by every command
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
    #[serde(default = "d_data_dir")]
    pub data_dir: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
            data_dir: defaults::data_dir().into(),
        }
    }
}

/// Plain (rollout-based) search settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MctsConfig {
    #[serde(default = "d_iterations")]
    pub iterations: u32,
    #[serde(default = "d_c_uct")]
    pub c_uct: f64,
    #[serde(default = "d_rollout_depth")]
    pub rollout_depth: u32,
    #[serde(default = "d_rollout_greedy_prob")]
    pub rollout_greedy_prob: f64,
    #[serde(default = "d_rollout_top_k")]
    pub rollout_top_k: usize,
    #[serde(default = "d_tactical_override")]
    pub tactical_override: i32,
    #[serde(default = "d_widening_base")]
    pub widening_base: u32,
    #[serde(default = "d_widening_step")]
    pub widening_step: u32,
    #[serde(default = "d_widening_every")]
    pub widening_every: u32,
    #[serde(default = "d_use_transposition")]
    pub use_transposition: bool,
    #[serde(default = "d_min_iterations")]
    pub min_iterations: u32,
    /// Per-move thinking time; `0` means use the iteration budget.
    #[serde(default = "d_think_time_secs")]
    pub think_time_secs: f64,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            iterations: defaults::iterations(),
            c_uct: defaults::c_uct(),
            rollout_depth: defaults::rollout_depth(),
            rollout_greedy_prob: defaults::rollout_greedy_prob(),
            rollout_top_k: defaults::rollout_top_k(),
            tactical_override: defaults::tactical_override(),
            widening_base: defaults::widening_base(),
            widening_step: defaults::widening_step(),
            widening_every: defaults::widening_every(),
            use_transposition: defaults::use_transposition(),
            min_iterations: defaults::min_iterations(),
            think_time_secs: defaults::think_time_secs(),
        }
    }
}

/// Prior-guided search settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PuctConfig {
    #[serde(default = "d_simulations")]
    pub simulations: u32,
    #[serde(default = "d_c_puct")]
    pub c_puct: f64,
    #[serde(default = "d_dirichlet_alpha")]
    pub dirichlet_alpha: f64,
    #[serde(default = "d_dirichlet_epsilon")]
    pub dirichlet_epsilon: f64,
    #[serde(default = "d_temperature")]
    pub temperature: f64,
    /// Largest move amount given an action-index slot.
    #[serde(default = "d_max_move_amount")]
    pub max_move_amount: u32,
}

impl Default for PuctConfig {
    fn default() -> Self {
        Self {
            simulations: defaults::simulations(),
            c_puct: defaults::c_puct(),
            dirichlet_alpha: defaults::dirichlet_alpha(),
            dirichlet_epsilon: defaults::dirichlet_epsilon(),
            temperature: defaults::temperature(),
            max_move_amount: defaults::max_move_amount(),
        }
    }
}

/// Match runner settings
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ArenaConfig {
    #[serde(default = "d_games")]
    pub games: u32,
    #[serde(default = "d_seed")]
    pub seed: u64,
    /// JSON heuristic weights to load; empty for the built-in defaults.
    #[serde(default = "d_weights_path")]
    pub weights_path: String,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            games: defaults::games(),
            seed: defaults::seed(),
            weights_path: defaults::weights_path().into(),
        }
    }
}
