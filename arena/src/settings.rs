//! Maps the central `config.toml` sections onto the search drivers' typed
//! configs and the host game.
//!
//! Command-line flags take priority over environment variables, which take
//! priority over config.toml (see `engine-config`).

use anyhow::{anyhow, Context, Result};
use clap::ValueEnum;
use engine_config::CentralConfig;
use engine_core::HeuristicWeights;
use games_skirmish::{default_weights, Skirmish, SkirmishConfig};
use mcts::{MctsConfig, PuctConfig, ValuePerspective};
use tracing::info;
use tracing::level_filters::LevelFilter;

/// Board preset for the host game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Board {
    /// 5x5 board, 60 turns.
    Standard,
    /// 3x3 board, 20 turns.
    Small,
}

impl Board {
    pub fn skirmish_config(self) -> SkirmishConfig {
        match self {
            Board::Standard => SkirmishConfig::default(),
            Board::Small => SkirmishConfig::small(),
        }
    }
}

pub fn validate_log_level(level: &str) -> Result<()> {
    if level.parse::<LevelFilter>().is_err() {
        return Err(anyhow!(
            "invalid log level '{}', expected one of trace, debug, info, warn, error",
            level
        ));
    }
    Ok(())
}

/// Plain driver settings from `[mcts]`.
///
/// Skirmish turns span a stance ply and an acting ply by the same player, so
/// values are converted by player rather than by ply.
pub fn plain_config(config: &CentralConfig) -> Result<MctsConfig> {
    let section = &config.mcts;
    let plain = MctsConfig {
        iterations: section.iterations,
        c_uct: section.c_uct as f32,
        rollout_depth: section.rollout_depth,
        rollout_greedy_prob: section.rollout_greedy_prob as f32,
        rollout_top_k: section.rollout_top_k,
        tactical_override: section.tactical_override,
        widening_base: section.widening_base,
        widening_step: section.widening_step,
        widening_every: section.widening_every,
        use_transposition: section.use_transposition,
        min_iterations: section.min_iterations,
        perspective: ValuePerspective::ByPlayer,
        seed: None,
    };
    plain.validate().context("invalid [mcts] settings")?;
    Ok(plain)
}

/// Prior-guided driver settings from `[puct]`.
pub fn puct_config(config: &CentralConfig) -> Result<PuctConfig> {
    let section = &config.puct;
    let puct = PuctConfig {
        simulations: section.simulations,
        c_puct: section.c_puct as f32,
        dirichlet_alpha: section.dirichlet_alpha as f32,
        dirichlet_epsilon: section.dirichlet_epsilon as f32,
        temperature: section.temperature as f32,
        perspective: ValuePerspective::ByPlayer,
        ..PuctConfig::default()
    };
    puct.validate().context("invalid [puct] settings")?;
    Ok(puct)
}

/// Heuristic weights: built-in defaults, overlaid with `[arena] weights_path`
/// when set.
pub fn load_weights(config: &CentralConfig) -> Result<HeuristicWeights> {
    let mut weights = default_weights();
    let path = config.arena.weights_path.trim();
    if !path.is_empty() {
        let applied = weights
            .load_json(path)
            .with_context(|| format!("failed to load weights from {}", path))?;
        info!(path, applied, "Loaded heuristic weights");
    }
    Ok(weights)
}

/// Host game with the given board and weights, heuristics enabled.
pub fn skirmish(board: Board, weights: HeuristicWeights) -> Skirmish {
    Skirmish::new(board.skirmish_config()).with_weights(weights)
}

/// Host game for prior-guided search: moves are capped at
/// `[puct] max_move_amount` so every legal action has an index slot.
pub fn indexed_skirmish(board: Board, config: &CentralConfig) -> Result<Skirmish> {
    let mut rules = board.skirmish_config();
    if config.puct.max_move_amount == 0 {
        return Err(anyhow!("[puct] max_move_amount must be at least 1"));
    }
    rules.max_move_amount = config.puct.max_move_amount;
    Ok(Skirmish::new(rules))
}
