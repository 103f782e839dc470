//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "SATELLITES_CONFIG";

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",      // Current directory
    "../config.toml",   // Parent directory (when running from subdirectory)
    "/app/config.toml", // Container
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by SATELLITES_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
/// 4. Container path (/app/config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from {}: {}", CONFIG_ENV_VAR, path.display());
            return load_from_path(&path);
        }
        warn!(
            "{}={} not found, searching defaults",
            CONFIG_ENV_VAR,
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &PathBuf) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u32, f64, bool, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        match std::env::var($key).map(|s| s.parse()) {
            Ok(Ok(v)) => $config.$section.$field = v,
            Ok(Err(_)) => warn!("Ignoring unparsable {}", $key),
            Err(_) => {}
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: SATELLITES_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.log_level, "SATELLITES_COMMON_LOG_LEVEL");
    env_override!(config, common.data_dir, "SATELLITES_COMMON_DATA_DIR");

    // Plain driver
    env_override!(config, mcts.iterations, "SATELLITES_MCTS_ITERATIONS", parse);
    env_override!(config, mcts.c_uct, "SATELLITES_MCTS_C_UCT", parse);
    env_override!(
        config,
        mcts.rollout_depth,
        "SATELLITES_MCTS_ROLLOUT_DEPTH",
        parse
    );
    env_override!(
        config,
        mcts.rollout_greedy_prob,
        "SATELLITES_MCTS_ROLLOUT_GREEDY_PROB",
        parse
    );
    env_override!(
        config,
        mcts.rollout_top_k,
        "SATELLITES_MCTS_ROLLOUT_TOP_K",
        parse
    );
    env_override!(
        config,
        mcts.tactical_override,
        "SATELLITES_MCTS_TACTICAL_OVERRIDE",
        parse
    );
    env_override!(
        config,
        mcts.widening_base,
        "SATELLITES_MCTS_WIDENING_BASE",
        parse
    );
    env_override!(
        config,
        mcts.widening_step,
        "SATELLITES_MCTS_WIDENING_STEP",
        parse
    );
    env_override!(
        config,
        mcts.widening_every,
        "SATELLITES_MCTS_WIDENING_EVERY",
        parse
    );
    env_override!(
        config,
        mcts.use_transposition,
        "SATELLITES_MCTS_USE_TRANSPOSITION",
        parse
    );
    env_override!(
        config,
        mcts.min_iterations,
        "SATELLITES_MCTS_MIN_ITERATIONS",
        parse
    );
    env_override!(
        config,
        mcts.think_time_secs,
        "SATELLITES_MCTS_THINK_TIME_SECS",
        parse
    );

    // Prior-guided driver
    env_override!(
        config,
        puct.simulations,
        "SATELLITES_PUCT_SIMULATIONS",
        parse
    );
    env_override!(config, puct.c_puct, "SATELLITES_PUCT_C_PUCT", parse);
    env_override!(
        config,
        puct.dirichlet_alpha,
        "SATELLITES_PUCT_DIRICHLET_ALPHA",
        parse
    );
    env_override!(
        config,
        puct.dirichlet_epsilon,
        "SATELLITES_PUCT_DIRICHLET_EPSILON",
        parse
    );
    env_override!(
        config,
        puct.temperature,
        "SATELLITES_PUCT_TEMPERATURE",
        parse
    );
    env_override!(
        config,
        puct.max_move_amount,
        "SATELLITES_PUCT_MAX_MOVE_AMOUNT",
        parse
    );

    // Arena
    env_override!(config, arena.games, "SATELLITES_ARENA_GAMES", parse);
    env_override!(config, arena.seed, "SATELLITES_ARENA_SEED", parse);
    env_override!(config, arena.weights_path, "SATELLITES_ARENA_WEIGHTS_PATH");

    config
}
