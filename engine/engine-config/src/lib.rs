//! Centralized configuration loading from config.toml.
//!
//! This crate provides the configuration structs and loading logic used by
//! the `arena` front end. Search drivers take their own typed configs; the
//! front end maps these sections onto them.
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`SATELLITES_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults (config.defaults.toml, embedded at compile time)
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! SATELLITES_<SECTION>_<KEY>=value
//!
//! Examples:
//!     SATELLITES_COMMON_LOG_LEVEL=debug
//!     SATELLITES_MCTS_ITERATIONS=2000
//!     SATELLITES_MCTS_USE_TRANSPOSITION=false
//!     SATELLITES_PUCT_TEMPERATURE=0.5
//!     SATELLITES_ARENA_GAMES=100
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{
    apply_env_overrides, load_config, load_from_path, CONFIG_ENV_VAR, CONFIG_SEARCH_PATHS,
};
pub use structs::*;
