//! Arena - command-line front end for the Satellites search engine
//!
//! Subcommands:
//! - `bench`: plain driver decisions/sec and rollouts/sec
//! - `compare-tt`: head-to-head with transposition reuse on vs off
//! - `tune`: random-search tuning of the heuristic weights
//! - `selfplay`: prior-guided self-play written out as training examples
//!
//! Settings come from config.toml (see `engine-config`) with
//! `SATELLITES_<SECTION>_<KEY>` environment overrides; command-line flags
//! win over both. Reports are printed to stdout as JSON.

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info};

mod bench;
mod compare;
mod matches;
mod selfplay;
mod settings;
mod stats;
mod tune;

use crate::settings::Board;

#[derive(Parser, Debug)]
#[command(name = "arena")]
#[command(about = "Benchmarks, matches, tuning and self-play for the Satellites search engine")]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG wins when set
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Board preset for the host game
    #[arg(long, value_enum, default_value_t = Board::Standard, global = true)]
    board: Board,

    /// Base seed for game seeds (defaults to [arena] seed)
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Measure plain driver throughput
    Bench(bench::BenchArgs),
    /// Play transposition reuse on against off
    CompareTt(compare::CompareArgs),
    /// Tune heuristic weights by random search
    Tune(tune::TuneArgs),
    /// Generate self-play training examples
    Selfplay(selfplay::SelfplayArgs),
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn print_report<T: Serialize>(report: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = engine_config::load_config();
    if let Some(level) = &cli.log_level {
        config.common.log_level = level.clone();
    }
    if let Some(seed) = cli.seed {
        config.arena.seed = seed;
    }

    settings::validate_log_level(&config.common.log_level)?;
    init_tracing(&config.common.log_level)?;
    info!(log_level = %config.common.log_level, board = ?cli.board, "Tracing initialized");

    let outcome = match &cli.command {
        Command::Bench(args) => bench::run(args, &config, cli.board).and_then(|r| print_report(&r)),
        Command::CompareTt(args) => {
            compare::run(args, &config, cli.board).and_then(|r| print_report(&r))
        }
        Command::Tune(args) => tune::run(args, &config, cli.board).and_then(|r| print_report(&r)),
        Command::Selfplay(args) => {
            selfplay::run(args, &config, cli.board).and_then(|r| print_report(&r))
        }
    };

    if let Err(e) = &outcome {
        error!("Arena failed: {:#}", e);
    }
    outcome
}
