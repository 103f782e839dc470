//! `arena bench`: plain driver throughput on the host game.

use anyhow::{bail, Result};
use clap::Args;
use engine_config::CentralConfig;
use engine_core::GameAdapter;
use mcts::{MctsSearch, SearchError};
use std::time::Instant;
use tracing::{debug, info};

use crate::matches::game_seed;
use crate::settings::{self, Board};
use crate::stats::BenchReport;

#[derive(Args, Debug, Clone)]
pub struct BenchArgs {
    /// Decisions to time
    #[arg(long, default_value_t = 200)]
    pub decisions: u32,

    /// Simulations per decision (defaults to [mcts] iterations)
    #[arg(long)]
    pub iterations: Option<u32>,

    /// Disable the transposition table
    #[arg(long)]
    pub no_transposition: bool,
}

/// Play self-play games with one driver until `decisions` decisions have
/// been made, timing the searches only.
pub fn run(args: &BenchArgs, config: &CentralConfig, board: Board) -> Result<BenchReport> {
    if args.decisions == 0 {
        bail!("--decisions must be at least 1");
    }
    let mut plain = settings::plain_config(config)?;
    if let Some(iterations) = args.iterations {
        plain.iterations = iterations;
    }
    if args.no_transposition {
        plain.use_transposition = false;
    }
    let game = settings::skirmish(board, settings::load_weights(config)?);

    info!(
        decisions = args.decisions,
        iterations = plain.iterations,
        use_transposition = plain.use_transposition,
        "Benchmarking plain driver"
    );

    let mut decisions = 0u32;
    let mut games = 0u32;
    let mut rollouts = 0u64;
    let mut searching = std::time::Duration::ZERO;

    while decisions < args.decisions {
        let seed = game_seed(config.arena.seed, games);
        let mut search = MctsSearch::new(game.clone(), plain.clone().with_seed(seed))?;
        let mut state = game.initial_state();
        games += 1;

        while !game.is_terminal(&state) && decisions < args.decisions {
            let started = Instant::now();
            let (action, stats) = match search.select_action(&state) {
                Ok(found) => found,
                Err(SearchError::NoLegalActions) => break,
                Err(e) => return Err(e.into()),
            };
            searching += started.elapsed();

            if !game.apply_action(&mut state, &action) {
                bail!("driver chose a rejected action {:?}", action);
            }
            decisions += 1;
            rollouts += stats.iterations as u64;
        }
        debug!(games, decisions, "Benchmark game finished");
    }

    Ok(BenchReport::new(
        decisions,
        games,
        rollouts,
        plain.iterations,
        plain.use_transposition,
        searching,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bench_counts_decisions() {
        let mut config = CentralConfig::default();
        config.mcts.rollout_depth = 8;
        let args = BenchArgs {
            decisions: 6,
            iterations: Some(10),
            no_transposition: true,
        };

        let report = run(&args, &config, Board::Small).unwrap();
        assert_eq!(report.decisions, 6);
        assert_eq!(report.rollouts, 60);
        assert!(!report.use_transposition);
        assert!(report.games >= 1);
    }

    #[test]
    fn test_bench_rejects_zero_decisions() {
        let args = BenchArgs {
            decisions: 0,
            iterations: None,
            no_transposition: false,
        };
        assert!(run(&args, &CentralConfig::default(), Board::Small).is_err());
    }
}
