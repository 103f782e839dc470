//! `arena compare-tt`: transposition reuse on versus off.

use anyhow::{bail, Result};
use clap::Args;
use engine_config::CentralConfig;
use std::time::Instant;
use tracing::info;

use crate::matches::{run_match, Contender};
use crate::settings::{self, Board};
use crate::stats::MatchReport;

#[derive(Args, Debug, Clone)]
pub struct CompareArgs {
    /// Games to play (defaults to [arena] games)
    #[arg(long)]
    pub games: Option<u32>,

    /// Simulations per decision for both sides (defaults to [mcts] iterations)
    #[arg(long)]
    pub iterations: Option<u32>,
}

pub fn run(args: &CompareArgs, config: &CentralConfig, board: Board) -> Result<MatchReport> {
    let games = args.games.unwrap_or(config.arena.games);
    if games == 0 {
        bail!("a match needs at least one game");
    }
    let mut plain = settings::plain_config(config)?;
    if let Some(iterations) = args.iterations {
        plain.iterations = iterations;
    }
    let game = settings::skirmish(board, settings::load_weights(config)?);

    let with_tt = Contender::new("tt", game.clone(), plain.clone().with_transposition(true))
        .with_think_time(config.mcts.think_time_secs);
    let without_tt = Contender::new("no-tt", game, plain.with_transposition(false))
        .with_think_time(config.mcts.think_time_secs);

    info!(games, "Comparing transposition on vs off");
    let started = Instant::now();
    let summary = run_match(&with_tt, &without_tt, games, config.arena.seed)?;
    let report = MatchReport::new(
        [&with_tt.name, &without_tt.name],
        &summary,
        started.elapsed(),
    );

    info!(
        tt_wins = summary.wins[0],
        no_tt_wins = summary.wins[1],
        draws = summary.draws,
        tt_score = report.score_rate[0],
        "Comparison finished"
    );
    Ok(report)
}
