//! `arena tune`: random-search tuning of the heuristic weights.
//!
//! Each round mutates one weight of the incumbent by a Gaussian step scaled
//! to that weight's magnitude and plays the challenger against the
//! incumbent. The challenger replaces the incumbent when its score rate
//! beats the best rate accepted so far (starting at an even score).

use anyhow::{anyhow, bail, Context, Result};
use clap::Args;
use engine_config::CentralConfig;
use engine_core::HeuristicWeights;
use rand::seq::IteratorRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use rand_distr::{Distribution, Normal};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, info};

use crate::matches::{run_match, Contender};
use crate::settings::{self, Board};
use crate::stats::TuneReport;

#[derive(Args, Debug, Clone)]
pub struct TuneArgs {
    /// Mutation rounds
    #[arg(long, default_value_t = 10)]
    pub rounds: u32,

    /// Games per challenger match (defaults to [arena] games)
    #[arg(long)]
    pub games: Option<u32>,

    /// Mutation step as a fraction of the weight's magnitude (at least 1)
    #[arg(long, default_value_t = 0.2)]
    pub sigma_frac: f64,

    /// Where to write the tuned weights as JSON
    #[arg(long)]
    pub output: Option<PathBuf>,
}

/// Copy of `incumbent` with one randomly chosen weight moved by a Gaussian
/// step of standard deviation `sigma_frac * max(1, |w|)`, floored at 0.
/// Returns the challenger and the name of the mutated weight.
pub fn mutate<R: Rng>(
    incumbent: &HeuristicWeights,
    sigma_frac: f64,
    rng: &mut R,
) -> Result<(HeuristicWeights, String)> {
    let name = incumbent
        .names()
        .choose(rng)
        .map(str::to_string)
        .ok_or_else(|| anyhow!("no weights to tune"))?;
    let current = incumbent.get(&name);
    let span = current.abs().max(1.0);
    let step = Normal::new(0.0, sigma_frac * span)
        .map_err(|e| anyhow!("invalid mutation step for {}: {}", name, e))?;

    let mut challenger = incumbent.clone();
    challenger.set(&name, (current + step.sample(rng)).max(0.0))?;
    Ok((challenger, name))
}

/// Incumbent weights and the score rate they last won with.
#[derive(Debug, Clone)]
pub struct Tuner {
    pub best: HeuristicWeights,
    pub best_score: f64,
}

impl Tuner {
    /// Starts at an even score: a challenger must do better than a draw.
    pub fn new(weights: HeuristicWeights) -> Self {
        Self {
            best: weights,
            best_score: 0.5,
        }
    }

    /// Adopt `challenger` when its score rate beats the best so far.
    pub fn consider(&mut self, challenger: HeuristicWeights, score_rate: f64) -> bool {
        if score_rate > self.best_score {
            self.best = challenger;
            self.best_score = score_rate;
            true
        } else {
            false
        }
    }
}

pub fn run(args: &TuneArgs, config: &CentralConfig, board: Board) -> Result<TuneReport> {
    let games = args.games.unwrap_or(config.arena.games);
    if games == 0 {
        bail!("a match needs at least one game");
    }
    if !(args.sigma_frac.is_finite() && args.sigma_frac > 0.0) {
        bail!("--sigma-frac must be a positive number, got {}", args.sigma_frac);
    }
    let plain = settings::plain_config(config)?;
    let mut rng = ChaCha20Rng::seed_from_u64(config.arena.seed);
    let mut tuner = Tuner::new(settings::load_weights(config)?);
    let mut accepted = 0;
    let started = Instant::now();

    info!(
        rounds = args.rounds,
        games,
        sigma_frac = args.sigma_frac,
        "Tuning weights"
    );

    for round in 0..args.rounds {
        let (challenger, name) = mutate(&tuner.best, args.sigma_frac, &mut rng)?;
        let champion = Contender::new(
            "incumbent",
            settings::skirmish(board, tuner.best.clone()),
            plain.clone(),
        );
        let candidate = Contender::new(
            "challenger",
            settings::skirmish(board, challenger.clone()),
            plain.clone(),
        );

        let seed = config.arena.seed.wrapping_add(round as u64 + 1);
        let summary = run_match(&candidate, &champion, games, seed)?;
        let score = summary.score_rate(0);
        let from = tuner.best.get(&name);
        let to = challenger.get(&name);
        let won = tuner.consider(challenger, score);
        debug!(round, weight = %name, from, to, score, won, "Tuning round");

        if won {
            info!(round, weight = %name, value = to, score, "Challenger accepted");
            accepted += 1;
        }
    }

    if let Some(path) = &args.output {
        tuner
            .best
            .save_json(path)
            .with_context(|| format!("failed to write weights to {}", path.display()))?;
        info!(path = %path.display(), "Saved tuned weights");
    }

    Ok(TuneReport {
        rounds: args.rounds,
        accepted,
        best_score: tuner.best_score,
        weights: tuner.best.to_map(),
        runtime_seconds: started.elapsed().as_secs_f64(),
    })
}
