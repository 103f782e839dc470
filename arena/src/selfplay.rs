//! `arena selfplay`: prior-guided self-play producing training examples.
//!
//! Each position contributes its encoded features, the search's visit
//! policy over the full action index, and the final outcome from the mover's
//! perspective. Examples are written as JSON lines.
//!
//! Priors and values come from an ONNX model when `--model` is given (build
//! with the `onnx` feature), otherwise from the flat `UniformEvaluator`.

use anyhow::{bail, Context, Result};
use clap::Args;
use engine_config::CentralConfig;
use engine_core::{ActionIndex, FeatureEncoder, GameAdapter, GameResult, PlayerId};
use games_skirmish::{Skirmish, SkirmishEncoder};
use mcts::{Evaluator, PuctConfig, PuctSearch, SearchError, UniformEvaluator};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

use crate::matches::{game_seed, MAX_PLIES};
use crate::settings::{self, Board};
use crate::stats::SelfplayReport;

#[derive(Args, Debug, Clone, Default)]
pub struct SelfplayArgs {
    /// Games to play (defaults to [arena] games)
    #[arg(long)]
    pub games: Option<u32>,

    /// Output file (defaults to <data_dir>/selfplay.jsonl)
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Plies after which moves are chosen greedily (0 keeps the configured
    /// temperature for the whole game)
    #[arg(long, default_value_t = 0)]
    pub temp_threshold: u32,

    /// ONNX model supplying priors and values
    #[cfg(feature = "onnx")]
    #[arg(long)]
    pub model: Option<PathBuf>,
}

/// One training example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Example {
    pub features: Vec<f32>,
    pub policy: Vec<f32>,
    /// Final result for the player to move: 1 win, -1 loss, 0 draw.
    pub outcome: f32,
}

/// Examples from one game plus its result.
#[derive(Debug)]
pub struct SelfplayGame {
    pub examples: Vec<Example>,
    pub result: GameResult,
}

/// Play one self-play game with a fresh driver.
pub fn play_game<V: Evaluator + Clone>(
    game: &Skirmish,
    index: &ActionIndex<games_skirmish::Action>,
    config: &PuctConfig,
    evaluator: &V,
    seed: u64,
    temp_threshold: u32,
) -> Result<SelfplayGame> {
    let encoder = SkirmishEncoder::new(game.config().clone());
    let mut search = PuctSearch::new(
        game.clone(),
        encoder.clone(),
        evaluator.clone(),
        index.clone(),
        config.clone().with_seed(seed),
    )?;

    let mut state = game.initial_state();
    let mut pending: Vec<(Vec<f32>, Vec<f32>, PlayerId)> = Vec::new();
    let mut plies = 0u32;

    while !game.is_terminal(&state) && plies < MAX_PLIES {
        if temp_threshold > 0 && plies == temp_threshold {
            search.set_temperature(0.0);
        }
        let result = match search.search(&state) {
            Ok(result) => result,
            Err(SearchError::NoLegalActions) => break,
            Err(e) => return Err(e.into()),
        };

        let player = game.current_player(&state);
        pending.push((encoder.encode(&state), result.policy, player));
        if !game.apply_action(&mut state, &result.action) {
            bail!("self-play chose a rejected action {:?}", result.action);
        }
        plies += 1;
    }

    let result = if game.is_terminal(&state) {
        state.result()
    } else {
        GameResult::Draw
    };
    let examples = pending
        .into_iter()
        .map(|(features, policy, player)| Example {
            features,
            policy,
            outcome: engine_core::outcome_for_player(result, player),
        })
        .collect();

    Ok(SelfplayGame { examples, result })
}

fn write_examples(path: &Path, games: &[SelfplayGame]) -> Result<usize> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let mut written = 0;
    for example in games.iter().flat_map(|g| &g.examples) {
        serde_json::to_writer(&mut writer, example)?;
        writer.write_all(b"\n")?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

pub fn run(args: &SelfplayArgs, config: &CentralConfig, board: Board) -> Result<SelfplayReport> {
    #[cfg(feature = "onnx")]
    {
        if let Some(model) = &args.model {
            let game = settings::indexed_skirmish(board, config)?;
            let feature_size = SkirmishEncoder::new(game.config().clone()).feature_size();
            let evaluator = mcts::SharedOnnxEvaluator::load(model, feature_size)
                .with_context(|| format!("failed to load model {}", model.display()))?;
            info!(model = %model.display(), feature_size, "Loaded ONNX model");
            return generate(args, config, board, &evaluator);
        }
    }

    generate(args, config, board, &UniformEvaluator::new())
}

fn generate<V: Evaluator + Clone>(
    args: &SelfplayArgs,
    config: &CentralConfig,
    board: Board,
    evaluator: &V,
) -> Result<SelfplayReport> {
    let games = args.games.unwrap_or(config.arena.games);
    if games == 0 {
        bail!("self-play needs at least one game");
    }
    let puct = settings::puct_config(config)?;
    let game = settings::indexed_skirmish(board, config)?;
    let index = ActionIndex::build(&game, game.config().max_move_amount);
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| Path::new(&config.common.data_dir).join("selfplay.jsonl"));

    info!(
        games,
        simulations = puct.simulations,
        actions = index.len(),
        output = %output.display(),
        "Starting self-play"
    );

    let started = Instant::now();
    let played = (0..games)
        .into_par_iter()
        .map(|g| -> Result<SelfplayGame> {
            let seed = game_seed(config.arena.seed, g);
            let played = play_game(&game, &index, &puct, evaluator, seed, args.temp_threshold)?;
            debug!(
                game = g,
                examples = played.examples.len(),
                result = ?played.result,
                "Self-play game finished"
            );
            Ok(played)
        })
        .collect::<Result<Vec<_>>>()?;

    let examples = write_examples(&output, &played)?;
    let elapsed = started.elapsed();

    let mut report = SelfplayReport {
        games,
        examples,
        player0_wins: 0,
        player1_wins: 0,
        draws: 0,
        output: output.display().to_string(),
        runtime_seconds: elapsed.as_secs_f64(),
        examples_per_second: if elapsed.as_secs_f64() > 0.0 {
            examples as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        },
    };
    for g in &played {
        match g.result {
            GameResult::Won(0) => report.player0_wins += 1,
            GameResult::Won(_) => report.player1_wins += 1,
            GameResult::Draw | GameResult::Ongoing => report.draws += 1,
        }
    }

    info!(examples, output = %report.output, "Self-play finished");
    Ok(report)
}
