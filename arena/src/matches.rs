//! Head-to-head games between two plain-driver contenders.
//!
//! Every game owns its drivers and working state, so a match runs its games
//! in parallel on the rayon pool. Seats alternate between games.

use anyhow::{bail, Result};
use engine_core::{GameAdapter, GameResult};
use games_skirmish::Skirmish;
use mcts::{MctsConfig, MctsSearch, SearchError};
use rayon::prelude::*;
use tracing::{debug, trace};

/// Safety cap on plies per game; Skirmish ends itself on its turn limit well
/// before this.
pub const MAX_PLIES: u32 = 4_000;

/// One side of a match.
#[derive(Debug, Clone)]
pub struct Contender {
    pub name: String,
    pub game: Skirmish,
    pub config: MctsConfig,
    /// Per-decision thinking time; `0` uses the iteration budget.
    pub think_time_secs: f64,
}

impl Contender {
    pub fn new(name: impl Into<String>, game: Skirmish, config: MctsConfig) -> Self {
        Self {
            name: name.into(),
            game,
            config,
            think_time_secs: 0.0,
        }
    }

    pub fn with_think_time(mut self, secs: f64) -> Self {
        self.think_time_secs = secs;
        self
    }
}

/// What happened in one game.
#[derive(Debug, Clone, Copy)]
pub struct GameRecord {
    /// Result by seat (seat 0 is player 0).
    pub result: GameResult,
    pub plies: u32,
    pub decisions: u32,
    /// Simulations run across every decision.
    pub iterations: u64,
}

/// Deterministic per-game seed.
pub fn game_seed(base: u64, game: u32) -> u64 {
    base ^ (game as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15)
}

/// Play one game; `seats[p]` moves for player `p`.
pub fn play_game(seats: [&Contender; 2], seed: u64) -> Result<GameRecord> {
    let mut searches = Vec::with_capacity(2);
    for (seat, contender) in seats.iter().enumerate() {
        let config = contender.config.clone().with_seed(seed.wrapping_add(seat as u64));
        searches.push(MctsSearch::new(contender.game.clone(), config)?);
    }

    let referee = &seats[0].game;
    let mut state = referee.initial_state();
    let mut record = GameRecord {
        result: GameResult::Draw,
        plies: 0,
        decisions: 0,
        iterations: 0,
    };

    while !referee.is_terminal(&state) && record.plies < MAX_PLIES {
        let seat = referee.current_player(&state) as usize;
        let contender = seats[seat];
        let search = &mut searches[seat];

        let chosen = if contender.think_time_secs > 0.0 {
            search.select_action_for_time(
                &state,
                contender.think_time_secs,
                contender.config.min_iterations,
            )
        } else {
            search.select_action(&state)
        };
        let (action, stats) = match chosen {
            Ok(found) => found,
            // Stalled position: nobody can act, score it as a draw.
            Err(SearchError::NoLegalActions) => break,
            Err(e) => return Err(e.into()),
        };

        trace!(seat, ?action, visits = stats.root_visits, "Decision");
        if !referee.apply_action(&mut state, &action) {
            bail!("{} chose a rejected action {:?}", contender.name, action);
        }
        record.plies += 1;
        record.decisions += 1;
        record.iterations += stats.iterations as u64;
    }

    if referee.is_terminal(&state) {
        record.result = state.result();
    }
    Ok(record)
}

/// Aggregated results of a match, by contender (not by seat).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MatchSummary {
    pub games: u32,
    pub wins: [u32; 2],
    pub draws: u32,
    pub plies: u64,
    pub iterations: u64,
}

impl MatchSummary {
    fn record(&mut self, record: &GameRecord, first_seat: usize) {
        self.games += 1;
        self.plies += record.plies as u64;
        self.iterations += record.iterations;
        match record.result {
            GameResult::Won(player) => {
                // Seat `player` was contender `first_seat ^ player`.
                self.wins[first_seat ^ player as usize] += 1;
            }
            GameResult::Draw | GameResult::Ongoing => self.draws += 1,
        }
    }

    /// Match points of `contender`: a win is 1, a draw is 0.5.
    pub fn score(&self, contender: usize) -> f64 {
        self.wins[contender] as f64 + 0.5 * self.draws as f64
    }

    /// Score as a fraction of the games played.
    pub fn score_rate(&self, contender: usize) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.score(contender) / self.games as f64
        }
    }

    pub fn avg_plies(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.plies as f64 / self.games as f64
        }
    }
}

/// Play `games` games between `a` (contender 0) and `b` (contender 1).
///
/// Even-numbered games seat `a` as player 0, odd-numbered games swap seats.
pub fn run_match(a: &Contender, b: &Contender, games: u32, seed: u64) -> Result<MatchSummary> {
    let records = (0..games)
        .into_par_iter()
        .map(|game| {
            let first_seat = (game % 2) as usize;
            let seats = if first_seat == 0 { [a, b] } else { [b, a] };
            play_game(seats, game_seed(seed, game)).map(|record| (record, first_seat))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut summary = MatchSummary::default();
    for (record, first_seat) in &records {
        summary.record(record, *first_seat);
    }
    debug!(
        a = %a.name,
        b = %b.name,
        games = summary.games,
        a_wins = summary.wins[0],
        b_wins = summary.wins[1],
        draws = summary.draws,
        "Match finished"
    );
    Ok(summary)
}
