//! Weight-driven heuristic hooks: leaf evaluation, move priors, tactical priority.

use engine_core::game_utils::opponent;
use engine_core::{HeuristicWeights, PlayerId};

use crate::{Action, Skirmish, Stance, State};

/// Move (or stance leading to a move) that takes the enemy home this turn.
pub const WIN_PRIORITY: i32 = 100;
/// Capture of an enemy stack standing next to our home.
pub const DEFEND_PRIORITY: i32 = 80;
/// Reinforcing a home that an adjacent enemy stack could take.
pub const BLOCK_PRIORITY: i32 = 60;
const CAPTURE_PRIORITY: i32 = 20;

pub const DEFAULT_WEIGHTS: &[(&str, f64)] = &[
    ("material", 1.0),
    ("territory", 0.5),
    ("home_threat", 0.8),
    ("advance", 0.4),
    ("capture", 0.6),
    ("merge", 0.05),
    ("home_defense", 0.7),
    ("stance_advance", 0.2),
    ("stance_reinforce", 0.1),
];

pub fn default_weights() -> HeuristicWeights {
    HeuristicWeights::from_defaults(DEFAULT_WEIGHTS)
}

/// 1.0 on `target`, falling linearly to 0.0 at the far corner.
fn closeness(game: &Skirmish, cell: usize, target: usize) -> f64 {
    let config = game.config();
    let span = (config.width + config.height).saturating_sub(2).max(1);
    1.0 - game.distance(cell, target) as f64 / span as f64
}

/// Units `attacker` can bring onto `target` in one move from adjacent stacks.
fn strongest_adjacent(game: &Skirmish, state: &State, target: usize, attacker: PlayerId) -> u32 {
    game.neighbors_of(target)
        .into_iter()
        .map(|n| state.cell(n))
        .filter(|c| c.owner == Some(attacker))
        .map(|c| c.units.min(game.config().max_move_amount))
        .max()
        .unwrap_or(0)
}

/// Whether a single move by `player` would take the enemy home.
fn can_take(game: &Skirmish, state: &State, target: usize, player: PlayerId) -> bool {
    let reach = strongest_adjacent(game, state, target, player);
    let defender = state.cell(target);
    match defender.owner {
        Some(owner) if owner != player => reach > defender.units,
        _ => reach > 0,
    }
}

fn home_threatened(game: &Skirmish, state: &State, player: PlayerId) -> bool {
    can_take(game, state, game.home(player), opponent(player))
}

/// Whether some capture would remove an enemy stack adjacent to our home.
fn can_defend(game: &Skirmish, state: &State, player: PlayerId) -> bool {
    let home = game.home(player);
    game.neighbors_of(home).into_iter().any(|cell| {
        let c = state.cell(cell);
        c.owner == Some(opponent(player)) && strongest_adjacent(game, state, cell, player) > c.units
    })
}

pub(crate) fn evaluate(game: &Skirmish, state: &State, player: PlayerId) -> f32 {
    if state.result().is_over() {
        return engine_core::outcome_for_player(state.result(), player);
    }

    let w = game.weights();
    let enemy = opponent(player);
    let (my_home, their_home) = (game.home(player), game.home(enemy));

    let mine = state.units_of(player) as f64;
    let theirs = state.units_of(enemy) as f64;
    let total = (mine + theirs).max(1.0);

    let mut my_cells = 0.0;
    let mut their_cells = 0.0;
    let mut my_reach = 0.0;
    let mut their_reach = 0.0;
    for (index, cell) in state.cells().iter().enumerate() {
        match cell.owner {
            Some(p) if p == player => {
                my_cells += 1.0;
                my_reach += cell.units as f64 * closeness(game, index, their_home);
            }
            Some(_) => {
                their_cells += 1.0;
                their_reach += cell.units as f64 * closeness(game, index, my_home);
            }
            None => {}
        }
    }

    let pressure = |home: usize, attacker: PlayerId| -> f64 {
        game.neighbors_of(home)
            .into_iter()
            .map(|n| state.cell(n))
            .filter(|c| c.owner == Some(attacker))
            .map(|c| c.units as f64)
            .sum()
    };

    let material = (mine - theirs) / total;
    let territory = (my_cells - their_cells) / game.config().num_cells() as f64;
    let threat = (pressure(my_home, enemy) - pressure(their_home, player)) / total;
    let advance = my_reach / mine.max(1.0) - their_reach / theirs.max(1.0);

    let score = w.get("material") * material + w.get("territory") * territory
        - w.get("home_threat") * threat
        + w.get("advance") * advance;
    score.tanh() as f32
}

pub(crate) fn action_prior(game: &Skirmish, state: &State, action: &Action, player: PlayerId) -> f32 {
    let w = game.weights();
    let enemy = opponent(player);
    let their_home = game.home(enemy);

    let prior = match *action {
        Action::Stance(Stance::Advance) => w.get("stance_advance"),
        Action::Stance(Stance::Reinforce) => {
            let defense = if home_threatened(game, state, player) {
                w.get("home_defense")
            } else {
                0.0
            };
            w.get("stance_reinforce") + defense
        }
        Action::Place(cell) => {
            let defense = if cell == game.home(player) && home_threatened(game, state, player) {
                w.get("home_defense")
            } else {
                0.0
            };
            w.get("advance") * closeness(game, cell, their_home) + defense
        }
        Action::Move { from, to, amount } => {
            let step = closeness(game, to, their_home) - closeness(game, from, their_home);
            let target = state.cell(to);
            let contact = match target.owner {
                Some(p) if p == enemy => {
                    if amount > target.units {
                        w.get("capture")
                    } else {
                        -0.5 * w.get("capture")
                    }
                }
                Some(_) => w.get("merge"),
                None => 0.0,
            };
            w.get("advance") * step + contact
        }
    };
    prior as f32
}

pub(crate) fn tactical_priority(
    game: &Skirmish,
    state: &State,
    action: &Action,
    player: PlayerId,
) -> i32 {
    let enemy = opponent(player);
    let their_home = game.home(enemy);

    match *action {
        Action::Stance(Stance::Advance) => {
            if can_take(game, state, their_home, player) {
                WIN_PRIORITY
            } else if can_defend(game, state, player) {
                DEFEND_PRIORITY
            } else {
                0
            }
        }
        Action::Stance(Stance::Reinforce) => {
            if home_threatened(game, state, player) && !can_take(game, state, their_home, player) {
                BLOCK_PRIORITY
            } else {
                0
            }
        }
        Action::Place(cell) => {
            if cell == game.home(player) && home_threatened(game, state, player) {
                BLOCK_PRIORITY
            } else {
                0
            }
        }
        Action::Move { to, amount, .. } => {
            let target = state.cell(to);
            let captures = target.owner == Some(enemy) && amount > target.units;
            let occupies = target.owner != Some(enemy) || captures;
            if to == their_home && occupies {
                WIN_PRIORITY
            } else if captures && game.distance(to, game.home(player)) <= 1 {
                DEFEND_PRIORITY
            } else if captures {
                CAPTURE_PRIORITY
            } else {
                0
            }
        }
    }
}
