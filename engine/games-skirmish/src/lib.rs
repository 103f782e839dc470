//! Skirmish: a small grid game for exercising the search engines end to end.
//!
//! Two players start with a stack of units on opposite corner home cells of a
//! rectangular grid. A turn takes two plies by the same player:
//!
//! 1. choose a [`Stance`] (a global choice that does not target a cell);
//! 2. act on it: `Reinforce` places one unit on the home cell or any owned
//!    cell, `Advance` moves `amount` units from an owned cell to an orthogonal
//!    neighbour.
//!
//! Moving onto an own stack merges. Moving onto an enemy stack fights: the
//! larger side survives with the difference, equal stacks annihilate. The
//! first player to hold the enemy home wins. A game that reaches the turn limit
//! is a draw.
//!
//! ```text
//!   H0 .  .  .  .
//!   .  .  .  .  .
//!   .  .  .  .  .
//!   .  .  .  .  .
//!   .  .  .  .  H1
//! ```

use engine_core::game_utils::opponent;
use engine_core::{BoardLayout, GameAdapter, GameResult, HeuristicWeights, Hooks, PlayerId};

mod encode;
mod heuristics;

pub use encode::SkirmishEncoder;
pub use heuristics::{
    default_weights, BLOCK_PRIORITY, DEFAULT_WEIGHTS, DEFEND_PRIORITY, WIN_PRIORITY,
};

/// Board dimensions and rule knobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkirmishConfig {
    pub width: usize,
    pub height: usize,
    /// Units on each home cell at the start.
    pub start_units: u32,
    /// Largest stack a single move may carry.
    pub max_move_amount: u32,
    /// Completed turns (both players) before the game is drawn.
    pub max_turns: u32,
}

impl Default for SkirmishConfig {
    fn default() -> Self {
        Self {
            width: 5,
            height: 5,
            start_units: 2,
            max_move_amount: 20,
            max_turns: 60,
        }
    }
}

impl SkirmishConfig {
    /// Tiny board for fast tests.
    pub fn small() -> Self {
        Self {
            width: 3,
            height: 3,
            start_units: 2,
            max_move_amount: 6,
            max_turns: 20,
        }
    }

    #[inline]
    pub fn num_cells(&self) -> usize {
        self.width * self.height
    }
}

/// First ply of every turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stance {
    Reinforce,
    Advance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Stance(Stance),
    Place(usize),
    Move { from: usize, to: usize, amount: u32 },
}

/// Contents of one grid cell. Empty cells have no owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cell {
    pub owner: Option<PlayerId>,
    pub units: u32,
}

impl Cell {
    fn occupied(owner: PlayerId, units: u32) -> Self {
        if units == 0 {
            Cell::default()
        } else {
            Cell {
                owner: Some(owner),
                units,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct State {
    cells: Vec<Cell>,
    current_player: PlayerId,
    /// `None` while the mover still has to pick a stance.
    stance: Option<Stance>,
    turn: u32,
    result: GameResult,
}

impl State {
    pub fn cell(&self, index: usize) -> Cell {
        self.cells[index]
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn stance(&self) -> Option<Stance> {
        self.stance
    }

    pub fn turn(&self) -> u32 {
        self.turn
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    /// Total units `player` has on the board.
    pub fn units_of(&self, player: PlayerId) -> u32 {
        self.cells
            .iter()
            .filter(|c| c.owner == Some(player))
            .map(|c| c.units)
            .sum()
    }

    /// Replace a cell's contents. Intended for setting up positions.
    pub fn set_cell(&mut self, index: usize, cell: Cell) {
        self.cells[index] = cell;
    }
}

#[derive(Debug, Clone, Copy)]
struct Bookkeeping {
    current_player: PlayerId,
    stance: Option<Stance>,
    turn: u32,
    result: GameResult,
}

/// Undo token: turn bookkeeping plus the prior contents of up to two cells.
#[derive(Debug, Clone, Copy)]
pub struct Undo {
    prev: Bookkeeping,
    cells: [Option<(usize, Cell)>; 2],
}

/// The Skirmish adapter.
#[derive(Debug, Clone)]
pub struct Skirmish {
    config: SkirmishConfig,
    weights: HeuristicWeights,
    heuristics: bool,
}

impl Default for Skirmish {
    fn default() -> Self {
        Self::new(SkirmishConfig::default())
    }
}

impl Skirmish {
    pub fn new(config: SkirmishConfig) -> Self {
        Self {
            config,
            weights: default_weights(),
            heuristics: true,
        }
    }

    /// Toggle the evaluate / prior / tactical hooks.
    pub fn with_heuristics(mut self, enabled: bool) -> Self {
        self.heuristics = enabled;
        self
    }

    pub fn with_weights(mut self, weights: HeuristicWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn config(&self) -> &SkirmishConfig {
        &self.config
    }

    pub fn weights(&self) -> &HeuristicWeights {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut HeuristicWeights {
        &mut self.weights
    }

    /// Home cell of `player`: top-left for 0, bottom-right for 1.
    #[inline]
    pub fn home(&self, player: PlayerId) -> usize {
        if player == 0 {
            0
        } else {
            self.config.num_cells() - 1
        }
    }

    pub fn initial_state(&self) -> State {
        let mut cells = vec![Cell::default(); self.config.num_cells()];
        for player in [0, 1] {
            cells[self.home(player)] = Cell::occupied(player, self.config.start_units);
        }
        State {
            cells,
            current_player: 0,
            stance: None,
            turn: 0,
            result: GameResult::Ongoing,
        }
    }

    /// Orthogonal neighbours in ascending cell order (up, left, right, down).
    pub fn neighbors_of(&self, cell: usize) -> Vec<usize> {
        let w = self.config.width;
        let (row, col) = (cell / w, cell % w);
        let mut out = Vec::with_capacity(4);
        if row > 0 {
            out.push(cell - w);
        }
        if col > 0 {
            out.push(cell - 1);
        }
        if col + 1 < w {
            out.push(cell + 1);
        }
        if row + 1 < self.config.height {
            out.push(cell + w);
        }
        out
    }

    /// Manhattan distance between two cells.
    pub fn distance(&self, a: usize, b: usize) -> usize {
        let w = self.config.width;
        (a / w).abs_diff(b / w) + (a % w).abs_diff(b % w)
    }

    fn can_place(&self, state: &State, cell: usize, player: PlayerId) -> bool {
        match state.cells[cell].owner {
            Some(owner) => owner == player,
            None => cell == self.home(player),
        }
    }

    fn placements(&self, state: &State, player: PlayerId) -> Vec<Action> {
        (0..state.cells.len())
            .filter(|&c| self.can_place(state, c, player))
            .map(Action::Place)
            .collect()
    }

    fn moves(&self, state: &State, player: PlayerId) -> Vec<Action> {
        let mut out = Vec::new();
        for (from, cell) in state.cells.iter().enumerate() {
            if cell.owner != Some(player) {
                continue;
            }
            let max = cell.units.min(self.config.max_move_amount);
            for to in self.neighbors_of(from) {
                for amount in 1..=max {
                    out.push(Action::Move { from, to, amount });
                }
            }
        }
        out
    }

    fn has_move(&self, state: &State, player: PlayerId) -> bool {
        state
            .cells
            .iter()
            .any(|c| c.owner == Some(player) && c.units > 0)
    }

    fn is_legal(&self, state: &State, action: &Action) -> bool {
        let player = state.current_player;
        match (*action, state.stance) {
            (Action::Stance(Stance::Reinforce), None) => true,
            (Action::Stance(Stance::Advance), None) => self.has_move(state, player),
            (Action::Place(cell), Some(Stance::Reinforce)) => {
                cell < state.cells.len() && self.can_place(state, cell, player)
            }
            (Action::Move { from, to, amount }, Some(Stance::Advance)) => {
                from < state.cells.len()
                    && state.cells[from].owner == Some(player)
                    && amount >= 1
                    && amount <= state.cells[from].units.min(self.config.max_move_amount)
                    && self.neighbors_of(from).contains(&to)
            }
            _ => false,
        }
    }

    /// Close out an acting ply: hand the turn over and apply the turn limit.
    fn end_turn(&self, state: &mut State) {
        state.stance = None;
        if state.result.is_over() {
            return;
        }
        if state.current_player == 1 {
            state.turn += 1;
        }
        state.current_player = opponent(state.current_player);
        if state.turn >= self.config.max_turns {
            state.result = GameResult::Draw;
        }
    }
}

impl GameAdapter for Skirmish {
    type State = State;
    type Action = Action;
    type Undo = Undo;

    fn legal_actions(&self, state: &State) -> Vec<Action> {
        if state.result.is_over() {
            return Vec::new();
        }
        let player = state.current_player;
        match state.stance {
            None => {
                let mut out = vec![Action::Stance(Stance::Reinforce)];
                if self.has_move(state, player) {
                    out.push(Action::Stance(Stance::Advance));
                }
                out
            }
            Some(Stance::Reinforce) => self.placements(state, player),
            Some(Stance::Advance) => self.moves(state, player),
        }
    }

    fn apply_action_with_undo(&self, state: &mut State, action: &Action) -> Option<Undo> {
        if state.result.is_over() || !self.is_legal(state, action) {
            return None;
        }

        let player = state.current_player;
        let mut token = Undo {
            prev: Bookkeeping {
                current_player: state.current_player,
                stance: state.stance,
                turn: state.turn,
                result: state.result,
            },
            cells: [None, None],
        };

        match *action {
            Action::Stance(stance) => {
                state.stance = Some(stance);
            }
            Action::Place(cell) => {
                token.cells[0] = Some((cell, state.cells[cell]));
                let units = state.cells[cell].units + 1;
                state.cells[cell] = Cell::occupied(player, units);
                self.end_turn(state);
            }
            Action::Move { from, to, amount } => {
                let source = state.cells[from];
                let target = state.cells[to];
                token.cells = [Some((from, source)), Some((to, target))];

                state.cells[from] = Cell::occupied(player, source.units - amount);
                state.cells[to] = match target.owner {
                    Some(owner) if owner != player => {
                        if amount > target.units {
                            Cell::occupied(player, amount - target.units)
                        } else {
                            Cell::occupied(owner, target.units - amount)
                        }
                    }
                    _ => Cell::occupied(player, target.units + amount),
                };

                if to == self.home(opponent(player)) && state.cells[to].owner == Some(player) {
                    state.result = GameResult::Won(player);
                }
                self.end_turn(state);
            }
        }

        Some(token)
    }

    fn undo_action(&self, state: &mut State, token: Undo) {
        for (index, cell) in token.cells.iter().rev().flatten() {
            state.cells[*index] = *cell;
        }
        state.current_player = token.prev.current_player;
        state.stance = token.prev.stance;
        state.turn = token.prev.turn;
        state.result = token.prev.result;
    }

    fn is_terminal(&self, state: &State) -> bool {
        state.result.is_over()
    }

    fn current_player(&self, state: &State) -> PlayerId {
        state.current_player
    }

    fn outcome_for_player(&self, state: &State, player: PlayerId) -> f32 {
        engine_core::outcome_for_player(state.result, player)
    }

    fn hooks(&self) -> Hooks {
        if self.heuristics {
            Hooks::ALL
        } else {
            Hooks::NONE
        }
    }

    fn evaluate(&self, state: &State, player: PlayerId) -> f32 {
        heuristics::evaluate(self, state, player)
    }

    fn action_prior(&self, state: &State, action: &Action, player: PlayerId) -> f32 {
        heuristics::action_prior(self, state, action, player)
    }

    fn tactical_priority(&self, state: &State, action: &Action, player: PlayerId) -> i32 {
        heuristics::tactical_priority(self, state, action, player)
    }

    /// XOR of per-cell hashes mixed with the turn bookkeeping.
    fn state_key(&self, state: &State) -> Option<u64> {
        let mut key = 0u64;
        for (index, cell) in state.cells.iter().enumerate() {
            if let Some(owner) = cell.owner {
                key ^= mix(((index as u64) << 40) | ((owner as u64) << 32) | cell.units as u64);
            }
        }
        let stance = match state.stance {
            None => 0u64,
            Some(Stance::Reinforce) => 1,
            Some(Stance::Advance) => 2,
        };
        key ^= mix(
            (1u64 << 63) | ((state.turn as u64) << 8) | (stance << 1) | state.current_player as u64,
        );
        Some(key)
    }
}

impl BoardLayout for Skirmish {
    type Action = Action;

    fn global_actions(&self) -> Vec<Action> {
        vec![
            Action::Stance(Stance::Reinforce),
            Action::Stance(Stance::Advance),
        ]
    }

    fn num_cells(&self) -> usize {
        self.config.num_cells()
    }

    fn neighbors(&self, cell: usize) -> Vec<usize> {
        self.neighbors_of(cell)
    }

    fn place_action(&self, cell: usize) -> Action {
        Action::Place(cell)
    }

    fn move_action(&self, from: usize, to: usize, amount: u32) -> Action {
        Action::Move { from, to, amount }
    }
}

/// splitmix64 finaliser.
#[inline]
fn mix(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    x ^ (x >> 31)
}

#[cfg(test)]
mod tests;
