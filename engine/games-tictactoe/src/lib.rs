//! TicTacToe reference adapter for the Satellites search engine
//!
//! This crate provides a small, complete implementation of the
//! [`GameAdapter`] contract: in-place moves with exact undo, terminal scoring,
//! tactical hooks, an exact state fingerprint, and a feature encoder for
//! prior-guided search.
//!
//! # Usage
//!
//! ```rust
//! use engine_core::GameAdapter;
//! use games_tictactoe::{Action, State, TicTacToe};
//!
//! let game = TicTacToe::new();
//! let mut state = State::new();
//! let token = game.apply_action_with_undo(&mut state, &Action::Place(4)).unwrap();
//! assert_eq!(game.current_player(&state), 1);
//! game.undo_action(&mut state, token);
//! assert_eq!(state, State::new());
//! ```

use engine_core::game_utils::{extend_features, opponent};
use engine_core::{
    outcome_for_player, ActionIndex, FeatureEncoder, GameAdapter, GameResult, Hooks, PlayerId,
};

/// Winning positions (rows, columns, diagonals)
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// Tactical priority of a move that wins on the spot.
pub const WIN_PRIORITY: i32 = 100;
/// Tactical priority of a move that blocks an opponent's immediate win.
pub const BLOCK_PRIORITY: i32 = 50;

/// TicTacToe game state
///
/// Represents the complete state of a TicTacToe game including the board,
/// current player, and result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct State {
    /// Board representation: 0=empty, 1=X, 2=O
    board: [u8; 9],
    /// Current player: 0=X, 1=O
    current_player: PlayerId,
    result: GameResult,
}

impl State {
    /// Create a new initial game state
    pub fn new() -> Self {
        Self {
            board: [0; 9],
            current_player: 0, // X goes first
            result: GameResult::Ongoing,
        }
    }

    /// Build a position from a board string such as `"XX.OO...."`.
    /// The side to move is derived from the piece counts.
    pub fn from_board(board: &str) -> Option<Self> {
        let cells: Vec<char> = board.chars().filter(|c| !c.is_whitespace()).collect();
        if cells.len() != 9 {
            return None;
        }
        let mut state = Self::new();
        for (i, c) in cells.iter().enumerate() {
            state.board[i] = match c {
                'X' | 'x' => 1,
                'O' | 'o' => 2,
                '.' | '_' => 0,
                _ => return None,
            };
        }
        let xs = state.board.iter().filter(|&&c| c == 1).count();
        let os = state.board.iter().filter(|&&c| c == 2).count();
        state.current_player = if xs > os { 1 } else { 0 };
        state.result = Self::check_result(&state.board);
        Some(state)
    }

    /// Check if the game is over
    pub fn is_done(&self) -> bool {
        self.result.is_over()
    }

    pub fn result(&self) -> GameResult {
        self.result
    }

    pub fn current_player(&self) -> PlayerId {
        self.current_player
    }

    pub fn cell(&self, pos: usize) -> u8 {
        self.board[pos]
    }

    /// Get legal moves (empty positions)
    pub fn legal_moves(&self) -> Vec<u8> {
        if self.is_done() {
            return Vec::new();
        }

        (0..9u8)
            .filter(|&pos| self.board[pos as usize] == 0)
            .collect()
    }

    /// Check for a result on the board
    fn check_result(board: &[u8; 9]) -> GameResult {
        for line in &LINES {
            let [a, b, c] = *line;
            if board[a] != 0 && board[a] == board[b] && board[b] == board[c] {
                return GameResult::Won(board[a] - 1);
            }
        }

        // Check for draw (board full but no winner)
        if board.iter().all(|&cell| cell != 0) {
            return GameResult::Draw;
        }

        GameResult::Ongoing
    }

    /// Whether `player` placing at `pos` completes a line.
    fn completes_line(&self, pos: usize, player: PlayerId) -> bool {
        let piece = player + 1;
        LINES.iter().filter(|line| line.contains(&pos)).any(|line| {
            line.iter()
                .all(|&cell| cell == pos || self.board[cell] == piece)
        })
    }
}

impl Default for State {
    fn default() -> Self {
        Self::new()
    }
}

/// TicTacToe action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Place a piece at the given position (0-8)
    Place(u8),
}

impl Action {
    /// Get the position for this action
    pub fn position(&self) -> u8 {
        match self {
            Action::Place(pos) => *pos,
        }
    }
}

/// Undo token: the position that was filled plus the bookkeeping it replaced.
#[derive(Debug, Clone, Copy)]
pub struct Undo {
    position: u8,
    previous_player: PlayerId,
    previous_result: GameResult,
}

/// TicTacToe adapter.
///
/// With `with_heuristics(true)` the adapter advertises move priors (centre,
/// then corners) and tactical priorities (win now, then block).
#[derive(Debug, Clone, Default)]
pub struct TicTacToe {
    heuristics: bool,
}

impl TicTacToe {
    /// Create a new TicTacToe adapter with no heuristic hooks.
    pub fn new() -> Self {
        Self { heuristics: false }
    }

    pub fn with_heuristics(mut self, enabled: bool) -> Self {
        self.heuristics = enabled;
        self
    }

    /// Action index: one slot per cell, in cell order.
    pub fn action_index() -> ActionIndex<Action> {
        ActionIndex::from_enumeration((0..9u8).map(Action::Place))
    }
}

impl GameAdapter for TicTacToe {
    type State = State;
    type Action = Action;
    type Undo = Undo;

    fn legal_actions(&self, state: &State) -> Vec<Action> {
        state.legal_moves().into_iter().map(Action::Place).collect()
    }

    fn apply_action_with_undo(&self, state: &mut State, action: &Action) -> Option<Undo> {
        let position = action.position();
        if state.is_done() || position >= 9 || state.board[position as usize] != 0 {
            return None;
        }

        let token = Undo {
            position,
            previous_player: state.current_player,
            previous_result: state.result,
        };

        state.board[position as usize] = state.current_player + 1;
        state.result = State::check_result(&state.board);
        if !state.result.is_over() {
            state.current_player = opponent(state.current_player);
        }

        Some(token)
    }

    fn undo_action(&self, state: &mut State, token: Undo) {
        state.board[token.position as usize] = 0;
        state.current_player = token.previous_player;
        state.result = token.previous_result;
    }

    fn is_terminal(&self, state: &State) -> bool {
        state.is_done()
    }

    fn current_player(&self, state: &State) -> PlayerId {
        state.current_player
    }

    fn outcome_for_player(&self, state: &State, player: PlayerId) -> f32 {
        outcome_for_player(state.result, player)
    }

    fn hooks(&self) -> Hooks {
        if self.heuristics {
            Hooks {
                evaluate: false,
                action_prior: true,
                tactical_priority: true,
            }
        } else {
            Hooks::NONE
        }
    }

    fn action_prior(&self, _state: &State, action: &Action, _player: PlayerId) -> f32 {
        match action.position() {
            4 => 0.3,
            0 | 2 | 6 | 8 => 0.2,
            _ => 0.1,
        }
    }

    fn tactical_priority(&self, state: &State, action: &Action, player: PlayerId) -> i32 {
        let pos = action.position() as usize;
        if pos >= 9 || state.board[pos] != 0 {
            return 0;
        }
        if state.completes_line(pos, player) {
            WIN_PRIORITY
        } else if state.completes_line(pos, opponent(player)) {
            BLOCK_PRIORITY
        } else {
            0
        }
    }

    /// Exact base-3 encoding of the board plus the side to move.
    fn state_key(&self, state: &State) -> Option<u64> {
        let board = state
            .board
            .iter()
            .fold(0u64, |acc, &cell| acc * 3 + cell as u64);
        Some(board * 2 + state.current_player as u64)
    }
}

/// Feature encoder
///
/// Layout: one-hot board `[X positions, O positions]` (18), legal-move mask
/// (9), side to move `[is_X, is_O]` (2). 29 floats total.
#[derive(Debug, Clone, Copy, Default)]
pub struct TicTacToeEncoder;

impl TicTacToeEncoder {
    pub const FEATURE_SIZE: usize = 29;
}

impl FeatureEncoder<State> for TicTacToeEncoder {
    fn feature_size(&self) -> usize {
        Self::FEATURE_SIZE
    }

    fn encode_into(&self, state: &State, out: &mut Vec<f32>) {
        let mut board_view = [0.0f32; 18];
        let mut legal_moves = [0.0f32; 9];
        let mut current_player = [0.0f32; 2];

        for (i, &cell) in state.board.iter().enumerate() {
            if cell == 1 {
                board_view[i] = 1.0; // X positions
            } else if cell == 2 {
                board_view[i + 9] = 1.0; // O positions
            }
        }

        for pos in state.legal_moves() {
            legal_moves[pos as usize] = 1.0;
        }

        current_player[state.current_player as usize] = 1.0;

        extend_features(out, [&board_view[..], &legal_moves[..], &current_player[..]]);
    }
}
