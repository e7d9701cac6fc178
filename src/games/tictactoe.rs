//! # Tic-Tac-Toe Game Implementation
//!
//! A complete host-side implementation of the engine's capability contracts
//! for 3x3 tic-tac-toe, used by the `play` binary and as a worked example of
//! integrating a game with the engine.
//!
//! ## Rules
//! - Players alternate placing crosses and circles on a 3x3 board
//! - Three in a row (horizontally, vertically, or diagonally) wins
//! - The game is a draw when the board fills up with no winner

use std::fmt;

use rand::Rng;

use crate::{Action, ActionGenerator, Backpropagation, PlayoutGenerator, Scoring, TerminationCheck};

/// One of the two tic-tac-toe players.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Player {
    Cross,
    Circle,
}

impl Player {
    /// The other player.
    pub fn opponent(self) -> Player {
        match self {
            Player::Cross => Player::Circle,
            Player::Circle => Player::Cross,
        }
    }

    /// A single character representation of a player.
    pub fn to_char(self) -> char {
        match self {
            Player::Cross => 'x',
            Player::Circle => 'o',
        }
    }
}

/// The three-in-a-row lines of a 3x3 board, as cell indices.
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// The complete state of a tic-tac-toe game.
///
/// Cells are stored row-major; `(x, y)` maps to index `y * 3 + x`.
#[derive(Clone, Debug)]
pub struct Board {
    cells: [Option<Player>; 9],
    current: Player,
    turns: u32,
}

impl Board {
    /// An empty board with Cross to move.
    pub fn new() -> Self {
        Board {
            cells: [None; 9],
            current: Player::Cross,
            turns: 0,
        }
    }

    /// The player occupying the given position, if any.
    pub fn position(&self, x: usize, y: usize) -> Option<Player> {
        self.cells[y * 3 + x]
    }

    /// Plays the given square for the current player and passes the turn.
    pub fn play(&mut self, x: usize, y: usize) {
        self.cells[y * 3 + x] = Some(self.current);
        self.current = self.current.opponent();
        self.turns += 1;
    }

    /// The winning player, or `None` for a draw or an unfinished game.
    pub fn winner(&self) -> Option<Player> {
        for line in &LINES {
            if let Some(p) = self.cells[line[0]] {
                if self.cells[line[1]] == Some(p) && self.cells[line[2]] == Some(p) {
                    return Some(p);
                }
            }
        }
        None
    }

    /// The number of moves played so far.
    pub fn turns(&self) -> u32 {
        self.turns
    }

    /// The player allowed to make the next move.
    pub fn current_player(&self) -> Player {
        self.current
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for y in 0..3 {
            for x in 0..3 {
                let symbol = match self.position(x, y) {
                    Some(p) => p.to_char(),
                    None => '-',
                };
                write!(f, "{} ", symbol)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

/// Places a piece for the current player at `(x, y)`.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct TttAction {
    pub x: usize,
    pub y: usize,
}

impl TttAction {
    pub fn new(x: usize, y: usize) -> Self {
        TttAction { x, y }
    }
}

impl fmt::Display for TttAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Place at ({},{})", self.x, self.y)
    }
}

impl Action<Board> for TttAction {
    fn execute(&self, state: &mut Board) {
        state.play(self.x, self.y);
    }
}

/// Lazily enumerates the empty squares of one board, row-major.
///
/// Snapshots the occupancy at construction time and advances a cursor over
/// it, so each square is produced at most once per instance.
pub struct TttActionGenerator {
    occupied: [bool; 9],
    cursor: usize,
}

impl TttActionGenerator {
    /// Advances the cursor past occupied squares.
    fn skip_occupied(&mut self) {
        while self.cursor < 9 && self.occupied[self.cursor] {
            self.cursor += 1;
        }
    }
}

impl ActionGenerator for TttActionGenerator {
    type State = Board;
    type Action = TttAction;

    fn new(state: &Board) -> Self {
        let mut occupied = [false; 9];
        for (i, slot) in occupied.iter_mut().enumerate() {
            *slot = state.position(i % 3, i / 3).is_some();
        }
        let mut generator = TttActionGenerator {
            occupied,
            cursor: 0,
        };
        generator.skip_occupied();
        generator
    }

    fn generate_next(&mut self) -> Option<TttAction> {
        if self.cursor >= 9 {
            return None;
        }
        let index = self.cursor;
        self.cursor += 1;
        self.skip_occupied();
        Some(TttAction::new(index % 3, index / 3))
    }

    fn can_generate_next(&self) -> bool {
        self.cursor < 9
    }
}

/// Samples a uniformly random empty square of one board.
pub struct TttPlayoutGenerator {
    empty: Vec<(usize, usize)>,
}

impl PlayoutGenerator for TttPlayoutGenerator {
    type State = Board;
    type Action = TttAction;

    fn new(state: &Board) -> Self {
        let empty = (0..9)
            .filter(|i| state.position(i % 3, i / 3).is_none())
            .map(|i| (i % 3, i / 3))
            .collect();
        TttPlayoutGenerator { empty }
    }

    fn generate_random(&mut self) -> TttAction {
        let (x, y) = self.empty[rand::rng().random_range(0..self.empty.len())];
        TttAction::new(x, y)
    }
}

/// Flips the backpropagated score on the opponent's nodes.
///
/// A node's statistics are recorded from the perspective of the player who
/// moved into that node, so a playout score is kept as-is where the searcher
/// is about to act and inverted where the opponent is.
pub struct TttBackpropagation {
    player: Player,
}

impl TttBackpropagation {
    /// `player` is the player the search is run for, i.e. the one to move at
    /// the root.
    pub fn new(player: Player) -> Self {
        TttBackpropagation { player }
    }
}

impl Backpropagation<Board> for TttBackpropagation {
    fn update_score(&mut self, state: &Board, score: f32) -> f32 {
        if state.current_player() == self.player {
            score
        } else {
            1.0 - score
        }
    }
}

/// The game ends on a win or when all nine squares are filled.
pub struct TttTerminationCheck;

impl TerminationCheck<Board> for TttTerminationCheck {
    fn is_terminal(&self, state: &Board) -> bool {
        state.winner().is_some() || state.turns() == 9
    }
}

/// Scores a finished board for the searching player.
///
/// Scored from the perspective of the player about to act at the terminal
/// state: a board the searcher has won is a loss for the player left to move,
/// hence 0. `TttBackpropagation` flips the value back on the searcher's own
/// nodes.
pub struct TttScoring {
    player: Player,
}

impl TttScoring {
    /// `player` is the player the search is run for.
    pub fn new(player: Player) -> Self {
        TttScoring { player }
    }
}

impl Scoring<Board> for TttScoring {
    fn score(&self, state: &Board) -> f32 {
        match state.winner() {
            Some(p) if p == self.player => 0.0,
            Some(_) => 1.0,
            None => 0.75,
        }
    }
}
