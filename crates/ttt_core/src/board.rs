//! The board: piece placement, turn order and the cursor.
//!
//! A [`Board`] owns everything that is shared between peers (rank, side
//! length, cells and whose turn it is) plus two local concerns: the cursor,
//! which only the presentation layer moves, and a cache of winning lines
//! that is refreshed by an explicit [`Board::check_winners`] call.

use crate::error::BoardError;
use crate::geometry::{add, Coord, Geometry, AXES};
use crate::snapshot::BoardState;
use crate::win::{find_winning_lines, WinningLine};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Side length of classic tic-tac-toe.
pub const DEFAULT_SIDE_LENGTH: usize = 3;

/// Longest supported side. Keeps a 4D board at 65536 cells and every index
/// computation well inside `usize`.
pub const MAX_SIDE_LENGTH: usize = 16;

/// Validates a shape and returns its geometry and cell count.
fn checked_shape(rank: Rank, side_length: usize) -> Result<(Geometry, usize), BoardError> {
    if !(2..=MAX_SIDE_LENGTH).contains(&side_length) {
        return Err(BoardError::InvalidSideLength(side_length));
    }
    let geometry = Geometry::new(side_length);
    let cells = geometry
        .cell_count(rank)
        .ok_or(BoardError::InvalidSideLength(side_length))?;
    Ok((geometry, cells))
}

/// One of the two sides. `First` always moves first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Piece {
    First,
    Second,
}

impl Piece {
    /// Returns the opposing side.
    pub fn other(self) -> Self {
        match self {
            Piece::First => Piece::Second,
            Piece::Second => Piece::First,
        }
    }

    /// Single-character symbol used in text dumps.
    pub fn symbol(self) -> char {
        match self {
            Piece::First => 'X',
            Piece::Second => 'O',
        }
    }
}

impl From<Piece> for u8 {
    fn from(piece: Piece) -> Self {
        match piece {
            Piece::First => 0,
            Piece::Second => 1,
        }
    }
}

impl TryFrom<u8> for Piece {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Piece::First),
            1 => Ok(Piece::Second),
            other => Err(format!("invalid piece {other}, expected 0 or 1")),
        }
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Number of active axes on a board: 2, 3 or 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rank(u8);

impl Rank {
    pub const TWO: Rank = Rank(2);
    pub const THREE: Rank = Rank(3);
    pub const FOUR: Rank = Rank(4);

    /// Validates a rank value.
    pub fn new(value: i64) -> Result<Self, BoardError> {
        match value {
            2..=4 => Ok(Rank(value as u8)),
            other => Err(BoardError::InvalidRank(other)),
        }
    }

    /// The rank as a plain number of axes.
    pub fn get(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<i64> for Rank {
    type Error = BoardError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Rank::new(value)
    }
}

impl From<Rank> for i64 {
    fn from(rank: Rank) -> Self {
        rank.0 as i64
    }
}

impl Default for Rank {
    fn default() -> Self {
        Rank::FOUR
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}D", self.0)
    }
}

/// Outcome derived from the cached winning lines and board fullness.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    InProgress,
    Won(Piece),
    Draw,
}

/// An N-dimensional tic-tac-toe board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    geometry: Geometry,
    rank: Rank,
    cells: Vec<Option<Piece>>,
    current_piece: Piece,
    cursor: usize,
    winning_lines: Vec<WinningLine>,
}

impl Board {
    /// Creates an empty board with `First` to move and the cursor on cell 0.
    ///
    /// # Errors
    ///
    /// [`BoardError::InvalidSideLength`] if `side_length` is outside
    /// `2..=MAX_SIDE_LENGTH`.
    pub fn new(rank: Rank, side_length: usize) -> Result<Self, BoardError> {
        let (geometry, cells) = checked_shape(rank, side_length)?;
        Ok(Self {
            geometry,
            rank,
            cells: vec![None; cells],
            current_piece: Piece::First,
            cursor: 0,
            winning_lines: Vec::new(),
        })
    }

    pub fn rank(&self) -> Rank {
        self.rank
    }

    pub fn side_length(&self) -> usize {
        self.geometry.side_length()
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[Option<Piece>] {
        &self.cells
    }

    /// The piece at `index`, or `None` when the cell is empty or out of range.
    pub fn cell(&self, index: usize) -> Option<Piece> {
        self.cells.get(index).copied().flatten()
    }

    /// Whose turn it is.
    pub fn current_piece(&self) -> Piece {
        self.current_piece
    }

    /// Index of the selected cell.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Coordinate of the selected cell.
    pub fn cursor_coord(&self) -> Coord {
        self.geometry.decode(self.cursor)
    }

    /// Winning lines found by the last [`check_winners`](Self::check_winners)
    /// call. Stale after any mutation until detection runs again.
    pub fn winning_lines(&self) -> &[WinningLine] {
        &self.winning_lines
    }

    /// Places the current piece under the cursor.
    ///
    /// Returns `false` and leaves the board untouched if the cell is already
    /// occupied. On success the turn passes to the other side. Detection is
    /// not run here; callers decide when to call
    /// [`check_winners`](Self::check_winners).
    pub fn place_piece(&mut self) -> bool {
        match self.cells.get_mut(self.cursor) {
            Some(slot @ None) => {
                *slot = Some(self.current_piece);
                self.current_piece = self.current_piece.other();
                true
            }
            _ => false,
        }
    }

    /// Shifts the cursor by `direction`, wrapping each active axis modulo the
    /// side length. Components on axes beyond the board's rank are ignored so
    /// the cursor always stays on the board.
    pub fn move_cursor(&mut self, direction: Coord) {
        let mut direction = direction;
        for component in direction.iter_mut().skip(self.rank.get()) {
            *component = 0;
        }
        let target = add(self.geometry.decode(self.cursor), direction);
        self.cursor = self.geometry.encode(target);
    }

    /// Puts the cursor directly on `index`.
    ///
    /// # Errors
    ///
    /// [`BoardError::IndexOutOfRange`] if `index` is not a cell of this board;
    /// the cursor is left where it was.
    pub fn select(&mut self, index: usize) -> Result<(), BoardError> {
        if index >= self.cells.len() {
            return Err(BoardError::IndexOutOfRange {
                index,
                cells: self.cells.len(),
            });
        }
        self.cursor = index;
        Ok(())
    }

    /// Clears the board, optionally switching rank and side length. Omitted
    /// values are kept.
    ///
    /// # Errors
    ///
    /// [`BoardError::InvalidSideLength`] if the new side length is out of
    /// range; the board is left unchanged.
    pub fn reset(&mut self, rank: Option<Rank>, side_length: Option<usize>) -> Result<(), BoardError> {
        let rank = rank.unwrap_or(self.rank);
        let (geometry, cells) = checked_shape(rank, side_length.unwrap_or(self.side_length()))?;
        self.geometry = geometry;
        self.rank = rank;
        self.cells = vec![None; cells];
        self.current_piece = Piece::First;
        self.cursor = 0;
        self.winning_lines.clear();
        Ok(())
    }

    /// Runs win detection, caches the result and returns it.
    pub fn check_winners(&mut self) -> &[WinningLine] {
        self.winning_lines = find_winning_lines(self);
        &self.winning_lines
    }

    /// Side owning the first cached winning line, if any.
    pub fn winner(&self) -> Option<Piece> {
        self.winning_lines.first().map(|line| line.piece)
    }

    /// Whether every cell holds a piece.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(Option::is_some)
    }

    /// Game outcome according to the cached winning lines.
    pub fn status(&self) -> GameStatus {
        match self.winner() {
            Some(piece) => GameStatus::Won(piece),
            None if self.is_full() => GameStatus::Draw,
            None => GameStatus::InProgress,
        }
    }

    /// Captures the shared part of the board.
    pub fn serialize(&self) -> BoardState {
        BoardState {
            dimension: self.rank.get() as i64,
            side_length: self.side_length(),
            pieces: self.cells.clone(),
            cur_piece: self.current_piece,
        }
    }

    /// Overwrites the shared part of the board with an authoritative
    /// snapshot.
    ///
    /// The cursor is kept unless it falls outside the new shape, in which case
    /// it returns to cell 0. The winning-line cache is cleared.
    ///
    /// # Errors
    ///
    /// Returns an error and leaves the board untouched if the snapshot's rank
    /// or side length is invalid or its piece list has the wrong length.
    pub fn deserialize(&mut self, state: &BoardState) -> Result<(), BoardError> {
        let rank = Rank::new(state.dimension)?;
        let (geometry, expected) = checked_shape(rank, state.side_length)?;
        if state.pieces.len() != expected {
            return Err(BoardError::ShapeMismatch {
                expected,
                found: state.pieces.len(),
            });
        }

        self.geometry = geometry;
        self.rank = rank;
        self.cells = state.pieces.clone();
        self.current_piece = state.cur_piece;
        self.winning_lines.clear();
        if self.cursor >= expected {
            self.cursor = 0;
        }
        Ok(())
    }

    /// Plain-text dump of the board, one `S x S` grid per (z, w) slice.
    /// The cursor cell is wrapped in brackets.
    pub fn render_text(&self) -> String {
        let side = self.side_length();
        let layers = match self.rank.get() {
            2 => 1,
            3 => side,
            _ => side * side,
        };
        let mut out = String::new();
        for layer in 0..layers {
            if self.rank.get() > 2 {
                let z = layer % side;
                let w = layer / side;
                out.push_str(&format!("z={z} w={w}\n"));
            }
            for y in (0..side).rev() {
                for x in 0..side {
                    let index = x + y * side + layer * side * side;
                    let symbol = self.cell(index).map(Piece::symbol).unwrap_or('.');
                    if index == self.cursor {
                        out.push_str(&format!("[{symbol}]"));
                    } else {
                        out.push_str(&format!(" {symbol} "));
                    }
                }
                out.push('\n');
            }
        }
        out
    }
}

impl Default for Board {
    fn default() -> Self {
        Self {
            geometry: Geometry::new(DEFAULT_SIDE_LENGTH),
            rank: Rank::FOUR,
            cells: vec![None; DEFAULT_SIDE_LENGTH.pow(4)],
            current_piece: Piece::First,
            cursor: 0,
            winning_lines: Vec::new(),
        }
    }
}

/// Unit step along one axis, as produced by a keyboard-driven UI.
pub fn unit_step(axis: usize, forward: bool) -> Coord {
    let mut step = [0; AXES];
    if axis < AXES {
        step[axis] = if forward { 1 } else { -1 };
    }
    step
}
