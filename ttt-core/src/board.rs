//! The 3x3 board and its outcome classification.
//!
//! # Encoding (32-bit)
//!
//! ```text
//! Bits 0-17:  9 cells × 2 bits, row-major (cell index = y * 3 + x)
//! Bits 18-31: unused (must be zero)
//!
//! Each cell (2 bits): 0 = Empty, 1 = Circle, 2 = Cross, 3 = invalid
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::coord::Coord;
use crate::error::{BoardError, Result};

/// What occupies (or describes) a cell.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Mark {
    /// Returned for coordinates off the grid. Never stored.
    Invalid = 0,
    Empty = 1,
    Circle = 2,
    Cross = 3,
}

impl Mark {
    /// Check if this is a playable side (Circle or Cross).
    #[inline]
    pub fn is_side(self) -> bool {
        matches!(self, Mark::Circle | Mark::Cross)
    }

    /// The opposing side. Empty and Invalid map to themselves.
    #[inline]
    pub fn opponent(self) -> Mark {
        match self {
            Mark::Circle => Mark::Cross,
            Mark::Cross => Mark::Circle,
            other => other,
        }
    }

    /// Side selected by the solver's boolean flag.
    #[inline]
    pub fn for_side(circle: bool) -> Mark {
        if circle {
            Mark::Circle
        } else {
            Mark::Cross
        }
    }

    /// Display character: `O`, `X`, `.` for empty, `?` for invalid.
    pub fn symbol(self) -> char {
        match self {
            Mark::Circle => 'O',
            Mark::Cross => 'X',
            Mark::Empty => '.',
            Mark::Invalid => '?',
        }
    }

    #[inline]
    fn to_bits(self) -> u32 {
        match self {
            Mark::Circle => 1,
            Mark::Cross => 2,
            Mark::Empty | Mark::Invalid => 0,
        }
    }

    #[inline]
    fn from_bits(bits: u32) -> Option<Mark> {
        match bits {
            0 => Some(Mark::Empty),
            1 => Some(Mark::Circle),
            2 => Some(Mark::Cross),
            _ => None,
        }
    }
}

impl FromStr for Mark {
    type Err = BoardError;

    /// Parse a side name (`circle`/`o` or `cross`/`x`, case-insensitive).
    fn from_str(s: &str) -> Result<Mark> {
        match s.trim().to_ascii_lowercase().as_str() {
            "circle" | "o" => Ok(Mark::Circle),
            "cross" | "x" => Ok(Mark::Cross),
            _ => Err(BoardError::UnknownSide(s.to_string())),
        }
    }
}

/// Whole-board classification.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Game still in progress.
    #[default]
    Regular,
    Tied,
    CircleWin,
    CrossWin,
}

impl Outcome {
    /// Anything other than Regular ends the game.
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != Outcome::Regular
    }

    /// The winning side, if any.
    pub fn winner(self) -> Option<Mark> {
        match self {
            Outcome::CircleWin => Some(Mark::Circle),
            Outcome::CrossWin => Some(Mark::Cross),
            Outcome::Regular | Outcome::Tied => None,
        }
    }

    fn win_for(mark: Mark) -> Outcome {
        if mark == Mark::Circle {
            Outcome::CircleWin
        } else {
            Outcome::CrossWin
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Outcome::Regular => "regular",
            Outcome::Tied => "tied",
            Outcome::CircleWin => "circle_win",
            Outcome::CrossWin => "cross_win",
        };
        f.write_str(s)
    }
}

/// The 8 lines, in scan order: 3 rows, 3 columns, `\` diagonal, `/` diagonal.
pub const LINES: [[Coord; 3]; 8] = [
    [Coord::new(0, 0), Coord::new(1, 0), Coord::new(2, 0)], // Row 0
    [Coord::new(0, 1), Coord::new(1, 1), Coord::new(2, 1)], // Row 1
    [Coord::new(0, 2), Coord::new(1, 2), Coord::new(2, 2)], // Row 2
    [Coord::new(0, 0), Coord::new(0, 1), Coord::new(0, 2)], // Col 0
    [Coord::new(1, 0), Coord::new(1, 1), Coord::new(1, 2)], // Col 1
    [Coord::new(2, 0), Coord::new(2, 1), Coord::new(2, 2)], // Col 2
    [Coord::new(0, 0), Coord::new(1, 1), Coord::new(2, 2)], // Main diagonal
    [Coord::new(0, 2), Coord::new(1, 1), Coord::new(2, 0)], // Anti-diagonal
];

/// 3x3 grid of marks plus its cached outcome.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Board {
    /// Indexed `[y][x]`. Only Empty, Circle and Cross are ever stored.
    cells: [[Mark; 3]; 3],
    outcome: Outcome,
}

impl Board {
    /// Create an empty board.
    pub fn new() -> Board {
        Board {
            cells: [[Mark::Empty; 3]; 3],
            outcome: Outcome::Regular,
        }
    }

    /// Clear every cell and set the outcome back to Regular.
    pub fn reset(&mut self) {
        *self = Board::new();
    }

    /// Mark at `(x, y)`, or `Mark::Invalid` when off the grid.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> Mark {
        self.get_at(Coord::new(x, y))
    }

    #[inline]
    pub fn get_at(&self, c: Coord) -> Mark {
        if c.in_range() {
            self.cells[c.y as usize][c.x as usize]
        } else {
            Mark::Invalid
        }
    }

    /// Place `mark` at `(x, y)`.
    ///
    /// Returns `false` and leaves the board untouched if the coordinate is off
    /// the grid, the cell is occupied, or `mark` is not Circle/Cross.
    ///
    /// A board whose outcome is already terminal still accepts marks on its
    /// empty cells; stopping play after a finished game is up to the caller.
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, mark: Mark) -> bool {
        self.set_at(Coord::new(x, y), mark)
    }

    pub fn set_at(&mut self, c: Coord, mark: Mark) -> bool {
        if !mark.is_side() || self.get_at(c) != Mark::Empty {
            return false;
        }

        self.cells[c.y as usize][c.x as usize] = mark;
        self.update();
        true
    }

    /// Cached classification, recomputed after every successful `set`.
    #[inline]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    #[inline]
    pub fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(|&m| m != Mark::Empty)
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = Coord> + '_ {
        Coord::all().filter(move |&c| self.get_at(c) == Mark::Empty)
    }

    /// The rows of the grid, top to bottom.
    pub fn rows(&self) -> [[Mark; 3]; 3] {
        self.cells
    }

    /// Check a line for three equal Circle/Cross marks.
    #[inline]
    fn line_winner(&self, line: &[Coord; 3]) -> Option<Mark> {
        let first = self.get_at(line[0]);
        if first.is_side() && self.get_at(line[1]) == first && self.get_at(line[2]) == first {
            Some(first)
        } else {
            None
        }
    }

    /// The first winning line in scan order, if any.
    pub fn winning_line(&self) -> Option<[Coord; 3]> {
        LINES
            .iter()
            .find(|line| self.line_winner(line).is_some())
            .copied()
    }

    /// Recompute the outcome. Stops at the first winning line.
    fn update(&mut self) {
        for line in &LINES {
            if let Some(mark) = self.line_winner(line) {
                self.outcome = Outcome::win_for(mark);
                return;
            }
        }

        self.outcome = if self.is_full() {
            Outcome::Tied
        } else {
            Outcome::Regular
        };
    }

    // ========== Encoding ==========

    /// Pack the grid into 18 bits (see module docs).
    pub fn to_bits(&self) -> u32 {
        Coord::all().fold(0u32, |bits, c| {
            let index = (c.y * 3 + c.x) as u32;
            bits | (self.get_at(c).to_bits() << (index * 2))
        })
    }

    /// Unpack a board from [`Board::to_bits`] output and recompute its outcome.
    pub fn from_bits(bits: u32) -> Result<Board> {
        if bits >> 18 != 0 {
            return Err(BoardError::EncodingOverflow(bits));
        }

        let mut board = Board::new();
        for (index, c) in Coord::all().enumerate() {
            let cell = (bits >> (index * 2)) & 0b11;
            let mark =
                Mark::from_bits(cell).ok_or(BoardError::InvalidCellBits { index, bits: cell })?;
            board.cells[c.y as usize][c.x as usize] = mark;
        }
        board.update();
        Ok(board)
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.cells {
            writeln!(f, "{} {} {}", row[0].symbol(), row[1].symbol(), row[2].symbol())?;
        }
        Ok(())
    }
}
