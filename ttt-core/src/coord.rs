//! Grid coordinates.
//!
//! `x` is the column and `y` is the row, both 0-2 on a valid cell:
//!
//! ```text
//!   (0,0) (1,0) (2,0)
//!   (0,1) (1,1) (2,1)
//!   (0,2) (1,2) (2,2)
//! ```
//!
//! Axes are signed so that neighbour offsets can step off the grid and be
//! rejected by a bounds check instead of wrapping around.

use serde::{Deserialize, Serialize};

/// Side length of the board.
pub const SIZE: i32 = 3;

/// A position on (or next to) the 3x3 grid.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    /// The center cell.
    pub const CENTER: Coord = Coord { x: 1, y: 1 };

    #[inline]
    pub const fn new(x: i32, y: i32) -> Coord {
        Coord { x, y }
    }

    /// Check if both axes are inside [0, 3).
    #[inline]
    pub fn in_range(self) -> bool {
        (0..SIZE).contains(&self.x) && (0..SIZE).contains(&self.y)
    }

    /// Reduce both axes modulo 3, wrapping negatives onto the far edge.
    ///
    /// Only meant for the selection cursor; board addressing never wraps.
    #[inline]
    pub fn normalize(self) -> Coord {
        Coord {
            x: self.x.rem_euclid(SIZE),
            y: self.y.rem_euclid(SIZE),
        }
    }

    /// Move by a delta and wrap the result onto the grid.
    #[inline]
    pub fn shifted(self, dx: i32, dy: i32) -> Coord {
        let base = self.normalize();
        Coord::new(base.x + dx.rem_euclid(SIZE), base.y + dy.rem_euclid(SIZE)).normalize()
    }

    /// Add an offset without wrapping. The result may be off the grid.
    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Coord {
        Coord::new(self.x + dx, self.y + dy)
    }

    /// Row-major cell index (0-8), or `None` when off the grid.
    #[inline]
    pub fn index(self) -> Option<usize> {
        if self.in_range() {
            Some((self.y * SIZE + self.x) as usize)
        } else {
            None
        }
    }

    /// Inverse of [`Coord::index`].
    #[inline]
    pub fn from_index(index: usize) -> Option<Coord> {
        if index < 9 {
            Some(Coord::new(index as i32 % SIZE, index as i32 / SIZE))
        } else {
            None
        }
    }

    /// Iterate over all 9 cells in row-major order.
    pub fn all() -> impl Iterator<Item = Coord> {
        (0..9).filter_map(Coord::from_index)
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}
