//! Tic-tac-toe game state with a fixed heuristic opponent.
//!
//! - [`Board`]: 3x3 grid of [`Mark`]s with a cached [`Outcome`]
//! - [`solver::next_move`]: plays one move for a side using an ordered rule table
//! - [`Coord`]: grid coordinate with wrap-around for the selection cursor
//! - [`Session`]: cursor, human move, solver reply and timed auto-reset
//!
//! # Coordinates
//!
//! ```text
//!   (0,0) (1,0) (2,0)
//!   (0,1) (1,1) (2,1)
//!   (0,2) (1,2) (2,2)
//! ```
//!
//! `x` is the column, `y` the row. Board accessors take signed coordinates
//! and treat anything outside [0, 3) as off the grid.

#[cfg(feature = "wasm")]
pub mod wasm;

pub mod board;
pub mod coord;
mod error;
pub mod session;
pub mod solver;

pub use board::{Board, Mark, Outcome, LINES};
pub use coord::Coord;
pub use error::{BoardError, Result};
pub use session::{Session, SessionConfig, SessionSnapshot, Turn};
pub use solver::next_move;
