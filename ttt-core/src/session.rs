//! One human against the solver, with a selection cursor and a timed
//! auto-reset after each finished game.
//!
//! Time is passed in by the caller as the elapsed duration since some fixed
//! start, so the session never reads a clock.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::board::{Board, Mark, Outcome};
use crate::coord::Coord;
use crate::error::{BoardError, Result};
use crate::solver;

/// Session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// How long a finished board stays up before it is cleared.
    pub reset_delay: Duration,
    /// Side played by the human. The solver plays the other one.
    pub human: Mark,
    /// Where the cursor starts.
    pub start_cursor: Coord,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reset_delay: Duration::from_secs(5),
            human: Mark::Circle,
            start_cursor: Coord::CENTER,
        }
    }
}

impl SessionConfig {
    pub fn with_reset_delay(reset_delay: Duration) -> Self {
        Self {
            reset_delay,
            ..Default::default()
        }
    }
}

/// What happened on a confirmed human move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Turn {
    pub human: Coord,
    /// The solver's reply, absent when the human move ended the game.
    pub reply: Option<Coord>,
    pub outcome: Outcome,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    /// Rows top to bottom, each indexed by x.
    pub cells: [[Mark; 3]; 3],
    pub outcome: Outcome,
    pub cursor: Coord,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winning_line: Option<[Coord; 3]>,
    pub finished: bool,
    pub ai_turn: u32,
    pub bits: u32,
}

/// Game loop state around a single board.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
    board: Board,
    cursor: Coord,
    ai_turn: u32,
    human_moves: u32,
    finished_at: Option<Duration>,
}

impl Session {
    /// Start a session. Fails if the configured human side is not Circle or
    /// Cross.
    pub fn new(config: SessionConfig) -> Result<Self> {
        if !config.human.is_side() {
            return Err(BoardError::NotASide(config.human));
        }
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: SessionConfig) -> Self {
        let cursor = config.start_cursor.normalize();
        Self {
            config,
            board: Board::new(),
            cursor,
            ai_turn: 0,
            human_moves: 0,
            finished_at: None,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn cursor(&self) -> Coord {
        self.cursor
    }

    pub fn ai_turn(&self) -> u32 {
        self.ai_turn
    }

    /// Human moves played since the last reset.
    pub fn human_moves(&self) -> u32 {
        self.human_moves
    }

    /// True while a finished board is waiting for its auto-reset.
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    fn solver_is_circle(&self) -> bool {
        self.config.human.opponent() == Mark::Circle
    }

    /// Move the cursor, wrapping at the edges. Ignored while finished.
    pub fn move_cursor(&mut self, dx: i32, dy: i32) -> Coord {
        if !self.is_finished() {
            self.cursor = self.cursor.shifted(dx, dy);
        }
        self.cursor
    }

    /// Place the human mark at the cursor and let the solver answer.
    ///
    /// Returns `None` when the move was ignored: the game is finished or the
    /// cell is taken.
    pub fn confirm(&mut self, now: Duration) -> Option<Turn> {
        if self.is_finished() {
            return None;
        }

        let human = self.cursor;
        if !self.board.set_at(human, self.config.human) {
            return None;
        }
        self.human_moves += 1;

        let reply = if self.board.is_terminal() {
            None
        } else {
            let circle = self.solver_is_circle();
            let reply = solver::next_move(&mut self.board, self.ai_turn, circle);
            self.ai_turn += 1;
            reply
        };

        let outcome = self.board.outcome();
        if outcome.is_terminal() {
            info!(%outcome, human_moves = self.human_moves, "game finished");
            self.finished_at = Some(now);
        }

        Some(Turn {
            human,
            reply,
            outcome,
        })
    }

    /// Move the cursor to `cell` and confirm there.
    ///
    /// Off-grid cells are rejected rather than wrapped.
    pub fn play_at(&mut self, cell: Coord, now: Duration) -> Option<Turn> {
        if self.is_finished() || !cell.in_range() {
            return None;
        }
        self.cursor = cell;
        self.confirm(now)
    }

    /// Advance the clock. Clears a finished board once strictly more than the
    /// reset delay has passed and returns whether that happened.
    pub fn tick(&mut self, now: Duration) -> bool {
        match self.finished_at {
            Some(at) if now.saturating_sub(at) > self.config.reset_delay => {
                info!("auto-reset after finished game");
                self.reset();
                true
            }
            _ => false,
        }
    }

    /// Clear the board, the solver turn counter and the finished flag.
    /// The cursor stays where it is.
    pub fn reset(&mut self) {
        self.board.reset();
        self.ai_turn = 0;
        self.human_moves = 0;
        self.finished_at = None;
    }

    /// Replace the board, e.g. from an imported encoding.
    ///
    /// A terminal board counts as finished at `now`.
    pub fn load(&mut self, board: Board, now: Duration) {
        self.board = board;
        self.ai_turn = 0;
        self.human_moves = 0;
        self.finished_at = board.is_terminal().then_some(now);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            cells: self.board.rows(),
            outcome: self.board.outcome(),
            cursor: self.cursor,
            winning_line: self.board.winning_line(),
            finished: self.is_finished(),
            ai_turn: self.ai_turn,
            bits: self.board.to_bits(),
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::with_valid_config(SessionConfig::default())
    }
}
