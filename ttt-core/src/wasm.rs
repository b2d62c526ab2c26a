//! WASM bindings for ttt-core
//!
//! Exposes a [`Session`] to a browser renderer. Times are milliseconds on
//! whatever monotonic clock the page uses (e.g. `performance.now()`).

use std::time::Duration;

use wasm_bindgen::prelude::*;

use crate::{Board, Coord, Session, SessionConfig};

/// Convert JS milliseconds, clamping negatives and NaN to zero and anything
/// too large (including infinity) to `Duration::MAX`.
fn millis(now_ms: f64) -> Duration {
    Duration::try_from_secs_f64(now_ms.max(0.0) / 1000.0).unwrap_or(Duration::MAX)
}

/// WASM-friendly wrapper around Session
#[wasm_bindgen]
pub struct WasmGame {
    inner: Session,
}

#[wasm_bindgen]
impl WasmGame {
    /// Create a new game with the default 5 second reset delay
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmGame {
        WasmGame { inner: Session::default() }
    }

    /// Create a game with a custom reset delay in milliseconds
    #[wasm_bindgen(js_name = withResetDelay)]
    pub fn with_reset_delay(delay_ms: f64) -> WasmGame {
        let config = SessionConfig::with_reset_delay(millis(delay_ms));
        WasmGame {
            inner: Session::new(config).unwrap_or_default(),
        }
    }

    /// Move the cursor by a delta, wrapping at the edges. Returns [x, y]
    #[wasm_bindgen(js_name = moveCursor)]
    pub fn move_cursor(&mut self, dx: i32, dy: i32) -> Vec<i32> {
        let c = self.inner.move_cursor(dx, dy);
        vec![c.x, c.y]
    }

    /// Confirm at the cursor. Returns true if the move was played
    pub fn confirm(&mut self, now_ms: f64) -> bool {
        self.inner.confirm(millis(now_ms)).is_some()
    }

    /// Play at a cell directly. Returns true if the move was played
    #[wasm_bindgen(js_name = playAt)]
    pub fn play_at(&mut self, x: i32, y: i32, now_ms: f64) -> bool {
        self.inner.play_at(Coord::new(x, y), millis(now_ms)).is_some()
    }

    /// Advance the clock. Returns true if a finished board was cleared
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.inner.tick(millis(now_ms))
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    /// Cell mark: 0 (invalid), 1 (empty), 2 (circle), 3 (cross)
    pub fn cell(&self, x: i32, y: i32) -> u8 {
        self.inner.board().get(x, y) as u8
    }

    /// "regular", "tied", "circle_win" or "cross_win"
    pub fn outcome(&self) -> String {
        self.inner.board().outcome().to_string()
    }

    /// Check if a finished board is waiting for its reset
    #[wasm_bindgen(js_name = isFinished)]
    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    /// Cursor as [x, y]
    pub fn cursor(&self) -> Vec<i32> {
        let c = self.inner.cursor();
        vec![c.x, c.y]
    }

    /// Winning line as [x, y, x, y, x, y], empty if nobody has won
    #[wasm_bindgen(js_name = winningLine)]
    pub fn winning_line(&self) -> Vec<i32> {
        match self.inner.board().winning_line() {
            Some(line) => line.iter().flat_map(|c| [c.x, c.y]).collect(),
            None => vec![],
        }
    }

    /// Full frame state as a JS object
    pub fn snapshot(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.snapshot()).map_err(JsValue::from)
    }

    /// Get the 18-bit board encoding
    #[wasm_bindgen(js_name = toBits)]
    pub fn to_bits(&self) -> u32 {
        self.inner.board().to_bits()
    }

    /// Load a board from its encoding
    #[wasm_bindgen(js_name = fromBits)]
    pub fn from_bits(&mut self, bits: u32, now_ms: f64) -> Result<(), JsValue> {
        let board = Board::from_bits(bits).map_err(|e| JsValue::from_str(&e.to_string()))?;
        self.inner.load(board, millis(now_ms));
        Ok(())
    }

    /// Check if the human side has won
    #[wasm_bindgen(js_name = humanWon)]
    pub fn human_won(&self) -> bool {
        self.inner.board().outcome().winner() == Some(self.inner.config().human)
    }
}

impl Default for WasmGame {
    fn default() -> Self {
        Self::new()
    }
}
