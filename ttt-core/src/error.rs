use thiserror::Error;

use crate::board::Mark;

/// Errors from decoding or parsing board data.
///
/// Illegal moves are not errors: [`Board::set`](crate::Board::set) reports them
/// with `false`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("board encoding {0:#x} uses bits above the 9 cells")]
    EncodingOverflow(u32),

    #[error("board encoding has invalid mark bits {bits:#b} at cell {index}")]
    InvalidCellBits { index: usize, bits: u32 },

    #[error("unknown side: {0:?} (expected \"circle\" or \"cross\")")]
    UnknownSide(String),

    #[error("{0:?} is not a playable side")]
    NotASide(Mark),
}

/// Convenience Result type for board operations.
pub type Result<T> = std::result::Result<T, BoardError>;
