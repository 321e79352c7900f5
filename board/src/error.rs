use thiserror::Error;

use crate::Square;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("invalid square `{0}`")]
    InvalidSquare(String),

    #[error("illegal move {0}")]
    IllegalMove(Square),

    #[error("stones overlap at {0:#018x}")]
    Overlap(u64),

    #[error("invalid board: {0}")]
    InvalidBoard(String),

    #[error("invalid record at move {position}: {reason}")]
    InvalidRecord { position: usize, reason: String },
}
