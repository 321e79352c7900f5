use board::BoardError;
use thiserror::Error;

use crate::arena::Handle;

#[derive(Debug, Error)]
pub enum SearchError {
    /// A growable pool or table could not be (re)allocated.
    #[error("out of memory growing the {pool} by {requested} slots")]
    OutOfMemory { pool: &'static str, requested: usize },

    #[error("stale handle {0:?}")]
    StaleHandle(Handle),

    #[error("invalid MPC model at line {line}: {reason}")]
    InvalidModel { line: usize, reason: String },

    #[error(transparent)]
    Board(#[from] BoardError),
}
