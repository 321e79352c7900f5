mod error;
mod movegen;
mod position;
pub mod record;
mod simd;
mod square;

pub use error::BoardError;
pub use movegen::{
    final_score, flip_mask, legal_moves, legal_moves_scalar, CORNERS, DIAGONAL_MASK,
    HORIZONTAL_MASK, VERTICAL_MASK,
};
pub use position::{Color, Ply, Position};
pub use simd::simd_available;
pub use square::{Square, Squares};
