mod list;

use board::Square;

use crate::transposition::Entry;

pub use list::{Move, MoveList};

/// Ordering score of a move that captures every opponent stone.
pub const WIPEOUT_SCORE: i32 = 1 << 30;
/// Ordering score of the cached best move.
pub const BEST_MOVE_SCORE: i32 = 1 << 29;
/// Ordering score of the cached second-best move.
pub const SECOND_MOVE_SCORE: i32 = 1 << 28;

/// Static square preference: corners high, squares next to them low.
#[rustfmt::skip]
pub const SQUARE_VALUE: [i32; 64] = [
    18,  4, 16, 12, 12, 16,  4, 18,
     4,  2,  6,  8,  8,  6,  2,  4,
    16,  6, 14, 10, 10, 14,  6, 16,
    12,  8, 10,  0,  0, 10,  8, 12,
    12,  8, 10,  0,  0, 10,  8, 12,
    16,  6, 14, 10, 10, 14,  6, 16,
     4,  2,  6,  8,  8,  6,  2,  4,
    18,  4, 16, 12, 12, 16,  4, 18,
];

/// Move hints taken from a transposition entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hint {
    pub best: Option<Square>,
    pub second: Option<Square>,
}

impl Hint {
    pub fn from_entry(entry: Option<&Entry>) -> Self {
        match entry {
            Some(entry) => Self {
                best: entry.best,
                second: entry.second,
            },
            None => Self::default(),
        }
    }

    /// Bonus for a hinted square, if any.
    #[inline(always)]
    pub fn bonus(&self, square: Square) -> Option<i32> {
        if self.best == Some(square) {
            Some(BEST_MOVE_SCORE)
        } else if self.second == Some(square) {
            Some(SECOND_MOVE_SCORE)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_values_are_symmetric() {
        for index in 0..64 {
            let (file, rank) = (index % 8, index / 8);
            let mirrored = rank * 8 + (7 - file);
            let flipped = (7 - rank) * 8 + file;
            let transposed = file * 8 + rank;
            assert_eq!(SQUARE_VALUE[index], SQUARE_VALUE[mirrored]);
            assert_eq!(SQUARE_VALUE[index], SQUARE_VALUE[flipped]);
            assert_eq!(SQUARE_VALUE[index], SQUARE_VALUE[transposed]);
        }
    }

    #[test]
    fn test_hint_bonus() {
        let hint = Hint {
            best: Some(Square::new(0)),
            second: Some(Square::new(7)),
        };
        assert_eq!(hint.bonus(Square::new(0)), Some(BEST_MOVE_SCORE));
        assert_eq!(hint.bonus(Square::new(7)), Some(SECOND_MOVE_SCORE));
        assert_eq!(hint.bonus(Square::new(9)), None);
        assert!(WIPEOUT_SCORE > BEST_MOVE_SCORE && BEST_MOVE_SCORE > SECOND_MOVE_SCORE);
    }
}
