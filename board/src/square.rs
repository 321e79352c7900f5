use std::fmt;
use std::str::FromStr;

use crate::BoardError;

/// A board square. Bit index = rank * 8 + file, so a1 = 0, h1 = 7 and h8 = 63.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(u8);

impl Square {
    #[inline(always)]
    pub const fn new(index: u8) -> Self {
        debug_assert!(index < 64);
        Self(index)
    }

    #[inline(always)]
    pub const fn from_coords(file: u8, rank: u8) -> Self {
        debug_assert!(file < 8 && rank < 8);
        Self(rank * 8 + file)
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline(always)]
    pub const fn bit(self) -> u64 {
        1u64 << self.0
    }

    #[inline(always)]
    pub const fn file(self) -> u8 {
        self.0 & 7
    }

    #[inline(always)]
    pub const fn rank(self) -> u8 {
        self.0 >> 3
    }

    /// Lowest set square of a non-empty mask.
    #[inline(always)]
    pub fn first(mask: u64) -> Option<Self> {
        if mask == 0 {
            None
        } else {
            Some(Self(mask.trailing_zeros() as u8))
        }
    }

    pub fn all() -> Squares {
        Squares(u64::MAX)
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", (b'a' + self.file()) as char, self.rank() + 1)
    }
}

impl FromStr for Square {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = s.as_bytes();
        if bytes.len() != 2 {
            return Err(BoardError::InvalidSquare(s.to_string()));
        }

        let file = bytes[0].to_ascii_lowercase().wrapping_sub(b'a');
        let rank = bytes[1].wrapping_sub(b'1');
        if file >= 8 || rank >= 8 {
            return Err(BoardError::InvalidSquare(s.to_string()));
        }

        Ok(Self::from_coords(file, rank))
    }
}

/// Iterates the squares of a bitmask from a1 towards h8.
#[derive(Clone, Copy, Debug)]
pub struct Squares(pub u64);

impl Iterator for Squares {
    type Item = Square;

    #[inline(always)]
    fn next(&mut self) -> Option<Square> {
        let square = Square::first(self.0)?;
        self.0 &= self.0 - 1;
        Some(square)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.0.count_ones() as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for Squares {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_square_names() {
        assert_eq!(Square::new(0).to_string(), "a1");
        assert_eq!(Square::new(7).to_string(), "h1");
        assert_eq!(Square::new(63).to_string(), "h8");
        assert_eq!("f5".parse::<Square>(), Ok(Square::new(37)));
        assert_eq!("D3".parse::<Square>(), Ok(Square::new(19)));
    }

    #[test]
    fn test_square_parse_errors() {
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("a".parse::<Square>().is_err());
        assert!("a10".parse::<Square>().is_err());
    }

    #[test]
    fn test_squares_iterates_in_order() {
        let squares: Vec<_> = Squares(0x8000_0000_0000_0081).map(Square::index).collect();
        assert_eq!(squares, vec![0, 7, 63]);
        assert_eq!(Squares(0).count(), 0);
        assert_eq!(Square::all().len(), 64);
    }
}
