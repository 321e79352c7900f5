use crate::Square;

/// Opponent stones that can be flanked along a rank (a and h files excluded).
pub const HORIZONTAL_MASK: u64 = 0x7E7E_7E7E_7E7E_7E7E;
/// Opponent stones that can be flanked along a file (ranks 1 and 8 excluded).
pub const VERTICAL_MASK: u64 = 0x00FF_FFFF_FFFF_FF00;
/// Opponent stones that can be flanked along either diagonal.
pub const DIAGONAL_MASK: u64 = 0x007E_7E7E_7E7E_7E00;

pub const CORNERS: u64 = 0x8100_0000_0000_0081;

// Positive directions first (E, N, NW, NE), their nearest square is the lowest bit.
const DIRECTIONS: [(i32, i32); 8] = [
    (1, 0),
    (0, 1),
    (-1, 1),
    (1, 1),
    (-1, 0),
    (0, -1),
    (1, -1),
    (-1, -1),
];

const fn ray(square: usize, df: i32, dr: i32) -> u64 {
    let mut mask = 0u64;
    let mut file = (square % 8) as i32 + df;
    let mut rank = (square / 8) as i32 + dr;
    while file >= 0 && file < 8 && rank >= 0 && rank < 8 {
        mask |= 1u64 << (rank * 8 + file);
        file += df;
        rank += dr;
    }
    mask
}

const fn build_rays() -> [[u64; 8]; 64] {
    let mut rays = [[0u64; 8]; 64];
    let mut square = 0;
    while square < 64 {
        let mut direction = 0;
        while direction < 8 {
            rays[square][direction] =
                ray(square, DIRECTIONS[direction].0, DIRECTIONS[direction].1);
            direction += 1;
        }
        square += 1;
    }
    rays
}

static RAYS: [[u64; 8]; 64] = build_rays();

/// Moves along one axis in both directions: up to six opponent stones
/// followed by an empty square.
#[inline(always)]
fn axis_moves(mover: u64, opponent: u64, shift: u32) -> u64 {
    let mut left = opponent & (mover << shift);
    let mut right = opponent & (mover >> shift);
    for _ in 0..5 {
        left |= opponent & (left << shift);
        right |= opponent & (right >> shift);
    }
    (left << shift) | (right >> shift)
}

/// Portable mobility. The AVX2 path must match this bit for bit.
#[inline]
pub fn legal_moves_scalar(mover: u64, opponent: u64) -> u64 {
    let empty = !(mover | opponent);
    let moves = axis_moves(mover, opponent & HORIZONTAL_MASK, 1)
        | axis_moves(mover, opponent & VERTICAL_MASK, 8)
        | axis_moves(mover, opponent & DIAGONAL_MASK, 7)
        | axis_moves(mover, opponent & DIAGONAL_MASK, 9);
    moves & empty
}

/// Bitmask of squares where `mover` may play.
#[inline]
pub fn legal_moves(mover: u64, opponent: u64) -> u64 {
    #[cfg(target_arch = "x86_64")]
    {
        if crate::simd::simd_available() {
            // SAFETY: AVX2 support was detected at runtime.
            return unsafe { crate::simd::legal_moves_avx2(mover, opponent) };
        }
    }
    legal_moves_scalar(mover, opponent)
}

/// Opponent stones captured by `mover` playing `square`; zero when the move is illegal.
#[inline]
pub fn flip_mask(mover: u64, opponent: u64, square: Square) -> u64 {
    if (mover | opponent) & square.bit() != 0 {
        return 0;
    }

    let rays = &RAYS[square.index()];
    let mut flips = 0;

    for &ray in &rays[..4] {
        let outflank = ray & !opponent;
        let anchor = outflank.trailing_zeros();
        if anchor < 64 && mover & (1u64 << anchor) != 0 {
            flips |= ray & ((1u64 << anchor) - 1);
        }
    }

    for &ray in &rays[4..] {
        let outflank = ray & !opponent;
        if outflank == 0 {
            continue;
        }
        let anchor = 1u64 << (63 - outflank.leading_zeros());
        if mover & anchor != 0 {
            flips |= ray & !(anchor | (anchor - 1));
        }
    }

    flips
}

/// Disc differential of a finished game from `mover`'s side; empty squares go to the winner.
#[inline]
pub fn final_score(mover: u64, opponent: u64) -> i32 {
    let own = mover.count_ones() as i32;
    let theirs = opponent.count_ones() as i32;
    let empties = 64 - own - theirs;

    if own > theirs {
        own - theirs + empties
    } else if own < theirs {
        own - theirs - empties
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Squares;

    const BLACK: u64 = (1 << 28) | (1 << 35);
    const WHITE: u64 = (1 << 27) | (1 << 36);

    #[test]
    fn test_start_position_moves() {
        assert_eq!(legal_moves(BLACK, WHITE), 0x0000_1020_0408_0000);
        assert_eq!(legal_moves_scalar(BLACK, WHITE), 0x0000_1020_0408_0000);
    }

    #[test]
    fn test_start_position_flips() {
        let f5: Square = "f5".parse().unwrap();
        assert_eq!(flip_mask(BLACK, WHITE, f5), 1 << 36);

        let a1 = Square::new(0);
        assert_eq!(flip_mask(BLACK, WHITE, a1), 0);

        let d5 = Square::new(35);
        assert_eq!(flip_mask(BLACK, WHITE, d5), 0, "occupied square");
    }

    #[test]
    fn test_long_run_flips() {
        // a1 mover, b1..g1 opponent, h1 empty: playing h1 captures six stones.
        let mover = 1u64;
        let opponent = 0x7E;
        let h1 = Square::new(7);
        assert_eq!(legal_moves(mover, opponent), 1 << 7);
        assert_eq!(flip_mask(mover, opponent, h1), 0x7E);
    }

    #[test]
    fn test_no_wraparound() {
        // h1 mover, a2 opponent, b2 empty: not a horizontal line.
        let mover = 1u64 << 7;
        let opponent = 1u64 << 8;
        assert_eq!(legal_moves(mover, opponent), 0);
        assert_eq!(flip_mask(mover, opponent, Square::new(9)), 0);
    }

    #[test]
    fn test_unanchored_ray_does_not_flip() {
        let mover = 0;
        let opponent = 0x7E;
        assert_eq!(flip_mask(mover, opponent, Square::new(7)), 0);
    }

    #[test]
    fn test_diagonal_flip() {
        // a1 mover, b2 c3 opponent, d4 empty.
        let mover = 1u64;
        let opponent = (1u64 << 9) | (1u64 << 18);
        let d4 = Square::new(27);
        assert_eq!(flip_mask(mover, opponent, d4), opponent);
        assert_eq!(legal_moves(mover, opponent), d4.bit());
    }

    #[test]
    fn test_final_score() {
        assert_eq!(final_score(0xFF, 0xF), 4 + 52);
        assert_eq!(final_score(0xF, 0xFF), -(4 + 52));
        assert_eq!(final_score(0xF0, 0xF), 0);
        assert_eq!(final_score(u64::MAX, 0), 64);
    }

    #[test]
    fn test_rays_cover_board_lines() {
        let a1 = &RAYS[0];
        assert_eq!(a1[0], 0xFE);
        assert_eq!(a1[1], 0x0101_0101_0101_0100);
        assert_eq!(a1[3], 0x8040_2010_0804_0200);
        assert_eq!(a1[4] | a1[5] | a1[6] | a1[7] | a1[2], 0);
        assert_eq!(Squares(RAYS[27][7]).count(), 3);
    }
}
