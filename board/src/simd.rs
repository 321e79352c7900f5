//! AVX2 mobility with runtime CPU feature detection.
//!
//! The four axes (horizontal, vertical, both diagonals) run in the four
//! 64-bit lanes of one register, each lane with its own shift and mask.

use std::sync::OnceLock;

static AVX2: OnceLock<bool> = OnceLock::new();

/// Whether the AVX2 mobility path is used on this CPU. Detected once.
pub fn simd_available() -> bool {
    *AVX2.get_or_init(detect)
}

#[cfg(target_arch = "x86_64")]
fn detect() -> bool {
    is_x86_feature_detected!("avx2")
}

#[cfg(not(target_arch = "x86_64"))]
fn detect() -> bool {
    false
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
pub(crate) unsafe fn legal_moves_avx2(mover: u64, opponent: u64) -> u64 {
    use crate::movegen::{DIAGONAL_MASK, HORIZONTAL_MASK, VERTICAL_MASK};
    use std::arch::x86_64::*;

    let shifts = _mm256_set_epi64x(9, 7, 8, 1);
    let masks = _mm256_set_epi64x(
        DIAGONAL_MASK as i64,
        DIAGONAL_MASK as i64,
        VERTICAL_MASK as i64,
        HORIZONTAL_MASK as i64,
    );

    let p = _mm256_set1_epi64x(mover as i64);
    let o = _mm256_and_si256(_mm256_set1_epi64x(opponent as i64), masks);

    let mut left = _mm256_and_si256(o, _mm256_sllv_epi64(p, shifts));
    let mut right = _mm256_and_si256(o, _mm256_srlv_epi64(p, shifts));
    for _ in 0..5 {
        left = _mm256_or_si256(left, _mm256_and_si256(o, _mm256_sllv_epi64(left, shifts)));
        right = _mm256_or_si256(right, _mm256_and_si256(o, _mm256_srlv_epi64(right, shifts)));
    }

    let moves = _mm256_or_si256(
        _mm256_sllv_epi64(left, shifts),
        _mm256_srlv_epi64(right, shifts),
    );
    let lanes: [u64; 4] = std::mem::transmute(moves);

    (lanes[0] | lanes[1] | lanes[2] | lanes[3]) & !(mover | opponent)
}
