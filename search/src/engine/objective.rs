use board::{final_score, flip_mask, Square};
use evaluation::Phase;

use super::Engine;

/// What a search is scoring. Chosen once per search so the recursion is
/// monomorphised instead of dispatching per node.
pub(crate) trait Objective {
    /// Scores are exact disc differentials rather than estimates.
    const EXACT: bool;

    fn name() -> &'static str;

    /// Score at remaining depth 0.
    fn leaf(engine: &Engine) -> i32;

    /// Whether a node at this remaining depth is worth move ordering and
    /// table probes, or should take the unordered path.
    fn ordered(engine: &Engine, depth: u8) -> bool;
}

/// Depth-limited search scored by the evaluator.
pub(crate) struct Midgame;

/// Search to the end of the game scored by the final disc count.
/// The remaining depth is always the number of empty squares.
pub(crate) struct Endgame;

impl Objective for Midgame {
    const EXACT: bool = false;

    fn name() -> &'static str {
        "midgame"
    }

    #[inline(always)]
    fn leaf(engine: &Engine) -> i32 {
        let position = &engine.position;
        let empties = position.empty_count();
        if empties == 0 {
            return position.final_score();
        }
        engine.evaluator.score(Phase::from_empties(empties))
    }

    #[inline(always)]
    fn ordered(engine: &Engine, depth: u8) -> bool {
        depth >= engine.config.ordering_depth.value
    }
}

impl Objective for Endgame {
    const EXACT: bool = true;

    fn name() -> &'static str {
        "endgame"
    }

    #[inline(always)]
    fn leaf(engine: &Engine) -> i32 {
        engine.position.final_score()
    }

    #[inline(always)]
    fn ordered(engine: &Engine, depth: u8) -> bool {
        depth >= engine.config.endgame_ordering_empties.value
    }
}

/// Exact score with one empty square left, without building a move list.
/// Tries the mover first, then the opponent, else nobody can play.
#[inline(always)]
pub(crate) fn last_move_score(mover: u64, opponent: u64) -> i32 {
    let empty = !(mover | opponent);
    let Some(square) = Square::first(empty) else {
        return final_score(mover, opponent);
    };
    debug_assert_eq!(empty.count_ones(), 1);

    let flips = flip_mask(mover, opponent, square);
    if flips != 0 {
        return final_score(mover | flips | square.bit(), opponent ^ flips);
    }

    let flips = flip_mask(opponent, mover, square);
    if flips != 0 {
        return -final_score(opponent | flips | square.bit(), mover ^ flips);
    }

    final_score(mover, opponent)
}
