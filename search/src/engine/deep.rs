use board::{final_score, flip_mask, legal_moves, Squares};

use super::objective::{last_move_score, Objective};
use super::Engine;
use crate::SCORE_INF;

impl Engine {
    /// Unordered fail-soft alpha-beta for the last few plies.
    ///
    /// Moves are taken straight off the mobility bitmask, no tables are
    /// touched, and nothing is allocated.
    pub(super) fn deep<O: Objective>(
        &mut self,
        depth: u8,
        mut alpha: i32,
        beta: i32,
        passed: bool,
    ) -> i32 {
        self.stats.nodes += 1;

        if depth == 0 {
            return O::leaf(self);
        }

        let mover = self.position.mover();
        let opponent = self.position.opponent();

        if O::EXACT && depth == 1 {
            return last_move_score(mover, opponent);
        }

        let moves = legal_moves(mover, opponent);
        if moves == 0 {
            if passed {
                return final_score(mover, opponent);
            }

            self.pass();
            let score = -self.deep::<O>(depth, -beta, -alpha, true);
            self.pass();
            return score;
        }

        let mut best_score = -SCORE_INF;
        for square in Squares(moves) {
            let flips = flip_mask(mover, opponent, square);

            self.make(square, flips);
            let score = -self.deep::<O>(depth - 1, -beta, -alpha, false);
            self.unmake(square, flips);

            if score > best_score {
                best_score = score;
                if score > alpha {
                    alpha = score;
                    if alpha >= beta {
                        self.stats.cutoffs += 1;
                        break;
                    }
                }
            }
        }

        best_score
    }
}

#[cfg(test)]
mod tests {
    use super::super::objective::{Endgame, Midgame};
    use super::super::tests::{
        brute_force, engine_with, position_with, random_position, test_config,
    };
    use crate::SCORE_INF;

    #[test]
    fn test_deep_endgame_is_exact() {
        let mut engine = engine_with(test_config());
        for seed in 1..6 {
            let Some(position) = random_position(seed * 7919, 8) else {
                continue;
            };
            engine.init_search(&position);

            let depth = position.empty_count() as u8;
            let score = engine.deep::<Endgame>(depth, -SCORE_INF, SCORE_INF, false);
            assert_eq!(score, brute_force(position.mover(), position.opponent(), false));
            assert_eq!(*engine.position(), position);
        }
    }

    #[test]
    fn test_deep_null_window_brackets_exact_score() {
        let mut engine = engine_with(test_config());
        let position = position_with(8);
        engine.init_search(&position);

        let depth = position.empty_count() as u8;
        let exact = brute_force(position.mover(), position.opponent(), false);

        let low = engine.deep::<Endgame>(depth, exact - 1, exact, false);
        assert!(low >= exact);
        let high = engine.deep::<Endgame>(depth, exact, exact + 1, false);
        assert!(high <= exact);
    }

    #[test]
    fn test_deep_midgame_restores_position() {
        let mut engine = engine_with(test_config());
        let position = position_with(40);
        engine.init_search(&position);
        let features = *engine.evaluator.features();

        let score = engine.deep::<Midgame>(3, -SCORE_INF, SCORE_INF, false);
        assert!((-64..=64).contains(&score));
        assert_eq!(*engine.position(), position);
        assert_eq!(*engine.evaluator.features(), features);
    }
}
