use board::{final_score, legal_moves, Square};

use super::objective::Objective;
use super::Engine;
use crate::move_ordering::{Hint, MoveList};
use crate::{SearchError, SCORE_INF};

impl Engine {
    /// Ordered fail-soft alpha-beta without tables or forward pruning.
    /// Reference search for checking PVS.
    pub(super) fn alpha_beta<O: Objective>(
        &mut self,
        depth: u8,
        alpha: i32,
        beta: i32,
        passed: bool,
    ) -> Result<(i32, Option<Square>), SearchError> {
        if !O::ordered(self, depth) {
            return Ok((self.deep::<O>(depth, alpha, beta, passed), None));
        }
        self.stats.nodes += 1;

        let mover = self.position.mover();
        let opponent = self.position.opponent();

        if legal_moves(mover, opponent) == 0 {
            if passed {
                return Ok((final_score(mover, opponent), None));
            }

            self.pass();
            let result = self.alpha_beta::<O>(depth, -beta, -alpha, true);
            self.pass();
            return result.map(|(score, _)| (-score, None));
        }

        let mut list = MoveList::new(&mut self.pool, mover, opponent)?;
        let result = self.alpha_beta_moves::<O>(&mut list, depth, alpha, beta);
        list.release(&mut self.pool);
        result
    }

    fn alpha_beta_moves<O: Objective>(
        &mut self,
        list: &mut MoveList,
        depth: u8,
        mut alpha: i32,
        beta: i32,
    ) -> Result<(i32, Option<Square>), SearchError> {
        self.evaluate_moves(list, alpha, Hint::default(), depth)?;

        let mut best_score = -SCORE_INF;
        let mut best_move = None;
        let mut previous = None;

        while let Some(handle) = list.next_best(&mut self.pool, previous)? {
            previous = Some(handle);
            let mv = list.get(&self.pool, handle)?;

            self.make(mv.square, mv.flips);
            let result = self.alpha_beta::<O>(depth - 1, -beta, -alpha, false);
            self.unmake(mv.square, mv.flips);
            let score = -result?.0;

            if score > best_score {
                best_score = score;
                best_move = Some(mv.square);
                if score > alpha {
                    alpha = score;
                    if alpha >= beta {
                        self.stats.cutoffs += 1;
                        break;
                    }
                }
            }
        }

        Ok((best_score, best_move))
    }
}
