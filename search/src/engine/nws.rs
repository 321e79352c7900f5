use board::{final_score, legal_moves, Square};

use super::objective::Objective;
use super::Engine;
use crate::move_ordering::{Hint, MoveList};
use crate::transposition::probe_cut_null_window;
use crate::{SearchError, SCORE_INF};

impl Engine {
    /// Null-window search: is the score above `alpha`?
    ///
    /// Returns a fail-soft bound, `> alpha` or `<= alpha`. Only the answer
    /// to that comparison is stored, in the null-window table.
    pub(super) fn nws<O: Objective>(
        &mut self,
        depth: u8,
        alpha: i32,
        passed: bool,
    ) -> Result<i32, SearchError> {
        if !O::ordered(self, depth) {
            return Ok(self.deep::<O>(depth, alpha, alpha + 1, passed));
        }
        self.stats.nodes += 1;

        let mover = self.position.mover();
        let opponent = self.position.opponent();
        let use_hash = self.config.use_hash.value;
        let hash = if use_hash { self.hash() } else { 0 };

        let mut hint = Hint::default();
        if use_hash {
            for pvs in [false, true] {
                let table = if pvs {
                    &mut self.tables.pvs
                } else {
                    &mut self.tables.nws
                };
                let Some(entry) = table.lookup(hash, mover, opponent) else {
                    continue;
                };
                if let Some(score) = probe_cut_null_window(&entry, depth, alpha) {
                    self.stats.table_cutoffs += 1;
                    return Ok(score);
                }
                if hint.best.is_none() {
                    hint = Hint::from_entry(Some(&entry));
                }
            }
        }

        if legal_moves(mover, opponent) == 0 {
            if passed {
                return Ok(final_score(mover, opponent));
            }

            self.pass();
            let result = self.nws::<O>(depth, -alpha - 1, true);
            self.pass();
            return result.map(|score| -score);
        }

        if let Some(score) = self.probcut::<O>(depth, alpha)? {
            return Ok(score);
        }

        let mut list = MoveList::new(&mut self.pool, mover, opponent)?;
        let result = self.nws_moves::<O>(&mut list, depth, alpha, hint);
        list.release(&mut self.pool);
        let (score, best) = result?;

        if use_hash {
            self.tables
                .nws
                .register(hash, mover, opponent, best, depth, alpha, alpha + 1, score);
        }

        Ok(score)
    }

    fn nws_moves<O: Objective>(
        &mut self,
        list: &mut MoveList,
        depth: u8,
        alpha: i32,
        hint: Hint,
    ) -> Result<(i32, Option<Square>), SearchError> {
        self.evaluate_moves(list, alpha, hint, depth)?;

        let mut best_score = -SCORE_INF;
        let mut best_move = None;
        let mut previous = None;

        while let Some(handle) = list.next_best(&mut self.pool, previous)? {
            previous = Some(handle);
            let mv = list.get(&self.pool, handle)?;

            self.make(mv.square, mv.flips);
            let result = self.nws::<O>(depth - 1, -alpha - 1, false);
            self.unmake(mv.square, mv.flips);
            let score = -result?;

            if score > best_score {
                best_score = score;
                best_move = Some(mv.square);
                if score > alpha {
                    self.stats.cutoffs += 1;
                    break;
                }
            }
        }

        Ok((best_score, best_move))
    }
}

#[cfg(test)]
mod tests {
    use super::super::objective::{Endgame, Midgame};
    use super::super::tests::{brute_force, engine_with, position_with, test_config};
    use crate::SCORE_INF;

    #[test]
    fn test_nws_endgame_answers_comparison() {
        let mut config = test_config();
        config.endgame_ordering_empties.value = 4;
        let mut engine = engine_with(config);

        let position = position_with(10);
        let exact = brute_force(position.mover(), position.opponent(), false);
        let depth = position.empty_count() as u8;

        for alpha in [exact - 3, exact - 1, exact, exact + 2] {
            engine.init_search(&position);
            let score = engine.nws::<Endgame>(depth, alpha, false).unwrap();
            assert_eq!(score > alpha, exact > alpha, "alpha {alpha}");
            assert_eq!(*engine.position(), position);
            assert!(engine.pool.is_empty());
        }
    }

    #[test]
    fn test_nws_midgame_agrees_with_deep() {
        let mut config = test_config();
        config.use_mpc.value = false;
        config.use_hash.value = false;
        let mut engine = engine_with(config);

        let position = position_with(36);
        engine.init_search(&position);
        let exact = engine.deep::<Midgame>(4, -SCORE_INF, SCORE_INF, false);

        for alpha in [exact - 2, exact - 1, exact, exact + 1] {
            let score = engine.nws::<Midgame>(4, alpha, false).unwrap();
            assert_eq!(score > alpha, exact > alpha, "alpha {alpha}");
        }
    }
}
