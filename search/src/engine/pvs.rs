use board::{final_score, legal_moves, Square};

use super::objective::Objective;
use super::Engine;
use crate::move_ordering::{Hint, MoveList};
use crate::transposition::probe_cut;
use crate::{SearchError, SCORE_INF};

impl Engine {
    /// Principal-variation search.
    ///
    /// The first ordered move gets the full window; the rest are first
    /// tested with a null window and only re-searched when they beat alpha.
    pub(super) fn pvs<O: Objective>(
        &mut self,
        depth: u8,
        mut alpha: i32,
        mut beta: i32,
        passed: bool,
    ) -> Result<(i32, Option<Square>), SearchError> {
        if !O::ordered(self, depth) {
            return Ok((self.deep::<O>(depth, alpha, beta, passed), None));
        }
        self.stats.nodes += 1;

        let mover = self.position.mover();
        let opponent = self.position.opponent();
        let use_hash = self.config.use_hash.value;
        let hash = if use_hash { self.hash() } else { 0 };

        let mut hint = Hint::default();
        if use_hash {
            if let Some(entry) = self.tables.pvs.lookup(hash, mover, opponent) {
                if let Some(score) = probe_cut(&entry, depth, &mut alpha, &mut beta) {
                    self.stats.table_cutoffs += 1;
                    return Ok((score, entry.best));
                }
                hint = Hint::from_entry(Some(&entry));
            } else if let Some(entry) = self.tables.nws.lookup(hash, mover, opponent) {
                hint = Hint::from_entry(Some(&entry));
            }
        }

        if legal_moves(mover, opponent) == 0 {
            if passed {
                return Ok((final_score(mover, opponent), None));
            }

            self.pass();
            let result = self.pvs::<O>(depth, -beta, -alpha, true);
            self.pass();
            return result.map(|(score, _)| (-score, None));
        }

        let mut list = MoveList::new(&mut self.pool, mover, opponent)?;
        let result = self.pvs_moves::<O>(&mut list, depth, alpha, beta, hint);
        list.release(&mut self.pool);
        let (score, best) = result?;

        if use_hash {
            self.tables
                .pvs
                .register(hash, mover, opponent, best, depth, alpha, beta, score);
        }

        Ok((score, best))
    }

    fn pvs_moves<O: Objective>(
        &mut self,
        list: &mut MoveList,
        depth: u8,
        mut alpha: i32,
        beta: i32,
        hint: Hint,
    ) -> Result<(i32, Option<Square>), SearchError> {
        self.evaluate_moves(list, alpha, hint, depth)?;

        let mut best_score = -SCORE_INF;
        let mut best_move = None;
        let mut previous = None;

        while let Some(handle) = list.next_best(&mut self.pool, previous)? {
            let first = previous.is_none();
            previous = Some(handle);
            let mv = list.get(&self.pool, handle)?;

            self.make(mv.square, mv.flips);
            let result = self.pvs_child::<O>(depth - 1, alpha, beta, first);
            self.unmake(mv.square, mv.flips);
            let score = result?;

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

    /// Score of the move just made, from the parent's side.
    pub(super) fn pvs_child<O: Objective>(
        &mut self,
        depth: u8,
        alpha: i32,
        beta: i32,
        first: bool,
    ) -> Result<i32, SearchError> {
        if !first {
            let score = -self.nws::<O>(depth, -alpha - 1, false)?;
            if score <= alpha || score >= beta {
                return Ok(score);
            }
        }

        let (score, _) = self.pvs::<O>(depth, -beta, -alpha, false)?;
        Ok(-score)
    }
}
