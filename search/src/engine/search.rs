use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use board::{final_score, legal_moves, Color, Position, Square};

use super::objective::{Endgame, Midgame, Objective};
use super::{Algorithm, Engine};
use crate::arena::Handle;
use crate::move_ordering::{Hint, MoveList};
use crate::time_control::SearchController;
use crate::{SearchError, SCORE_INF};

/// Scores of one fully searched root iteration.
struct RootOutcome {
    best: (Square, i32),
    second: Option<(Square, i32)>,
    scores: Vec<(Handle, i32)>,
}

/// Next iterative-deepening depth: grows by about the square root of the current one.
fn next_depth(depth: u8, max_depth: u8) -> u8 {
    let step = ((depth as f32).sqrt() as u8).max(1);
    depth.saturating_add(step).min(max_depth)
}

impl Engine {
    /// Best move for `mover` to play against `opponent`, or the second best
    /// when `want_second_best` is set. `None` means the mover has to pass.
    pub fn search(
        &mut self,
        mover: u64,
        opponent: u64,
        want_second_best: bool,
    ) -> Result<Option<Square>, SearchError> {
        let position = Position::new(mover, opponent, Color::Black)?;
        self.search_position(&position, want_second_best)
    }

    pub fn search_position(
        &mut self,
        position: &Position,
        want_second_best: bool,
    ) -> Result<Option<Square>, SearchError> {
        self.init_search(position);

        let moves = position.legal_moves();
        if moves == 0 {
            log::debug!("No legal move, passing");
            return Ok(None);
        }
        if moves.count_ones() == 1 {
            self.report.best_move = Square::first(moves);
            return Ok(self.report.best_move);
        }

        let empties = position.empty_count() as u8;
        let endgame = empties <= self.config.endgame_empties.value;
        let max_depth = self.config.max_depth.value.min(empties);
        // In the endgame the midgame pass only has to seed move ordering
        let midgame_depth = if endgame {
            max_depth.min(empties / 3).max(1)
        } else {
            max_depth
        };

        let time_limit = match self.config.time_limit_ms.value {
            0 => None,
            ms => Some(Duration::from_millis(ms as u64)),
        };
        let mut controller =
            SearchController::new(time_limit, if endgame { empties } else { midgame_depth });
        let deadline = Arc::clone(&self.deadline);
        controller.on_stop(move || deadline.store(true, Ordering::Relaxed));
        controller.start_timer();

        let mut root = MoveList::new(&mut self.pool, position.mover(), position.opponent())?;
        let result = self.iterate(&mut root, &mut controller, midgame_depth, endgame, want_second_best);
        root.release(&mut self.pool);

        self.stats.elapsed = controller.elapsed();
        self.stats.table = self.tables.stats();
        self.report.stats = self.stats;
        result?;

        if want_second_best {
            Ok(self.report.second_move.or(self.report.best_move))
        } else {
            Ok(self.report.best_move)
        }
    }

    fn iterate(
        &mut self,
        root: &mut MoveList,
        controller: &mut SearchController,
        midgame_depth: u8,
        endgame: bool,
        want_second_best: bool,
    ) -> Result<(), SearchError> {
        let hint = self.root_hint();
        self.evaluate_moves(root, -SCORE_INF, hint, midgame_depth)?;
        root.sort(&mut self.pool)?;
        self.record_ordering(root)?;

        let mut depth = 1;
        loop {
            controller.on_iteration_start();
            if self.stopped() || !controller.should_continue_to_next_depth(depth) {
                break;
            }
            if !self.iteration::<Midgame>(root, depth, want_second_best, controller)? {
                break;
            }
            controller.on_iteration_complete();

            if depth >= midgame_depth {
                break;
            }
            depth = next_depth(depth, midgame_depth);
        }

        if endgame && !self.stopped() {
            let empties = self.position.empty_count() as u8;
            controller.on_iteration_start();
            if controller.should_continue_to_next_depth(empties) {
                // Heuristic windows are not valid bounds for an exact solve
                self.tables.clear_scores();
                self.iteration::<Endgame>(root, empties, want_second_best, controller)?;
            }
        }

        Ok(())
    }

    /// Runs one root iteration and records it. Returns false when it was
    /// cut short by a stop request and discarded.
    fn iteration<O: Objective>(
        &mut self,
        root: &mut MoveList,
        depth: u8,
        want_second_best: bool,
        controller: &SearchController,
    ) -> Result<bool, SearchError> {
        let Some(outcome) = self.search_root::<O>(root, depth, want_second_best)? else {
            log::debug!("Discarding unfinished {} iteration at depth {}", O::name(), depth);
            return Ok(false);
        };

        for &(handle, score) in &outcome.scores {
            root.set_score(&mut self.pool, handle, score)?;
        }
        root.sort(&mut self.pool)?;

        self.report.best_move = Some(outcome.best.0);
        self.report.score = outcome.best.1;
        if let Some((square, score)) = outcome.second {
            self.report.second_move = Some(square);
            self.report.second_score = Some(score);
        }
        self.report.depth = depth;
        self.report.exact = O::EXACT;
        self.report.root_scores = root
            .handles(&self.pool)?
            .into_iter()
            .map(|handle| root.get(&self.pool, handle).map(|mv| (mv.square, mv.score)))
            .collect::<Result<_, _>>()?;

        log::info!(
            "{} depth {} best {} score {} nodes {} time {}ms",
            O::name(),
            depth,
            outcome.best.0,
            outcome.best.1,
            self.stats.nodes,
            controller.elapsed().as_millis()
        );

        Ok(true)
    }

    /// Searches every root move in list order. Returns `None` if a stop
    /// request arrives before the last move is searched.
    fn search_root<O: Objective>(
        &mut self,
        root: &MoveList,
        depth: u8,
        want_second_best: bool,
    ) -> Result<Option<RootOutcome>, SearchError> {
        let handles = root.handles(&self.pool)?;
        let mut scores = Vec::with_capacity(handles.len());

        let mut alpha = -SCORE_INF;
        let mut best: Option<(Square, i32)> = None;
        let mut second: Option<(Square, i32)> = None;

        for (index, handle) in handles.into_iter().enumerate() {
            if self.stopped() {
                return Ok(None);
            }

            let mv = root.get(&self.pool, handle)?;
            self.make(mv.square, mv.flips);
            let result = if want_second_best {
                self.second_best_child::<O>(depth - 1, index, second.map(|(_, s)| s))
            } else {
                self.pvs_child::<O>(depth - 1, alpha, SCORE_INF, index == 0)
            };
            self.unmake(mv.square, mv.flips);
            let score = result?;

            scores.push((handle, score));
            match best {
                Some((_, best_score)) if score <= best_score => {
                    // Exact in second-best mode; otherwise `score` may be an upper bound
                    if second.map_or(true, |(_, s)| score > s) {
                        second = Some((mv.square, score));
                    }
                }
                _ => {
                    second = best;
                    best = Some((mv.square, score));
                }
            }
            alpha = alpha.max(score);
        }

        Ok(best.map(|best| RootOutcome {
            best,
            second,
            scores,
        }))
    }

    /// Root child in second-best mode. The first two moves get exact scores;
    /// later ones are tested against the current second-best score and only
    /// re-searched when they beat it.
    fn second_best_child<O: Objective>(
        &mut self,
        depth: u8,
        index: usize,
        floor: Option<i32>,
    ) -> Result<i32, SearchError> {
        match floor {
            Some(floor) if index >= 2 => {
                let score = -self.nws::<O>(depth, -floor - 1, false)?;
                if score <= floor {
                    return Ok(score);
                }
                let (score, _) = self.pvs::<O>(depth, -SCORE_INF, -floor, false)?;
                Ok(-score)
            }
            _ => {
                let (score, _) = self.pvs::<O>(depth, -SCORE_INF, SCORE_INF, false)?;
                Ok(-score)
            }
        }
    }

    fn root_hint(&mut self) -> Hint {
        if !self.config.use_hash.value {
            return Hint::default();
        }

        let hash = self.hash();
        let mover = self.position.mover();
        let opponent = self.position.opponent();
        let entry = self
            .tables
            .pvs
            .lookup(hash, mover, opponent)
            .or_else(|| self.tables.nws.lookup(hash, mover, opponent));
        Hint::from_entry(entry.as_ref())
    }

    /// Fallback result from move ordering alone, used when no iteration completes.
    fn record_ordering(&mut self, root: &MoveList) -> Result<(), SearchError> {
        let handles = root.handles(&self.pool)?;
        let mut squares = Vec::with_capacity(handles.len());
        for handle in handles {
            squares.push(root.get(&self.pool, handle)?.square);
        }

        self.report.best_move = squares.first().copied();
        self.report.second_move = squares.get(1).copied();
        self.report.root_scores = squares.into_iter().map(|square| (square, 0)).collect();
        Ok(())
    }

    /// Fixed-depth full-window search of `position`, exact when `depth`
    /// reaches the end of the game. Returns the score and best move.
    pub fn analyse(
        &mut self,
        position: &Position,
        depth: u8,
        algorithm: Algorithm,
    ) -> Result<(i32, Option<Square>), SearchError> {
        self.init_search(position);

        let empties = position.empty_count();
        let result = if depth as u32 >= empties {
            self.analyse_root::<Endgame>(empties as u8, algorithm)
        } else {
            self.analyse_root::<Midgame>(depth, algorithm)
        };

        self.stats.table = self.tables.stats();
        self.report.stats = self.stats;
        result
    }

    fn analyse_root<O: Objective>(
        &mut self,
        depth: u8,
        algorithm: Algorithm,
    ) -> Result<(i32, Option<Square>), SearchError> {
        let mover = self.position.mover();
        let opponent = self.position.opponent();

        if legal_moves(mover, opponent) == 0 {
            if legal_moves(opponent, mover) == 0 {
                return Ok((final_score(mover, opponent), None));
            }

            self.pass();
            let result = self.analyse_root::<O>(depth, algorithm);
            self.pass();
            return result.map(|(score, _)| (-score, None));
        }

        if depth == 0 {
            return Ok((O::leaf(self), None));
        }

        let mut list = MoveList::new(&mut self.pool, mover, opponent)?;
        let result = self.analyse_moves::<O>(&mut list, depth, algorithm);
        list.release(&mut self.pool);
        result
    }

    fn analyse_moves<O: Objective>(
        &mut self,
        list: &mut MoveList,
        depth: u8,
        algorithm: Algorithm,
    ) -> Result<(i32, Option<Square>), SearchError> {
        self.evaluate_moves(list, -SCORE_INF, Hint::default(), depth)?;

        let mut alpha = -SCORE_INF;
        let mut best_score = -SCORE_INF;
        let mut best_move = None;
        let mut previous = None;

        while let Some(handle) = list.next_best(&mut self.pool, previous)? {
            let first = previous.is_none();
            previous = Some(handle);
            let mv = list.get(&self.pool, handle)?;

            self.make(mv.square, mv.flips);
            let result = match algorithm {
                Algorithm::Pvs => self.pvs_child::<O>(depth - 1, alpha, SCORE_INF, first),
                Algorithm::AlphaBeta => self
                    .alpha_beta::<O>(depth - 1, -SCORE_INF, -alpha, false)
                    .map(|(score, _)| -score),
            };
            self.unmake(mv.square, mv.flips);
            let score = result?;

            if score > best_score {
                best_score = score;
                best_move = Some(mv.square);
                alpha = alpha.max(score);
            }
        }

        Ok((best_score, best_move))
    }
}
