use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use board::{Position, Square};
use evaluation::Evaluator;

use crate::{
    arena::Arena,
    move_ordering::Move,
    pruning::MpcModel,
    transposition::{HashKeys, TranspositionTables},
    EngineConfig, SearchError,
};

mod alpha_beta;
mod deep;
mod nws;
mod objective;
mod ordering;
mod probcut;
mod pvs;
mod report;
mod search;

pub use report::{SearchReport, SearchStats};

const MOVE_POOL_CAPACITY: usize = 4096;

/// Search algorithm for fixed-depth analysis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Algorithm {
    /// Principal-variation search with null-window verification.
    Pvs,
    /// Plain full-window alpha-beta.
    AlphaBeta,
}

/// One search tree: position, evaluator, tables and node pool.
///
/// Nothing is shared between engines except the read-only hash keys, so
/// independent engines can run on separate threads.
pub struct Engine {
    /// Configuration for the engine
    config: EngineConfig,

    /// External stop request, held until `clear_stop`
    stop: Arc<AtomicBool>,
    /// Raised by the search timer, lowered when the next search starts
    deadline: Arc<AtomicBool>,

    keys: Arc<HashKeys>,

    /// The position being searched, mutated in place with make/unmake
    position: Position,
    /// Pattern features kept in step with `position`
    evaluator: Evaluator,

    /// Null-window and principal-variation tables
    tables: TranspositionTables,
    /// Move list nodes for every open node on the search path
    pool: Arena<Move>,

    mpc: MpcModel,
    /// Verification searches currently open above this node
    mpc_nesting: u8,
    /// History length at the root, to measure distance from it
    root_ply: usize,

    stats: SearchStats,
    report: SearchReport,
}

impl Engine {
    pub fn new(config: &EngineConfig, evaluator: Evaluator) -> Result<Self, SearchError> {
        Self::with_keys(config, evaluator, Arc::new(HashKeys::new()))
    }

    /// Builds an engine sharing already generated hash keys.
    pub fn with_keys(
        config: &EngineConfig,
        mut evaluator: Evaluator,
        keys: Arc<HashKeys>,
    ) -> Result<Self, SearchError> {
        evaluator.set_bounds(config.eval_min.value, config.eval_max.value);

        Ok(Self {
            config: config.clone(),
            stop: Arc::new(AtomicBool::new(false)),
            deadline: Arc::new(AtomicBool::new(false)),
            keys,
            position: Position::start(),
            evaluator,
            tables: TranspositionTables::new(config.hash_bits.value)?,
            pool: Arena::with_capacity("move pool", MOVE_POOL_CAPACITY)?,
            mpc: MpcModel::default(),
            mpc_nesting: 0,
            root_ply: 0,
            stats: SearchStats::default(),
            report: SearchReport::default(),
        })
    }

    pub fn configure(&mut self, config: &EngineConfig) -> Result<(), SearchError> {
        if config.hash_bits.value != self.config.hash_bits.value {
            self.tables = TranspositionTables::new(config.hash_bits.value)?;
            log::debug!("Resized transposition tables to {} entries", self.tables.nws.len());
        }
        self.evaluator
            .set_bounds(config.eval_min.value, config.eval_max.value);
        self.config = config.clone();
        Ok(())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn name(&self) -> String {
        format!("PVS ({})", self.evaluator.name())
    }

    pub fn set_mpc_model(&mut self, model: MpcModel) {
        self.mpc = model;
    }

    pub fn mpc_model(&self) -> &MpcModel {
        &self.mpc
    }

    /// Forgets everything learned in earlier searches.
    pub fn new_game(&mut self) {
        self.tables.clear();
    }

    pub fn stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Withdraws a stop request. Searches never do this on their own, so a
    /// request made between two searches still stops the second one.
    pub fn clear_stop(&self) {
        self.stop.store(false, Ordering::Relaxed);
    }

    /// Flag that stops the running search at the next root move when set.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    /// Result of the last `search`.
    pub fn report(&self) -> &SearchReport {
        &self.report
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    #[inline(always)]
    fn stopped(&self) -> bool {
        self.stop.load(Ordering::Relaxed) || self.deadline.load(Ordering::Relaxed)
    }

    /// Plies played since the search root. Passes do not count.
    #[inline(always)]
    fn distance_from_root(&self) -> usize {
        self.position.ply() - self.root_ply
    }

    #[inline(always)]
    fn make(&mut self, square: Square, flips: u64) {
        self.position.play(square, flips);
        self.evaluator.update(square, flips);
    }

    #[inline(always)]
    fn unmake(&mut self, square: Square, flips: u64) {
        let undone = self.position.undo();
        debug_assert!(undone.is_some_and(|ply| ply.square == square && ply.flips == flips));
        self.evaluator.undo(square, flips);
    }

    #[inline(always)]
    fn pass(&mut self) {
        self.position.pass();
        self.evaluator.pass();
    }

    #[inline(always)]
    fn hash(&self) -> u64 {
        self.keys.hash(self.position.mover(), self.position.opponent())
    }

    /// Resets per-search state and loads `position` as the root.
    fn init_search(&mut self, position: &Position) {
        self.deadline.store(false, Ordering::Relaxed);

        self.position = position.clone();
        self.root_ply = position.ply();
        self.evaluator
            .reload(position.mover(), position.opponent(), position.side());

        self.pool.clear();
        self.tables.new_search();
        self.tables.reset_stats();
        self.mpc_nesting = 0;

        self.stats = SearchStats::default();
        self.report = SearchReport::default();
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use board::{legal_moves, Position, Squares};
    use evaluation::{Evaluator, LinearBackend, PatternSet};
    use rand::rngs::StdRng;
    use rand::seq::IteratorRandom;
    use rand::SeedableRng;

    use super::*;

    pub(crate) fn engine_with(config: EngineConfig) -> Engine {
        let patterns = Arc::new(PatternSet::new());
        let backend = Box::new(LinearBackend::heuristic(&patterns));
        Engine::new(&config, Evaluator::new(patterns, backend)).unwrap()
    }

    pub(crate) fn test_config() -> EngineConfig {
        let mut config = EngineConfig::default();
        config.hash_bits.value = 12;
        config
    }

    /// Plays random legal moves from the start until `empties` remain,
    /// passing when forced. Returns `None` if the game ends first.
    pub(crate) fn random_position(seed: u64, empties: u32) -> Option<Position> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut position = Position::start();
        while position.empty_count() > empties {
            if position.is_game_over() {
                return None;
            }
            if position.can_pass() {
                position.pass();
                continue;
            }

            let square = position.moves().choose(&mut rng)?;
            position.apply(square).ok()?;
        }
        Some(position)
    }

    /// First reachable position with `empties` empty squares.
    pub(crate) fn position_with(empties: u32) -> Position {
        (1u64..)
            .find_map(|seed| random_position(seed * 7919, empties))
            .unwrap()
    }

    /// Exact minimax, no pruning.
    pub(crate) fn brute_force(mover: u64, opponent: u64, passed: bool) -> i32 {
        let moves = legal_moves(mover, opponent);
        if moves == 0 {
            if passed {
                return board::final_score(mover, opponent);
            }
            return -brute_force(opponent, mover, true);
        }

        Squares(moves)
            .map(|square| {
                let flips = board::flip_mask(mover, opponent, square);
                -brute_force(opponent ^ flips, mover ^ flips ^ square.bit(), false)
            })
            .max()
            .unwrap_or(i32::MIN)
    }

    #[test]
    fn test_engine_starts_at_start_position() {
        let engine = engine_with(test_config());
        assert_eq!(*engine.position(), Position::start());
        assert!(engine.name().starts_with("PVS"));
    }

    #[test]
    fn test_make_unmake_keeps_evaluator_in_sync() {
        let mut engine = engine_with(test_config());
        let position = position_with(40);
        engine.init_search(&position);

        let features = *engine.evaluator.features();
        let square = Squares(position.legal_moves()).next().unwrap();
        let flips = position.flips(square);

        engine.make(square, flips);
        assert_ne!(*engine.evaluator.features(), features);
        engine.unmake(square, flips);

        assert_eq!(*engine.evaluator.features(), features);
        assert_eq!(engine.position, position);
    }

    #[test]
    fn test_configure_reallocates_tables() {
        let mut engine = engine_with(test_config());
        let mut config = test_config();
        config.hash_bits.value = 10;
        engine.configure(&config).unwrap();
        assert_eq!(engine.tables.nws.len(), 1 << 10);
    }

    #[test]
    fn test_stop_handle_is_shared() {
        let mut engine = engine_with(test_config());
        let handle = engine.stop_handle();
        engine.stop();
        assert!(handle.load(Ordering::Relaxed));

        engine.init_search(&Position::start());
        assert!(engine.stopped());
        engine.clear_stop();
        assert!(!handle.load(Ordering::Relaxed));
    }
}
