use std::time::Duration;

use board::Square;

use crate::transposition::TableStats;

/// Counters for one search.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    /// Beta cutoffs in the move loops
    pub cutoffs: u64,
    /// Nodes answered straight from a table entry
    pub table_cutoffs: u64,
    pub mpc_cuts: u64,
    pub table: TableStats,
    pub elapsed: Duration,
}

impl SearchStats {
    pub fn nodes_per_second(&self) -> u64 {
        let seconds = self.elapsed.as_secs_f64();
        if seconds > 0.0 {
            (self.nodes as f64 / seconds) as u64
        } else {
            0
        }
    }
}

/// Outcome of the last root search.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchReport {
    pub best_move: Option<Square>,
    pub score: i32,
    pub second_move: Option<Square>,
    pub second_score: Option<i32>,
    /// Last fully completed depth; 0 if no iteration completed.
    pub depth: u8,
    /// The scores come from an exact endgame solve.
    pub exact: bool,
    /// Root moves in their final order with their last completed scores.
    /// Only the best move (and the second in second-best mode) carry exact
    /// values; the rest are upper bounds.
    pub root_scores: Vec<(Square, i32)>,
    pub stats: SearchStats,
}
