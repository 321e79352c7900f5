use board::Square;

use crate::{SearchError, SCORE_INF};

/// A cached search result.
///
/// `lower..=upper` is the window the true score is known to lie in; both are
/// always valid for `depth` plies (or the whole endgame when `depth` equals
/// the empty count).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Entry {
    pub mover: u64,
    pub opponent: u64,
    pub lower: i16,
    pub upper: i16,
    pub depth: u8,
    pub best: Option<Square>,
    pub second: Option<Square>,
    /// Search generation that last touched the entry. 0 = never used.
    pub version: u8,
}

impl Entry {
    const EMPTY: Entry = Entry {
        mover: 0,
        opponent: 0,
        lower: -SCORE_INF as i16,
        upper: SCORE_INF as i16,
        depth: 0,
        best: None,
        second: None,
        version: 0,
    };

    #[inline(always)]
    fn matches(&self, mover: u64, opponent: u64) -> bool {
        self.version != 0 && self.mover == mover && self.opponent == opponent
    }

    #[inline(always)]
    fn priority(&self) -> (u8, u8) {
        (self.version, self.depth)
    }

    /// Window implied by a fail-soft result against `alpha..beta`.
    fn set_bounds(&mut self, alpha: i32, beta: i32, score: i32) {
        let score = score.clamp(-SCORE_INF, SCORE_INF) as i16;
        if score as i32 >= beta {
            self.lower = score;
            self.upper = SCORE_INF as i16;
        } else if score as i32 <= alpha {
            self.lower = -SCORE_INF as i16;
            self.upper = score;
        } else {
            self.lower = score;
            self.upper = score;
        }
    }

    fn tighten_bounds(&mut self, alpha: i32, beta: i32, score: i32) {
        let clamped = score.clamp(-SCORE_INF, SCORE_INF) as i16;
        if score >= beta {
            self.lower = self.lower.max(clamped);
        } else if score <= alpha {
            self.upper = self.upper.min(clamped);
        } else {
            self.lower = clamped;
            self.upper = clamped;
        }

        // Only possible after a search instability; trust the newest result
        if self.lower > self.upper {
            self.set_bounds(alpha, beta, score);
        }
    }
}

impl Default for Entry {
    fn default() -> Self {
        Self::EMPTY
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableStats {
    pub lookups: u64,
    pub hits: u64,
    pub stores: u64,
    /// Inserts that evicted a different live position.
    pub collisions: u64,
}

/// Open-addressed table with two candidate slots per position
/// (the hashed index and its sibling with the low bit flipped).
pub struct Table {
    entries: Vec<Entry>,
    mask: usize,
    version: u8,
    stats: TableStats,
}

impl Table {
    pub fn new(bits: u32) -> Result<Self, SearchError> {
        let len = 1usize << bits.max(1);

        let mut entries = Vec::new();
        entries
            .try_reserve_exact(len)
            .map_err(|_| SearchError::OutOfMemory {
                pool: "transposition table",
                requested: len,
            })?;
        entries.resize(len, Entry::EMPTY);

        log::debug!("Allocated transposition table with {} entries", len);

        Ok(Self {
            entries,
            mask: len - 1,
            version: 1,
            stats: TableStats::default(),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn stats(&self) -> TableStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = TableStats::default();
    }

    pub fn clear(&mut self) {
        self.entries.fill(Entry::EMPTY);
        self.version = 1;
    }

    /// Starts a new search generation. Entries from older generations lose
    /// replacement priority but stay usable.
    pub fn new_search(&mut self) {
        if self.version == u8::MAX {
            log::debug!("Transposition table version wrapped, clearing");
            self.clear();
        } else {
            self.version += 1;
        }
    }

    /// Forgets every score window but keeps move hints. Used when switching
    /// from heuristic to exact search.
    pub fn clear_scores(&mut self) {
        for entry in self.entries.iter_mut().filter(|e| e.version != 0) {
            entry.lower = -SCORE_INF as i16;
            entry.upper = SCORE_INF as i16;
            entry.depth = 0;
        }
    }

    #[inline(always)]
    fn find(&self, hash: u64, mover: u64, opponent: u64) -> Result<usize, usize> {
        let primary = hash as usize & self.mask;
        let sibling = primary ^ 1;

        if self.entries[primary].matches(mover, opponent) {
            return Ok(primary);
        }
        if self.entries[sibling].matches(mover, opponent) {
            return Ok(sibling);
        }

        // Most recent and deepest survives
        if self.entries[sibling].priority() < self.entries[primary].priority() {
            Err(sibling)
        } else {
            Err(primary)
        }
    }

    pub fn lookup(&mut self, hash: u64, mover: u64, opponent: u64) -> Option<Entry> {
        self.stats.lookups += 1;

        let index = self.find(hash, mover, opponent).ok()?;
        self.stats.hits += 1;

        let entry = &mut self.entries[index];
        entry.version = self.version;
        Some(*entry)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn register(
        &mut self,
        hash: u64,
        mover: u64,
        opponent: u64,
        best: Option<Square>,
        depth: u8,
        alpha: i32,
        beta: i32,
        score: i32,
    ) {
        debug_assert!(mover & opponent == 0);
        self.stats.stores += 1;
        let version = self.version;

        match self.find(hash, mover, opponent) {
            Ok(index) => {
                let entry = &mut self.entries[index];
                entry.version = version;

                if depth > entry.depth {
                    entry.depth = depth;
                    entry.set_bounds(alpha, beta, score);
                } else if depth == entry.depth {
                    entry.tighten_bounds(alpha, beta, score);
                }

                if best.is_some() && best != entry.best {
                    entry.second = entry.best;
                    entry.best = best;
                }
            }
            Err(index) => {
                let entry = &mut self.entries[index];
                if entry.version != 0 {
                    self.stats.collisions += 1;
                }

                *entry = Entry {
                    mover,
                    opponent,
                    depth,
                    best,
                    version,
                    ..Entry::EMPTY
                };
                entry.set_bounds(alpha, beta, score);
            }
        }

        debug_assert!(self.find(hash, mover, opponent).is_ok());
    }
}

/// Cutoff test for a full-window node.
///
/// Returns the cached score if it already decides the node. Otherwise
/// narrows `alpha`/`beta` to the cached window.
#[inline(always)]
pub fn probe_cut(entry: &Entry, depth: u8, alpha: &mut i32, beta: &mut i32) -> Option<i32> {
    if entry.depth < depth {
        return None;
    }

    let lower = entry.lower as i32;
    let upper = entry.upper as i32;

    if upper <= *alpha {
        return Some(upper);
    }
    if lower >= *beta {
        return Some(lower);
    }
    if lower == upper {
        return Some(lower);
    }

    *alpha = (*alpha).max(lower);
    *beta = (*beta).min(upper);
    None
}

/// Cutoff test for a null-window node at `alpha..alpha + 1`.
#[inline(always)]
pub fn probe_cut_null_window(entry: &Entry, depth: u8, alpha: i32) -> Option<i32> {
    if entry.depth < depth {
        return None;
    }

    if entry.lower as i32 > alpha {
        return Some(entry.lower as i32);
    }
    if entry.upper as i32 <= alpha {
        return Some(entry.upper as i32);
    }
    None
}

/// The null-window and principal-variation tables of one search tree.
pub struct TranspositionTables {
    pub nws: Table,
    pub pvs: Table,
}

impl TranspositionTables {
    pub fn new(bits: u32) -> Result<Self, SearchError> {
        Ok(Self {
            nws: Table::new(bits)?,
            pvs: Table::new(bits)?,
        })
    }

    pub fn new_search(&mut self) {
        self.nws.new_search();
        self.pvs.new_search();
    }

    pub fn clear(&mut self) {
        self.nws.clear();
        self.pvs.clear();
    }

    pub fn clear_scores(&mut self) {
        self.nws.clear_scores();
        self.pvs.clear_scores();
    }

    pub fn reset_stats(&mut self) {
        self.nws.reset_stats();
        self.pvs.reset_stats();
    }

    pub fn stats(&self) -> TableStats {
        let nws = self.nws.stats();
        let pvs = self.pvs.stats();
        TableStats {
            lookups: nws.lookups + pvs.lookups,
            hits: nws.hits + pvs.hits,
            stores: nws.stores + pvs.stores,
            collisions: nws.collisions + pvs.collisions,
        }
    }
}
