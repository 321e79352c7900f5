mod hash;
mod table;

pub use hash::HashKeys;
pub use table::{probe_cut, probe_cut_null_window, Entry, TableStats, TranspositionTables};
