mod arena;
mod config;
pub mod engine;
mod error;
mod move_ordering;
mod pruning;
mod time_control;
mod transposition;

/// Largest possible disc differential.
pub const SCORE_MAX: i32 = 64;
/// Window bound strictly outside every reachable score.
pub const SCORE_INF: i32 = SCORE_MAX + 1;

pub use arena::{Arena, Handle};
pub use config::{ConfigOption, ConfigParam, EngineConfig, OptionType};
pub use engine::{Algorithm, Engine, SearchReport, SearchStats};
pub use error::SearchError;
pub use pruning::{MpcModel, MpcParams, MpcSample};
pub use time_control::SearchController;
pub use transposition::{HashKeys, TableStats};
