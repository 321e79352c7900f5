// Pattern-based position evaluation.
//
// The evaluator keeps a vector of base-3 pattern indices in sync with the
// board through update/undo, and turns it into a score through a pluggable
// `ScoreBackend`. The geometry (`PatternSet`) is built once and shared.

mod backend;
mod evaluator;
mod features;
mod pattern;
mod phase;
mod training;

pub use backend::{LinearBackend, ScoreBackend, WeightLayout, WeightsError, WEIGHT_SCALE};
pub use evaluator::Evaluator;
pub use features::FeatureVector;
pub use pattern::{
    opponent_index, FeatureSlot, PatternClass, PatternSet, SquareFeature, DIGIT_EMPTY,
    DIGIT_MOVER, DIGIT_OPPONENT, FEATURE_COUNT, MAX_FEATURES_PER_SQUARE, MAX_PATTERN_SQUARES,
    POW3,
};
pub use phase::Phase;
pub use training::TrainingBackend;
