use thiserror::Error;

use crate::{opponent_index, FeatureVector, PatternClass, PatternSet, Phase, FEATURE_COUNT};

/// Weights are stored in 1/64 disc.
pub const WEIGHT_SCALE: i32 = 64;

/// Scoring model consumed by the evaluator.
///
/// Implementations must be deterministic functions of the feature vector and
/// phase. The result is in disc units from the viewpoint side.
pub trait ScoreBackend: Send {
    fn name(&self) -> String;
    fn score(&self, features: &FeatureVector, phase: Phase) -> i32;
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WeightsError {
    #[error("expected {expected} weights, got {actual}")]
    Length { expected: usize, actual: usize },
}

/// Where each slot's table starts inside the flat weight vector.
#[derive(Clone, Debug)]
pub struct WeightLayout {
    class_offsets: [usize; PatternClass::ALL.len()],
    slot_offsets: [usize; FEATURE_COUNT],
    phase_stride: usize,
}

impl WeightLayout {
    pub fn new(patterns: &PatternSet) -> Self {
        let mut class_offsets = [0; PatternClass::ALL.len()];
        let mut offset = 0;
        for class in PatternClass::ALL {
            class_offsets[class.index()] = offset;
            offset += class.size();
        }

        let mut slot_offsets = [0; FEATURE_COUNT];
        for (slot, offset) in slot_offsets.iter_mut().enumerate() {
            *offset = class_offsets[patterns.class(slot).index()];
        }

        Self {
            class_offsets,
            slot_offsets,
            phase_stride: offset,
        }
    }

    /// Total number of weights over all phases.
    pub fn len(&self) -> usize {
        self.phase_stride * Phase::COUNT
    }

    pub fn is_empty(&self) -> bool {
        self.phase_stride == 0
    }

    #[inline(always)]
    pub fn class_base(&self, phase: Phase, class: PatternClass) -> usize {
        phase.index() * self.phase_stride + self.class_offsets[class.index()]
    }

    /// Weight positions of every active feature.
    #[inline(always)]
    pub fn active<'a>(
        &'a self,
        features: &'a FeatureVector,
        phase: Phase,
    ) -> impl Iterator<Item = usize> + 'a {
        let base = phase.index() * self.phase_stride;
        features
            .as_slice()
            .iter()
            .zip(self.slot_offsets.iter())
            .map(move |(&index, &offset)| base + offset + index as usize)
    }
}

#[inline(always)]
pub(crate) fn descale(sum: i32) -> i32 {
    (sum + WEIGHT_SCALE / 2).div_euclid(WEIGHT_SCALE)
}

/// Positional square values in 1/64 disc, used to derive heuristic weights.
#[rustfmt::skip]
const SQUARE_VALUES: [i32; 64] = [
     512, -160,  64,  32,  32,  64, -160,  512,
    -160, -320,  -8,  -8,  -8,  -8, -320, -160,
      64,   -8,  16,   8,   8,  16,   -8,   64,
      32,   -8,   8,   0,   0,   8,   -8,   32,
      32,   -8,   8,   0,   0,   8,   -8,   32,
      64,   -8,  16,   8,   8,  16,   -8,   64,
    -160, -320,  -8,  -8,  -8,  -8, -320, -160,
     512, -160,  64,  32,  32,  64, -160,  512,
];

/// Linear model over pattern indices: one weight table per phase and pattern class.
pub struct LinearBackend {
    layout: WeightLayout,
    weights: Vec<i16>,
}

impl LinearBackend {
    /// Accepts externally trained weights laid out per `WeightLayout`.
    pub fn from_weights(patterns: &PatternSet, weights: Vec<i16>) -> Result<Self, WeightsError> {
        let layout = WeightLayout::new(patterns);
        if weights.len() != layout.len() {
            return Err(WeightsError::Length {
                expected: layout.len(),
                actual: weights.len(),
            });
        }
        Ok(Self { layout, weights })
    }

    /// Weights derived from a static square table, blended toward plain disc
    /// count as the game progresses. Each square's value is split evenly across
    /// the patterns covering it, so summing all slots recovers the table.
    pub fn heuristic(patterns: &PatternSet) -> Self {
        let layout = WeightLayout::new(patterns);
        let mut weights = vec![0i16; layout.len()];

        for phase in Phase::all() {
            let progress = phase.progress();
            for class in PatternClass::ALL {
                let slot = patterns.canonical_slot(class);
                let values: Vec<f32> = slot
                    .squares
                    .iter()
                    .map(|&square| {
                        let positional = SQUARE_VALUES[square.index()] as f32;
                        let value = progress * positional + (1.0 - progress) * WEIGHT_SCALE as f32;
                        value / patterns.square_features(square).len() as f32
                    })
                    .collect();

                let base = layout.class_base(phase, class);
                for index in 0..class.size() {
                    let mut rest = index;
                    let mut weight = 0.0;
                    for value in values.iter().rev() {
                        match rest % 3 {
                            1 => weight += value,
                            2 => weight -= value,
                            _ => {}
                        }
                        rest /= 3;
                    }
                    weights[base + index] = weight.round() as i16;
                }
            }
        }

        log::debug!("Built heuristic weights ({} entries)", weights.len());

        Self { layout, weights }
    }

    pub fn weights(&self) -> &[i16] {
        &self.weights
    }

    pub fn layout(&self) -> &WeightLayout {
        &self.layout
    }

    /// Largest |w(i) + w(opponent_index(i))| over all tables. Zero for weights
    /// that score both viewpoints symmetrically.
    pub fn antisymmetry_error(&self) -> i32 {
        let mut worst = 0;
        for phase in Phase::all() {
            for class in PatternClass::ALL {
                let base = self.layout.class_base(phase, class);
                for index in 0..class.size() {
                    let mirrored = opponent_index(index, class.digits());
                    let sum = self.weights[base + index] as i32 + self.weights[base + mirrored] as i32;
                    worst = worst.max(sum.abs());
                }
            }
        }
        worst
    }
}

impl ScoreBackend for LinearBackend {
    fn name(&self) -> String {
        "Linear".to_string()
    }

    #[inline]
    fn score(&self, features: &FeatureVector, phase: Phase) -> i32 {
        let sum: i32 = self
            .layout
            .active(features, phase)
            .map(|i| self.weights[i] as i32)
            .sum();
        descale(sum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_weights_checks_length() {
        let patterns = PatternSet::new();
        let layout = WeightLayout::new(&patterns);
        let err = LinearBackend::from_weights(&patterns, vec![0; 3]).err();
        assert_eq!(
            err,
            Some(WeightsError::Length {
                expected: layout.len(),
                actual: 3
            })
        );
        assert!(LinearBackend::from_weights(&patterns, vec![0; layout.len()]).is_ok());
    }

    #[test]
    fn test_heuristic_is_antisymmetric() {
        let patterns = PatternSet::new();
        let backend = LinearBackend::heuristic(&patterns);
        assert_eq!(backend.antisymmetry_error(), 0);
    }

    #[test]
    fn test_heuristic_prefers_corners() {
        let patterns = PatternSet::new();
        let backend = LinearBackend::heuristic(&patterns);
        let phase = Phase::from_empties(40);

        let corner = patterns.compute(1, 1 << 9);
        let x_square = patterns.compute(1 << 9, 1);
        assert!(backend.score(&corner, phase) > 0);
        assert!(backend.score(&x_square, phase) < 0);
    }

    #[test]
    fn test_heuristic_counts_discs_at_the_end() {
        let patterns = PatternSet::new();
        let backend = LinearBackend::heuristic(&patterns);

        // Phase 0 is pure disc count (progress 0).
        let features = patterns.compute(0x0000_0000_00FF_FFFF, 0x0000_0000_FF00_0000);
        let score = backend.score(&features, Phase::from_empties(0));
        assert!((score - 16).abs() <= 1, "score {}", score);
    }
}
