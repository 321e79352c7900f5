use crate::backend::{descale, WeightLayout};
use crate::{
    FeatureVector, LinearBackend, PatternSet, Phase, ScoreBackend, WeightsError, WEIGHT_SCALE,
};

/// Float weights with a gradient accumulator.
///
/// Kept apart from `LinearBackend` so the play-time backend carries no
/// training state. Scores the same way, so it can drive a search directly.
pub struct TrainingBackend {
    layout: WeightLayout,
    weights: Vec<f32>,
    gradient: Vec<f32>,
    samples: usize,
}

impl TrainingBackend {
    pub fn new(patterns: &PatternSet) -> Self {
        let layout = WeightLayout::new(patterns);
        let len = layout.len();
        Self {
            layout,
            weights: vec![0.0; len],
            gradient: vec![0.0; len],
            samples: 0,
        }
    }

    pub fn from_linear(backend: &LinearBackend) -> Self {
        let weights: Vec<f32> = backend.weights().iter().map(|&w| w as f32).collect();
        Self {
            layout: backend.layout().clone(),
            gradient: vec![0.0; weights.len()],
            weights,
            samples: 0,
        }
    }

    /// Unrounded prediction in disc units.
    pub fn predict(&self, features: &FeatureVector, phase: Phase) -> f32 {
        let sum: f32 = self
            .layout
            .active(features, phase)
            .map(|i| self.weights[i])
            .sum();
        sum / WEIGHT_SCALE as f32
    }

    /// Adds one sample's squared-error gradient; `error` is prediction minus target, in discs.
    pub fn accumulate(&mut self, features: &FeatureVector, phase: Phase, error: f32) {
        for i in self.layout.active(features, phase) {
            self.gradient[i] += error;
        }
        self.samples += 1;
    }

    pub fn pending_samples(&self) -> usize {
        self.samples
    }

    /// Applies the averaged gradient and resets the accumulator.
    pub fn apply(&mut self, learning_rate: f32) {
        if self.samples == 0 {
            return;
        }

        let step = learning_rate * WEIGHT_SCALE as f32 / self.samples as f32;
        for (weight, gradient) in self.weights.iter_mut().zip(self.gradient.iter_mut()) {
            *weight -= step * *gradient;
            *gradient = 0.0;
        }
        self.samples = 0;
    }

    /// Rounds into a play-time backend for `patterns`.
    pub fn to_linear(&self, patterns: &PatternSet) -> Result<LinearBackend, WeightsError> {
        let weights = self
            .weights
            .iter()
            .map(|w| w.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16)
            .collect();

        LinearBackend::from_weights(patterns, weights)
    }
}

impl ScoreBackend for TrainingBackend {
    fn name(&self) -> String {
        "Linear (training)".to_string()
    }

    fn score(&self, features: &FeatureVector, phase: Phase) -> i32 {
        let sum: f32 = self
            .layout
            .active(features, phase)
            .map(|i| self.weights[i])
            .sum();
        descale(sum.round() as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gradient_steps_reduce_error() {
        let patterns = PatternSet::new();
        let mut backend = TrainingBackend::new(&patterns);
        let features = patterns.compute(0x0000_0018_0800_0000, 0x0000_0000_1000_0000);
        let phase = Phase::from_empties(56);
        let target = 6.0;

        let before = (backend.predict(&features, phase) - target).abs();
        for _ in 0..20 {
            let error = backend.predict(&features, phase) - target;
            backend.accumulate(&features, phase, error);
            backend.apply(0.002);
        }
        let after = (backend.predict(&features, phase) - target).abs();

        assert!(after < before);
        assert_eq!(backend.pending_samples(), 0);
    }

    #[test]
    fn test_roundtrip_through_linear() {
        let patterns = PatternSet::new();
        let linear = LinearBackend::heuristic(&patterns);
        let training = TrainingBackend::from_linear(&linear);

        let features = patterns.compute(0x0000_0018_0800_0000, 0x0000_0000_1000_0000);
        let phase = Phase::from_empties(56);
        assert_eq!(training.score(&features, phase), linear.score(&features, phase));

        let back = training.to_linear(&patterns).unwrap();
        assert_eq!(back.weights(), linear.weights());
    }

    #[test]
    fn test_to_linear_rejects_mismatched_weights() {
        let patterns = PatternSet::new();
        let mut training = TrainingBackend::new(&patterns);
        training.weights.truncate(3);

        assert!(matches!(
            training.to_linear(&patterns),
            Err(WeightsError::Length { .. })
        ));
    }
}
