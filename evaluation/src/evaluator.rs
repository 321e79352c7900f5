use std::sync::Arc;

use board::{Color, Square, Squares};

use crate::{FeatureVector, PatternSet, Phase, ScoreBackend, DIGIT_OPPONENT};

/// Incrementally maintained pattern features for both viewpoints.
///
/// `views[c]` encodes the board with `c`'s stones as mover digits. Moves are
/// applied with `update` and reverted with `undo` in the opposite order, so
/// the vectors never need a full recomputation inside the search.
pub struct Evaluator {
    patterns: Arc<PatternSet>,
    backend: Box<dyn ScoreBackend>,

    views: [FeatureVector; 2],
    side: Color,

    min_score: i32,
    max_score: i32,
}

impl Evaluator {
    pub fn new(patterns: Arc<PatternSet>, backend: Box<dyn ScoreBackend>) -> Self {
        Self {
            patterns,
            backend,
            views: [FeatureVector::default(); 2],
            side: Color::Black,
            min_score: -64,
            max_score: 64,
        }
    }

    pub fn name(&self) -> String {
        self.backend.name()
    }

    /// Clamp range applied to backend scores.
    pub fn set_bounds(&mut self, min_score: i32, max_score: i32) {
        debug_assert!(min_score <= max_score);
        self.min_score = min_score;
        self.max_score = max_score;
    }

    pub fn bounds(&self) -> (i32, i32) {
        (self.min_score, self.max_score)
    }

    pub fn patterns(&self) -> &Arc<PatternSet> {
        &self.patterns
    }

    /// Full recomputation for the position where `side` owns `mover`.
    pub fn reload(&mut self, mover: u64, opponent: u64, side: Color) -> &FeatureVector {
        self.side = side;
        self.views[side.index()] = self.patterns.compute(mover, opponent);
        self.views[side.opposite().index()] = self.patterns.compute(opponent, mover);
        &self.views[side.index()]
    }

    /// Applies the side to move playing `square` and capturing `flips`.
    #[inline]
    pub fn update(&mut self, square: Square, flips: u64) {
        let own = self.side.index();
        let other = self.side.opposite().index();

        for flipped in Squares(flips) {
            for feature in self.patterns.square_features(flipped) {
                let slot = feature.slot as usize;
                self.views[own].0[slot] -= feature.weight;
                self.views[other].0[slot] += feature.weight;
            }
        }

        for feature in self.patterns.square_features(square) {
            let slot = feature.slot as usize;
            self.views[own].0[slot] += feature.weight;
            self.views[other].0[slot] += DIGIT_OPPONENT * feature.weight;
        }

        self.side = self.side.opposite();
        debug_assert!(self.patterns.in_range(&self.views[own]));
        debug_assert!(self.patterns.in_range(&self.views[other]));
    }

    /// Exact inverse of `update` for the same move.
    #[inline]
    pub fn undo(&mut self, square: Square, flips: u64) {
        self.side = self.side.opposite();

        let own = self.side.index();
        let other = self.side.opposite().index();

        for feature in self.patterns.square_features(square) {
            let slot = feature.slot as usize;
            self.views[own].0[slot] -= feature.weight;
            self.views[other].0[slot] -= DIGIT_OPPONENT * feature.weight;
        }

        for flipped in Squares(flips) {
            for feature in self.patterns.square_features(flipped) {
                let slot = feature.slot as usize;
                self.views[own].0[slot] += feature.weight;
                self.views[other].0[slot] -= feature.weight;
            }
        }
    }

    #[inline(always)]
    pub fn pass(&mut self) {
        self.side = self.side.opposite();
    }

    #[inline(always)]
    pub fn side(&self) -> Color {
        self.side
    }

    /// Features from the side to move's viewpoint.
    #[inline(always)]
    pub fn features(&self) -> &FeatureVector {
        &self.views[self.side.index()]
    }

    pub fn view(&self, color: Color) -> &FeatureVector {
        &self.views[color.index()]
    }

    /// Backend score for the side to move, clamped to the configured range.
    #[inline]
    pub fn score(&self, phase: Phase) -> i32 {
        self.backend
            .score(self.features(), phase)
            .clamp(self.min_score, self.max_score)
    }
}
