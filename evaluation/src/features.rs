use std::ops::Index;

use crate::FEATURE_COUNT;

/// Base-3 pattern indices, one per feature slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FeatureVector(pub(crate) [u16; FEATURE_COUNT]);

impl Default for FeatureVector {
    fn default() -> Self {
        Self([0; FEATURE_COUNT])
    }
}

impl FeatureVector {
    #[inline(always)]
    pub fn as_slice(&self) -> &[u16] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, u16)> + '_ {
        self.0.iter().copied().enumerate()
    }
}

impl Index<usize> for FeatureVector {
    type Output = u16;

    #[inline(always)]
    fn index(&self, slot: usize) -> &u16 {
        &self.0[slot]
    }
}
