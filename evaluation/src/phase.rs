/// Game progress bucket selecting the weight set. Bands are four empties wide.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Phase(u8);

impl Phase {
    pub const COUNT: usize = 16;
    pub const WIDTH: u32 = 4;

    #[inline(always)]
    pub fn from_empties(empties: u32) -> Self {
        Self((empties / Self::WIDTH).min(Self::COUNT as u32 - 1) as u8)
    }

    #[inline(always)]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// 1.0 at the opening, 0.0 near the end of the game.
    pub fn progress(self) -> f32 {
        self.0 as f32 / (Self::COUNT - 1) as f32
    }

    pub fn all() -> impl Iterator<Item = Phase> {
        (0..Self::COUNT as u8).map(Phase)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_bands() {
        assert_eq!(Phase::from_empties(0).index(), 0);
        assert_eq!(Phase::from_empties(3).index(), 0);
        assert_eq!(Phase::from_empties(4).index(), 1);
        assert_eq!(Phase::from_empties(60).index(), 15);
        assert_eq!(Phase::from_empties(64).index(), 15);
        assert_eq!(Phase::all().count(), Phase::COUNT);
    }
}
