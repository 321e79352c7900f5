use arrayvec::ArrayVec;
use board::{Square, Squares};

use crate::FeatureVector;

/// Number of feature slots (pattern instances) on the board.
pub const FEATURE_COUNT: usize = 46;
/// Largest pattern, in squares.
pub const MAX_PATTERN_SQUARES: usize = 10;
/// Every square is covered by between 4 and 8 pattern instances.
pub const MAX_FEATURES_PER_SQUARE: usize = 8;

/// Powers of three up to 3^10.
pub const POW3: [usize; 11] = [1, 3, 9, 27, 81, 243, 729, 2187, 6561, 19683, 59049];

/// Digit values of a pattern index, relative to the viewpoint side.
pub const DIGIT_EMPTY: u16 = 0;
pub const DIGIT_MOVER: u16 = 1;
pub const DIGIT_OPPONENT: u16 = 2;

/// Shape of a pattern. All instances of a class share the same weights.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PatternClass {
    Corner3x3,
    Corner2x5,
    Edge2X,
    Line2,
    Line3,
    Line4,
    Diagonal8,
    Diagonal7,
    Diagonal6,
    Diagonal5,
    Diagonal4,
}

const CORNER_3X3: [(u8, u8); 9] = [
    (0, 0),
    (1, 0),
    (2, 0),
    (0, 1),
    (1, 1),
    (2, 1),
    (0, 2),
    (1, 2),
    (2, 2),
];
const CORNER_2X5: [(u8, u8); 10] = [
    (0, 0),
    (1, 0),
    (2, 0),
    (3, 0),
    (4, 0),
    (0, 1),
    (1, 1),
    (2, 1),
    (3, 1),
    (4, 1),
];
const EDGE_2X: [(u8, u8); 10] = [
    (1, 1),
    (0, 0),
    (1, 0),
    (2, 0),
    (3, 0),
    (4, 0),
    (5, 0),
    (6, 0),
    (7, 0),
    (6, 1),
];

// (rotations, with transposed copies)
const FOUR_ROTATIONS: (u8, bool) = (4, false);

impl PatternClass {
    pub const ALL: [PatternClass; 11] = [
        PatternClass::Corner3x3,
        PatternClass::Corner2x5,
        PatternClass::Edge2X,
        PatternClass::Line2,
        PatternClass::Line3,
        PatternClass::Line4,
        PatternClass::Diagonal8,
        PatternClass::Diagonal7,
        PatternClass::Diagonal6,
        PatternClass::Diagonal5,
        PatternClass::Diagonal4,
    ];

    #[inline(always)]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn digits(self) -> usize {
        match self {
            PatternClass::Corner3x3 => 9,
            PatternClass::Corner2x5 | PatternClass::Edge2X => 10,
            PatternClass::Line2
            | PatternClass::Line3
            | PatternClass::Line4
            | PatternClass::Diagonal8 => 8,
            PatternClass::Diagonal7 => 7,
            PatternClass::Diagonal6 => 6,
            PatternClass::Diagonal5 => 5,
            PatternClass::Diagonal4 => 4,
        }
    }

    /// Number of distinct indices, 3^digits.
    #[inline(always)]
    pub const fn size(self) -> usize {
        POW3[self.digits()]
    }

    /// Squares of the canonical instance as (file, rank), most significant digit first.
    fn base(self) -> ArrayVec<(u8, u8), MAX_PATTERN_SQUARES> {
        let mut squares = ArrayVec::new();
        match self {
            PatternClass::Corner3x3 => squares.extend(CORNER_3X3),
            PatternClass::Corner2x5 => squares.extend(CORNER_2X5),
            PatternClass::Edge2X => squares.extend(EDGE_2X),
            PatternClass::Line2 => squares.extend((0..8).map(|f| (f, 1))),
            PatternClass::Line3 => squares.extend((0..8).map(|f| (f, 2))),
            PatternClass::Line4 => squares.extend((0..8).map(|f| (f, 3))),
            diagonal => {
                let offset = (8 - diagonal.digits()) as u8;
                squares.extend((0..diagonal.digits() as u8).map(|i| (i + offset, i)))
            }
        }
        squares
    }

    fn symmetries(self) -> (u8, bool) {
        match self {
            PatternClass::Corner2x5 => (4, true),
            PatternClass::Diagonal8 => (2, false),
            _ => FOUR_ROTATIONS,
        }
    }
}

fn transform(file: u8, rank: u8, rotation: u8, transposed: bool) -> (u8, u8) {
    let (mut f, mut r) = if transposed {
        (rank, file)
    } else {
        (file, rank)
    };
    for _ in 0..rotation {
        (f, r) = (7 - r, f);
    }
    (f, r)
}

/// One pattern instance on the board.
#[derive(Clone, Debug)]
pub struct FeatureSlot {
    pub class: PatternClass,
    pub squares: ArrayVec<Square, MAX_PATTERN_SQUARES>,
}

/// A square's membership in one slot: the slot id and the square's power of three there.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SquareFeature {
    pub slot: u8,
    pub weight: u16,
}

/// The board's pattern geometry. Built once and shared.
#[derive(Clone, Debug)]
pub struct PatternSet {
    slots: Vec<FeatureSlot>,
    by_square: Vec<ArrayVec<SquareFeature, MAX_FEATURES_PER_SQUARE>>,
}

impl Default for PatternSet {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternSet {
    pub fn new() -> Self {
        let mut slots = Vec::with_capacity(FEATURE_COUNT);

        for class in PatternClass::ALL {
            let base = class.base();
            let (rotations, transposed) = class.symmetries();
            let variants = if transposed { 2 } else { 1 };

            for rotation in 0..rotations {
                for variant in 0..variants {
                    let squares = base
                        .iter()
                        .map(|&(f, r)| {
                            let (f, r) = transform(f, r, rotation, variant == 1);
                            Square::from_coords(f, r)
                        })
                        .collect();
                    slots.push(FeatureSlot { class, squares });
                }
            }
        }
        debug_assert_eq!(slots.len(), FEATURE_COUNT);

        let mut by_square = vec![ArrayVec::new(); 64];
        for (slot, pattern) in slots.iter().enumerate() {
            let digits = pattern.squares.len();
            for (position, square) in pattern.squares.iter().enumerate() {
                by_square[square.index()].push(SquareFeature {
                    slot: slot as u8,
                    weight: POW3[digits - 1 - position] as u16,
                });
            }
        }

        Self { slots, by_square }
    }

    pub fn slots(&self) -> &[FeatureSlot] {
        &self.slots
    }

    #[inline(always)]
    pub fn class(&self, slot: usize) -> PatternClass {
        self.slots[slot].class
    }

    /// Slots the square participates in, with its digit weight in each.
    #[inline(always)]
    pub fn square_features(&self, square: Square) -> &[SquareFeature] {
        &self.by_square[square.index()]
    }

    /// First slot of each class, used as the canonical instance.
    pub fn canonical_slot(&self, class: PatternClass) -> &FeatureSlot {
        self.slots
            .iter()
            .find(|slot| slot.class == class)
            .unwrap_or(&self.slots[0])
    }

    /// Full recomputation of the feature vector from `mover`'s viewpoint.
    pub fn compute(&self, mover: u64, opponent: u64) -> FeatureVector {
        let mut features = FeatureVector::default();
        for square in Squares(mover) {
            for feature in self.square_features(square) {
                features.0[feature.slot as usize] += DIGIT_MOVER * feature.weight;
            }
        }
        for square in Squares(opponent) {
            for feature in self.square_features(square) {
                features.0[feature.slot as usize] += DIGIT_OPPONENT * feature.weight;
            }
        }
        features
    }

    /// Whether every slot's index is below its class bound.
    pub fn in_range(&self, features: &FeatureVector) -> bool {
        features
            .0
            .iter()
            .zip(&self.slots)
            .all(|(&index, slot)| (index as usize) < slot.class.size())
    }
}

/// The index the same physical pattern reports from the other side's viewpoint.
pub fn opponent_index(mut index: usize, digits: usize) -> usize {
    const SWAP: [usize; 3] = [0, 2, 1];

    let mut result = 0;
    for power in POW3.iter().take(digits) {
        result += SWAP[index % 3] * power;
        index /= 3;
    }
    result
}
