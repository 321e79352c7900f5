use rand::{rngs::StdRng, Rng, SeedableRng};

const SEED: u64 = 0x0DD5_EED5_5EED_0DD5;
const MIN_KEY_BITS: u32 = 8;

/// Byte-indexed random keys for hashing a position.
///
/// Built once per engine and shared read-only. Each of the 16 board bytes
/// (8 mover, 8 opponent) selects one key from its own row.
pub struct HashKeys {
    keys: Box<[[u64; 256]; 16]>,
}

impl HashKeys {
    pub fn new() -> Self {
        Self::with_seed(SEED)
    }

    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut keys = Box::new([[0u64; 256]; 16]);

        for row in keys.iter_mut() {
            for key in row.iter_mut() {
                // Sparse keys leave low-entropy hashes for sparse boards
                *key = loop {
                    let candidate: u64 = rng.gen();
                    if candidate.count_ones() >= MIN_KEY_BITS {
                        break candidate;
                    }
                };
            }
        }

        Self { keys }
    }

    #[inline(always)]
    pub fn hash(&self, mover: u64, opponent: u64) -> u64 {
        let mut hash = 0;
        for byte in 0..8 {
            let shift = byte * 8;
            hash ^= self.keys[byte][((mover >> shift) & 0xFF) as usize];
            hash ^= self.keys[byte + 8][((opponent >> shift) & 0xFF) as usize];
        }
        hash
    }
}

impl Default for HashKeys {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_dense() {
        let keys = HashKeys::new();
        for row in keys.keys.iter() {
            assert!(row.iter().all(|k| k.count_ones() >= MIN_KEY_BITS));
        }
    }

    #[test]
    fn test_same_seed_same_hash() {
        let a = HashKeys::with_seed(7);
        let b = HashKeys::with_seed(7);
        let mover = 0x0000_0008_1000_0000;
        let opponent = 0x0000_0010_0800_0000;
        assert_eq!(a.hash(mover, opponent), b.hash(mover, opponent));
    }

    #[test]
    fn test_side_matters() {
        let keys = HashKeys::new();
        let mover = 0x0000_0008_1000_0000;
        let opponent = 0x0000_0010_0800_0000;
        assert_ne!(keys.hash(mover, opponent), keys.hash(opponent, mover));
    }
}
