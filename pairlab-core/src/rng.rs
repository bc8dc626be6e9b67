//! Deterministic RNG hierarchy.
//!
//! A master seed generates deterministic sub-seeds for each `(stream, iteration)`
//! pair. Sub-seeds are derived via BLAKE3 hashing, so adding a new consumer of
//! randomness never shifts the numbers an existing consumer sees.

use rand::rngs::StdRng;
use rand::SeedableRng;

/// Deterministic RNG hierarchy.
///
/// The master seed is expanded into per-(stream, iteration) sub-seeds using
/// BLAKE3. Derivation is hash-based rather than order-dependent.
#[derive(Debug, Clone)]
pub struct RngHierarchy {
    master_seed: u64,
}

impl RngHierarchy {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    /// Derive a deterministic sub-seed for a named stream.
    pub fn sub_seed(&self, stream: &str, iteration: u64) -> u64 {
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.master_seed.to_le_bytes());
        hasher.update(stream.as_bytes());
        hasher.update(&iteration.to_le_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&hash.as_bytes()[..8]);
        u64::from_le_bytes(bytes)
    }

    /// Create a seeded StdRng from a sub-seed.
    pub fn rng_for(&self, stream: &str, iteration: u64) -> StdRng {
        StdRng::seed_from_u64(self.sub_seed(stream, iteration))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn sub_seeds_are_deterministic() {
        let hierarchy = RngHierarchy::new(42);
        assert_eq!(
            hierarchy.sub_seed("hmm_init", 0),
            hierarchy.sub_seed("hmm_init", 0)
        );
    }

    #[test]
    fn different_streams_different_seeds() {
        let hierarchy = RngHierarchy::new(42);
        assert_ne!(
            hierarchy.sub_seed("hmm_init", 0),
            hierarchy.sub_seed("bootstrap", 0)
        );
    }

    #[test]
    fn different_iterations_different_seeds() {
        let hierarchy = RngHierarchy::new(42);
        assert_ne!(
            hierarchy.sub_seed("hmm_init", 0),
            hierarchy.sub_seed("hmm_init", 1)
        );
    }

    #[test]
    fn derivation_order_independent() {
        let hierarchy = RngHierarchy::new(42);

        let a_first = hierarchy.sub_seed("a", 0);
        let b_second = hierarchy.sub_seed("b", 0);

        let b_first = hierarchy.sub_seed("b", 0);
        let a_second = hierarchy.sub_seed("a", 0);

        assert_eq!(a_first, a_second);
        assert_eq!(b_first, b_second);
    }

    #[test]
    fn different_master_seeds_different_output() {
        let h1 = RngHierarchy::new(42);
        let h2 = RngHierarchy::new(43);
        assert_ne!(h1.sub_seed("hmm_init", 0), h2.sub_seed("hmm_init", 0));
    }

    #[test]
    fn rng_streams_replay() {
        let hierarchy = RngHierarchy::new(7);
        let x: u64 = hierarchy.rng_for("hmm_init", 0).gen();
        let y: u64 = hierarchy.rng_for("hmm_init", 0).gen();
        assert_eq!(x, y);
    }
}
