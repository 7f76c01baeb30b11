//! Alias and content generators.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

use crate::constants::{
    ALIAS_GENERATED_PREFIX, CONTENT_GENERATED_BYTES_MAX, TEST_SEED_DEFAULT, TEST_SEED_ENV_VAR,
};

/// An alias no other call has returned.
#[must_use]
pub fn unique_alias() -> String {
    format!("{ALIAS_GENERATED_PREFIX}{}", Uuid::new_v4().simple())
}

/// Deterministic generator of binary payloads.
#[derive(Debug, Clone)]
pub struct ContentGenerator {
    seed: u64,
    rng: ChaCha8Rng,
}

impl ContentGenerator {
    /// Create a generator with an explicit seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed from `QDB_TEST_SEED`, or the default seed. The seed is logged.
    #[must_use]
    pub fn from_env() -> Self {
        let seed = std::env::var(TEST_SEED_ENV_VAR)
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(TEST_SEED_DEFAULT);
        tracing::info!(seed, "content generator seeded");
        Self::with_seed(seed)
    }

    /// The seed this generator started from.
    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// `len` random bytes.
    ///
    /// # Panics
    /// Panics if len exceeds `CONTENT_GENERATED_BYTES_MAX`.
    pub fn content(&mut self, len: usize) -> Vec<u8> {
        assert!(
            len <= CONTENT_GENERATED_BYTES_MAX,
            "content {len} bytes exceeds max {CONTENT_GENERATED_BYTES_MAX}"
        );
        let mut buf = vec![0u8; len];
        self.rng.fill_bytes(&mut buf);
        buf
    }

    /// Random bytes of a random length in `1..=max_len`.
    ///
    /// # Panics
    /// Panics if max_len is zero or exceeds `CONTENT_GENERATED_BYTES_MAX`.
    pub fn content_up_to(&mut self, max_len: usize) -> Vec<u8> {
        assert!(max_len > 0, "max_len must be positive");
        let len = self.rng.gen_range(1..=max_len);
        self.content(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_alias() {
        let a = unique_alias();
        let b = unique_alias();
        assert_ne!(a, b);
        assert!(a.starts_with(ALIAS_GENERATED_PREFIX));
    }

    #[test]
    fn test_same_seed_same_content() {
        let mut a = ContentGenerator::with_seed(42);
        let mut b = ContentGenerator::with_seed(42);
        assert_eq!(a.content(32), b.content(32));
        assert_eq!(a.content_up_to(100), b.content_up_to(100));
    }

    #[test]
    fn test_content_up_to_bounds() {
        let mut generator = ContentGenerator::with_seed(7);
        for _ in 0..100 {
            let content = generator.content_up_to(16);
            assert!(!content.is_empty() && content.len() <= 16);
        }
    }

    #[test]
    #[should_panic(expected = "exceeds max")]
    fn test_content_too_large() {
        let mut generator = ContentGenerator::with_seed(1);
        let _ = generator.content(CONTENT_GENERATED_BYTES_MAX + 1);
    }
}
