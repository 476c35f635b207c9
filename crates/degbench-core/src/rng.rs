//! Seeded randomness for corpus generation.
//!
//! There is no process-wide generator: every random component receives an
//! [`RngHandle`] built from the run's master seed. Length bucket `i` draws
//! from its own stream, so its corpus depends only on the master seed and `i`.

use std::hash::Hasher;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use siphasher::sip::SipHasher13;

/// A `StdRng` that remembers the seed it was built from.
#[derive(Debug, Clone)]
pub struct RngHandle {
    seed: u64,
    rng: StdRng,
}

impl RngHandle {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Stream for length bucket `index` of a run seeded with `master_seed`.
    pub fn for_bucket(master_seed: u64, index: usize) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, index as u64))
    }

    /// Seed of this stream, as recorded in the run manifest.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// SipHash-1-3 (zero keys) of `(master_seed, substream)`. Stable across
/// platforms and releases; changing it changes every generated corpus.
pub fn derive_substream_seed(master_seed: u64, substream: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(substream);
    hasher.finish()
}
