//! Seedable byte filler for measurement buffers.
//!
//! The contents only need to defeat data-dependent shortcuts in hashes,
//! so a fast non-cryptographic generator is used.

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// Fills sub-ranges of a buffer with pseudo-random bytes.
pub struct ByteFiller {
    rng: SmallRng,
}

impl ByteFiller {
    /// Create a filler whose output is fully determined by `seed`.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Overwrite `buffer[offset..offset + length]` with fresh bytes.
    ///
    /// # Panics
    /// Panics if the range is out of bounds.
    pub fn fill(&mut self, buffer: &mut [u8], offset: usize, length: usize) {
        self.rng.fill_bytes(&mut buffer[offset..offset + length]);
    }
}
