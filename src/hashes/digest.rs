//! Cryptographic digests from the RustCrypto crates.
//!
//! Neither algorithm takes a seed, so the seed bytes are absorbed ahead of
//! the message.

use crate::registry::HashInstance;
use sha2::{Digest, Sha256};
use sha3::Sha3_256;

#[derive(Clone, Copy, Debug)]
pub struct Sha256Hash {
    seed: u32,
}

impl Sha256Hash {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }
}

impl HashInstance for Sha256Hash {
    fn compute_hash(&self, data: &[u8]) -> Vec<u8> {
        let mut hasher = Sha256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(data);
        hasher.finalize().to_vec()
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Sha3Hash {
    seed: u32,
}

impl Sha3Hash {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }
}

impl HashInstance for Sha3Hash {
    fn compute_hash(&self, data: &[u8]) -> Vec<u8> {
        let mut hasher = Sha3_256::new();
        hasher.update(self.seed.to_le_bytes());
        hasher.update(data);
        hasher.finalize().to_vec()
    }
}
