//! # Hash Functions
//!
//! Concrete hash implementations used as benchmark cases. Each one takes a
//! 32-bit seed so that every repetition of a measurement runs against a
//! structurally distinct instance.
//!
//! - **DummyHash**: returns a constant; measures harness overhead
//! - **FNV-1a**: byte-at-a-time multiply/xor, 32 and 64 bit
//! - **MurmurHash3 x86_32**: 4-byte blocks with a final avalanche
//! - **SHA-256 / SHA3-256**: cryptographic digests keyed by prefixing the seed

pub mod digest;
pub mod dummy;
pub mod fnv;
pub mod murmur;
#[cfg(test)]
pub mod test;

pub use digest::{Sha256Hash, Sha3Hash};
pub use dummy::DummyHash;
pub use fnv::{Fnv1a32, Fnv1a64};
pub use murmur::Murmur3x86_32;

use crate::registry::{BenchmarkCase, HashInstance};

fn dummy(_seed: u32) -> Box<dyn HashInstance> {
    Box::new(DummyHash)
}

fn fnv1a_32(seed: u32) -> Box<dyn HashInstance> {
    Box::new(Fnv1a32::new(seed))
}

fn fnv1a_64(seed: u32) -> Box<dyn HashInstance> {
    Box::new(Fnv1a64::new(seed))
}

fn murmur3_x86_32(seed: u32) -> Box<dyn HashInstance> {
    Box::new(Murmur3x86_32::new(seed))
}

fn sha256(seed: u32) -> Box<dyn HashInstance> {
    Box::new(Sha256Hash::new(seed))
}

fn sha3_256(seed: u32) -> Box<dyn HashInstance> {
    Box::new(Sha3Hash::new(seed))
}

/// All hash cases, in report order.
pub fn available_cases() -> Vec<BenchmarkCase> {
    vec![
        BenchmarkCase::new("DummyHash", "Constant output, measures harness overhead", dummy),
        BenchmarkCase::new("FNV-1a-32", "Fowler-Noll-Vo 1a, 32-bit", fnv1a_32),
        BenchmarkCase::new("FNV-1a-64", "Fowler-Noll-Vo 1a, 64-bit", fnv1a_64),
        BenchmarkCase::new(
            "MurmurHash3-x86_32",
            "Austin Appleby's MurmurHash3, x86 32-bit",
            murmur3_x86_32,
        ),
        BenchmarkCase::new("SHA-256", "SHA-2 256-bit digest", sha256),
        BenchmarkCase::new("SHA3-256", "SHA-3 256-bit digest", sha3_256),
    ]
}
