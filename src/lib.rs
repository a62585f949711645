//! # Hash-Throughput
//!
//! Throughput benchmarks for non-cryptographic and cryptographic hashes,
//! measured on a pinned, priority-raised process with outlier trimming.

pub mod config;
pub mod error;
pub mod hashes;
pub mod measure;
pub mod registry;
pub mod utils;

pub use error::{BenchError, Result};

/// Re-export tui from utils
pub use utils::tui;

/// Re-export run_benchmarks from utils::runner
pub use utils::runner::run_benchmarks;

/// Re-export commonly used items
pub mod prelude {
    pub use crate::config::{BenchConfig, ChunkBand, Increment};
    pub use crate::measure::{Averager, MeasurementPoint, Sweeper};
    pub use crate::registry::{build_registry, BenchmarkCase, HashInstance, HashRegistry};
    pub use crate::utils::runner::{run_benchmarks, RunOptions};
}

#[cfg(test)]
mod tests {
    use crate::registry::build_registry;

    #[test]
    fn test_all_hashes_accept_every_alignment() {
        let registry = build_registry();
        let storage: Vec<u8> = (0..=255u8).cycle().take(4096 + 8).collect();

        for case in registry.all() {
            let hash = case.instantiate(0);
            for offset in 0..8 {
                let digest = hash.compute_hash(&storage[offset..offset + 4096]);
                assert!(!digest.is_empty(), "case {} returned no bytes", case.name);
            }
        }
    }
}
