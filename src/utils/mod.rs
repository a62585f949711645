//! Utility modules for measuring and running benchmarks.

pub mod clock;
pub mod cpu_affinity;
pub mod optimizer;
pub mod priority;
pub mod random;
pub mod runner;
pub mod stats;
pub mod tui;

// Re-export commonly used items
pub use clock::{ensure_high_resolution, ClockSession};
pub use cpu_affinity::AffinityOptimizer;
pub use optimizer::{CpuSet, LatencyMode, Optimizer, PriorityClass};
pub use priority::PriorityOptimizer;
pub use runner::{export_csv, run_benchmarks, CaseResult, RunOptions};
pub use stats::{time_seed, trimmed_mean};

/// Serializes tests that change the real process scheduling state.
#[cfg(test)]
pub(crate) static NATIVE_SCHEDULER_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());
