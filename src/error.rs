//! Error type shared by the library and the `hash-bench` binary.
//!
//! Only conditions a caller can act on are errors. Denied scheduling
//! escalations and rejected timing samples are reported as `bool`/`Option`
//! values by the modules that produce them.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BenchError {
    /// The monotonic clock is too coarse to time a single hash call.
    #[error("The clock doesn't support high resolution (observed resolution {resolution:?}).")]
    ClockResolution { resolution: Duration },

    #[error("Invalid benchmark configuration: {0}")]
    InvalidConfig(String),

    #[error("Hash '{0}' not found")]
    UnknownHash(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, BenchError>;
