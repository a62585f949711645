//! Throughput measurement.
//!
//! - [`sampler`]: one timed hash call turned into a bytes/second figure
//! - [`averager`]: many samples reduced to a 2-sigma trimmed mean
//! - [`sweep`]: the bulk (alignment) and chunk (key length) sweeps

pub mod averager;
pub mod sampler;
pub mod sweep;

pub use averager::{AlignedBuffer, Averager, MeasurementPoint};
pub use sampler::sample_speed;
pub use sweep::{AlignmentSpeed, BandResult, BulkResult, ChunkResult, Sweeper};
