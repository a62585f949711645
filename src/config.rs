//! Benchmark configuration.
//!
//! Everything the sweeps need is carried in a [`BenchConfig`] value that is
//! built once at startup and passed down by reference.

use std::fmt;
use std::ops::Range;
use std::time::Duration;

use crate::error::{BenchError, Result};
use crate::utils::clock::DEFAULT_MAX_IDLE;
use crate::utils::stats::time_seed;

/// Key length of the bulk sweep, in bytes.
pub const BULK_KEY_LENGTH: usize = 256 * 1024;
/// Repetitions per alignment in the bulk sweep.
pub const BULK_REPETITIONS: usize = 5000;
/// Untimed averaging runs before each sweep.
pub const WARMUP_ITERATIONS: usize = 3;

/// How the chunk sweep advances from one key length to the next.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Increment {
    Add(usize),
    Double,
}

impl Increment {
    /// Next key length after `offset`. Always strictly greater than
    /// `offset`, so a band is guaranteed to terminate.
    pub fn next(&self, offset: usize) -> usize {
        let next = match *self {
            Increment::Add(step) => offset.saturating_add(step),
            Increment::Double => offset.saturating_mul(2),
        };
        next.max(offset.saturating_add(1))
    }
}

impl fmt::Display for Increment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Increment::Add(step) => write!(f, "+{}", step),
            Increment::Double => write!(f, "x2"),
        }
    }
}

/// One contiguous region of the chunk sweep.
///
/// A band starts where the previous one ended (the first at 0) and stops
/// before `end`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkBand {
    pub increment: Increment,
    pub end: usize,
    pub repetitions: usize,
}

impl ChunkBand {
    pub const fn new(increment: Increment, end: usize, repetitions: usize) -> Self {
        Self {
            increment,
            end,
            repetitions,
        }
    }

    /// Key lengths measured in this band when it starts at `start`.
    pub fn offsets(&self, start: usize) -> impl Iterator<Item = usize> + '_ {
        std::iter::successors(Some(start), move |&offset| Some(self.increment.next(offset)))
            .take_while(move |&offset| offset < self.end)
    }
}

/// Default band layout: dense steps for tiny keys, doubling for large ones.
pub fn default_chunk_bands() -> Vec<ChunkBand> {
    vec![
        ChunkBand::new(Increment::Add(1), 32, 200_000),
        ChunkBand::new(Increment::Add(2), 64, 100_000),
        ChunkBand::new(Increment::Add(4), 128, 50_000),
        ChunkBand::new(Increment::Add(8), 256, 25_000),
        ChunkBand::new(Increment::Double, 65536, 12_500),
    ]
}

/// Configuration for a benchmark run
#[derive(Clone, Debug)]
pub struct BenchConfig {
    /// Key length of the bulk sweep (default: 256 KiB)
    pub key_length: usize,
    /// Repetitions per bulk measurement and per warm-up run (default: 5000)
    pub repetitions: usize,
    /// Untimed averaging runs before each sweep (default: 3)
    pub warmup_iterations: usize,
    /// Idle period after which a clock session goes stale
    pub clock_max_idle: Duration,
    /// Seed for the buffer filler
    pub seed: u64,
    /// Ordered chunk sweep bands
    pub chunk_bands: Vec<ChunkBand>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            key_length: BULK_KEY_LENGTH,
            repetitions: BULK_REPETITIONS,
            warmup_iterations: WARMUP_ITERATIONS,
            clock_max_idle: DEFAULT_MAX_IDLE,
            seed: time_seed(),
            chunk_bands: default_chunk_bands(),
        }
    }
}

impl BenchConfig {
    /// Check the band layout. A zero key length is accepted; its points
    /// simply produce no speed.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_bands.is_empty() {
            return Err(BenchError::InvalidConfig(
                "at least one chunk band is required".to_string(),
            ));
        }

        let mut start = 0;
        for (idx, band) in self.chunk_bands.iter().enumerate() {
            if band.end <= start {
                return Err(BenchError::InvalidConfig(format!(
                    "chunk band {} ends at {} but starts at {}; band ends must strictly increase",
                    idx, band.end, start
                )));
            }
            start = band.end;
        }
        Ok(())
    }

    /// `start..end` key length range of every band, in order.
    pub fn band_ranges(&self) -> Vec<Range<usize>> {
        let mut start = 0;
        self.chunk_bands
            .iter()
            .map(|band| {
                let range = start..band.end;
                start = band.end;
                range
            })
            .collect()
    }

    /// Largest key length the chunk sweep can reach (exclusive).
    pub fn max_chunk_size(&self) -> usize {
        self.chunk_bands.iter().map(|b| b.end).max().unwrap_or(0)
    }

    /// `(min, max)` repetitions across bands.
    pub fn chunk_repetition_span(&self) -> Option<(usize, usize)> {
        let min = self.chunk_bands.iter().map(|b| b.repetitions).min()?;
        let max = self.chunk_bands.iter().map(|b| b.repetitions).max()?;
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(BenchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_band_ranges_contiguous() {
        let config = BenchConfig::default();
        let ranges = config.band_ranges();

        assert_eq!(ranges.first().map(|r| r.start), Some(0));
        for pair in ranges.windows(2) {
            assert_eq!(pair[1].start, pair[0].end);
            assert!(pair[0].start < pair[0].end);
        }
        assert_eq!(ranges.last().map(|r| r.end), Some(config.max_chunk_size()));
    }

    #[test]
    fn test_band_offsets() {
        let band = ChunkBand::new(Increment::Add(8), 256, 1);
        let offsets: Vec<usize> = band.offsets(128).collect();
        assert_eq!(offsets.len(), 16);
        assert_eq!(offsets[0], 128);
        assert_eq!(offsets[15], 248);

        let doubling = ChunkBand::new(Increment::Double, 65536, 1);
        let offsets: Vec<usize> = doubling.offsets(256).collect();
        assert_eq!(offsets, vec![256, 512, 1024, 2048, 4096, 8192, 16384, 32768]);
    }

    #[test]
    fn test_doubling_from_zero_terminates() {
        let band = ChunkBand::new(Increment::Double, 4, 1);
        let offsets: Vec<usize> = band.offsets(0).collect();
        assert_eq!(offsets, vec![0, 1, 2]);
    }

    #[test]
    fn test_rejects_non_increasing_bands() {
        let config = BenchConfig {
            chunk_bands: vec![
                ChunkBand::new(Increment::Add(1), 32, 1),
                ChunkBand::new(Increment::Add(1), 32, 1),
            ],
            ..BenchConfig::default()
        };
        assert!(matches!(config.validate(), Err(BenchError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_empty_bands() {
        let no_bands = BenchConfig {
            chunk_bands: Vec::new(),
            ..BenchConfig::default()
        };
        assert!(no_bands.validate().is_err());
    }

    #[test]
    fn test_zero_key_length_is_valid() {
        let zero_length = BenchConfig {
            key_length: 0,
            ..BenchConfig::default()
        };
        assert!(zero_length.validate().is_ok());
    }

    #[test]
    fn test_repetition_span() {
        assert_eq!(
            BenchConfig::default().chunk_repetition_span(),
            Some((12_500, 200_000))
        );
    }

    #[test]
    fn test_increment_display() {
        assert_eq!(Increment::Add(4).to_string(), "+4");
        assert_eq!(Increment::Double.to_string(), "x2");
    }
}
