//! Bulk and chunk sweeps.
//!
//! Each sweep runs inside its own [`PriorityOptimizer`] scope: warm-up
//! first, then the timed measurement points. Results are both written to a
//! [`Report`] and returned for export.

use crate::config::{BenchConfig, Increment};
use crate::registry::HashFactory;
use crate::utils::optimizer::PriorityBackend;
use crate::utils::priority::{NativePriority, PriorityOptimizer};
use crate::utils::stats;
use crate::utils::tui::{format_speed, Report};

use super::averager::{Averager, MeasurementPoint};

/// Number of alignments measured by the bulk sweep.
pub const ALIGNMENT_COUNT: usize = 8;

/// Mean speed at one alignment offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlignmentSpeed {
    pub alignment: usize,
    pub speed: Option<f64>,
}

/// Result of the bulk sweep
#[derive(Clone, Debug, PartialEq)]
pub struct BulkResult {
    pub key_length: usize,
    pub repetitions: usize,
    /// Always [`ALIGNMENT_COUNT`] entries, alignment 0 first.
    pub alignments: Vec<AlignmentSpeed>,
    /// Unweighted mean of the measured alignments.
    pub overall: Option<f64>,
}

/// Result for one chunk band
#[derive(Clone, Debug, PartialEq)]
pub struct BandResult {
    /// First key length of the band
    pub start: usize,
    /// Key length the band stops before
    pub end: usize,
    pub increment: Increment,
    pub repetitions: usize,
    /// Measurement points that produced a speed
    pub points: usize,
    /// Mean of the band's point speeds
    pub speed: Option<f64>,
}

/// Result of the chunk sweep
#[derive(Clone, Debug, PartialEq)]
pub struct ChunkResult {
    pub bands: Vec<BandResult>,
    pub points: usize,
    /// Mean over every point of every band, each point weighted equally.
    pub overall: Option<f64>,
}

/// Runs sweeps for one configuration.
pub struct Sweeper<'a, P: PriorityBackend + Clone = NativePriority> {
    config: &'a BenchConfig,
    priority: P,
    averager: Averager,
}

impl<'a> Sweeper<'a, NativePriority> {
    pub fn new(config: &'a BenchConfig) -> Self {
        Self::with_backend(config, NativePriority)
    }
}

impl<'a, P: PriorityBackend + Clone> Sweeper<'a, P> {
    pub fn with_backend(config: &'a BenchConfig, priority: P) -> Self {
        Self {
            config,
            priority,
            averager: Averager::new(config.seed, config.clock_max_idle),
        }
    }

    /// Untimed runs that let caches, branch predictors and lazily
    /// initialized code settle before measuring.
    fn warm_up(&mut self, factory: HashFactory) {
        let point = MeasurementPoint::new(factory, self.config.key_length, 0, self.config.repetitions);
        for _ in 0..self.config.warmup_iterations {
            std::hint::black_box(self.averager.average_speed(&point));
        }
    }

    /// Measure a fixed key length at alignments `0..8`.
    pub fn bulk(&mut self, factory: HashFactory, report: &mut dyn Report) -> BulkResult {
        let key_length = self.config.key_length;
        let repetitions = self.config.repetitions;

        report.line("[BULK SPEED TEST]");
        report.line(&format!("Keys Length: {} Bytes", key_length));
        report.line(&format!("Repetitions: {}", repetitions));

        let _speed = PriorityOptimizer::acquire_with(self.priority.clone());
        self.warm_up(factory);

        let alignments: Vec<AlignmentSpeed> = (0..ALIGNMENT_COUNT)
            .map(|alignment| {
                let point = MeasurementPoint::new(factory, key_length, alignment, repetitions);
                let speed = self.averager.average_speed(&point);
                report.line(&format!(
                    " - Average Speed Alignment {}: {}",
                    alignment,
                    format_speed(speed)
                ));
                AlignmentSpeed { alignment, speed }
            })
            .collect();

        let measured: Vec<f64> = alignments.iter().filter_map(|a| a.speed).collect();
        let overall = (!measured.is_empty()).then(|| stats::mean(&measured));
        report.line(&format!(" - Average Speed Overall: {}", format_speed(overall)));

        BulkResult {
            key_length,
            repetitions,
            alignments,
            overall,
        }
    }

    /// Measure every key length produced by the configured bands.
    pub fn chunks(&mut self, factory: HashFactory, report: &mut dyn Report) -> ChunkResult {
        let config = self.config;

        report.line("[CHUNKS SPEED TEST]");
        report.line(&format!("Keys Length Span: 0-{} Bytes", config.max_chunk_size()));
        if let Some((min, max)) = config.chunk_repetition_span() {
            report.line(&format!("Repetitions Span: {}-{}", min, max));
        }

        let _speed = PriorityOptimizer::acquire_with(self.priority.clone());
        self.warm_up(factory);

        let mut total_speed = 0.0;
        let mut total_points = 0;
        let mut bands = Vec::with_capacity(config.chunk_bands.len());

        for (band, range) in config.chunk_bands.iter().zip(config.band_ranges()) {
            let mut band_speed = 0.0;
            let mut points = 0;

            for length in band.offsets(range.start) {
                let point = MeasurementPoint::new(factory, length, 0, band.repetitions);
                if let Some(speed) = self.averager.average_speed(&point) {
                    band_speed += speed;
                    points += 1;
                }
            }

            total_speed += band_speed;
            total_points += points;

            let speed = (points > 0).then(|| band_speed / points as f64);
            report.line(&format!(
                " - Average Speed {}-{} Bytes: {}",
                range.start,
                range.end.saturating_sub(1),
                format_speed(speed)
            ));

            bands.push(BandResult {
                start: range.start,
                end: range.end,
                increment: band.increment,
                repetitions: band.repetitions,
                points,
                speed,
            });
        }

        let overall = (total_points > 0).then(|| total_speed / total_points as f64);
        report.line(&format!(" - Average Speed Overall: {}", format_speed(overall)));

        ChunkResult {
            bands,
            points: total_points,
            overall,
        }
    }
}
