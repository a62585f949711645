//! Robust averaging of throughput samples.
//!
//! One averaging run owns a single scratch buffer. Every repetition refills
//! the hashed region, builds a fresh hash instance seeded with the
//! repetition index, and takes one sample. Invalid samples are dropped as
//! they arrive; the rest go through a single 2-sigma trim before the mean
//! is taken.

use crate::registry::HashFactory;
use crate::utils::clock::ClockSession;
use crate::utils::random::ByteFiller;
use crate::utils::stats;
use std::time::Duration;

use super::sampler::{is_valid_sample, sample_speed};

/// Alignments are taken modulo this many bytes.
pub const ALIGNMENT_MODULUS: usize = 256;
/// Extra bytes allocated so any alignment fits behind the rounded-up start.
pub const BUFFER_MARGIN: usize = 2 * ALIGNMENT_MODULUS;

/// Everything that determines one averaging run.
#[derive(Clone, Copy)]
pub struct MeasurementPoint {
    pub factory: HashFactory,
    pub length: usize,
    /// Start address of the hashed region modulo [`ALIGNMENT_MODULUS`].
    pub alignment: usize,
    pub repetitions: usize,
}

impl MeasurementPoint {
    pub fn new(factory: HashFactory, length: usize, alignment: usize, repetitions: usize) -> Self {
        Self {
            factory,
            length,
            alignment: alignment % ALIGNMENT_MODULUS,
            repetitions,
        }
    }
}

/// Over-allocated buffer whose hashed region starts at a chosen alignment.
pub struct AlignedBuffer {
    storage: Vec<u8>,
    offset: usize,
    length: usize,
}

impl AlignedBuffer {
    pub fn new(length: usize, alignment: usize) -> Self {
        let storage = vec![0u8; length + BUFFER_MARGIN];
        let base = storage.as_ptr() as usize;
        let offset =
            base.next_multiple_of(ALIGNMENT_MODULUS) - base + alignment % ALIGNMENT_MODULUS;
        Self {
            storage,
            offset,
            length,
        }
    }

    /// Offset of the hashed region inside [`AlignedBuffer::as_slice`].
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The whole backing storage, margin included.
    pub fn as_slice(&self) -> &[u8] {
        &self.storage
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.storage
    }

    /// Address of the first hashed byte.
    pub fn region_address(&self) -> usize {
        self.storage.as_ptr() as usize + self.offset
    }
}

/// Turns measurement points into trimmed mean speeds.
pub struct Averager {
    filler: ByteFiller,
    clock_max_idle: Duration,
}

impl Averager {
    pub fn new(seed: u64, clock_max_idle: Duration) -> Self {
        Self {
            filler: ByteFiller::new(seed),
            clock_max_idle,
        }
    }

    /// Collect the raw samples of one run, dropping invalid ones.
    pub fn collect_samples(&mut self, point: &MeasurementPoint) -> Vec<f64> {
        let mut buffer = AlignedBuffer::new(point.length, point.alignment);
        let offset = buffer.offset();
        let mut samples = Vec::with_capacity(point.repetitions);

        for repetition in 0..point.repetitions {
            self.filler.fill(buffer.as_mut_slice(), offset, point.length);

            let hash = (point.factory)(repetition as u32);

            let mut session = ClockSession::open(self.clock_max_idle);
            let speed = sample_speed(
                hash.as_ref(),
                buffer.as_slice(),
                offset,
                point.length,
                &mut session,
            );

            if is_valid_sample(speed) {
                samples.push(speed);
            }
        }

        samples
    }

    /// Trimmed mean speed in bytes/second, or `None` when no valid sample
    /// survived (zero repetitions, zero length, clock too coarse).
    pub fn average_speed(&mut self, point: &MeasurementPoint) -> Option<f64> {
        let samples = self.collect_samples(point);
        let collected = samples.len();
        let speed = stats::trimmed_mean(samples);

        tracing::trace!(
            length = point.length,
            alignment = point.alignment,
            repetitions = point.repetitions,
            collected,
            ?speed,
            "averaged measurement point"
        );

        speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::HashInstance;
    use crate::utils::clock::DEFAULT_MAX_IDLE;
    use std::cell::RefCell;

    struct Identity;

    impl HashInstance for Identity {
        fn compute_hash(&self, data: &[u8]) -> Vec<u8> {
            std::hint::black_box(data);
            vec![1]
        }
    }

    fn identity(_seed: u32) -> Box<dyn HashInstance> {
        Box::new(Identity)
    }

    thread_local! {
        static SEEDS: RefCell<Vec<u32>> = const { RefCell::new(Vec::new()) };
    }

    fn fnv(seed: u32) -> Box<dyn HashInstance> {
        Box::new(crate::hashes::Fnv1a32::new(seed))
    }

    fn recording(seed: u32) -> Box<dyn HashInstance> {
        SEEDS.with(|s| s.borrow_mut().push(seed));
        Box::new(Identity)
    }

    #[test]
    fn test_buffer_alignment() {
        for alignment in 0..8 {
            let buffer = AlignedBuffer::new(1024, alignment);
            assert_eq!(buffer.region_address() % ALIGNMENT_MODULUS, alignment);
            assert!(buffer.offset() + buffer.len() <= buffer.as_slice().len());
        }
    }

    #[test]
    fn test_buffer_alignment_wraps() {
        let buffer = AlignedBuffer::new(16, 255);
        assert_eq!(buffer.region_address() % ALIGNMENT_MODULUS, 255);
        assert!(buffer.offset() + buffer.len() <= buffer.as_slice().len());

        let point = MeasurementPoint::new(identity, 16, 260, 1);
        assert_eq!(point.alignment, 4);
    }

    #[test]
    fn test_seeds_follow_repetition_index() {
        SEEDS.with(|s| s.borrow_mut().clear());
        let mut averager = Averager::new(1, DEFAULT_MAX_IDLE);
        averager.collect_samples(&MeasurementPoint::new(recording, 64, 0, 5));

        SEEDS.with(|s| assert_eq!(*s.borrow(), vec![0, 1, 2, 3, 4]));
    }

    #[test]
    fn test_zero_length_batch_is_empty() {
        let mut averager = Averager::new(1, DEFAULT_MAX_IDLE);
        let point = MeasurementPoint::new(identity, 0, 0, 50);

        assert!(averager.collect_samples(&point).is_empty());
        assert_eq!(averager.average_speed(&point), None);
    }

    #[test]
    fn test_zero_repetitions_is_empty() {
        let mut averager = Averager::new(1, DEFAULT_MAX_IDLE);
        assert_eq!(
            averager.average_speed(&MeasurementPoint::new(identity, 128, 0, 0)),
            None
        );
    }

    #[test]
    fn test_average_is_positive_and_finite() {
        let mut averager = Averager::new(9, DEFAULT_MAX_IDLE);
        let speed = averager
            .average_speed(&MeasurementPoint::new(fnv, 4096, 3, 200))
            .expect("samples should survive");
        assert!(speed.is_finite());
        assert!(speed > 0.0);
    }
}
