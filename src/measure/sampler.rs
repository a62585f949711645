//! Single-sample throughput measurement.

use std::hint::black_box;

use crate::registry::HashInstance;
use crate::utils::clock::{elapsed_millis, ClockSession};

/// Time one hash of `buffer[offset..offset + length]` and return its speed
/// in bytes per second.
///
/// A zero-length key has no meaningful speed and yields `NaN`. An interval
/// too short for the clock yields infinity. Both are non-finite and get
/// dropped by the averager.
#[inline(never)]
pub fn sample_speed(
    hash: &dyn HashInstance,
    buffer: &[u8],
    offset: usize,
    length: usize,
    session: &mut ClockSession,
) -> f64 {
    if length == 0 {
        return f64::NAN;
    }

    let data = &buffer[offset..offset + length];

    let start = session.now();
    let digest = hash.compute_hash(black_box(data));
    let end = session.now();
    black_box(digest);

    speed_from_millis(length, elapsed_millis(start, end))
}

/// `length * 1000 / millis`, the bytes/second for one interval.
#[inline(always)]
pub fn speed_from_millis(length: usize, millis: f64) -> f64 {
    (length as f64 * 1000.0) / millis
}

/// Whether a raw sample can take part in an average.
#[inline(always)]
pub fn is_valid_sample(speed: f64) -> bool {
    speed.is_finite() && speed >= 0.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hashes::{DummyHash, Fnv1a64};
    use crate::utils::clock::DEFAULT_MAX_IDLE;

    #[test]
    fn test_zero_length_is_not_finite() {
        let buffer = [0u8; 16];
        let mut session = ClockSession::open(DEFAULT_MAX_IDLE);
        let speed = sample_speed(&DummyHash, &buffer, 0, 0, &mut session);
        assert!(!is_valid_sample(speed));
    }

    #[test]
    fn test_speed_from_millis() {
        assert_eq!(speed_from_millis(1000, 1.0), 1_000_000.0);
        assert_eq!(speed_from_millis(512, 0.5), 1_024_000.0);
        assert!(speed_from_millis(64, 0.0).is_infinite());
    }

    #[test]
    fn test_sample_is_non_negative() {
        let buffer = vec![0xabu8; 64 * 1024];
        let mut session = ClockSession::open(DEFAULT_MAX_IDLE);
        let speed = sample_speed(&Fnv1a64::new(0), &buffer, 3, 60 * 1024, &mut session);
        assert!(speed > 0.0);
    }

    #[test]
    fn test_validity_rules() {
        assert!(is_valid_sample(0.0));
        assert!(is_valid_sample(1.5e9));
        assert!(!is_valid_sample(-1.0));
        assert!(!is_valid_sample(f64::NAN));
        assert!(!is_valid_sample(f64::INFINITY));
    }
}
