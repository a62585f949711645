//! Monotonic clock used for throughput samples.
//!
//! Timestamps come from `std::time::Instant`. Before any measurement the
//! driver checks that the underlying clock resolves at least
//! [`HIGH_RESOLUTION_THRESHOLD`]; a coarser clock would turn most short
//! samples into zero-length intervals.

use std::time::{Duration, Instant};

use crate::error::{BenchError, Result};

/// Coarsest clock step accepted as "high resolution".
pub const HIGH_RESOLUTION_THRESHOLD: Duration = Duration::from_micros(1);

/// Default idle period after which a [`ClockSession`] is considered stale.
pub const DEFAULT_MAX_IDLE: Duration = Duration::from_secs(10);

// ============================================================================
// Resolution detection
// ============================================================================

#[cfg(unix)]
fn platform_resolution() -> Option<Duration> {
    unsafe {
        let mut ts: libc::timespec = std::mem::zeroed();
        if libc::clock_getres(libc::CLOCK_MONOTONIC, &mut ts) == 0 {
            Some(Duration::new(ts.tv_sec as u64, ts.tv_nsec as u32))
        } else {
            None
        }
    }
}

#[cfg(not(unix))]
fn platform_resolution() -> Option<Duration> {
    None
}

/// Smallest non-zero step observed between consecutive `Instant` reads.
fn probe_resolution() -> Duration {
    let mut smallest = Duration::MAX;
    for _ in 0..16 {
        let start = Instant::now();
        let mut next = Instant::now();
        while next == start {
            next = Instant::now();
        }
        smallest = smallest.min(next.duration_since(start));
    }
    smallest
}

/// Resolution of the monotonic clock backing `Instant`.
pub fn resolution() -> Duration {
    platform_resolution()
        .filter(|r| !r.is_zero())
        .unwrap_or_else(probe_resolution)
}

/// Whether the clock is fine-grained enough to time single hash calls.
pub fn is_high_resolution() -> bool {
    resolution() <= HIGH_RESOLUTION_THRESHOLD
}

/// Fail with [`BenchError::ClockResolution`] unless the clock is high resolution.
pub fn ensure_high_resolution() -> Result<()> {
    let resolution = resolution();
    if resolution <= HIGH_RESOLUTION_THRESHOLD {
        Ok(())
    } else {
        Err(BenchError::ClockResolution { resolution })
    }
}

/// Milliseconds between two timestamps as a float.
#[inline(always)]
pub fn elapsed_millis(start: Instant, end: Instant) -> f64 {
    end.saturating_duration_since(start).as_secs_f64() * 1000.0
}

// ============================================================================
// Idle-bounded session
// ============================================================================

/// A timing scope that goes stale after `max_idle` without activity.
///
/// Reading the clock through a stale session reopens it. Timestamps are
/// absolute `Instant`s, so reopening never changes a measured interval.
pub struct ClockSession {
    max_idle: Duration,
    last_activity: Instant,
    reopened: usize,
}

impl ClockSession {
    pub fn open(max_idle: Duration) -> Self {
        Self {
            max_idle,
            last_activity: Instant::now(),
            reopened: 0,
        }
    }

    /// Read the clock, refreshing the session's activity mark.
    #[inline(always)]
    pub fn now(&mut self) -> Instant {
        let now = Instant::now();
        if now.saturating_duration_since(self.last_activity) > self.max_idle {
            self.reopened += 1;
            tracing::trace!(
                idle = ?self.max_idle,
                reopened = self.reopened,
                "clock session stale, reopening"
            );
        }
        self.last_activity = now;
        now
    }

    /// Whether the session has been idle longer than its bound.
    #[cfg(test)]
    pub fn is_stale(&self) -> bool {
        self.last_activity.elapsed() > self.max_idle
    }

    /// How many times the session was reopened after going stale.
    #[cfg(test)]
    pub fn reopen_count(&self) -> usize {
        self.reopened
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_resolution_is_positive() {
        assert!(!resolution().is_zero());
    }

    #[test]
    fn test_session_timestamps_monotonic() {
        let mut session = ClockSession::open(DEFAULT_MAX_IDLE);
        let a = session.now();
        let b = session.now();
        assert!(b >= a);
        assert!(elapsed_millis(a, b) >= 0.0);
        assert_eq!(session.reopen_count(), 0);
    }

    #[test]
    fn test_session_goes_stale_and_reopens() {
        let mut session = ClockSession::open(Duration::from_millis(1));
        thread::sleep(Duration::from_millis(5));
        assert!(session.is_stale());

        session.now();
        assert_eq!(session.reopen_count(), 1);
    }

    #[test]
    fn test_elapsed_millis_saturates() {
        let a = Instant::now();
        thread::sleep(Duration::from_millis(2));
        let b = Instant::now();
        assert!(elapsed_millis(a, b) >= 2.0);
        assert_eq!(elapsed_millis(b, a), 0.0);
    }
}
