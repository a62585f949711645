//! Scoped scheduling optimizers.
//!
//! An optimizer changes one piece of OS scheduling state when it is
//! acquired and puts it back when it is released. Release happens at most
//! once, never fails visibly, and is also triggered from `Drop` so that
//! early returns and panics restore the previous state.
//!
//! The OS calls sit behind the [`AffinityBackend`] and [`PriorityBackend`]
//! traits. The native implementations live in [`super::cpu_affinity`] and
//! [`super::priority`].

/// A scheduling change that can be undone.
pub trait Optimizer {
    /// Restore the state captured at acquisition.
    ///
    /// The first call restores; later calls do nothing. Restoration
    /// failures are swallowed.
    fn release(&mut self);

    /// Whether [`Optimizer::release`] has already run.
    fn is_released(&self) -> bool;
}

// ============================================================================
// Scheduling state
// ============================================================================

/// Sorted set of logical CPU ids.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CpuSet {
    cpus: Vec<usize>,
}

impl CpuSet {
    pub fn single(cpu: usize) -> Self {
        Self { cpus: vec![cpu] }
    }

    pub fn from_cpus<I: IntoIterator<Item = usize>>(cpus: I) -> Self {
        let mut cpus: Vec<usize> = cpus.into_iter().collect();
        cpus.sort_unstable();
        cpus.dedup();
        Self { cpus }
    }

    pub fn cpus(&self) -> &[usize] {
        &self.cpus
    }

    /// Highest CPU id in the set.
    pub fn last(&self) -> Option<usize> {
        self.cpus.last().copied()
    }
}

/// Memory latency policy applied around timed sections.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LatencyMode {
    /// Whatever the process runs with normally.
    Default,
    /// Resident memory is kept from being reclaimed while measuring.
    SustainedLowPause,
}

/// Priority tiers tried when escalating, highest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PriorityClass {
    RealTime,
    High,
    AboveNormal,
}

impl PriorityClass {
    /// Escalation order.
    pub const ESCALATION: [PriorityClass; 3] = [
        PriorityClass::RealTime,
        PriorityClass::High,
        PriorityClass::AboveNormal,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PriorityClass::RealTime => "realtime",
            PriorityClass::High => "high",
            PriorityClass::AboveNormal => "above-normal",
        }
    }
}

/// Scheduling state captured at acquisition time.
///
/// A field is `Some` only when the owning optimizer must put that value
/// back on release.
#[derive(Debug, Default)]
pub struct ScheduleGrant {
    pub(crate) process_affinity: Option<CpuSet>,
    pub(crate) thread_affinity: Option<CpuSet>,
    pub(crate) priority: Option<i32>,
    pub(crate) latency_mode: Option<LatencyMode>,
}

// ============================================================================
// Backends
// ============================================================================

/// CPU affinity primitives.
pub trait AffinityBackend {
    /// Number of online logical CPUs.
    fn logical_cpu_count(&self) -> Option<usize>;

    /// CPUs the process may run on.
    fn process_affinity(&self) -> Option<CpuSet>;

    fn set_process_affinity(&self, set: &CpuSet) -> bool;

    /// CPUs the calling thread may run on, or `None` when the platform has
    /// no thread-level affinity.
    fn thread_affinity(&self) -> Option<CpuSet>;

    fn set_thread_affinity(&self, set: &CpuSet) -> bool;
}

/// Process priority and memory latency primitives.
///
/// Priorities are raw platform values (a nice value, a priority class
/// constant).
pub trait PriorityBackend {
    fn priority(&self) -> Option<i32>;

    /// Apply `value` and report whether reading it back yields `value`.
    fn try_set_priority(&self, value: i32) -> bool;

    /// Raw platform value for a priority tier.
    fn priority_value(&self, class: PriorityClass) -> i32;

    /// Whether `candidate` schedules ahead of `current`.
    fn outranks(&self, candidate: i32, current: i32) -> bool;

    /// Current latency mode, or `None` when the platform has no such knob.
    fn latency_mode(&self) -> Option<LatencyMode>;

    fn set_latency_mode(&self, mode: LatencyMode) -> bool;
}

// ============================================================================
// In-memory backend for tests
// ============================================================================
