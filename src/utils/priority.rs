//! Priority/latency optimizer: raises process priority and keeps resident
//! memory from being reclaimed while a sweep is being timed.
//!
//! Escalation walks [`PriorityClass::ESCALATION`] from the top and keeps
//! the first tier the OS accepts. Without privileges every tier is usually
//! denied, and the sweep runs at normal priority.

use super::optimizer::{LatencyMode, Optimizer, PriorityBackend, PriorityClass, ScheduleGrant};

// ============================================================================
// Unix implementation using libc (nice values, mlockall on Linux)
// ============================================================================

#[cfg(unix)]
mod platform {
    use super::{LatencyMode, PriorityClass};

    pub fn priority() -> Option<i32> {
        // For the calling process getpriority cannot fail, and -1 is a
        // valid nice value, so the result is taken as is.
        Some(unsafe { libc::getpriority(libc::PRIO_PROCESS, 0) } as i32)
    }

    pub fn set_priority(value: i32) -> bool {
        unsafe { libc::setpriority(libc::PRIO_PROCESS, 0, value as libc::c_int) == 0 }
    }

    pub fn priority_value(class: PriorityClass) -> i32 {
        match class {
            PriorityClass::RealTime => -19,
            PriorityClass::High => -11,
            PriorityClass::AboveNormal => -5,
        }
    }

    /// Lower nice values run first.
    pub fn outranks(candidate: i32, current: i32) -> bool {
        candidate < current
    }

    /// Locked memory reported by the kernel, in kB.
    #[cfg(target_os = "linux")]
    fn locked_kib() -> Option<u64> {
        let status = std::fs::read_to_string("/proc/self/status").ok()?;
        status
            .lines()
            .find_map(|line| line.strip_prefix("VmLck:"))
            .and_then(|rest| rest.trim().trim_end_matches("kB").trim().parse().ok())
    }

    #[cfg(target_os = "linux")]
    pub fn latency_mode() -> Option<LatencyMode> {
        locked_kib().map(|kib| {
            if kib > 0 {
                LatencyMode::SustainedLowPause
            } else {
                LatencyMode::Default
            }
        })
    }

    /// Future mappings are only locked when the lock limit is unbounded;
    /// otherwise a locked-future process can fail ordinary allocations.
    #[cfg(target_os = "linux")]
    fn lock_flags() -> libc::c_int {
        let unbounded = unsafe {
            let mut limit: libc::rlimit = std::mem::zeroed();
            libc::getrlimit(libc::RLIMIT_MEMLOCK, &mut limit) == 0
                && limit.rlim_cur == libc::RLIM_INFINITY
        };
        if unbounded {
            libc::MCL_CURRENT | libc::MCL_FUTURE
        } else {
            libc::MCL_CURRENT
        }
    }

    #[cfg(target_os = "linux")]
    pub fn set_latency_mode(mode: LatencyMode) -> bool {
        if latency_mode() == Some(mode) {
            return true;
        }
        unsafe {
            match mode {
                LatencyMode::SustainedLowPause => libc::mlockall(lock_flags()) == 0,
                LatencyMode::Default => libc::munlockall() == 0,
            }
        }
    }

    #[cfg(not(target_os = "linux"))]
    pub fn latency_mode() -> Option<LatencyMode> {
        None
    }

    #[cfg(not(target_os = "linux"))]
    pub fn set_latency_mode(_mode: LatencyMode) -> bool {
        false
    }
}

// ============================================================================
// Windows implementation (priority classes)
// ============================================================================

#[cfg(windows)]
mod platform {
    use super::{LatencyMode, PriorityClass};

    type HANDLE = *mut std::ffi::c_void;
    type DWORD = u32;
    type BOOL = i32;

    const IDLE_PRIORITY_CLASS: DWORD = 0x0040;
    const BELOW_NORMAL_PRIORITY_CLASS: DWORD = 0x4000;
    const NORMAL_PRIORITY_CLASS: DWORD = 0x0020;
    const ABOVE_NORMAL_PRIORITY_CLASS: DWORD = 0x8000;
    const HIGH_PRIORITY_CLASS: DWORD = 0x0080;
    const REALTIME_PRIORITY_CLASS: DWORD = 0x0100;

    extern "system" {
        fn GetCurrentProcess() -> HANDLE;
        fn GetPriorityClass(hProcess: HANDLE) -> DWORD;
        fn SetPriorityClass(hProcess: HANDLE, dwPriorityClass: DWORD) -> BOOL;
    }

    fn rank(class: DWORD) -> u8 {
        match class {
            IDLE_PRIORITY_CLASS => 0,
            BELOW_NORMAL_PRIORITY_CLASS => 1,
            NORMAL_PRIORITY_CLASS => 2,
            ABOVE_NORMAL_PRIORITY_CLASS => 3,
            HIGH_PRIORITY_CLASS => 4,
            REALTIME_PRIORITY_CLASS => 5,
            _ => 2,
        }
    }

    pub fn priority() -> Option<i32> {
        match unsafe { GetPriorityClass(GetCurrentProcess()) } {
            0 => None,
            class => Some(class as i32),
        }
    }

    pub fn set_priority(value: i32) -> bool {
        unsafe { SetPriorityClass(GetCurrentProcess(), value as DWORD) != 0 }
    }

    pub fn priority_value(class: PriorityClass) -> i32 {
        let raw = match class {
            PriorityClass::RealTime => REALTIME_PRIORITY_CLASS,
            PriorityClass::High => HIGH_PRIORITY_CLASS,
            PriorityClass::AboveNormal => ABOVE_NORMAL_PRIORITY_CLASS,
        };
        raw as i32
    }

    pub fn outranks(candidate: i32, current: i32) -> bool {
        rank(candidate as DWORD) > rank(current as DWORD)
    }

    pub fn latency_mode() -> Option<LatencyMode> {
        None
    }

    pub fn set_latency_mode(_mode: LatencyMode) -> bool {
        false
    }
}

// ============================================================================
// Fallback for unsupported platforms
// ============================================================================

#[cfg(not(any(unix, windows)))]
mod platform {
    use super::{LatencyMode, PriorityClass};

    pub fn priority() -> Option<i32> {
        None
    }
    pub fn set_priority(_value: i32) -> bool {
        false
    }
    pub fn priority_value(_class: PriorityClass) -> i32 {
        0
    }
    pub fn outranks(_candidate: i32, _current: i32) -> bool {
        false
    }
    pub fn latency_mode() -> Option<LatencyMode> {
        None
    }
    pub fn set_latency_mode(_mode: LatencyMode) -> bool {
        false
    }
}

// ============================================================================
// Native backend
// ============================================================================

/// Priority backend for the running OS.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativePriority;

impl PriorityBackend for NativePriority {
    fn priority(&self) -> Option<i32> {
        platform::priority()
    }

    fn try_set_priority(&self, value: i32) -> bool {
        // Windows silently downgrades a realtime request, so read it back
        platform::set_priority(value) && platform::priority() == Some(value)
    }

    fn priority_value(&self, class: PriorityClass) -> i32 {
        platform::priority_value(class)
    }

    fn outranks(&self, candidate: i32, current: i32) -> bool {
        platform::outranks(candidate, current)
    }

    fn latency_mode(&self) -> Option<LatencyMode> {
        platform::latency_mode()
    }

    fn set_latency_mode(&self, mode: LatencyMode) -> bool {
        platform::set_latency_mode(mode)
    }
}

// ============================================================================
// RAII Guard
// ============================================================================

/// Raises priority and switches the latency mode on creation, restores both
/// on drop.
pub struct PriorityOptimizer<B: PriorityBackend = NativePriority> {
    backend: B,
    grant: Option<ScheduleGrant>,
    granted: Option<PriorityClass>,
    low_pause: bool,
}

impl PriorityOptimizer<NativePriority> {
    pub fn acquire() -> Self {
        Self::acquire_with(NativePriority)
    }
}

impl<B: PriorityBackend> PriorityOptimizer<B> {
    pub fn acquire_with(backend: B) -> Self {
        let original_priority = backend.priority();
        let original_latency = backend.latency_mode();

        // Without a readable starting point there is nothing to restore to,
        // so escalation is skipped entirely.
        let granted = original_priority.and_then(|current| {
            PriorityClass::ESCALATION
                .into_iter()
                .filter(|&class| backend.outranks(backend.priority_value(class), current))
                .find(|&class| backend.try_set_priority(backend.priority_value(class)))
        });

        let low_pause = original_latency.is_some()
            && backend.set_latency_mode(LatencyMode::SustainedLowPause);

        match granted {
            Some(class) => tracing::debug!(class = class.name(), "raised process priority"),
            None => tracing::debug!("priority escalation denied"),
        }
        tracing::debug!(low_pause, "latency mode");

        Self {
            grant: Some(ScheduleGrant {
                priority: granted.and(original_priority),
                latency_mode: original_latency,
                ..ScheduleGrant::default()
            }),
            backend,
            granted,
            low_pause,
        }
    }

    /// The priority tier that was granted, if any.
    pub fn granted(&self) -> Option<PriorityClass> {
        self.granted
    }

    /// Whether the sustained low-pause latency mode is active.
    pub fn is_low_pause(&self) -> bool {
        self.low_pause
    }
}

impl<B: PriorityBackend> Optimizer for PriorityOptimizer<B> {
    fn release(&mut self) {
        let Some(grant) = self.grant.take() else {
            return;
        };
        if let Some(mode) = grant.latency_mode {
            let _ = self.backend.set_latency_mode(mode);
        }
        if let Some(priority) = grant.priority {
            let _ = self.backend.try_set_priority(priority);
        }
        self.granted = None;
        self.low_pause = false;
    }

    fn is_released(&self) -> bool {
        self.grant.is_none()
    }
}

impl<B: PriorityBackend> Drop for PriorityOptimizer<B> {
    fn drop(&mut self) {
        self.release();
    }
}
