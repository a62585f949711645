//! CPU affinity optimizer: pins the process and the calling thread to one
//! logical CPU for the duration of a benchmark run.
//!
//! Implemented manually using platform-specific APIs (libc on Linux,
//! kernel32 on Windows). Other platforms have no usable affinity API and
//! run unpinned.

use super::optimizer::{AffinityBackend, CpuSet, Optimizer, ScheduleGrant};

// ============================================================================
// Linux implementation using libc
// ============================================================================

#[cfg(target_os = "linux")]
mod platform {
    use super::CpuSet;

    fn to_cpu_set(set: &CpuSet) -> libc::cpu_set_t {
        unsafe {
            let mut raw: libc::cpu_set_t = std::mem::zeroed();
            libc::CPU_ZERO(&mut raw);
            for &cpu in set.cpus() {
                if cpu < libc::CPU_SETSIZE as usize {
                    libc::CPU_SET(cpu, &mut raw);
                }
            }
            raw
        }
    }

    fn from_cpu_set(raw: &libc::cpu_set_t) -> CpuSet {
        CpuSet::from_cpus(
            (0..libc::CPU_SETSIZE as usize).filter(|&cpu| unsafe { libc::CPU_ISSET(cpu, raw) }),
        )
    }

    pub fn logical_cpu_count() -> Option<usize> {
        unsafe {
            let num_cpus = libc::sysconf(libc::_SC_NPROCESSORS_ONLN);
            if num_cpus <= 0 {
                return None;
            }
            Some(num_cpus as usize)
        }
    }

    /// Affinity of the thread-group leader, which is what the rest of the
    /// system reports as the process affinity.
    pub fn process_affinity() -> Option<CpuSet> {
        unsafe {
            let mut raw: libc::cpu_set_t = std::mem::zeroed();
            let pid = libc::getpid();
            if libc::sched_getaffinity(pid, std::mem::size_of::<libc::cpu_set_t>(), &mut raw) == 0 {
                Some(from_cpu_set(&raw))
            } else {
                None
            }
        }
    }

    pub fn set_process_affinity(set: &CpuSet) -> bool {
        let raw = to_cpu_set(set);
        unsafe {
            libc::sched_setaffinity(libc::getpid(), std::mem::size_of::<libc::cpu_set_t>(), &raw)
                == 0
        }
    }

    pub fn thread_affinity() -> Option<CpuSet> {
        unsafe {
            let mut raw: libc::cpu_set_t = std::mem::zeroed();
            if libc::pthread_getaffinity_np(
                libc::pthread_self(),
                std::mem::size_of::<libc::cpu_set_t>(),
                &mut raw,
            ) == 0
            {
                Some(from_cpu_set(&raw))
            } else {
                None
            }
        }
    }

    pub fn set_thread_affinity(set: &CpuSet) -> bool {
        let raw = to_cpu_set(set);
        unsafe {
            libc::pthread_setaffinity_np(
                libc::pthread_self(),
                std::mem::size_of::<libc::cpu_set_t>(),
                &raw,
            ) == 0
        }
    }
}

// ============================================================================
// Windows implementation
// ============================================================================

#[cfg(target_os = "windows")]
mod platform {
    use super::CpuSet;

    // Windows API types
    type HANDLE = *mut std::ffi::c_void;
    type DWORD_PTR = usize;
    type BOOL = i32;

    extern "system" {
        fn GetCurrentProcess() -> HANDLE;
        fn GetCurrentThread() -> HANDLE;
        fn GetProcessAffinityMask(
            hProcess: HANDLE,
            lpProcessAffinityMask: *mut DWORD_PTR,
            lpSystemAffinityMask: *mut DWORD_PTR,
        ) -> BOOL;
        fn SetProcessAffinityMask(hProcess: HANDLE, dwProcessAffinityMask: DWORD_PTR) -> BOOL;
        fn SetThreadAffinityMask(hThread: HANDLE, dwThreadAffinityMask: DWORD_PTR) -> DWORD_PTR;
    }

    fn to_mask(set: &CpuSet) -> DWORD_PTR {
        set.cpus()
            .iter()
            .filter(|&&cpu| cpu < DWORD_PTR::BITS as usize)
            .fold(0, |mask, &cpu| mask | (1 << cpu))
    }

    fn from_mask(mask: DWORD_PTR) -> CpuSet {
        CpuSet::from_cpus((0..DWORD_PTR::BITS as usize).filter(|&cpu| mask & (1 << cpu) != 0))
    }

    fn process_masks() -> Option<(DWORD_PTR, DWORD_PTR)> {
        unsafe {
            let mut process: DWORD_PTR = 0;
            let mut system: DWORD_PTR = 0;
            if GetProcessAffinityMask(GetCurrentProcess(), &mut process, &mut system) != 0 {
                Some((process, system))
            } else {
                None
            }
        }
    }

    pub fn logical_cpu_count() -> Option<usize> {
        let (_, system) = process_masks()?;
        match system.count_ones() as usize {
            0 => None,
            n => Some(n),
        }
    }

    pub fn process_affinity() -> Option<CpuSet> {
        process_masks().map(|(process, _)| from_mask(process))
    }

    pub fn set_process_affinity(set: &CpuSet) -> bool {
        unsafe { SetProcessAffinityMask(GetCurrentProcess(), to_mask(set)) != 0 }
    }

    pub fn thread_affinity() -> Option<CpuSet> {
        // There is no getter: set the process mask and read back the old value
        let (process, _) = process_masks()?;
        unsafe {
            let handle = GetCurrentThread();
            let old_mask = SetThreadAffinityMask(handle, process);
            if old_mask == 0 {
                return None;
            }
            SetThreadAffinityMask(handle, old_mask);
            Some(from_mask(old_mask))
        }
    }

    pub fn set_thread_affinity(set: &CpuSet) -> bool {
        unsafe { SetThreadAffinityMask(GetCurrentThread(), to_mask(set)) != 0 }
    }
}

// ============================================================================
// Fallback for platforms without affinity control (macOS included)
// ============================================================================

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
mod platform {
    use super::CpuSet;

    pub fn logical_cpu_count() -> Option<usize> {
        std::thread::available_parallelism().ok().map(|n| n.get())
    }
    pub fn process_affinity() -> Option<CpuSet> {
        None
    }
    pub fn set_process_affinity(_set: &CpuSet) -> bool {
        false
    }
    pub fn thread_affinity() -> Option<CpuSet> {
        None
    }
    pub fn set_thread_affinity(_set: &CpuSet) -> bool {
        false
    }
}

// ============================================================================
// Native backend
// ============================================================================

/// Affinity backend for the running OS.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeAffinity;

impl AffinityBackend for NativeAffinity {
    fn logical_cpu_count(&self) -> Option<usize> {
        platform::logical_cpu_count()
    }

    fn process_affinity(&self) -> Option<CpuSet> {
        platform::process_affinity()
    }

    fn set_process_affinity(&self, set: &CpuSet) -> bool {
        platform::set_process_affinity(set)
    }

    fn thread_affinity(&self) -> Option<CpuSet> {
        platform::thread_affinity()
    }

    fn set_thread_affinity(&self, set: &CpuSet) -> bool {
        platform::set_thread_affinity(set)
    }
}

/// CPU to pin to: the highest one the process is allowed on, which keeps
/// the benchmark away from CPU 0 where most interrupts land.
fn target_cpu<B: AffinityBackend>(backend: &B, allowed: Option<&CpuSet>) -> Option<usize> {
    allowed
        .and_then(CpuSet::last)
        .or_else(|| backend.logical_cpu_count()?.checked_sub(1))
}

// ============================================================================
// RAII Guard
// ============================================================================

/// Pins the process and calling thread on creation, restores both on drop.
///
/// # Example
/// ```ignore
/// {
///     let _affinity = AffinityOptimizer::acquire(); // pinned
///     // ... run every benchmark case ...
/// } // previous affinity restored here
/// ```
pub struct AffinityOptimizer<B: AffinityBackend = NativeAffinity> {
    backend: B,
    grant: Option<ScheduleGrant>,
    pinned_cpu: Option<usize>,
}

impl AffinityOptimizer<NativeAffinity> {
    /// Pin using the running OS.
    pub fn acquire() -> Self {
        Self::acquire_with(NativeAffinity)
    }
}

impl<B: AffinityBackend> AffinityOptimizer<B> {
    /// Record the current process and thread CPU sets, then restrict both to
    /// a single CPU. Denied requests leave the state untouched.
    pub fn acquire_with(backend: B) -> Self {
        let grant = ScheduleGrant {
            process_affinity: backend.process_affinity(),
            thread_affinity: backend.thread_affinity(),
            ..ScheduleGrant::default()
        };

        let pinned_cpu = target_cpu(&backend, grant.process_affinity.as_ref()).and_then(|cpu| {
            let target = CpuSet::single(cpu);
            let process_pinned = backend.set_process_affinity(&target);
            let thread_pinned =
                grant.thread_affinity.is_some() && backend.set_thread_affinity(&target);
            (process_pinned || thread_pinned).then_some(cpu)
        });

        match pinned_cpu {
            Some(cpu) => tracing::debug!(cpu, "pinned process and thread"),
            None => tracing::debug!("cpu pinning denied, running unpinned"),
        }

        Self {
            backend,
            grant: Some(grant),
            pinned_cpu,
        }
    }

    /// The CPU the process was pinned to, if pinning succeeded.
    pub fn pinned_cpu(&self) -> Option<usize> {
        self.pinned_cpu
    }

    pub fn is_pinned(&self) -> bool {
        self.pinned_cpu.is_some()
    }
}

impl<B: AffinityBackend> Optimizer for AffinityOptimizer<B> {
    fn release(&mut self) {
        let Some(grant) = self.grant.take() else {
            return;
        };
        // Thread first, then process
        if let Some(thread) = &grant.thread_affinity {
            let _ = self.backend.set_thread_affinity(thread);
        }
        if let Some(process) = &grant.process_affinity {
            let _ = self.backend.set_process_affinity(process);
        }
        self.pinned_cpu = None;
    }

    fn is_released(&self) -> bool {
        self.grant.is_none()
    }
}

impl<B: AffinityBackend> Drop for AffinityOptimizer<B> {
    fn drop(&mut self) {
        self.release();
    }
}
