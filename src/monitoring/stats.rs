/*!
 * Lock-Free Safe-Syscall Statistics
 * Atomic counters shared by the syscall path and the host signal handler
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafeSyscallStats {
    pub syscalls_issued: u64,
    pub restarts: u64,
    pub failures: u64,
    pub rewinds: u64,
    pub signals_intercepted: u64,
    pub signals_unattached: u64,
}

/// Atomic safe-syscall statistics
///
/// # Performance
/// - Cache-line aligned to prevent false sharing
/// - All operations use relaxed ordering
/// - Safe to update from a signal handler
#[repr(C, align(64))]
pub struct AtomicSafeSyscallStats {
    syscalls_issued: AtomicU64,
    restarts: AtomicU64,
    failures: AtomicU64,
    rewinds: AtomicU64,
    signals_intercepted: AtomicU64,
    signals_unattached: AtomicU64,
}

impl AtomicSafeSyscallStats {
    #[inline]
    pub const fn new() -> Self {
        Self {
            syscalls_issued: AtomicU64::new(0),
            restarts: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            rewinds: AtomicU64::new(0),
            signals_intercepted: AtomicU64::new(0),
            signals_unattached: AtomicU64::new(0),
        }
    }

    /// Hot path - called after every issued host syscall
    #[inline(always)]
    pub fn inc_syscalls_issued(&self) {
        self.syscalls_issued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_restarts(&self) {
        self.restarts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Signal context
    #[inline(always)]
    pub fn inc_rewinds(&self) {
        self.rewinds.fetch_add(1, Ordering::Relaxed);
    }

    /// Signal context
    #[inline(always)]
    pub fn inc_signals_intercepted(&self) {
        self.signals_intercepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Signal context
    #[inline(always)]
    pub fn inc_signals_unattached(&self) {
        self.signals_unattached.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of current stats
    ///
    /// # Note
    /// Values may not be perfectly consistent with each other due to concurrent updates,
    /// but each individual value is accurate.
    #[inline]
    pub fn snapshot(&self) -> SafeSyscallStats {
        SafeSyscallStats {
            syscalls_issued: self.syscalls_issued.load(Ordering::Relaxed),
            restarts: self.restarts.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            rewinds: self.rewinds.load(Ordering::Relaxed),
            signals_intercepted: self.signals_intercepted.load(Ordering::Relaxed),
            signals_unattached: self.signals_unattached.load(Ordering::Relaxed),
        }
    }
}

impl Default for AtomicSafeSyscallStats {
    fn default() -> Self {
        Self::new()
    }
}

static STATS: AtomicSafeSyscallStats = AtomicSafeSyscallStats::new();

/// Process-wide counters
#[inline(always)]
pub fn global() -> &'static AtomicSafeSyscallStats {
    &STATS
}

/// Snapshot of the process-wide counters
pub fn stats() -> SafeSyscallStats {
    STATS.snapshot()
}
