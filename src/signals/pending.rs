/*!
 * Pending-Flag Cell
 * Per-guest-thread "signal queued for the guest" state
 *
 * Written by the interception layer from the host signal handler, which runs
 * on the interrupted thread itself; read by the trampolines with a plain
 * 32-bit load.
 */

use nix::sys::signal::Signal;
use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

/// Single-word pending flag
///
/// The trampolines read the word directly, so the layout is fixed.
#[derive(Debug, Default)]
#[repr(transparent)]
pub struct PendingFlag(AtomicU32);

impl PendingFlag {
    #[inline]
    pub const fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::Relaxed) != 0
    }

    /// Address handed to the trampolines
    #[inline]
    pub fn as_ptr(&self) -> *const u32 {
        self.0.as_ptr() as *const u32
    }

    #[inline]
    fn raise(&self) {
        self.0.store(1, Ordering::SeqCst);
    }

    #[inline]
    fn clear(&self) {
        self.0.store(0, Ordering::SeqCst);
    }
}

/// Signal-interception state owned by one guest thread
///
/// Holds the pending flag plus the set of host signals queued for deferred
/// guest delivery. Every method is async-signal-safe.
#[derive(Debug, Default)]
pub struct ThreadSignalState {
    pending: PendingFlag,
    queued: AtomicU64,
}

impl ThreadSignalState {
    pub const fn new() -> Self {
        Self {
            pending: PendingFlag::new(),
            queued: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn pending_flag(&self) -> &PendingFlag {
        &self.pending
    }

    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_pending()
    }

    /// Queue a host signal for the guest and raise the pending flag
    #[inline]
    pub fn queue(&self, signal: Signal) {
        self.queued.fetch_or(signal_bit(signal), Ordering::SeqCst);
        self.pending.raise();
    }

    /// Drain queued signals in ascending number order and clear the flag
    ///
    /// A signal queued while draining keeps the flag raised: the flag is set
    /// exactly when the queue is non-empty.
    pub fn take_pending(&self) -> Vec<Signal> {
        let bits = self.queued.swap(0, Ordering::SeqCst);
        self.pending.clear();
        // The handler runs on this thread; one landing after the swap left its
        // bit behind.
        if self.queued.load(Ordering::SeqCst) != 0 {
            self.pending.raise();
        }
        (1..64)
            .filter(|n| bits & (1u64 << n) != 0)
            .filter_map(|n| Signal::try_from(n as i32).ok())
            .collect()
    }
}

#[inline]
fn signal_bit(signal: Signal) -> u64 {
    1u64 << ((signal as i32 as u32) & 63)
}
