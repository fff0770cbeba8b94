/*!
 * Guest Thread Attachment
 * Binds a ThreadSignalState to the current host thread
 *
 * One guest thread maps to one host thread. The host signal handler finds the
 * interrupted thread's state through a const thread-local cell, which needs no
 * lazy initialization and is safe to read in signal context.
 */

use super::pending::{PendingFlag, ThreadSignalState};
use crate::core::{Result, SafeSyscallError};
use nix::sys::signal::Signal;
use std::cell::Cell;
use std::marker::PhantomData;
use std::ptr;
use std::sync::atomic::{compiler_fence, Ordering};
use tracing::debug;

thread_local! {
    static CURRENT: Cell<*const ThreadSignalState> = const { Cell::new(ptr::null()) };
}

/// Handle tying a guest thread's signal state to the current host thread
///
/// Dropping the handle detaches the state. The handle cannot leave the thread.
pub struct GuestThread {
    state: Box<ThreadSignalState>,
    _not_send: PhantomData<*const ()>,
}

impl GuestThread {
    /// Attach fresh signal state to the calling thread
    pub fn attach() -> Result<Self> {
        if is_attached() {
            return Err(SafeSyscallError::ThreadAlreadyAttached);
        }

        let state = Box::new(ThreadSignalState::new());
        let raw: *const ThreadSignalState = &*state;
        compiler_fence(Ordering::SeqCst);
        CURRENT.with(|cell| cell.set(raw));
        debug!(thread = ?std::thread::current().id(), "Guest thread attached");

        Ok(Self {
            state,
            _not_send: PhantomData,
        })
    }

    #[inline]
    pub fn state(&self) -> &ThreadSignalState {
        &self.state
    }

    #[inline]
    pub fn pending_flag(&self) -> &PendingFlag {
        self.state.pending_flag()
    }

    /// Signals the guest still has to handle; clears the pending flag
    pub fn take_pending(&self) -> Vec<Signal> {
        self.state.take_pending()
    }
}

impl Drop for GuestThread {
    fn drop(&mut self) {
        CURRENT.with(|cell| cell.set(ptr::null()));
        compiler_fence(Ordering::SeqCst);
        debug!(thread = ?std::thread::current().id(), "Guest thread detached");
    }
}

/// Whether the calling thread has guest signal state attached
pub fn is_attached() -> bool {
    CURRENT.try_with(|cell| !cell.get().is_null()).unwrap_or(false)
}

/// Run `f` with the calling thread's state
///
/// Async-signal-safe; used by the host signal handler.
#[inline]
pub(crate) fn with_current<R>(f: impl FnOnce(Option<&ThreadSignalState>) -> R) -> R {
    let raw = CURRENT.try_with(|cell| cell.get()).unwrap_or(ptr::null());
    // SAFETY: the pointer is published only while the owning GuestThread is
    // alive on this thread, and cleared before its box is freed.
    f(unsafe { raw.as_ref() })
}
