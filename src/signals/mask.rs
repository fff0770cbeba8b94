/*!
 * Signal Mask Guard
 * Blocks a set of host signals on the calling thread while in scope
 */

use crate::core::{Result, SafeSyscallError};
use nix::sys::signal::{pthread_sigmask, SigSet, SigmaskHow, Signal};
use std::sync::OnceLock;

static INTERCEPTED: OnceLock<SigSet> = OnceLock::new();

/// Record the signal set owned by the interception layer
pub(crate) fn set_intercepted(signals: &[Signal]) {
    let mut set = SigSet::empty();
    for signal in signals {
        set.add(*signal);
    }
    let _ = INTERCEPTED.set(set);
}

/// Signals blocked by the masked trampoline
///
/// Everything, until a handler has been installed for a specific set.
pub fn intercepted_set() -> SigSet {
    INTERCEPTED.get().copied().unwrap_or_else(SigSet::all)
}

/// Restores the previous signal mask on drop
pub struct SignalMaskGuard {
    previous: SigSet,
}

impl SignalMaskGuard {
    /// Block `set` on the calling thread
    pub fn block(set: &SigSet) -> Result<Self> {
        let mut previous = SigSet::empty();
        pthread_sigmask(SigmaskHow::SIG_BLOCK, Some(set), Some(&mut previous))
            .map_err(SafeSyscallError::SignalMask)?;
        Ok(Self { previous })
    }

    /// Mask in effect before the guard was created
    pub fn previous(&self) -> &SigSet {
        &self.previous
    }
}

impl Drop for SignalMaskGuard {
    fn drop(&mut self) {
        let _ = pthread_sigmask(SigmaskHow::SIG_SETMASK, Some(&self.previous), None);
    }
}
