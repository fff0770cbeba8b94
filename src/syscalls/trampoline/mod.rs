/*!
 * Syscall Trampolines
 * Per-architecture check-then-call variants and the build-time registry
 *
 * Every variant re-checks the pending flag and, if it is clear, issues
 * exactly one host syscall. Window variants keep the check and the syscall
 * inside a SafeWindow whose last instruction is the syscall; the host signal
 * handler rewinds any pc inside it back to the start.
 */

#[cfg(all(target_os = "linux", target_arch = "aarch64"))]
mod aarch64;
mod masked;
#[cfg(all(target_os = "linux", target_arch = "riscv64"))]
mod riscv64;
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
mod x86_64;

#[cfg(all(target_os = "linux", target_arch = "aarch64"))]
pub use aarch64::Aarch64Trampoline;
pub use masked::MaskedTrampoline;
#[cfg(all(target_os = "linux", target_arch = "riscv64"))]
pub use riscv64::Riscv64Trampoline;
#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
pub use x86_64::X86_64Trampoline;

use super::window::{SafeWindow, WindowEntry};
use crate::config::Strategy;
use crate::core::{HostArch, HostWord, Result, SafeSyscallError, SyscallArgs};
use crate::signals::PendingFlag;
use std::sync::OnceLock;
use tracing::{debug, warn};

/// One host-architecture implementation of the check-then-call sequence
pub trait SyscallTrampoline: Sync {
    fn arch(&self) -> HostArch;

    /// Guarded instruction range, if this variant relies on pc rewind
    fn window(&self) -> Option<SafeWindow>;

    /// Encoding of the host syscall instruction closing the window
    fn syscall_instruction(&self) -> &'static [u8];

    /// Re-check `pending` and issue the syscall if it is clear
    ///
    /// Returns the raw host word, or `-ERESTARTSYS` without issuing anything
    /// when the flag is set.
    ///
    /// # Safety
    /// The syscall runs with whatever effects `number` and `args` imply.
    unsafe fn invoke(&self, pending: &PendingFlag, number: HostWord, args: &SyscallArgs) -> HostWord;

    /// Check the "syscall is the last instruction of the window" rule
    fn verify(&self) -> Result<()> {
        match self.window() {
            // SAFETY: the window brackets this variant's own code.
            Some(window) => unsafe { window.verify(self.arch(), self.syscall_instruction()) },
            None => Ok(()),
        }
    }
}

/// Window variants compiled for this host
static TRAMPOLINES: &[&dyn SyscallTrampoline] = &[
    #[cfg(all(target_os = "linux", target_arch = "x86_64"))]
    &X86_64Trampoline,
    #[cfg(all(target_os = "linux", target_arch = "aarch64"))]
    &Aarch64Trampoline,
    #[cfg(all(target_os = "linux", target_arch = "riscv64"))]
    &Riscv64Trampoline,
];

static MASKED: MaskedTrampoline = MaskedTrampoline;

static ACTIVE: OnceLock<&'static dyn SyscallTrampoline> = OnceLock::new();

/// Registered window variants
pub fn registered() -> &'static [&'static dyn SyscallTrampoline] {
    TRAMPOLINES
}

/// The host's window variant, if it has one
pub fn window_trampoline() -> Option<&'static dyn SyscallTrampoline> {
    TRAMPOLINES
        .iter()
        .copied()
        .find(|t| t.arch() == HostArch::current())
}

pub fn masked_trampoline() -> &'static dyn SyscallTrampoline {
    &MASKED
}

/// Table of {architecture, start, end} consulted by the rewind filter
///
/// Allocation-free; safe to walk in signal context.
pub fn safe_windows() -> impl Iterator<Item = WindowEntry> {
    TRAMPOLINES.iter().filter_map(|t| {
        t.window().map(|window| WindowEntry {
            arch: t.arch(),
            window,
        })
    })
}

/// Variant implementing `strategy` on this host
pub fn select(strategy: Strategy) -> Result<&'static dyn SyscallTrampoline> {
    match strategy {
        Strategy::Auto => Ok(window_trampoline().unwrap_or(masked_trampoline())),
        Strategy::Window => {
            window_trampoline().ok_or(SafeSyscallError::UnsupportedArch(HostArch::current()))
        }
        Strategy::Mask => Ok(masked_trampoline()),
    }
}

/// Verify every registered window
pub fn verify_all() -> Result<()> {
    for trampoline in TRAMPOLINES {
        if let Err(e) = trampoline.verify() {
            warn!(arch = %trampoline.arch(), error = %e, "Safe window verification failed");
            return Err(e);
        }
        if let Some(window) = trampoline.window() {
            debug!(arch = %trampoline.arch(), %window, len = window.len(), "Safe window verified");
        }
    }
    Ok(())
}

/// Fix the variant used by `perform_safe_syscall` for the rest of the process
pub(crate) fn activate(trampoline: &'static dyn SyscallTrampoline) -> Result<()> {
    ACTIVE
        .set(trampoline)
        .map_err(|_| SafeSyscallError::AlreadyInstalled)
}

/// Variant used by `perform_safe_syscall`
///
/// Before installation this is the `Auto` choice.
#[inline]
pub fn active() -> &'static dyn SyscallTrampoline {
    match ACTIVE.get() {
        Some(trampoline) => *trampoline,
        None => window_trampoline().unwrap_or(masked_trampoline()),
    }
}
