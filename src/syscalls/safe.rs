/*!
 * Safe Syscall Entry
 * The call exposed to the guest syscall emulation layer
 */

use super::errno::set_last_error;
use super::outcome::SyscallOutcome;
use super::trampoline;
use crate::core::{HostWord, SyscallArgs};
use crate::monitoring;
use crate::signals::PendingFlag;
use std::ffi::CStr;
use tracing::trace;

/// Issue host syscall `number` unless a guest signal is pending
///
/// Exactly zero or one host syscalls run per call. On
/// [`SyscallOutcome::Restart`] nothing was issued; the caller handles the
/// pending signal and may call again. Failure and restart codes are also
/// written to the errno side channel.
///
/// # Safety
/// The syscall runs with whatever effects `number` and `args` imply, e.g.
/// pointer arguments must be valid for the kernel to access.
pub unsafe fn perform_safe_syscall(pending: &PendingFlag, number: HostWord, args: &[HostWord]) -> SyscallOutcome {
    let args = SyscallArgs::from_slice(args);
    let raw = trampoline::active().invoke(pending, number, &args);
    let outcome = SyscallOutcome::from_trampoline(raw);

    let stats = monitoring::global();
    match outcome {
        SyscallOutcome::Success(_) => stats.inc_syscalls_issued(),
        SyscallOutcome::Failure(code) => {
            stats.inc_syscalls_issued();
            stats.inc_failures();
            set_last_error(code);
            trace!(number, errno = code, "Host syscall failed");
        }
        SyscallOutcome::Restart => {
            stats.inc_restarts();
            if let Some(code) = outcome.errno() {
                set_last_error(code);
            }
            trace!(number, "Syscall aborted on pending guest signal");
        }
    }
    outcome
}

/// `perform_safe_syscall(pending, number, &[args...])` with every argument
/// cast to a host word. Must be used in an `unsafe` block.
#[macro_export]
macro_rules! safe_syscall {
    ($pending:expr, $number:expr $(, $arg:expr)* $(,)?) => {
        $crate::syscalls::perform_safe_syscall(
            $pending,
            $number as $crate::core::HostWord,
            &[$($arg as $crate::core::HostWord),*],
        )
    };
}

pub fn safe_read(pending: &PendingFlag, fd: libc::c_int, buf: &mut [u8]) -> SyscallOutcome {
    // SAFETY: the kernel writes at most buf.len() bytes into buf.
    unsafe { safe_syscall!(pending, libc::SYS_read, fd, buf.as_mut_ptr(), buf.len()) }
}

pub fn safe_write(pending: &PendingFlag, fd: libc::c_int, buf: &[u8]) -> SyscallOutcome {
    // SAFETY: the kernel reads at most buf.len() bytes from buf.
    unsafe { safe_syscall!(pending, libc::SYS_write, fd, buf.as_ptr(), buf.len()) }
}

pub fn safe_openat(
    pending: &PendingFlag,
    dirfd: libc::c_int,
    path: &CStr,
    flags: libc::c_int,
    mode: libc::mode_t,
) -> SyscallOutcome {
    // SAFETY: path is NUL-terminated and outlives the call.
    unsafe { safe_syscall!(pending, libc::SYS_openat, dirfd, path.as_ptr(), flags, mode) }
}

pub fn safe_wait4(
    pending: &PendingFlag,
    pid: libc::pid_t,
    status: Option<&mut libc::c_int>,
    options: libc::c_int,
) -> SyscallOutcome {
    let status = status.map_or(std::ptr::null_mut(), |s| s as *mut libc::c_int);
    // SAFETY: status is null or a live c_int; no rusage is requested.
    unsafe {
        safe_syscall!(
            pending,
            libc::SYS_wait4,
            pid,
            status,
            options,
            std::ptr::null_mut::<libc::rusage>()
        )
    }
}

/// Relative monotonic sleep through `clock_nanosleep`, which every host has
pub fn safe_nanosleep(
    pending: &PendingFlag,
    request: &libc::timespec,
    remaining: Option<&mut libc::timespec>,
) -> SyscallOutcome {
    let remaining = remaining.map_or(std::ptr::null_mut(), |r| r as *mut libc::timespec);
    // SAFETY: request is readable, remaining is null or writable.
    unsafe {
        safe_syscall!(
            pending,
            libc::SYS_clock_nanosleep,
            libc::CLOCK_MONOTONIC,
            0,
            request as *const libc::timespec,
            remaining
        )
    }
}
