/*!
 * Syscall Outcome
 * Normalization of raw host syscall return words
 */

use crate::core::HostWord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Largest error code the host kernel encodes in a return word
pub const MAX_ERRNO: i32 = 4095;

/// Kernel-internal "restart this syscall" code, never returned by a real
/// syscall to user space. The trampolines return its negation when they
/// abort on a pending signal.
pub const ERESTARTSYS: i32 = 512;

/// Result of one safe-syscall invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum SyscallOutcome {
    /// Raw success word, unchanged
    Success(HostWord),
    /// Host error code in `1..=MAX_ERRNO`
    Failure(i32),
    /// Not issued because a guest signal was pending; retry after handling it
    Restart,
}

impl SyscallOutcome {
    /// Apply the host error-encoding convention to a raw return word
    ///
    /// Words in `[-4095, -1]` are errors. Everything else, including large
    /// unsigned values such as high addresses, is a success.
    #[inline]
    pub const fn normalize(raw: HostWord) -> Self {
        if (raw as libc::c_ulong) > (-(MAX_ERRNO as HostWord + 1)) as libc::c_ulong {
            SyscallOutcome::Failure(-raw as i32)
        } else {
            SyscallOutcome::Success(raw)
        }
    }

    /// Interpret a trampoline return word
    ///
    /// Same as [`normalize`](Self::normalize), except that the abort code maps
    /// to [`Restart`](Self::Restart).
    #[inline]
    pub const fn from_trampoline(raw: HostWord) -> Self {
        match Self::normalize(raw) {
            SyscallOutcome::Failure(ERESTARTSYS) => SyscallOutcome::Restart,
            outcome => outcome,
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, SyscallOutcome::Success(_))
    }

    #[inline]
    pub fn is_restart(&self) -> bool {
        matches!(self, SyscallOutcome::Restart)
    }

    /// Error code carried on the failure and restart paths
    #[inline]
    pub fn errno(&self) -> Option<i32> {
        match self {
            SyscallOutcome::Success(_) => None,
            SyscallOutcome::Failure(code) => Some(*code),
            SyscallOutcome::Restart => Some(ERESTARTSYS),
        }
    }

    /// Host libc convention: the value, or `-1` with the code in errno
    #[inline]
    pub fn host_return(&self) -> HostWord {
        match self {
            SyscallOutcome::Success(value) => *value,
            _ => -1,
        }
    }

    /// Raw kernel convention: the value, or the negated error code
    #[inline]
    pub fn guest_return(&self) -> HostWord {
        match self {
            SyscallOutcome::Success(value) => *value,
            SyscallOutcome::Failure(code) => -(*code as HostWord),
            SyscallOutcome::Restart => -(ERESTARTSYS as HostWord),
        }
    }

    /// Success value or error code
    #[inline]
    pub fn into_result(self) -> Result<HostWord, i32> {
        match self {
            SyscallOutcome::Success(value) => Ok(value),
            other => Err(other.errno().unwrap_or(ERESTARTSYS)),
        }
    }
}

impl fmt::Display for SyscallOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyscallOutcome::Success(value) => write!(f, "success({})", value),
            SyscallOutcome::Failure(code) => {
                write!(f, "failure({}: {})", code, nix::errno::Errno::from_raw(*code))
            }
            SyscallOutcome::Restart => f.write_str("restart"),
        }
    }
}
