/*!
 * Error Types
 * Setup-time failures of the safe-syscall core, with thiserror and miette support
 *
 * The syscall path itself never fails with these; it always yields a
 * `SyscallOutcome`.
 */

use super::types::HostArch;
use miette::Diagnostic;
use nix::errno::Errno;
use nix::sys::signal::Signal;
use thiserror::Error;

/// Result alias for setup operations
pub type Result<T> = std::result::Result<T, SafeSyscallError>;

#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
#[non_exhaustive]
pub enum SafeSyscallError {
    #[error("No safe-syscall window trampoline for host architecture {0}")]
    #[diagnostic(
        code(safe_syscall::unsupported_arch),
        help("Use the `mask` strategy on this host.")
    )]
    UnsupportedArch(HostArch),

    #[error("Host signal handler already installed")]
    #[diagnostic(code(safe_syscall::already_installed))]
    AlreadyInstalled,

    #[error("Failed to install host handler for {signal}: {errno}")]
    #[diagnostic(code(safe_syscall::handler_install))]
    HandlerInstall { signal: Signal, errno: Errno },

    #[error("Signal mask update failed: {0}")]
    #[diagnostic(code(safe_syscall::signal_mask))]
    SignalMask(Errno),

    #[error("Guest signal state already attached to this thread")]
    #[diagnostic(
        code(safe_syscall::thread_attached),
        help("Drop the existing GuestThread handle before attaching again.")
    )]
    ThreadAlreadyAttached,

    #[error("Invalid safe window for {arch}: {reason}")]
    #[diagnostic(
        code(safe_syscall::invalid_window),
        help("The syscall instruction must be the last instruction inside the window.")
    )]
    InvalidWindow { arch: HostArch, reason: String },

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(safe_syscall::config))]
    Config(String),
}

impl SafeSyscallError {
    #[inline]
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    #[inline]
    pub fn invalid_window(arch: HostArch, reason: impl Into<String>) -> Self {
        Self::InvalidWindow {
            arch,
            reason: reason.into(),
        }
    }
}
