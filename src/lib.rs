/*!
 * Safe Syscall Library
 * Signal-safe host syscall issuance for a user-mode process emulator
 *
 * A guest thread's syscall is issued only if no guest signal is pending, and
 * the pending check plus the syscall instruction behave as one indivisible
 * step with respect to host signals.
 */

pub mod config;
pub mod core;
pub mod monitoring;
pub mod signals;
pub mod syscalls;

// Re-exports
pub use config::{SafeSyscallConfig, Strategy};
pub use crate::core::{HostArch, HostWord, Result, SafeSyscallError, SyscallArgs};
pub use monitoring::{init_tracing, stats, SafeSyscallStats};
pub use signals::{install, install_with, GuestThread, PendingFlag, SignalInterceptor, ThreadSignalState};
pub use syscalls::{perform_safe_syscall, safe_windows, SafeWindow, SyscallOutcome, SyscallTrampoline};
