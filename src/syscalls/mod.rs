/*!
 * Syscalls Module
 * Safe issuance of opaque host syscalls on behalf of guest threads
 */

pub mod errno;
mod outcome;
mod safe;
pub mod trampoline;
mod window;

// Re-export public API
pub use outcome::{SyscallOutcome, ERESTARTSYS, MAX_ERRNO};
pub use safe::{perform_safe_syscall, safe_nanosleep, safe_openat, safe_read, safe_wait4, safe_write};
pub use trampoline::{safe_windows, SyscallTrampoline};
pub use window::{SafeWindow, WindowEntry};
