/*!
 * Signals Module
 * Host signal interception in front of the safe-syscall trampolines
 */

mod context;
mod handler;
mod mask;
mod pending;
pub mod rewind;
mod thread;

// Re-export public API
#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
))]
pub use context::HostContext;
pub use context::InterruptedContext;
pub use handler::{install, install_with, is_installed, Installation, QueueingInterceptor, SignalInterceptor};
pub use mask::{intercepted_set, SignalMaskGuard};
pub use pending::{PendingFlag, ThreadSignalState};
pub use rewind::{rewind_if_in_safe_window, rewind_pc, rewind_target};
pub use thread::{is_attached, GuestThread};
