/*!
 * Safe-Syscall Probe - Main Entry Point
 *
 * Installs host signal handling from the environment configuration, verifies
 * the safe windows and exercises one guarded syscall:
 * - Window table
 * - Strategy selection
 * - Restart path with a queued signal
 */

use safe_syscall::syscalls::{perform_safe_syscall, safe_windows, SyscallOutcome};
use safe_syscall::{init_tracing, install, stats, GuestThread, SafeSyscallConfig};
use tracing::{info, warn};

fn main() -> miette::Result<()> {
    init_tracing();

    info!("Safe-syscall probe starting...");

    let config = SafeSyscallConfig::from_env()?;
    info!(strategy = ?config.strategy, signals = config.signals.len(), "Configuration loaded");

    let installation = install(&config)?;
    match installation.window {
        Some(window) => info!(arch = %installation.arch, %window, "Window trampoline active"),
        None => info!(arch = %installation.arch, "Masked trampoline active"),
    }

    for entry in safe_windows() {
        info!(
            arch = %entry.arch,
            start = format_args!("{:#x}", entry.window.start),
            end = format_args!("{:#x}", entry.window.end),
            len = entry.window.len(),
            "Safe window"
        );
    }

    let guest = GuestThread::attach()?;

    // SAFETY: getpid has no arguments and no side effects.
    let outcome = unsafe { perform_safe_syscall(guest.pending_flag(), libc::SYS_getpid, &[]) };
    match outcome {
        SyscallOutcome::Success(pid) => info!(pid, "Guarded getpid succeeded"),
        other => warn!(%other, "Guarded getpid did not succeed"),
    }

    guest.state().queue(nix::sys::signal::Signal::SIGUSR1);
    // SAFETY: as above.
    let outcome = unsafe { perform_safe_syscall(guest.pending_flag(), libc::SYS_getpid, &[]) };
    info!(%outcome, pending = ?guest.take_pending(), "Guarded getpid with a queued signal");

    let snapshot = stats();
    match serde_json::to_string(&snapshot) {
        Ok(json) => info!(stats = %json, "Probe complete"),
        Err(e) => warn!(error = %e, "Could not serialize stats"),
    }

    Ok(())
}
