/*!
 * Host Signal Handler
 * Installs the process-wide handler that fronts guest signal interception
 *
 * Every intercepted host signal first passes the window-rewind filter, then
 * the registered SignalInterceptor. Both run in signal context: no locks, no
 * allocation, no logging.
 */

use super::context::InterruptedContext;
use super::mask;
use super::pending::ThreadSignalState;
use super::rewind::rewind_if_in_safe_window;
use super::thread;
use crate::config::{SafeSyscallConfig, Strategy};
use crate::core::{HostArch, Result, SafeSyscallError};
use crate::monitoring;
use crate::syscalls::trampoline;
use crate::syscalls::SafeWindow;
use nix::errno::Errno;
use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Queues intercepted host signals for deferred guest delivery
///
/// Called on the interrupted thread, after the pc rewind, with that thread's
/// guest state if one is attached. Implementations must be
/// async-signal-safe.
#[cfg_attr(test, mockall::automock)]
pub trait SignalInterceptor: Send + Sync {
    fn intercept<'a>(&self, signal: Signal, thread: Option<&'a ThreadSignalState>);
}

/// Default interceptor: queue on the interrupted guest thread
#[derive(Debug, Default, Clone, Copy)]
pub struct QueueingInterceptor;

impl SignalInterceptor for QueueingInterceptor {
    fn intercept<'a>(&self, signal: Signal, thread: Option<&'a ThreadSignalState>) {
        match thread {
            Some(state) => state.queue(signal),
            None => monitoring::global().inc_signals_unattached(),
        }
    }
}

static INTERCEPTOR: OnceLock<Box<dyn SignalInterceptor>> = OnceLock::new();
static INSTALLING: AtomicBool = AtomicBool::new(false);

/// What `install` set up
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Installation {
    pub strategy: Strategy,
    pub arch: HostArch,
    pub window: Option<SafeWindow>,
    pub signals: Vec<&'static str>,
}

/// Install the handler with the queueing interceptor
pub fn install(config: &SafeSyscallConfig) -> Result<Installation> {
    install_with(config, QueueingInterceptor)
}

/// Install the handler for `config.signals`, once per process
///
/// Selects and verifies the trampoline variant, then registers the handler
/// with `SA_SIGINFO` (and `SA_ONSTACK` if configured). `SA_RESTART` is not
/// used: a blocking syscall interrupted by an intercepted signal returns
/// EINTR to the caller.
///
/// Nothing is published until every action is registered. On failure the
/// previous actions are restored and install may be retried. A signal that
/// arrives while install is still running is dropped.
pub fn install_with<I>(config: &SafeSyscallConfig, interceptor: I) -> Result<Installation>
where
    I: SignalInterceptor + 'static,
{
    config.validate()?;

    let selected = trampoline::select(config.strategy)?;
    if config.verify_windows {
        trampoline::verify_all()?;
    }

    if INSTALLING
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        return Err(SafeSyscallError::AlreadyInstalled);
    }

    let mut flags = SaFlags::SA_SIGINFO;
    if config.alternate_stack {
        flags |= SaFlags::SA_ONSTACK;
    }
    let mut handler_mask = SigSet::empty();
    for signal in &config.signals {
        handler_mask.add(*signal);
    }
    let action = SigAction::new(SigHandler::SigAction(host_signal_handler), flags, handler_mask);

    if let Err(e) = register_actions(&config.signals, &action) {
        INSTALLING.store(false, Ordering::Release);
        return Err(e);
    }

    mask::set_intercepted(&config.signals);
    trampoline::activate(selected)?;
    INTERCEPTOR
        .set(Box::new(interceptor))
        .map_err(|_| SafeSyscallError::AlreadyInstalled)?;

    let installation = Installation {
        strategy: config.strategy,
        arch: selected.arch(),
        window: selected.window(),
        signals: config.signals.iter().map(|s| s.as_str()).collect(),
    };
    info!(
        arch = %installation.arch,
        strategy = ?installation.strategy,
        windowed = installation.window.is_some(),
        signals = installation.signals.len(),
        "Safe-syscall signal handling installed"
    );
    Ok(installation)
}

/// Register `action` for every signal, or for none of them
fn register_actions(signals: &[Signal], action: &SigAction) -> Result<()> {
    let mut previous = Vec::with_capacity(signals.len());

    for &signal in signals {
        // SAFETY: host_signal_handler only touches atomics and const thread-locals.
        match unsafe { sigaction(signal, action) } {
            Ok(old) => {
                debug!(%signal, "Host signal handler registered");
                previous.push((signal, old));
            }
            Err(errno) => {
                for (registered, old) in previous.into_iter().rev() {
                    // SAFETY: restores the action that was in place before.
                    let _ = unsafe { sigaction(registered, &old) };
                }
                warn!(%signal, %errno, "Host signal handler registration failed, rolled back");
                return Err(SafeSyscallError::HandlerInstall { signal, errno });
            }
        }
    }
    Ok(())
}

/// Whether the process-wide handler has been installed
pub fn is_installed() -> bool {
    INTERCEPTOR.get().is_some()
}

/// Rewind, then hand the signal to the interceptor
pub(crate) fn deliver(
    signal: Signal,
    ctx: Option<&mut dyn InterruptedContext>,
    interceptor: &dyn SignalInterceptor,
) {
    if let Some(ctx) = ctx {
        rewind_if_in_safe_window(ctx);
    }
    monitoring::global().inc_signals_intercepted();
    thread::with_current(|state| interceptor.intercept(signal, state));
}

extern "C" fn host_signal_handler(
    signo: libc::c_int,
    _info: *mut libc::siginfo_t,
    ucontext: *mut libc::c_void,
) {
    let saved_errno = Errno::last_raw();

    if let (Ok(signal), Some(interceptor)) = (Signal::try_from(signo), INTERCEPTOR.get()) {
        // SAFETY: the kernel passed this thread's saved context.
        let mut host_ctx = unsafe { host_context(ucontext) };
        deliver(
            signal,
            host_ctx.as_mut().map(|c| c as &mut dyn InterruptedContext),
            interceptor.as_ref(),
        );
    }

    Errno::set_raw(saved_errno);
}

#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
))]
unsafe fn host_context<'a>(raw: *mut libc::c_void) -> Option<super::context::HostContext<'a>> {
    super::context::HostContext::from_raw(raw)
}

/// No window variants here, so there is nothing to rewind
#[cfg(not(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
)))]
unsafe fn host_context(_raw: *mut libc::c_void) -> Option<NoContext> {
    None
}

#[cfg(not(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
)))]
struct NoContext;

#[cfg(not(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
)))]
impl InterruptedContext for NoContext {
    fn pc(&self) -> crate::core::Address {
        0
    }

    fn set_pc(&mut self, _pc: crate::core::Address) {}
}
