/*!
 * Window-Rewind Filter
 *
 * Runs in the host signal handler before any guest signal bookkeeping. An
 * interrupted pc inside a trampoline's SafeWindow is moved back to the
 * window start, so on resume the pending check runs again and sees the flag
 * the handler is about to raise. The syscall instruction is the last one in
 * each window: a pc at `end` means the syscall already ran and is left alone.
 */

use super::context::InterruptedContext;
use crate::core::Address;
use crate::monitoring;
use crate::syscalls::{safe_windows, SafeWindow};

/// Start of the window containing `pc`, if any
#[inline]
pub fn rewind_target(pc: Address, windows: impl IntoIterator<Item = SafeWindow>) -> Option<Address> {
    windows
        .into_iter()
        .find(|window| window.contains(pc))
        .map(|window| window.start)
}

/// Start of the registered window containing `pc`, if any
#[inline]
pub fn rewind_pc(pc: Address) -> Option<Address> {
    rewind_target(pc, safe_windows().map(|entry| entry.window))
}

/// Rewind `ctx` against the registered windows
///
/// Returns true when the pc lay inside a window. Async-signal-safe.
pub fn rewind_if_in_safe_window(ctx: &mut dyn InterruptedContext) -> bool {
    let pc = ctx.pc();
    match rewind_pc(pc) {
        Some(start) => {
            if start != pc {
                ctx.set_pc(start);
                monitoring::global().inc_rewinds();
            }
            true
        }
        None => false,
    }
}
