/*!
 * Masked Trampoline
 *
 * Portable variant without an instruction window: the intercepted signals are
 * blocked around the pending check and the syscall, so nothing can slip in
 * between them. Signals raised meanwhile stay pending in the host kernel and
 * reach the interception layer when the mask is restored.
 *
 * A blocking syscall issued here cannot be interrupted by an intercepted
 * signal until it returns.
 */

use super::SyscallTrampoline;
use crate::core::{HostArch, HostWord, SafeSyscallError, SyscallArgs};
use crate::signals::{intercepted_set, PendingFlag, SignalMaskGuard};
use crate::syscalls::outcome::ERESTARTSYS;
use crate::syscalls::window::SafeWindow;
use nix::errno::Errno;

pub struct MaskedTrampoline;

impl SyscallTrampoline for MaskedTrampoline {
    fn arch(&self) -> HostArch {
        HostArch::current()
    }

    fn window(&self) -> Option<SafeWindow> {
        None
    }

    fn syscall_instruction(&self) -> &'static [u8] {
        &[]
    }

    unsafe fn invoke(&self, pending: &PendingFlag, number: HostWord, args: &SyscallArgs) -> HostWord {
        let _guard = match SignalMaskGuard::block(&intercepted_set()) {
            Ok(guard) => guard,
            Err(SafeSyscallError::SignalMask(errno)) => return -(errno as i32 as HostWord),
            Err(_) => return -(libc::EINVAL as HostWord),
        };

        if pending.is_pending() {
            return -(ERESTARTSYS as HostWord);
        }

        let [a0, a1, a2, a3, a4, a5] = *args.words();
        let ret = libc::syscall(number, a0, a1, a2, a3, a4, a5);
        if ret == -1 {
            -(Errno::last_raw() as HostWord)
        } else {
            ret
        }
    }
}
