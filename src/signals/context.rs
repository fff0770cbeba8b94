/*!
 * Interrupted Context
 * Program-counter access to the context saved by the host kernel on signal entry
 */

use crate::core::Address;

/// Saved execution state of an interrupted host thread
///
/// Writing the pc changes where the thread resumes once the handler returns.
pub trait InterruptedContext {
    fn pc(&self) -> Address;
    fn set_pc(&mut self, pc: Address);
}

/// `ucontext_t` handed to an `SA_SIGINFO` handler
#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
))]
pub struct HostContext<'a> {
    uc: &'a mut libc::ucontext_t,
}

#[cfg(all(
    target_os = "linux",
    any(target_arch = "x86_64", target_arch = "aarch64", target_arch = "riscv64")
))]
impl<'a> HostContext<'a> {
    /// # Safety
    /// `raw` must be the third argument of an `SA_SIGINFO` handler, used only
    /// for the duration of that handler.
    pub unsafe fn from_raw(raw: *mut libc::c_void) -> Option<Self> {
        (raw as *mut libc::ucontext_t).as_mut().map(|uc| Self { uc })
    }
}

#[cfg(all(target_os = "linux", target_arch = "x86_64"))]
impl InterruptedContext for HostContext<'_> {
    fn pc(&self) -> Address {
        self.uc.uc_mcontext.gregs[libc::REG_RIP as usize] as Address
    }

    fn set_pc(&mut self, pc: Address) {
        self.uc.uc_mcontext.gregs[libc::REG_RIP as usize] = pc as libc::greg_t;
    }
}

#[cfg(all(target_os = "linux", target_arch = "aarch64"))]
impl InterruptedContext for HostContext<'_> {
    fn pc(&self) -> Address {
        self.uc.uc_mcontext.pc as Address
    }

    fn set_pc(&mut self, pc: Address) {
        self.uc.uc_mcontext.pc = pc as _;
    }
}

// __gregs[0] is REG_PC
#[cfg(all(target_os = "linux", target_arch = "riscv64"))]
impl InterruptedContext for HostContext<'_> {
    fn pc(&self) -> Address {
        self.uc.uc_mcontext.__gregs[0] as Address
    }

    fn set_pc(&mut self, pc: Address) {
        self.uc.uc_mcontext.__gregs[0] = pc as _;
    }
}
