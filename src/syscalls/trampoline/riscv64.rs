/*!
 * riscv64 Trampoline
 *
 * LP64 call: a0 = pending flag, a1 = number, a2-a7 = args 0-5.
 * Linux syscall: a7 = number, a0-a5 = args. The number goes through t1
 * because a7 still holds arg 5 while the arguments shift down.
 */

use super::SyscallTrampoline;
use crate::core::{HostArch, HostWord, SyscallArgs};
use crate::signals::PendingFlag;
use crate::syscalls::window::SafeWindow;
use std::arch::global_asm;

global_asm!(
    ".text",
    ".p2align 2",
    ".globl __safe_syscall_riscv64",
    ".type __safe_syscall_riscv64, @function",
    "__safe_syscall_riscv64:",
    ".cfi_startproc",
    "mv t0, a0",
    "mv t1, a1",
    "mv a0, a2",
    "mv a1, a3",
    "mv a2, a4",
    "mv a3, a5",
    "mv a4, a6",
    "mv a5, a7",
    "mv a7, t1",
    ".globl __safe_syscall_riscv64_start",
    "__safe_syscall_riscv64_start:",
    "lw t1, 0(t0)",
    "bnez t1, 2f",
    "ecall",
    ".globl __safe_syscall_riscv64_end",
    "__safe_syscall_riscv64_end:",
    "ret",
    "2:",
    "li a0, -512",
    "ret",
    ".cfi_endproc",
    ".size __safe_syscall_riscv64, . - __safe_syscall_riscv64",
);

extern "C" {
    fn __safe_syscall_riscv64(
        pending: *const u32,
        number: HostWord,
        a0: HostWord,
        a1: HostWord,
        a2: HostWord,
        a3: HostWord,
        a4: HostWord,
        a5: HostWord,
    ) -> HostWord;
    fn __safe_syscall_riscv64_start();
    fn __safe_syscall_riscv64_end();
}

/// `ecall`, little-endian
const SYSCALL_INSN: [u8; 4] = [0x73, 0x00, 0x00, 0x00];

pub struct Riscv64Trampoline;

impl SyscallTrampoline for Riscv64Trampoline {
    fn arch(&self) -> HostArch {
        HostArch::Riscv64
    }

    fn window(&self) -> Option<SafeWindow> {
        Some(SafeWindow::new(
            __safe_syscall_riscv64_start as *const () as usize,
            __safe_syscall_riscv64_end as *const () as usize,
        ))
    }

    fn syscall_instruction(&self) -> &'static [u8] {
        &SYSCALL_INSN
    }

    #[inline]
    unsafe fn invoke(&self, pending: &PendingFlag, number: HostWord, args: &SyscallArgs) -> HostWord {
        let [a0, a1, a2, a3, a4, a5] = *args.words();
        __safe_syscall_riscv64(pending.as_ptr(), number, a0, a1, a2, a3, a4, a5)
    }
}
