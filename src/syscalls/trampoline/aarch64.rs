/*!
 * aarch64 Trampoline
 *
 * AAPCS64 call: x0 = pending flag, x1 = number, x2-x7 = args 0-5.
 * Linux syscall: x8 = number, x0-x5 = args.
 */

use super::SyscallTrampoline;
use crate::core::{HostArch, HostWord, SyscallArgs};
use crate::signals::PendingFlag;
use crate::syscalls::window::SafeWindow;
use std::arch::global_asm;

global_asm!(
    ".text",
    ".p2align 4",
    ".globl __safe_syscall_aarch64",
    ".type __safe_syscall_aarch64, %function",
    "__safe_syscall_aarch64:",
    ".cfi_startproc",
    "mov x9, x0",
    "mov x8, x1",
    "mov x0, x2",
    "mov x1, x3",
    "mov x2, x4",
    "mov x3, x5",
    "mov x4, x6",
    "mov x5, x7",
    ".globl __safe_syscall_aarch64_start",
    "__safe_syscall_aarch64_start:",
    "ldr w10, [x9]",
    "cbnz w10, 2f",
    "svc #0",
    ".globl __safe_syscall_aarch64_end",
    "__safe_syscall_aarch64_end:",
    "ret",
    "2:",
    "mov x0, #-512",
    "ret",
    ".cfi_endproc",
    ".size __safe_syscall_aarch64, . - __safe_syscall_aarch64",
);

extern "C" {
    fn __safe_syscall_aarch64(
        pending: *const u32,
        number: HostWord,
        a0: HostWord,
        a1: HostWord,
        a2: HostWord,
        a3: HostWord,
        a4: HostWord,
        a5: HostWord,
    ) -> HostWord;
    fn __safe_syscall_aarch64_start();
    fn __safe_syscall_aarch64_end();
}

/// `svc #0`, little-endian
const SYSCALL_INSN: [u8; 4] = [0x01, 0x00, 0x00, 0xd4];

pub struct Aarch64Trampoline;

impl SyscallTrampoline for Aarch64Trampoline {
    fn arch(&self) -> HostArch {
        HostArch::Aarch64
    }

    fn window(&self) -> Option<SafeWindow> {
        Some(SafeWindow::new(
            __safe_syscall_aarch64_start as *const () as usize,
            __safe_syscall_aarch64_end as *const () as usize,
        ))
    }

    fn syscall_instruction(&self) -> &'static [u8] {
        &SYSCALL_INSN
    }

    #[inline]
    unsafe fn invoke(&self, pending: &PendingFlag, number: HostWord, args: &SyscallArgs) -> HostWord {
        let [a0, a1, a2, a3, a4, a5] = *args.words();
        __safe_syscall_aarch64(pending.as_ptr(), number, a0, a1, a2, a3, a4, a5)
    }
}
