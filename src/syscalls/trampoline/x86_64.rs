/*!
 * x86_64 Trampoline
 *
 * System V call: rdi = pending flag, rsi = number, rdx rcx r8 r9 = args 0-3,
 * args 4-5 on the stack. Linux syscall: rax = number, rdi rsi rdx r10 r8 r9.
 * The flag pointer lives in rbp across the window since the syscall
 * instruction clobbers rcx and r11.
 */

use super::SyscallTrampoline;
use crate::core::{HostArch, HostWord, SyscallArgs};
use crate::signals::PendingFlag;
use crate::syscalls::window::SafeWindow;
use std::arch::global_asm;

global_asm!(
    ".text",
    ".p2align 4",
    ".globl __safe_syscall_x86_64",
    ".type __safe_syscall_x86_64, @function",
    "__safe_syscall_x86_64:",
    ".cfi_startproc",
    "push rbp",
    ".cfi_adjust_cfa_offset 8",
    ".cfi_rel_offset rbp, 0",
    "mov rbp, rdi",
    "mov rax, rsi",
    "mov rdi, rdx",
    "mov rsi, rcx",
    "mov rdx, r8",
    "mov r10, r9",
    "mov r8, qword ptr [rsp + 16]",
    "mov r9, qword ptr [rsp + 24]",
    ".globl __safe_syscall_x86_64_start",
    "__safe_syscall_x86_64_start:",
    "cmp dword ptr [rbp], 0",
    "jnz 2f",
    "syscall",
    ".globl __safe_syscall_x86_64_end",
    "__safe_syscall_x86_64_end:",
    "pop rbp",
    ".cfi_remember_state",
    ".cfi_adjust_cfa_offset -8",
    ".cfi_restore rbp",
    "ret",
    ".cfi_restore_state",
    "2:",
    "pop rbp",
    ".cfi_adjust_cfa_offset -8",
    ".cfi_restore rbp",
    "mov rax, -512",
    "ret",
    ".cfi_endproc",
    ".size __safe_syscall_x86_64, . - __safe_syscall_x86_64",
);

extern "C" {
    fn __safe_syscall_x86_64(
        pending: *const u32,
        number: HostWord,
        a0: HostWord,
        a1: HostWord,
        a2: HostWord,
        a3: HostWord,
        a4: HostWord,
        a5: HostWord,
    ) -> HostWord;
    fn __safe_syscall_x86_64_start();
    fn __safe_syscall_x86_64_end();
}

/// `syscall`
const SYSCALL_INSN: [u8; 2] = [0x0f, 0x05];

pub struct X86_64Trampoline;

impl SyscallTrampoline for X86_64Trampoline {
    fn arch(&self) -> HostArch {
        HostArch::X86_64
    }

    fn window(&self) -> Option<SafeWindow> {
        Some(SafeWindow::new(
            __safe_syscall_x86_64_start as *const () as usize,
            __safe_syscall_x86_64_end as *const () as usize,
        ))
    }

    fn syscall_instruction(&self) -> &'static [u8] {
        &SYSCALL_INSN
    }

    #[inline]
    unsafe fn invoke(&self, pending: &PendingFlag, number: HostWord, args: &SyscallArgs) -> HostWord {
        let [a0, a1, a2, a3, a4, a5] = *args.words();
        __safe_syscall_x86_64(pending.as_ptr(), number, a0, a1, a2, a3, a4, a5)
    }
}
