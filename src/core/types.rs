/*!
 * Core Types
 * Common types shared by the trampolines, the rewind filter and the syscall layer
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine word as passed to and returned from a host syscall
pub type HostWord = libc::c_long;

/// Host program counter
pub type Address = usize;

/// Maximum argument words a host syscall accepts
pub const MAX_SYSCALL_ARGS: usize = 6;

/// Host instruction-set architectures with a dedicated trampoline variant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostArch {
    X86_64,
    Aarch64,
    Riscv64,
    /// Any other host; only the signal-masking trampoline is available
    Other,
}

impl HostArch {
    /// Architecture this crate was built for
    pub const fn current() -> Self {
        if cfg!(target_arch = "x86_64") {
            HostArch::X86_64
        } else if cfg!(target_arch = "aarch64") {
            HostArch::Aarch64
        } else if cfg!(target_arch = "riscv64") {
            HostArch::Riscv64
        } else {
            HostArch::Other
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            HostArch::X86_64 => "x86_64",
            HostArch::Aarch64 => "aarch64",
            HostArch::Riscv64 => "riscv64",
            HostArch::Other => "other",
        }
    }
}

impl fmt::Display for HostArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Opaque syscall argument words, zero-padded to the host maximum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SyscallArgs([HostWord; MAX_SYSCALL_ARGS]);

impl SyscallArgs {
    /// Build from the emulator's argument list
    ///
    /// Missing trailing words are zero. Callers validate the count; words past
    /// the host maximum are not forwarded.
    #[inline]
    pub fn from_slice(args: &[HostWord]) -> Self {
        debug_assert!(
            args.len() <= MAX_SYSCALL_ARGS,
            "host syscalls take at most {} arguments",
            MAX_SYSCALL_ARGS
        );
        let mut words = [0; MAX_SYSCALL_ARGS];
        for (slot, arg) in words.iter_mut().zip(args) {
            *slot = *arg;
        }
        Self(words)
    }

    #[inline]
    pub fn words(&self) -> &[HostWord; MAX_SYSCALL_ARGS] {
        &self.0
    }
}

impl From<[HostWord; MAX_SYSCALL_ARGS]> for SyscallArgs {
    fn from(words: [HostWord; MAX_SYSCALL_ARGS]) -> Self {
        Self(words)
    }
}
