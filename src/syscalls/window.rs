/*!
 * Safe Windows
 * Instruction ranges bracketing a trampoline's pending check and syscall
 */

use crate::core::{Address, HostArch, Result, SafeSyscallError};
use serde::Serialize;
use std::fmt;

/// Half-open host address range `[start, end)`
///
/// `start` is the first instruction of the pending-flag check, `end` is the
/// address just past the syscall instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SafeWindow {
    pub start: Address,
    pub end: Address,
}

impl SafeWindow {
    #[inline]
    pub const fn new(start: Address, end: Address) -> Self {
        Self { start, end }
    }

    #[inline]
    pub const fn contains(&self, pc: Address) -> bool {
        self.start <= pc && pc < self.end
    }

    #[inline]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check that `instruction` is the last instruction inside the window
    ///
    /// # Safety
    /// The window must describe mapped, readable code of this process.
    pub unsafe fn verify(&self, arch: HostArch, instruction: &[u8]) -> Result<()> {
        if self.start >= self.end {
            return Err(SafeSyscallError::invalid_window(
                arch,
                format!("start {:#x} is not below end {:#x}", self.start, self.end),
            ));
        }
        if self.len() <= instruction.len() {
            return Err(SafeSyscallError::invalid_window(
                arch,
                "window has no room for the pending check",
            ));
        }

        let tail = std::slice::from_raw_parts(
            (self.end - instruction.len()) as *const u8,
            instruction.len(),
        );
        if tail != instruction {
            return Err(SafeSyscallError::invalid_window(
                arch,
                format!(
                    "expected syscall instruction {:02x?} before end, found {:02x?}",
                    instruction, tail
                ),
            ));
        }
        Ok(())
    }
}

impl fmt::Display for SafeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:#x}, {:#x})", self.start, self.end)
    }
}

/// One row of the window table handed to the signal-interception layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WindowEntry {
    pub arch: HostArch,
    pub window: SafeWindow,
}
