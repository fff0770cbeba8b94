/*!
 * Shared test helpers
 */

#![allow(dead_code)]


use nix::sys::signal::Signal;
use safe_syscall::signals::{install, Installation};
use safe_syscall::SafeSyscallConfig;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};
use std::sync::OnceLock;

static INSTALLATION: OnceLock<Installation> = OnceLock::new();

/// Install the host handler for SIGUSR1/SIGUSR2, once per test binary
pub fn install_test_handler() -> &'static Installation {
    INSTALLATION.get_or_init(|| {
        install(&SafeSyscallConfig::with_signals([Signal::SIGUSR1, Signal::SIGUSR2]))
            .expect("install host signal handler")
    })
}

/// Non-blocking pipe
pub struct Pipe {
    pub read: OwnedFd,
    pub write: OwnedFd,
}

impl Pipe {
    pub fn new() -> Self {
        let mut fds: [libc::c_int; 2] = [-1; 2];
        let rc = unsafe { libc::pipe2(fds.as_mut_ptr(), libc::O_NONBLOCK | libc::O_CLOEXEC) };
        assert_eq!(rc, 0, "pipe2 failed");
        unsafe {
            Self {
                read: OwnedFd::from_raw_fd(fds[0]),
                write: OwnedFd::from_raw_fd(fds[1]),
            }
        }
    }

    pub fn read_fd(&self) -> RawFd {
        self.read.as_raw_fd()
    }

    pub fn write_fd(&self) -> RawFd {
        self.write.as_raw_fd()
    }

    /// Read everything currently buffered, bypassing the safe-syscall path
    pub fn drain(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = unsafe { libc::read(self.read_fd(), buf.as_mut_ptr().cast(), buf.len()) };
            if n <= 0 {
                break;
            }
            out.extend_from_slice(&buf[..n as usize]);
        }
        out
    }

    pub fn fill(&self, data: &[u8]) {
        let n = unsafe { libc::write(self.write_fd(), data.as_ptr().cast(), data.len()) };
        assert_eq!(n, data.len() as isize);
    }
}
