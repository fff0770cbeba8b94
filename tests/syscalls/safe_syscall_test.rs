/*!
 * Safe Syscall Tests
 * End-to-end issuance through the host trampoline
 */

use crate::common::Pipe;
use nix::sys::signal::Signal;
use pretty_assertions::assert_eq;
use safe_syscall::safe_syscall;
use safe_syscall::syscalls::errno::last_error_raw;
use safe_syscall::syscalls::trampoline::{masked_trampoline, registered, SyscallTrampoline};
use safe_syscall::syscalls::{
    safe_openat, safe_read, safe_wait4, safe_write, SyscallOutcome, ERESTARTSYS,
};
use safe_syscall::{HostWord, SyscallArgs, ThreadSignalState};
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;

#[test]
fn test_read_returns_bytes_read() {
    let state = ThreadSignalState::new();
    let pipe = Pipe::new();
    pipe.fill(b"hello");

    let mut buf = [0u8; 16];
    let outcome = safe_read(state.pending_flag(), pipe.read_fd(), &mut buf);

    assert_eq!(outcome, SyscallOutcome::Success(5));
    assert_eq!(&buf[..5], b"hello");
}

#[test]
fn test_read_empty_nonblocking_pipe_is_eagain() {
    let state = ThreadSignalState::new();
    let pipe = Pipe::new();

    let mut buf = [0u8; 16];
    let outcome = safe_read(state.pending_flag(), pipe.read_fd(), &mut buf);

    assert_eq!(outcome, SyscallOutcome::Failure(libc::EAGAIN));
    assert_eq!(outcome.host_return(), -1);
    assert_eq!(last_error_raw(), libc::EAGAIN);
}

#[test]
fn test_pending_read_is_not_issued() {
    let state = ThreadSignalState::new();
    let pipe = Pipe::new();
    pipe.fill(b"hello");
    state.queue(Signal::SIGUSR1);

    let mut buf = [0u8; 16];
    let outcome = safe_read(state.pending_flag(), pipe.read_fd(), &mut buf);

    assert_eq!(outcome, SyscallOutcome::Restart);
    assert_eq!(last_error_raw(), ERESTARTSYS);
    // Data still buffered: the read never reached the kernel
    assert_eq!(pipe.drain(), b"hello".to_vec());
}

#[test]
fn test_pending_write_is_not_issued() {
    let state = ThreadSignalState::new();
    let pipe = Pipe::new();
    state.queue(Signal::SIGUSR2);

    let outcome = safe_write(state.pending_flag(), pipe.write_fd(), b"data");
    assert_eq!(outcome, SyscallOutcome::Restart);
    assert!(pipe.drain().is_empty());

    assert_eq!(state.take_pending(), vec![Signal::SIGUSR2]);
    let outcome = safe_write(state.pending_flag(), pipe.write_fd(), b"data");
    assert_eq!(outcome, SyscallOutcome::Success(4));
    assert_eq!(pipe.drain(), b"data".to_vec());
}

#[test]
fn test_every_variant_honours_contract() {
    let variants: Vec<&dyn SyscallTrampoline> = registered()
        .iter()
        .copied()
        .chain(std::iter::once(masked_trampoline()))
        .collect();

    for variant in variants {
        let state = ThreadSignalState::new();
        let pipe = Pipe::new();
        let data = b"xyz";
        let args = SyscallArgs::from_slice(&[
            pipe.write_fd() as HostWord,
            data.as_ptr() as HostWord,
            data.len() as HostWord,
        ]);

        let raw = unsafe { variant.invoke(state.pending_flag(), libc::SYS_write, &args) };
        assert_eq!(SyscallOutcome::from_trampoline(raw), SyscallOutcome::Success(3), "{}", variant.arch());

        state.queue(Signal::SIGUSR1);
        let raw = unsafe { variant.invoke(state.pending_flag(), libc::SYS_write, &args) };
        assert_eq!(raw, -(ERESTARTSYS as HostWord), "{}", variant.arch());

        assert_eq!(pipe.drain(), data.to_vec());
    }
}

#[test]
fn test_six_arguments_reach_the_kernel() {
    let state = ThreadSignalState::new();
    let len = 4096;
    let outcome = unsafe {
        safe_syscall!(
            state.pending_flag(),
            libc::SYS_mmap,
            0,
            len,
            libc::PROT_READ | libc::PROT_WRITE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0
        )
    };

    let addr = match outcome {
        SyscallOutcome::Success(addr) => addr,
        other => panic!("mmap failed: {}", other),
    };
    assert_ne!(addr, 0);
    assert_eq!(unsafe { libc::munmap(addr as *mut libc::c_void, len) }, 0);
}

#[test]
fn test_openat_through_safe_path() {
    let state = ThreadSignalState::new();
    let file = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(file.path(), b"contents").unwrap();
    let path = CString::new(file.path().as_os_str().as_bytes()).unwrap();

    let outcome = safe_openat(state.pending_flag(), libc::AT_FDCWD, &path, libc::O_RDONLY | libc::O_CLOEXEC, 0);
    let fd = match outcome {
        SyscallOutcome::Success(fd) => fd as libc::c_int,
        other => panic!("openat failed: {}", other),
    };

    let mut buf = [0u8; 8];
    assert_eq!(safe_read(state.pending_flag(), fd, &mut buf), SyscallOutcome::Success(8));
    assert_eq!(&buf, b"contents");
    unsafe { libc::close(fd) };

    let missing = CString::new("/nonexistent/safe-syscall").unwrap();
    assert_eq!(
        safe_openat(state.pending_flag(), libc::AT_FDCWD, &missing, libc::O_RDONLY, 0),
        SyscallOutcome::Failure(libc::ENOENT)
    );
}

#[test]
fn test_wait4_reaps_child() {
    let state = ThreadSignalState::new();
    let child = std::process::Command::new("true").spawn().unwrap();
    let pid = child.id() as libc::pid_t;

    let mut status = 0;
    let outcome = loop {
        match safe_wait4(state.pending_flag(), pid, Some(&mut status), 0) {
            SyscallOutcome::Failure(libc::EINTR) => continue,
            other => break other,
        }
    };

    assert_eq!(outcome, SyscallOutcome::Success(pid as HostWord));
    assert!(libc::WIFEXITED(status));
    assert_eq!(libc::WEXITSTATUS(status), 0);
}
