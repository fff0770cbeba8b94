/*!
 * Interrupt Stress Tests
 * Signal storms against an attached guest thread
 *
 * Every logical write must land in the pipe exactly once no matter where the
 * signals hit the trampoline, and the pending flag must never outlive the
 * queued signals it announces.
 */

use crate::common::{install_test_handler, Pipe};
use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use safe_syscall::signals::{GuestThread, PendingFlag};
use safe_syscall::syscalls::trampoline::{masked_trampoline, window_trampoline};
use safe_syscall::syscalls::{safe_write, SyscallOutcome};
use safe_syscall::{stats, HostWord, SyscallArgs};
use serial_test::serial;
use std::os::fd::RawFd;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::time::{Duration, Instant};

const WRITES: usize = 4000;
const TAKES: usize = 2_000_000;
const WINDOW_HIT_DEADLINE: Duration = Duration::from_secs(20);

/// Run `work` on an attached guest thread while SIGUSR1 is sent to it with
/// random spacing until `work` returns
fn storm<T, F>(seed: u64, work: F) -> T
where
    T: Send + 'static,
    F: FnOnce(&GuestThread) -> T + Send + 'static,
{
    install_test_handler();
    let done = Arc::new(AtomicBool::new(false));
    let (tx, rx) = mpsc::channel();

    let worker_done = done.clone();
    let worker = std::thread::spawn(move || {
        let guest = GuestThread::attach().unwrap();
        tx.send(unsafe { libc::pthread_self() }).unwrap();
        let result = work(&guest);
        worker_done.store(true, Ordering::SeqCst);
        result
    });

    let target = rx.recv().unwrap();
    let mut rng = StdRng::seed_from_u64(seed);
    while !done.load(Ordering::SeqCst) {
        unsafe { libc::pthread_kill(target, libc::SIGUSR1) };
        for _ in 0..rng.gen_range(0..256) {
            std::hint::spin_loop();
        }
    }

    worker.join().unwrap()
}

struct StormReport {
    restarts_without_signal: usize,
}

fn run_storm(seed: u64, write: fn(&PendingFlag, RawFd) -> SyscallOutcome) -> (Pipe, StormReport) {
    let pipe = Pipe::new();
    let write_fd = pipe.write_fd();

    let report = storm(seed, move |guest| {
        let mut report = StormReport {
            restarts_without_signal: 0,
        };
        for _ in 0..WRITES {
            loop {
                match write(guest.pending_flag(), write_fd) {
                    SyscallOutcome::Success(1) => break,
                    SyscallOutcome::Restart => {
                        if guest.take_pending().is_empty() {
                            report.restarts_without_signal += 1;
                        }
                    }
                    SyscallOutcome::Failure(libc::EINTR) => continue,
                    other => panic!("unexpected outcome {}", other),
                }
            }
        }
        report
    });
    (pipe, report)
}

fn write_active(pending: &PendingFlag, fd: RawFd) -> SyscallOutcome {
    safe_write(pending, fd, b"x")
}

fn write_masked(pending: &PendingFlag, fd: RawFd) -> SyscallOutcome {
    let byte = b"x";
    let args = SyscallArgs::from_slice(&[fd as HostWord, byte.as_ptr() as HostWord, 1]);
    let raw = unsafe { masked_trampoline().invoke(pending, libc::SYS_write, &args) };
    SyscallOutcome::from_trampoline(raw)
}

#[test]
#[serial]
fn test_signal_storm_active_trampoline() {
    let (pipe, report) = run_storm(0x5afe, write_active);

    assert_eq!(pipe.drain().len(), WRITES);
    assert_eq!(report.restarts_without_signal, 0);
}

#[test]
#[serial]
fn test_signal_storm_masked_trampoline() {
    let (pipe, report) = run_storm(0xca11, write_masked);

    assert_eq!(pipe.drain().len(), WRITES);
    assert_eq!(report.restarts_without_signal, 0);
}

#[test]
#[serial]
fn test_take_pending_never_leaves_flag_without_signal() {
    let spurious = storm(0x7a4e, |guest| {
        let mut spurious = 0usize;
        for _ in 0..TAKES {
            let was_pending = guest.pending_flag().is_pending();
            if guest.take_pending().is_empty() && was_pending {
                spurious += 1;
            }
        }
        spurious
    });

    assert_eq!(spurious, 0);
}

#[test]
#[serial]
fn test_signal_storm_rewinds_inside_real_window() {
    let Some(trampoline) = window_trampoline() else {
        return;
    };
    let before = stats().rewinds;

    // With a signal kept queued every call aborts inside the window, so the
    // guest spends its time in user mode around the pending check.
    let (rewinds, stray) = storm(0x3e3d, move |guest| {
        guest.state().queue(nix::sys::signal::Signal::SIGUSR2);
        let args = SyscallArgs::default();
        let deadline = Instant::now() + WINDOW_HIT_DEADLINE;
        let mut stray = 0usize;
        while stats().rewinds == before && Instant::now() < deadline {
            for _ in 0..1024 {
                let raw = unsafe { trampoline.invoke(guest.pending_flag(), libc::SYS_getpid, &args) };
                if SyscallOutcome::from_trampoline(raw) != SyscallOutcome::Restart {
                    stray += 1;
                }
            }
        }
        guest.take_pending();
        (stats().rewinds - before, stray)
    });

    println!("rewinds observed: {}", rewinds);
    assert!(rewinds > 0);
    assert_eq!(stray, 0);
}
