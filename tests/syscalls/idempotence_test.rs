/*!
 * Restart Idempotence Tests
 * Interrupts at every step of the modeled check-then-call sequence
 */

use crate::common::sim::{Machine, SimOutcome, PROGRAM, WINDOW};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

#[test]
fn test_no_interrupt_issues_once() {
    let mut machine = Machine::new(true);
    assert_eq!(machine.invoke(&[]), SimOutcome::Success);
    assert_eq!(machine.syscalls_issued, 1);
}

#[test]
fn test_pending_before_entry_issues_nothing() {
    let mut machine = Machine::new(true);
    machine.pending = true;
    assert_eq!(machine.invoke(&[]), SimOutcome::Restart);
    assert_eq!(machine.syscalls_issued, 0);
}

#[test]
fn test_single_interrupt_at_each_step() {
    // Steps 0..=4 reach the syscall; 5 is the return after it
    for step in 0..PROGRAM.len() - 1 {
        let mut machine = Machine::new(true);
        let outcome = machine.invoke(&[step]);

        if step <= WINDOW.end - 1 {
            assert_eq!(outcome, SimOutcome::Restart, "interrupt before step {}", step);
            assert_eq!(machine.syscalls_issued, 0);
        } else {
            assert_eq!(outcome, SimOutcome::Success, "interrupt before step {}", step);
            assert_eq!(machine.syscalls_issued, 1);
        }
        assert!(!machine.issued_while_pending);
    }
}

#[test]
fn test_interrupt_inside_window_is_rewound() {
    for step in WINDOW.start + 1..WINDOW.end {
        let mut machine = Machine::new(true);
        machine.invoke(&[step]);
        assert_eq!(machine.rewinds, 1, "step {}", step);
    }
}

#[test]
fn test_without_rewind_check_can_be_bypassed() {
    // Interrupt after the flag was loaded but before the syscall
    let mut machine = Machine::new(false);
    assert_eq!(machine.invoke(&[WINDOW.end - 1]), SimOutcome::Success);
    assert!(machine.issued_while_pending);
}

proptest! {
    #[test]
    fn logical_call_issues_exactly_once(interrupts in prop::collection::vec(0usize..64, 0..16)) {
        let mut machine = Machine::new(true);
        machine.logical_call(&interrupts);

        prop_assert_eq!(machine.syscalls_issued, 1);
        prop_assert!(!machine.issued_while_pending);
    }
}
