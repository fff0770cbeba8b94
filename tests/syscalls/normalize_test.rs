/*!
 * Result Normalization Tests
 * Error band boundary of the host return-word convention
 */

use proptest::prelude::*;
use safe_syscall::syscalls::{SyscallOutcome, MAX_ERRNO};
use safe_syscall::HostWord;

proptest! {
    #[test]
    fn error_band_normalizes_to_failure(code in 1..=MAX_ERRNO) {
        let raw = -(code as HostWord);
        prop_assert_eq!(SyscallOutcome::normalize(raw), SyscallOutcome::Failure(code));
    }

    #[test]
    fn below_error_band_passes_through(raw in HostWord::MIN..=-4096) {
        prop_assert_eq!(SyscallOutcome::normalize(raw), SyscallOutcome::Success(raw));
    }

    #[test]
    fn non_negative_passes_through(raw in 0..=HostWord::MAX) {
        prop_assert_eq!(SyscallOutcome::normalize(raw), SyscallOutcome::Success(raw));
    }

    #[test]
    fn unsigned_comparison_matches_signed_band(raw in any::<HostWord>()) {
        let is_error = (-4095..=-1).contains(&raw);
        prop_assert_eq!(!SyscallOutcome::normalize(raw).is_success(), is_error);
    }
}

#[test]
fn test_read_scenario_values() {
    assert_eq!(SyscallOutcome::normalize(5), SyscallOutcome::Success(5));
    assert_eq!(SyscallOutcome::normalize(-11), SyscallOutcome::Failure(11));
}

#[test]
fn test_high_mapping_address_not_an_error() {
    // Top-of-address-space mapping just below the error band
    let addr = (-4096 as HostWord) - 0x10_0000;
    assert_eq!(SyscallOutcome::normalize(addr), SyscallOutcome::Success(addr));
}
