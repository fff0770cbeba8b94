/*!
 * Errno Side Channel
 * Thread-local last-error cell consumed by guest errno emulation
 *
 * Mirrors the host convention of returning -1 and recording the error code
 * separately. The code is also written to the host errno.
 */

use nix::errno::Errno;
use std::cell::Cell;

thread_local! {
    static LAST_ERROR: Cell<i32> = const { Cell::new(0) };
}

/// Record an error code for the current thread
#[inline]
pub fn set_last_error(code: i32) {
    LAST_ERROR.with(|cell| cell.set(code));
    Errno::set_raw(code);
}

/// Last error code recorded on this thread, if any
#[inline]
pub fn last_error() -> Option<Errno> {
    match LAST_ERROR.with(|cell| cell.get()) {
        0 => None,
        code => Some(Errno::from_raw(code)),
    }
}

/// Raw last error code (0 when none)
#[inline]
pub fn last_error_raw() -> i32 {
    LAST_ERROR.with(|cell| cell.get())
}

#[inline]
pub fn clear_last_error() {
    LAST_ERROR.with(|cell| cell.set(0));
}
