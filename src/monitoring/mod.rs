/*!
 * Monitoring
 * Tracing setup and process-wide safe-syscall counters
 */

mod stats;
mod tracer;

pub use stats::{global, stats, AtomicSafeSyscallStats, SafeSyscallStats};
pub use tracer::{init_tracing, TRACE_JSON_ENV};
