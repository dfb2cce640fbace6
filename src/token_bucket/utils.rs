//! # Utility Functions (utils.rs)
//!
//! Time and CPU helpers shared by the bucket and its clocks.
//!
//! ```text
//!     Monotonic time base:
//!
//!     first call ──► Instant captured (epoch = 0 ns)
//!          │
//!          ▼
//!     later calls ──► epoch + Instant::elapsed()
//!
//!     Never goes backward, unaffected by wall-clock jumps.
//! ```

use std::sync::OnceLock;
use std::time::{Duration, Instant};

// Process-local epoch for monotonic timestamps. Captured on first use so that
// timestamps start near zero and comfortably fit in a u64 for centuries.
static MONOTONIC_BASE: OnceLock<Instant> = OnceLock::new();

/// CPU-specific relaxation hint for spin loops.
///
/// Emits PAUSE on x86_64 and YIELD on ARM64 through
/// [`std::hint::spin_loop`]. It does not give up the time slice: a
/// [`BlockMode::BlockSpin`](crate::BlockMode::BlockSpin) take keeps its core
/// busy for the whole wait.
///
/// ```rust
/// use pacer::cpu_relax;
///
/// for _ in 0..10 {
///     cpu_relax();
/// }
/// ```
#[inline(always)]
pub fn cpu_relax() {
    std::hint::spin_loop();
}

/// Returns a monotonically non-decreasing nanosecond count.
///
/// The epoch is unspecified (it is the first call within the process), so
/// only differences between two readings are meaningful.
///
/// # Example
///
/// ```rust
/// use pacer::current_monotonic_time_ns;
///
/// let start = current_monotonic_time_ns();
/// // ... some operation ...
/// let elapsed = current_monotonic_time_ns() - start;
/// println!("Operation took {} nanoseconds", elapsed);
/// ```
#[inline]
pub fn current_monotonic_time_ns() -> u64 {
    let base = MONOTONIC_BASE.get_or_init(Instant::now);
    // u128 -> u64 only truncates after ~584 years of uptime.
    base.elapsed().as_nanos().min(u64::MAX as u128) as u64
}

/// Suspends the calling thread for roughly `ns` nanoseconds.
///
/// The OS may wake the thread late; sub-millisecond requests in particular
/// tend to overshoot.
#[inline]
pub(crate) fn sleep_ns(ns: u64) {
    if ns > 0 {
        std::thread::sleep(Duration::from_nanos(ns));
    }
}
