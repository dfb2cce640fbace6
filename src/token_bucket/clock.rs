//! # Time Sources
//!
//! The bucket never reads the time directly. It asks a [`Clock`], which also
//! decides how to wait:
//!
//! ```text
//!     TokenBucket ──► Clock::now_ns()    (every loop iteration)
//!          │
//!          ├────────► Clock::spin()      (BlockSpin)
//!          │
//!          └────────► Clock::sleep_ns()  (BlockSleep)
//! ```
//!
//! [`MonotonicClock`] is the production clock. [`ManualClock`] only moves
//! when told to, which makes refill boundaries exact and tests instant.

use super::utils::{cpu_relax, current_monotonic_time_ns, sleep_ns};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Default amount a [`ManualClock`] advances per spin (1 ms).
pub const DEFAULT_SPIN_STEP_NS: u64 = 1_000_000;

/// A monotonic time source that also knows how to wait.
///
/// Implementations must never report a time earlier than a previous
/// reading.
pub trait Clock {
    /// Current time in nanoseconds since an arbitrary epoch.
    fn now_ns(&self) -> u64;

    /// Suspends the caller for approximately `ns` nanoseconds.
    fn sleep_ns(&self, ns: u64);

    /// One iteration of a busy-wait loop.
    fn spin(&self);
}

/// The process monotonic clock.
///
/// ```rust
/// use pacer::{Clock, MonotonicClock};
///
/// let clock = MonotonicClock;
/// let a = clock.now_ns();
/// let b = clock.now_ns();
/// assert!(b >= a);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    #[inline]
    fn now_ns(&self) -> u64 {
        current_monotonic_time_ns()
    }

    #[inline]
    fn sleep_ns(&self, ns: u64) {
        sleep_ns(ns);
    }

    #[inline(always)]
    fn spin(&self) {
        cpu_relax();
    }
}

/// A hand-driven clock for tests and simulations.
///
/// Clones share the same timestamp, so a test can keep one handle while the
/// bucket owns another. Sleeping advances time by the requested amount and
/// each spin advances it by the spin step, so blocking takes terminate
/// without real waiting.
///
/// ```rust
/// use pacer::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
///
/// handle.advance(500);
/// assert_eq!(clock.now_ns(), 500);
/// ```
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<AtomicU64>,
    spin_step_ns: u64,
}

impl ManualClock {
    /// Creates a clock reading zero.
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Creates a clock reading `ns`.
    pub fn starting_at(ns: u64) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(ns)),
            spin_step_ns: DEFAULT_SPIN_STEP_NS,
        }
    }

    /// Sets how far each [`Clock::spin`] moves time forward.
    ///
    /// A step of zero makes a spinning take loop forever, since time would
    /// never reach the next refill boundary.
    pub fn with_spin_step(mut self, step_ns: u64) -> Self {
        self.spin_step_ns = step_ns;
        self
    }

    /// Moves time forward by `ns`, stopping at `u64::MAX`.
    pub fn advance(&self, ns: u64) {
        let _ = self
            .now
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |t| {
                Some(t.saturating_add(ns))
            });
    }

    /// Jumps to `ns`. Requests to move backward are ignored.
    pub fn set(&self, ns: u64) {
        self.now.fetch_max(ns, Ordering::SeqCst);
    }

    /// Current reading without going through the trait.
    pub fn get(&self) -> u64 {
        self.now.load(Ordering::SeqCst)
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now_ns(&self) -> u64 {
        self.get()
    }

    fn sleep_ns(&self, ns: u64) {
        self.advance(ns);
    }

    fn spin(&self) {
        self.advance(self.spin_step_ns);
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ns(&self) -> u64 {
        (**self).now_ns()
    }

    fn sleep_ns(&self, ns: u64) {
        (**self).sleep_ns(ns)
    }

    fn spin(&self) {
        (**self).spin()
    }
}
