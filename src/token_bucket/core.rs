//! # Core Token Bucket Implementation
//!
//! A single-owner token bucket with opportunistic refill. There is no
//! background timer: every [`TokenBucket::take`] call reads the clock and,
//! if a full interval has passed since the last refill, resets the bucket to
//! full before consuming.
//!
//! ```text
//!     Discrete refill (interval = 0.5s, amount = 100):
//!
//!     t=0.0   [100] ── take 80 ──► [20]
//!     t=0.3   [20]  ── take 10 ──► [10]     (no refill yet)
//!     t=0.6   [100] ── take 30 ──► [70]     (boundary passed: reset to full)
//!     t=9.0   [100]                         (long idle: still only 100)
//! ```
//!
//! ## Blocking takes
//!
//! A blocking take larger than what is left drains the bucket, waits for the
//! next boundary, and keeps going until the whole amount has been consumed:
//!
//! ```text
//!     take(400) with 40 left:
//!
//!     t=0.0  drain 40   (need 360)
//!     t=0.5  drain 100  (need 260)
//!     t=1.0  drain 100  (need 160)
//!     t=1.5  drain 100  (need 60)
//!     t=2.0  take 60    ──► 40 left, return Ok
//! ```

use super::{
    clock::{Clock, MonotonicClock},
    config::{BlockMode, TokenBucketConfig},
    error::TakeError,
    metrics::BucketMetrics,
};
use std::cell::Cell;
use std::fmt;
use std::marker::PhantomData;
use tracing::{debug, trace, warn};

/// Running counters behind [`BucketMetrics`].
#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    total_taken: u64,
    total_calls: u64,
    rejected_exceeds_capacity: u64,
    rejected_insufficient: u64,
    total_refills: u64,
    total_wait_ns: u64,
    max_wait_ns: u64,
}

/// Single-consumer token bucket rate limiter.
///
/// Throttles a repeated operation to an average of `refill_token_amount`
/// units per `refill_interval_ns`. The bucket starts full, and its observable
/// state is the pair ([`current_tokens`](Self::current_tokens),
/// [`last_refill_ns`](Self::last_refill_ns)). Only `take` changes it.
///
/// ## Thread Safety
///
/// There is no internal synchronization. The bucket is `Send` but not
/// `Sync`, and `take` needs `&mut self`; to share one bucket between threads,
/// wrap it in a `Mutex` and hold the lock across each `take`.
///
/// ## Example
///
/// ```rust
/// use pacer::{BlockMode, TakeError, TokenBucket};
///
/// // 100 tokens every half second
/// let mut bucket = TokenBucket::new(500_000_000, 100);
///
/// // Non-blocking requests larger than one refill can never succeed
/// assert!(matches!(
///     bucket.take(200, BlockMode::NonBlocking),
///     Err(TakeError::ExceedsCapacity { .. })
/// ));
///
/// // Spend part of the current period
/// bucket.take(60, BlockMode::NonBlocking).unwrap();
/// assert_eq!(bucket.current_tokens(), 40);
/// ```
pub struct TokenBucket<C = MonotonicClock> {
    current_tokens: i64,
    last_refill_ns: u64,
    refill_interval_ns: u64,
    refill_token_amount: i64,
    clock: C,
    counters: Counters,
    // Cell<()> is Send but not Sync, which is exactly the contract here.
    _not_sync: PhantomData<Cell<()>>,
}

impl TokenBucket {
    /// Creates a full bucket on the process monotonic clock.
    ///
    /// Never fails. A zero interval (refill on every call) or a non-positive
    /// amount (blocking takes never finish) is accepted but logged.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pacer::TokenBucket;
    ///
    /// let bucket = TokenBucket::new(1_000_000_000, 10);
    /// assert_eq!(bucket.current_tokens(), 10);
    /// ```
    pub fn new(refill_interval_ns: u64, refill_token_amount: i64) -> Self {
        Self::with_config(TokenBucketConfig::new(
            refill_interval_ns,
            refill_token_amount,
        ))
    }

    /// Creates a full bucket from a [`TokenBucketConfig`].
    pub fn with_config(config: TokenBucketConfig) -> Self {
        Self::with_clock(config, MonotonicClock)
    }
}

impl<C: Clock> TokenBucket<C> {
    /// Creates a full bucket that reads time from `clock`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pacer::{BlockMode, ManualClock, TokenBucket, TokenBucketConfig};
    ///
    /// let clock = ManualClock::new();
    /// let mut bucket = TokenBucket::with_clock(TokenBucketConfig::new(1_000, 5), clock.clone());
    ///
    /// bucket.take(5, BlockMode::NonBlocking).unwrap();
    /// assert!(bucket.take(1, BlockMode::NonBlocking).is_err());
    ///
    /// clock.advance(1_000);
    /// assert!(bucket.take(1, BlockMode::NonBlocking).is_ok());
    /// ```
    pub fn with_clock(config: TokenBucketConfig, clock: C) -> Self {
        if let Err(err) = config.validate() {
            warn!(
                refill_interval_ns = config.refill_interval_ns,
                refill_token_amount = config.refill_token_amount,
                "creating token bucket with degenerate configuration: {}",
                err
            );
        }

        let now = clock.now_ns();

        Self {
            current_tokens: config.refill_token_amount,
            last_refill_ns: now,
            refill_interval_ns: config.refill_interval_ns,
            refill_token_amount: config.refill_token_amount,
            clock,
            counters: Counters::default(),
            _not_sync: PhantomData,
        }
    }

    /// Takes `take_token_amount` tokens, waiting for refills if `mode`
    /// allows it.
    ///
    /// ## How it Works
    ///
    /// ```text
    ///     NonBlocking and amount > capacity ──► ExceedsCapacity (no clock read)
    ///          │
    ///          ▼
    ///     ┌─► read clock ──► boundary passed? ──Yes──► reset to full
    ///     │        │
    ///     │        ▼
    ///     │   enough tokens? ──Yes──► subtract ──► Ok
    ///     │        │
    ///     │        No
    ///     │        ├── NonBlocking ──► InsufficientTokens (nothing taken)
    ///     │        ▼
    ///     │   drain bucket, spin or sleep until boundary
    ///     └────────┘
    /// ```
    ///
    /// A request for 0 tokens always succeeds (after a possible refill).
    ///
    /// # Errors
    ///
    /// Only in [`BlockMode::NonBlocking`]:
    /// - [`TakeError::ExceedsCapacity`] if the amount exceeds
    ///   `refill_token_amount`; the clock is not read.
    /// - [`TakeError::InsufficientTokens`] if too few tokens remain in the
    ///   current period; the bucket is left unchanged.
    ///
    /// Blocking modes always return `Ok`, possibly after waiting forever if
    /// the bucket can never refill (e.g. `refill_token_amount <= 0`).
    ///
    /// # Example
    ///
    /// ```rust
    /// use pacer::{BlockMode, TakeError, TokenBucket};
    ///
    /// let mut bucket = TokenBucket::new(3_600_000_000_000, 10); // 10 per hour
    ///
    /// bucket.take(8, BlockMode::NonBlocking).unwrap();
    /// assert_eq!(
    ///     bucket.take(5, BlockMode::NonBlocking),
    ///     Err(TakeError::InsufficientTokens { requested: 5, available: 2 })
    /// );
    /// assert_eq!(bucket.current_tokens(), 2);
    /// ```
    pub fn take(&mut self, take_token_amount: u64, mode: BlockMode) -> Result<(), TakeError> {
        self.counters.total_calls += 1;

        if mode == BlockMode::NonBlocking && self.exceeds_capacity(take_token_amount) {
            self.counters.rejected_exceeds_capacity += 1;
            return Err(TakeError::ExceedsCapacity {
                requested: take_token_amount,
                capacity: self.refill_token_amount,
            });
        }

        let mut remaining = take_token_amount;
        let mut first_now = None;

        loop {
            let now = self.clock.now_ns();
            let started_at = *first_now.get_or_insert(now);

            self.refill_if_due(now);

            // Negative balances only exist for degenerate configurations and
            // count as empty.
            let available = self.current_tokens.max(0) as u64;

            if remaining <= available {
                // remaining <= available <= i64::MAX
                self.current_tokens -= remaining as i64;
                self.counters.total_taken = self.counters.total_taken.saturating_add(take_token_amount);
                self.record_wait(now.saturating_sub(started_at), take_token_amount);
                return Ok(());
            }

            if mode == BlockMode::NonBlocking {
                self.counters.rejected_insufficient += 1;
                return Err(TakeError::InsufficientTokens {
                    requested: take_token_amount,
                    available: self.current_tokens,
                });
            }

            // Blocking: keep what we can get now and wait for the rest.
            remaining -= available;
            self.current_tokens -= available as i64;

            self.wait_for_refill(now, mode);
        }
    }

    #[inline]
    fn exceeds_capacity(&self, take_token_amount: u64) -> bool {
        i128::from(take_token_amount) > i128::from(self.refill_token_amount)
    }

    /// Resets to full if a whole interval has passed since the last refill.
    ///
    /// Any number of elapsed intervals yields a single refill's worth.
    #[inline]
    fn refill_if_due(&mut self, now: u64) {
        if now >= self.next_refill_ns() {
            self.current_tokens = self.refill_token_amount;
            self.last_refill_ns = now;
            self.counters.total_refills += 1;
            trace!(
                now_ns = now,
                tokens = self.refill_token_amount,
                "token bucket refilled"
            );
        }
    }

    fn wait_for_refill(&self, now: u64, mode: BlockMode) {
        match mode {
            BlockMode::NonBlocking => {}
            BlockMode::BlockSpin => self.clock.spin(),
            BlockMode::BlockSleep => {
                let delta_ns = self.next_refill_ns().saturating_sub(now);
                if delta_ns > 0 {
                    self.clock.sleep_ns(delta_ns);
                }
            }
        }
    }

    fn record_wait(&mut self, waited_ns: u64, take_token_amount: u64) {
        if waited_ns == 0 {
            return;
        }
        self.counters.total_wait_ns = self.counters.total_wait_ns.saturating_add(waited_ns);
        self.counters.max_wait_ns = self.counters.max_wait_ns.max(waited_ns);
        debug!(
            tokens = take_token_amount,
            waited_ns, "blocking take completed after waiting for refill"
        );
    }

    /// Timestamp at which the next refill becomes due.
    ///
    /// Callers that need a bounded wait can compare this against their own
    /// deadline before choosing a blocking mode.
    #[inline]
    pub fn next_refill_ns(&self) -> u64 {
        self.last_refill_ns.saturating_add(self.refill_interval_ns)
    }

    /// Clears the counters behind [`metrics`](Self::metrics). Token state is
    /// left as it is.
    pub fn reset_metrics(&mut self) {
        self.counters = Counters::default();
    }

    /// Returns a snapshot of the bucket's counters.
    ///
    /// # Example
    ///
    /// ```rust
    /// use pacer::{BlockMode, TokenBucket};
    ///
    /// let mut bucket = TokenBucket::new(1_000_000_000, 100);
    /// bucket.take(30, BlockMode::NonBlocking).unwrap();
    ///
    /// let metrics = bucket.metrics();
    /// println!("{}", metrics);
    /// assert_eq!(metrics.current_tokens, 70);
    /// ```
    pub fn metrics(&self) -> BucketMetrics {
        BucketMetrics {
            total_taken: self.counters.total_taken,
            total_calls: self.counters.total_calls,
            rejected_exceeds_capacity: self.counters.rejected_exceeds_capacity,
            rejected_insufficient: self.counters.rejected_insufficient,
            total_refills: self.counters.total_refills,
            total_wait_ns: self.counters.total_wait_ns,
            max_wait_ns: self.counters.max_wait_ns,
            current_tokens: self.current_tokens,
            refill_token_amount: self.refill_token_amount,
        }
    }
}

impl<C> TokenBucket<C> {
    /// Tokens left as of the last `take`. Does not trigger a refill.
    #[inline]
    pub fn current_tokens(&self) -> i64 {
        self.current_tokens
    }

    /// Monotonic timestamp of the most recent refill (or of creation).
    #[inline]
    pub fn last_refill_ns(&self) -> u64 {
        self.last_refill_ns
    }

    /// Length of one refill period.
    #[inline]
    pub fn refill_interval_ns(&self) -> u64 {
        self.refill_interval_ns
    }

    /// Tokens per refill, and the bucket's capacity.
    #[inline]
    pub fn refill_token_amount(&self) -> i64 {
        self.refill_token_amount
    }

    /// The configuration this bucket was built with.
    pub fn config(&self) -> TokenBucketConfig {
        TokenBucketConfig::new(self.refill_interval_ns, self.refill_token_amount)
    }

    /// The bucket's time source.
    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C> fmt::Debug for TokenBucket<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBucket")
            .field("refill_interval_ns", &self.refill_interval_ns)
            .field("refill_token_amount", &self.refill_token_amount)
            .field("current_tokens", &self.current_tokens)
            .field("last_refill_ns", &self.last_refill_ns)
            .finish()
    }
}

impl<C> Drop for TokenBucket<C> {
    fn drop(&mut self) {
        trace!(
            current_tokens = self.current_tokens,
            total_taken = self.counters.total_taken,
            "token bucket dropped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token_bucket::clock::ManualClock;
    use std::sync::{Arc, Mutex};
    use std::thread;

    const HALF_SECOND: u64 = 500_000_000;
    const MS: u64 = 1_000_000;

    fn manual_bucket(interval_ns: u64, amount: i64) -> (TokenBucket<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let bucket = TokenBucket::with_clock(
            TokenBucketConfig::new(interval_ns, amount),
            clock.clone(),
        );
        (bucket, clock)
    }

    /// Counts how often the bucket looks at the time.
    #[derive(Debug, Default)]
    struct CountingClock {
        inner: ManualClock,
        reads: Cell<u64>,
    }

    impl Clock for CountingClock {
        fn now_ns(&self) -> u64 {
            self.reads.set(self.reads.get() + 1);
            self.inner.now_ns()
        }

        fn sleep_ns(&self, ns: u64) {
            self.inner.sleep_ns(ns)
        }

        fn spin(&self) {
            self.inner.spin()
        }
    }

    #[test]
    fn test_starts_full() {
        let clock = ManualClock::starting_at(42);
        let bucket = TokenBucket::with_clock(TokenBucketConfig::new(HALF_SECOND, 100), clock);

        assert_eq!(bucket.current_tokens(), 100);
        assert_eq!(bucket.last_refill_ns(), 42);
        assert_eq!(bucket.refill_interval_ns(), HALF_SECOND);
        assert_eq!(bucket.refill_token_amount(), 100);
        assert_eq!(bucket.next_refill_ns(), 42 + HALF_SECOND);
    }

    #[test]
    fn test_reference_scenario_spin() {
        let (mut bucket, clock) = manual_bucket(HALF_SECOND, 100);

        // 1. Over capacity, non-blocking
        assert_eq!(
            bucket.take(200, BlockMode::NonBlocking),
            Err(TakeError::ExceedsCapacity {
                requested: 200,
                capacity: 100
            })
        );
        assert_eq!(clock.get(), 0);

        // 2. Two periods' worth: the first 100 are free, the rest after one interval
        bucket.take(200, BlockMode::BlockSpin).unwrap();
        assert_eq!(clock.get(), HALF_SECOND);
        assert_eq!(bucket.current_tokens(), 0);

        // 3. Before the boundary
        clock.advance(400 * MS);
        assert_eq!(
            bucket.take(100, BlockMode::NonBlocking),
            Err(TakeError::InsufficientTokens {
                requested: 100,
                available: 0
            })
        );
        assert_eq!(bucket.current_tokens(), 0);

        // 4. Past the boundary
        clock.advance(200 * MS);
        bucket.take(100, BlockMode::NonBlocking).unwrap();
        assert_eq!(bucket.current_tokens(), 0);

        // 5. Refill triggered, no wait
        clock.advance(600 * MS);
        let before = clock.get();
        bucket.take(80, BlockMode::BlockSpin).unwrap();
        assert_eq!(clock.get(), before);
        assert_eq!(bucket.current_tokens(), 20);

        // 6. One interval of waiting
        let before = clock.get();
        bucket.take(80, BlockMode::BlockSpin).unwrap();
        assert_eq!(clock.get() - before, HALF_SECOND);
        assert_eq!(bucket.current_tokens(), 40);

        // 7. Four intervals of waiting
        let before = clock.get();
        bucket.take(400, BlockMode::BlockSpin).unwrap();
        assert_eq!(clock.get() - before, 4 * HALF_SECOND);
        assert_eq!(bucket.current_tokens(), 40);
    }

    #[test]
    fn test_reference_scenario_sleep() {
        let (mut bucket, clock) = manual_bucket(HALF_SECOND, 100);

        bucket.take(200, BlockMode::BlockSleep).unwrap();
        assert_eq!(clock.get(), HALF_SECOND);
        assert_eq!(bucket.current_tokens(), 0);

        clock.advance(1_200 * MS);
        bucket.take(80, BlockMode::BlockSleep).unwrap();
        assert_eq!(bucket.current_tokens(), 20);

        let before = clock.get();
        bucket.take(400, BlockMode::BlockSleep).unwrap();
        assert_eq!(clock.get() - before, 4 * HALF_SECOND);
        assert_eq!(bucket.current_tokens(), 20);
    }

    #[test]
    fn test_sleep_waits_exactly_until_boundary() {
        let (mut bucket, clock) = manual_bucket(1_000, 10);

        clock.advance(300);
        bucket.take(15, BlockMode::BlockSleep).unwrap();

        // Drained 10 at t=300, slept 700 to reach t=1000, took 5
        assert_eq!(clock.get(), 1_000);
        assert_eq!(bucket.last_refill_ns(), 1_000);
        assert_eq!(bucket.current_tokens(), 5);
    }

    #[test]
    fn test_exceeds_capacity_does_not_read_clock_or_mutate() {
        let clock = CountingClock::default();
        let mut bucket = TokenBucket::with_clock(TokenBucketConfig::new(1_000, 10), clock);
        let reads_after_create = bucket.clock().reads.get();

        bucket.take(4, BlockMode::NonBlocking).unwrap();
        let reads_before = bucket.clock().reads.get();
        assert!(reads_before > reads_after_create);

        let err = bucket.take(11, BlockMode::NonBlocking).unwrap_err();
        assert!(matches!(err, TakeError::ExceedsCapacity { .. }));
        assert_eq!(bucket.clock().reads.get(), reads_before);
        assert_eq!(bucket.current_tokens(), 6);
        assert_eq!(bucket.last_refill_ns(), 0);
    }

    #[test]
    fn test_insufficient_leaves_state_unchanged() {
        let (mut bucket, clock) = manual_bucket(1_000, 10);

        bucket.take(7, BlockMode::NonBlocking).unwrap();
        clock.advance(999);

        let before = (bucket.current_tokens(), bucket.last_refill_ns());
        assert_eq!(
            bucket.take(5, BlockMode::NonBlocking),
            Err(TakeError::InsufficientTokens {
                requested: 5,
                available: 3
            })
        );
        assert_eq!((bucket.current_tokens(), bucket.last_refill_ns()), before);
    }

    #[test]
    fn test_refill_exactly_at_boundary() {
        let (mut bucket, clock) = manual_bucket(1_000, 10);

        bucket.take(9, BlockMode::NonBlocking).unwrap();

        clock.advance(999);
        bucket.take(0, BlockMode::NonBlocking).unwrap();
        assert_eq!(bucket.current_tokens(), 1);

        clock.advance(1);
        bucket.take(0, BlockMode::NonBlocking).unwrap();
        assert_eq!(bucket.current_tokens(), 10);
        assert_eq!(bucket.last_refill_ns(), 1_000);
    }

    #[test]
    fn test_long_idle_grants_single_refill() {
        let (mut bucket, clock) = manual_bucket(1_000, 10);

        bucket.take(10, BlockMode::NonBlocking).unwrap();
        clock.advance(50_000);

        bucket.take(10, BlockMode::NonBlocking).unwrap();
        assert!(matches!(
            bucket.take(1, BlockMode::NonBlocking),
            Err(TakeError::InsufficientTokens { .. })
        ));
        assert_eq!(bucket.last_refill_ns(), 50_000);
    }

    #[test]
    fn test_exact_accounting_over_multiple_periods() {
        for k in 1..=5u64 {
            let clock = ManualClock::new().with_spin_step(1);
            let mut bucket =
                TokenBucket::with_clock(TokenBucketConfig::new(1_000, 10), clock.clone());

            bucket.take(10 * k, BlockMode::BlockSpin).unwrap();

            assert_eq!(clock.get(), (k - 1) * 1_000, "k = {}", k);
            assert_eq!(bucket.current_tokens(), 0, "k = {}", k);
        }
    }

    #[test]
    fn test_capacity_invariant_under_mixed_load() {
        let (mut bucket, clock) = manual_bucket(1_000, 25);
        let modes = [
            BlockMode::NonBlocking,
            BlockMode::BlockSpin,
            BlockMode::BlockSleep,
        ];

        // Small LCG for a reproducible pseudo-random schedule
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move || {
            seed = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
            seed >> 33
        };

        for _ in 0..2_000 {
            clock.advance(next() % 700);
            let amount = next() % 40;
            let mode = modes[(next() % 3) as usize];
            let _ = bucket.take(amount, mode);

            let tokens = bucket.current_tokens();
            assert!((0..=25).contains(&tokens), "tokens = {}", tokens);
        }
    }

    #[test]
    fn test_zero_amount() {
        let (mut bucket, _clock) = manual_bucket(1_000, 10);

        bucket.take(10, BlockMode::NonBlocking).unwrap();
        assert!(bucket.take(0, BlockMode::NonBlocking).is_ok());
        assert!(bucket.take(0, BlockMode::BlockSpin).is_ok());
        assert_eq!(bucket.current_tokens(), 0);
    }

    #[test]
    fn test_zero_interval_refills_every_call() {
        let (mut bucket, clock) = manual_bucket(0, 10);

        for _ in 0..5 {
            bucket.take(10, BlockMode::NonBlocking).unwrap();
        }
        bucket.take(25, BlockMode::BlockSpin).unwrap();
        assert_eq!(bucket.current_tokens(), 5);

        // The next refill is always due, so sleeping never advances time
        let before = clock.get();
        bucket.take(25, BlockMode::BlockSleep).unwrap();
        assert_eq!(bucket.current_tokens(), 5);
        assert_eq!(clock.get(), before);
    }

    #[test]
    fn test_zero_capacity_rejects_non_blocking() {
        let (mut bucket, _clock) = manual_bucket(1_000, 0);

        assert!(matches!(
            bucket.take(1, BlockMode::NonBlocking),
            Err(TakeError::ExceedsCapacity { capacity: 0, .. })
        ));
        assert!(bucket.take(0, BlockMode::NonBlocking).is_ok());
    }

    #[test]
    fn test_huge_request_exceeds_capacity() {
        let (mut bucket, _clock) = manual_bucket(1_000, i64::MAX);
        assert!(matches!(
            bucket.take(u64::MAX, BlockMode::NonBlocking),
            Err(TakeError::ExceedsCapacity { .. })
        ));
        assert!(bucket.take(i64::MAX as u64, BlockMode::NonBlocking).is_ok());
        assert_eq!(bucket.current_tokens(), 0);
    }

    #[test]
    fn test_metrics_tracking() {
        let (mut bucket, clock) = manual_bucket(HALF_SECOND, 100);

        let _ = bucket.take(200, BlockMode::NonBlocking);
        bucket.take(200, BlockMode::BlockSleep).unwrap();
        let _ = bucket.take(1, BlockMode::NonBlocking);
        clock.advance(HALF_SECOND);
        bucket.take(30, BlockMode::NonBlocking).unwrap();

        let metrics = bucket.metrics();
        assert_eq!(metrics.total_calls, 4);
        assert_eq!(metrics.total_taken, 230);
        assert_eq!(metrics.rejected_exceeds_capacity, 1);
        assert_eq!(metrics.rejected_insufficient, 1);
        assert_eq!(metrics.total_refills, 2);
        assert_eq!(metrics.total_wait_ns, HALF_SECOND);
        assert_eq!(metrics.max_wait_ns, HALF_SECOND);
        assert_eq!(metrics.current_tokens, 70);
        assert_eq!(metrics.refill_token_amount, 100);
    }

    #[test]
    fn test_reset_metrics_keeps_token_state() {
        let (mut bucket, clock) = manual_bucket(1_000, 10);

        bucket.take(10, BlockMode::NonBlocking).unwrap();
        let _ = bucket.take(8, BlockMode::NonBlocking);
        clock.advance(10);

        bucket.reset_metrics();

        assert_eq!(bucket.current_tokens(), 0);
        assert_eq!(bucket.last_refill_ns(), 0);
        assert_eq!(bucket.metrics().total_calls, 0);
        assert_eq!(bucket.metrics().total_taken, 0);

        // Still drained until the boundary
        assert!(matches!(
            bucket.take(10, BlockMode::NonBlocking),
            Err(TakeError::InsufficientTokens { .. })
        ));
        assert_eq!(bucket.current_tokens(), 0);
        assert_eq!(bucket.last_refill_ns(), 0);

        let metrics = bucket.metrics();
        assert_eq!(metrics.total_calls, 1);
        assert_eq!(metrics.rejected_insufficient, 1);
        assert_eq!(metrics.total_refills, 0);
    }

    #[test]
    fn test_config_round_trip() {
        let config = TokenBucketConfig::new(HALF_SECOND, 100);
        let bucket = TokenBucket::with_config(config);
        assert_eq!(bucket.config(), config);
    }

    #[test]
    fn test_send_and_shared_through_mutex() {
        fn assert_send<T: Send>() {}
        assert_send::<TokenBucket>();

        // One hour interval: no refill during the test
        let bucket = Arc::new(Mutex::new(TokenBucket::new(3_600_000_000_000, 500)));
        let mut handles = vec![];

        for _ in 0..8 {
            let bucket = bucket.clone();
            handles.push(thread::spawn(move || {
                let mut granted = 0u64;
                for _ in 0..100 {
                    let mut guard = bucket.lock().unwrap();
                    if guard.take(1, BlockMode::NonBlocking).is_ok() {
                        granted += 1;
                    }
                }
                granted
            }));
        }

        let total: u64 = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 500);
        assert_eq!(bucket.lock().unwrap().current_tokens(), 0);
    }

    #[test]
    fn test_debug_impl() {
        let (bucket, _clock) = manual_bucket(1_000, 10);
        let debug_str = format!("{:?}", bucket);

        assert!(debug_str.contains("TokenBucket"));
        assert!(debug_str.contains("refill_token_amount: 10"));
        assert!(debug_str.contains("current_tokens: 10"));
    }
}
