//! # Bucket Metrics
//!
//! A plain snapshot of what a bucket has done so far. The bucket keeps the
//! counters itself (it is single-threaded, so no atomics), and
//! [`TokenBucket::metrics`](crate::TokenBucket::metrics) copies them out.
//!
//! ```text
//!     Bucket Metrics:
//!     ├─ Calls:    120 (110 ok, 10 rejected)
//!     ├─ Tokens:   40/100 available
//!     └─ Waiting:  2.000s total, 1.500s max
//! ```

use std::fmt;

/// Snapshot of a bucket's counters.
///
/// ```rust
/// use pacer::{BlockMode, TokenBucket};
///
/// let mut bucket = TokenBucket::new(1_000_000_000, 10);
/// bucket.take(4, BlockMode::NonBlocking).unwrap();
/// let _ = bucket.take(20, BlockMode::NonBlocking);
///
/// let metrics = bucket.metrics();
/// assert_eq!(metrics.total_taken, 4);
/// assert_eq!(metrics.rejected_exceeds_capacity, 1);
/// assert_eq!(metrics.current_tokens, 6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BucketMetrics {
    /// Tokens handed out by successful takes.
    pub total_taken: u64,

    /// Number of `take` calls, successful or not.
    pub total_calls: u64,

    /// Non-blocking takes refused because they exceeded capacity.
    pub rejected_exceeds_capacity: u64,

    /// Non-blocking takes refused for lack of tokens in the current period.
    pub rejected_insufficient: u64,

    /// Refill events observed (not counting the initial fill).
    pub total_refills: u64,

    /// Nanoseconds spent waiting inside blocking takes.
    pub total_wait_ns: u64,

    /// Longest single blocking take, in nanoseconds.
    pub max_wait_ns: u64,

    /// Tokens available as of the last take.
    pub current_tokens: i64,

    /// The bucket's capacity.
    pub refill_token_amount: i64,
}

impl BucketMetrics {
    /// Rejected calls of either kind.
    #[inline]
    pub fn total_rejected(&self) -> u64 {
        self.rejected_exceeds_capacity + self.rejected_insufficient
    }

    /// Fraction of calls that succeeded, 1.0 before any call.
    #[inline]
    pub fn success_rate(&self) -> f64 {
        if self.total_calls == 0 {
            1.0
        } else {
            (self.total_calls - self.total_rejected()) as f64 / self.total_calls as f64
        }
    }

    /// How much of the current period's allowance is spent (0.0 = full
    /// bucket, 1.0 = empty).
    #[inline]
    pub fn utilization(&self) -> f64 {
        if self.refill_token_amount <= 0 {
            0.0
        } else {
            1.0 - (self.current_tokens as f64 / self.refill_token_amount as f64)
        }
    }

    /// Longest blocking wait in milliseconds.
    #[inline]
    pub fn max_wait_time_ms(&self) -> f64 {
        self.max_wait_ns as f64 / 1_000_000.0
    }

    /// Total blocking wait in milliseconds.
    #[inline]
    pub fn total_wait_time_ms(&self) -> f64 {
        self.total_wait_ns as f64 / 1_000_000.0
    }

    /// Human-readable report, suitable for logs.
    pub fn summary(&self) -> String {
        format!(
            "Bucket Metrics:\n\
             ├─ Calls:\n\
             │  ├─ Total: {}\n\
             │  ├─ Success Rate: {:.2}%\n\
             │  ├─ Rejected (capacity): {}\n\
             │  └─ Rejected (insufficient): {}\n\
             ├─ Tokens:\n\
             │  ├─ Taken: {}\n\
             │  ├─ Available: {}/{}\n\
             │  ├─ Utilization: {:.2}%\n\
             │  └─ Refills: {}\n\
             └─ Waiting:\n\
                ├─ Total: {:.3}ms\n\
                └─ Max: {:.3}ms",
            self.total_calls,
            self.success_rate() * 100.0,
            self.rejected_exceeds_capacity,
            self.rejected_insufficient,
            self.total_taken,
            self.current_tokens,
            self.refill_token_amount,
            self.utilization() * 100.0,
            self.total_refills,
            self.total_wait_time_ms(),
            self.max_wait_time_ms(),
        )
    }
}

impl fmt::Display for BucketMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.summary())
    }
}
