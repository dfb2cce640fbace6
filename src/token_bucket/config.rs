//! # Token Bucket Configuration
//!
//! The two knobs of a bucket and the three ways a caller can wait for it.
//!
//! ```text
//!     ┌──────────────────────────────┐
//!     │  refill_token_amount: 100    │ ← capacity and refill size
//!     │  refill_interval_ns:  0.5s   │ ← how often it resets to full
//!     └──────────────────────────────┘
//!
//!     Average rate = amount / interval = 200 tokens/s
//! ```
//!
//! ### Block Modes
//!
//! ```text
//!     NonBlocking ──► fail fast, take nothing
//!        │
//!     BlockSpin ────► busy-wait on the clock (lowest latency, burns a core)
//!        │
//!     BlockSleep ───► sleep until the next refill (may oversleep)
//! ```

use super::error::ConfigError;
use std::time::Duration;

/// Nanoseconds per second.
pub const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// How [`take`](crate::TokenBucket::take) behaves when tokens run short.
///
/// ## Example
///
/// ```rust
/// use pacer::{BlockMode, TokenBucket};
///
/// let mut bucket = TokenBucket::new(1_000_000, 10);
///
/// // Fails immediately if tokens are short
/// assert!(bucket.take(5, BlockMode::NonBlocking).is_ok());
///
/// // Waits for refills instead of failing
/// bucket.take(10, BlockMode::BlockSleep).unwrap();
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BlockMode {
    /// Never delays. Fails with `ExceedsCapacity` or `InsufficientTokens`
    /// and leaves the bucket untouched.
    #[default]
    NonBlocking,

    /// Re-reads the clock in a tight loop until enough tokens accrue.
    ///
    /// Keeps the calling core busy for the whole wait.
    BlockSpin,

    /// Sleeps until the next refill boundary, then re-checks.
    ///
    /// Wake-up precision is up to the OS scheduler.
    BlockSleep,
}

impl BlockMode {
    /// Whether this mode waits for tokens instead of failing.
    #[inline]
    pub fn is_blocking(&self) -> bool {
        !matches!(self, Self::NonBlocking)
    }
}

/// Configuration for a [`TokenBucket`](crate::TokenBucket).
///
/// ## Examples
///
/// ```rust
/// use pacer::TokenBucketConfig;
/// use std::time::Duration;
///
/// // 100 tokens every half second
/// let config = TokenBucketConfig::new(500_000_000, 100);
///
/// // Same thing, from a Duration
/// let same = TokenBucketConfig::from_duration(Duration::from_millis(500), 100);
/// assert_eq!(config, same);
///
/// // 50 per second
/// let config = TokenBucketConfig::per_second(50);
/// assert_eq!(config.effective_rate_per_second(), 50.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBucketConfig {
    /// Length of one refill period in nanoseconds.
    pub refill_interval_ns: u64,

    /// Tokens granted per period. Also the most the bucket ever holds.
    pub refill_token_amount: i64,
}

impl Default for TokenBucketConfig {
    /// 100 tokens per second.
    fn default() -> Self {
        Self::per_second(100)
    }
}

impl TokenBucketConfig {
    /// Creates a configuration from raw values.
    pub fn new(refill_interval_ns: u64, refill_token_amount: i64) -> Self {
        Self {
            refill_interval_ns,
            refill_token_amount,
        }
    }

    /// `tokens_per_second` tokens, refilled once a second.
    pub fn per_second(tokens_per_second: i64) -> Self {
        Self::new(NANOS_PER_SECOND, tokens_per_second)
    }

    /// `tokens` tokens every `interval_ms` milliseconds.
    pub fn per_millisecond_interval(interval_ms: u64, tokens: i64) -> Self {
        Self::new(interval_ms.saturating_mul(1_000_000), tokens)
    }

    /// `tokens` tokens every `interval`.
    ///
    /// Intervals longer than `u64::MAX` nanoseconds (about 584 years) are
    /// clamped.
    pub fn from_duration(interval: Duration, tokens: i64) -> Self {
        let ns = interval.as_nanos().min(u64::MAX as u128) as u64;
        Self::new(ns, tokens)
    }

    /// The refill interval as a [`Duration`].
    pub fn refill_interval(&self) -> Duration {
        Duration::from_nanos(self.refill_interval_ns)
    }

    /// Checks that the configuration actually limits anything.
    ///
    /// Buckets can be built from invalid configurations (they just behave
    /// degenerately); this is for callers that want to reject them up front.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::ZeroInterval`] when `refill_interval_ns` is 0
    /// - [`ConfigError::NonPositiveTokenAmount`] when `refill_token_amount <= 0`
    ///
    /// ```rust
    /// use pacer::TokenBucketConfig;
    ///
    /// assert!(TokenBucketConfig::new(0, 10).validate().is_err());
    /// assert!(TokenBucketConfig::new(1_000, 0).validate().is_err());
    /// assert!(TokenBucketConfig::new(1_000, 10).validate().is_ok());
    /// ```
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.refill_interval_ns == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.refill_token_amount <= 0 {
            return Err(ConfigError::NonPositiveTokenAmount(self.refill_token_amount));
        }
        Ok(())
    }

    /// Average tokens per second this configuration allows.
    ///
    /// Returns 0.0 for a zero interval rather than infinity.
    pub fn effective_rate_per_second(&self) -> f64 {
        if self.refill_interval_ns == 0 {
            0.0
        } else {
            (self.refill_token_amount as f64 * NANOS_PER_SECOND as f64)
                / self.refill_interval_ns as f64
        }
    }
}
