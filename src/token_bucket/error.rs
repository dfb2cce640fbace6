//! Error types returned by the bucket and its configuration.

use thiserror::Error;

/// A non-blocking [`take`](crate::TokenBucket::take) could not be satisfied.
///
/// Blocking modes never produce this error; they wait instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TakeError {
    /// The request is larger than one full refill, so no amount of waiting
    /// could satisfy it without blocking. Detected before the clock is read.
    #[error("requested {requested} tokens but the bucket never holds more than {capacity}")]
    ExceedsCapacity {
        /// Tokens asked for.
        requested: u64,
        /// The bucket's `refill_token_amount`.
        capacity: i64,
    },

    /// The request fits in the bucket but not enough tokens remain in the
    /// current refill period. Nothing was consumed.
    #[error("requested {requested} tokens but only {available} are available")]
    InsufficientTokens {
        /// Tokens asked for.
        requested: u64,
        /// Tokens left at the time of the call.
        available: i64,
    },
}

impl TakeError {
    /// Whether retrying after the next refill could succeed.
    ///
    /// ```rust
    /// use pacer::TakeError;
    ///
    /// let err = TakeError::InsufficientTokens { requested: 5, available: 2 };
    /// assert!(err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::InsufficientTokens { .. })
    }
}

/// A [`TokenBucketConfig`](crate::TokenBucketConfig) failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A zero interval refills on every call, so nothing is limited.
    #[error("refill_interval_ns must be greater than 0")]
    ZeroInterval,

    /// A bucket with no tokens per period can never satisfy a blocking take.
    #[error("refill_token_amount must be greater than 0 (got {0})")]
    NonPositiveTokenAmount(i64),
}
