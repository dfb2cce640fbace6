//! # Pacer - Single-Consumer Token Bucket
//!
//! A small token bucket for throttling one caller's repeated operation (message
//! sends, disk writes, API calls) to an average of `N` units per interval.
//!
//! ## How It Works
//!
//! The bucket starts full. Each [`TokenBucket::take`] reads a monotonic clock
//! and, if a whole interval has passed since the last refill, resets the bucket
//! to full before consuming. There is no background timer:
//!
//! ```text
//!     interval = 0.5s, amount = 100
//!
//!     t=0.0   [██████████] 100   take 80 ──► [██        ] 20
//!     t=0.2   [██        ] 20    take 50 ──► NonBlocking: InsufficientTokens
//!     t=0.5   [██████████] 100   (boundary passed, reset to full)
//! ```
//!
//! Refill is a discrete jump: after a long idle period the bucket holds one
//! interval's worth, never more.
//!
//! ## Quick Start
//!
//! ```rust
//! use pacer::{BlockMode, TokenBucket};
//!
//! // 100 sends every half second
//! let mut bucket = TokenBucket::new(500_000_000, 100);
//!
//! for _ in 0..3 {
//!     // Waits (sleeping) whenever the budget for this period is spent
//!     bucket.take(1, BlockMode::BlockSleep).unwrap();
//!     // send_message();
//! }
//! ```
//!
//! ### Non-blocking callers
//!
//! ```rust
//! use pacer::{BlockMode, TakeError, TokenBucket};
//!
//! let mut bucket = TokenBucket::new(1_000_000_000, 10);
//!
//! match bucket.take(4, BlockMode::NonBlocking) {
//!     Ok(()) => println!("✅ go ahead"),
//!     Err(TakeError::InsufficientTokens { .. }) => println!("⏳ try again later"),
//!     Err(TakeError::ExceedsCapacity { .. }) => println!("⛔ never going to fit"),
//! }
//! ```
//!
//! ## Block Modes
//!
//! | Mode | On shortage | Cost |
//! |------|-------------|------|
//! | `NonBlocking` | returns an error, takes nothing | none |
//! | `BlockSpin` | busy-waits on the clock | one core at 100% |
//! | `BlockSleep` | sleeps until the next refill | may oversleep |
//!
//! Blocking takes never fail and have no timeout. Callers that need a bound
//! should use `NonBlocking` and manage their own backoff, or compare
//! [`TokenBucket::next_refill_ns`] against a deadline first.
//!
//! ## Thread Safety
//!
//! A bucket has a single owner and no internal locking. It is `Send` but
//! not `Sync`; share one between threads with `Mutex<TokenBucket>`.
//!
//! ## Testing With a Manual Clock
//!
//! ```rust
//! use pacer::{BlockMode, ManualClock, TokenBucketBuilder};
//!
//! let clock = ManualClock::new();
//! let mut bucket = TokenBucketBuilder::new()
//!     .refill_interval_ns(1_000)
//!     .refill_token_amount(10)
//!     .build_with_clock(clock.clone());
//!
//! // Blocking on a manual clock advances it instead of waiting
//! bucket.take(25, BlockMode::BlockSleep).unwrap();
//! assert_eq!(clock.get(), 2_000);
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    missing_debug_implementations
)]
#![forbid(unsafe_code)]

// Internal module
mod token_bucket;

// Public re-exports
pub use token_bucket::{
    cpu_relax, current_monotonic_time_ns, BlockMode, BucketMetrics, Clock, ConfigError,
    ManualClock, MonotonicClock, TakeError, TokenBucket, TokenBucketConfig,
    DEFAULT_SPIN_STEP_NS, NANOS_PER_SECOND,
};

use std::time::Duration;

/// Version information for the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Minimum supported Rust version.
pub const MSRV: &str = "1.70.0";

/// Prelude module for convenient imports.
///
/// ```rust
/// use pacer::prelude::*;
///
/// let mut bucket = TokenBucket::new(1_000_000_000, 5);
/// assert!(bucket.take(1, BlockMode::NonBlocking).is_ok());
/// ```
pub mod prelude {
    pub use crate::{
        BlockMode, BucketMetrics, Clock, ManualClock, MonotonicClock, TakeError, TokenBucket,
        TokenBucketBuilder, TokenBucketConfig,
    };
}

/// Builder for [`TokenBucket`]s.
///
/// `build` accepts anything, like [`TokenBucket::new`]; `try_build` rejects
/// configurations that would not limit anything.
///
/// # Example
///
/// ```rust
/// use pacer::TokenBucketBuilder;
/// use std::time::Duration;
///
/// let bucket = TokenBucketBuilder::new()
///     .refill_interval(Duration::from_millis(250))
///     .refill_token_amount(20)
///     .build();
/// assert_eq!(bucket.refill_interval_ns(), 250_000_000);
///
/// let result = TokenBucketBuilder::new()
///     .refill_token_amount(0)  // Invalid!
///     .try_build();
/// assert!(result.is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct TokenBucketBuilder {
    config: TokenBucketConfig,
}

impl TokenBucketBuilder {
    /// Starts from [`TokenBucketConfig::default`] (100 tokens per second).
    pub fn new() -> Self {
        Self {
            config: TokenBucketConfig::default(),
        }
    }

    /// Sets the refill interval in nanoseconds.
    pub fn refill_interval_ns(mut self, ns: u64) -> Self {
        self.config.refill_interval_ns = ns;
        self
    }

    /// Sets the refill interval from a [`Duration`].
    pub fn refill_interval(mut self, interval: Duration) -> Self {
        self.config = TokenBucketConfig::from_duration(interval, self.config.refill_token_amount);
        self
    }

    /// Sets the tokens granted per interval (and the bucket's capacity).
    pub fn refill_token_amount(mut self, amount: i64) -> Self {
        self.config.refill_token_amount = amount;
        self
    }

    /// The configuration built so far.
    pub fn config(&self) -> TokenBucketConfig {
        self.config
    }

    /// Builds a bucket on the process monotonic clock. Never fails.
    pub fn build(self) -> TokenBucket {
        TokenBucket::with_config(self.config)
    }

    /// Builds a bucket on a caller-supplied clock.
    pub fn build_with_clock<C: Clock>(self, clock: C) -> TokenBucket<C> {
        TokenBucket::with_clock(self.config, clock)
    }

    /// Validates the configuration, then builds.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`TokenBucketConfig::validate`].
    pub fn try_build(self) -> Result<TokenBucket, ConfigError> {
        self.config.validate()?;
        Ok(self.build())
    }
}

impl Default for TokenBucketBuilder {
    fn default() -> Self {
        Self::new()
    }
}
