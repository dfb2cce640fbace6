//! # Token Bucket Module
//!
//! Internal implementation of the limiter, split by concern.
//!
//! ## Module Structure
//!
//! ```text
//!     token_bucket/
//!     ├── mod.rs          (You are here - Module organization)
//!     ├── core.rs         (TokenBucket and the take algorithm)
//!     ├── config.rs       (Configuration and block modes)
//!     ├── clock.rs        (Time sources: monotonic and manual)
//!     ├── error.rs        (Take and configuration errors)
//!     ├── metrics.rs      (Counters snapshot)
//!     └── utils.rs        (Monotonic time, spin hints)
//! ```
//!
//! ## Architecture Flow
//!
//! ```text
//!     Caller
//!        │ take(n, mode)
//!        ▼
//!     ┌─────────┐
//!     │  Core   │ ◄── refill check, consume, wait
//!     └────┬────┘
//!          │
//!          ▼
//!     ┌─────────┐
//!     │  Clock  │ ◄── now / spin / sleep
//!     └────┬────┘
//!          │
//!          ▼
//!     ┌─────────┐
//!     │  Utils  │ ◄── Instant-based time, CPU hints
//!     └─────────┘
//! ```

mod clock;
mod config;
mod core;
mod error;
mod metrics;
mod utils;

/// Time sources the bucket can run on
pub use clock::{Clock, ManualClock, MonotonicClock, DEFAULT_SPIN_STEP_NS};

/// Configuration and waiting behaviour
pub use config::{BlockMode, TokenBucketConfig, NANOS_PER_SECOND};

/// The token bucket itself
pub use core::TokenBucket;

/// Errors from takes and configuration checks
pub use error::{ConfigError, TakeError};

/// Counters snapshot for observability
pub use metrics::BucketMetrics;

/// Time and CPU helpers
pub use utils::{cpu_relax, current_monotonic_time_ns};
