//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Live supplier fetch:
//!     → rate_limit.rs (token bucket admission, never waits)
//!     → timeouts.rs (overall request deadline)
//!         → retries.rs (retry retryable failures with backoff.rs delays)
//!             → timeouts.rs (hard deadline per attempt)
//!     → circuit_breaker.rs (one failure recorded per exhausted retry loop)
//! ```
//!
//! # Design Decisions
//! - State is owned by one pipeline instance; nothing is shared across processes
//! - Local rate limiting is not a supplier failure and never trips the breaker
//! - Retries are limited to idempotent reads and quote lookups

pub mod backoff;
pub mod circuit_breaker;
pub mod rate_limit;
pub mod retries;
pub mod timeouts;

pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use rate_limit::{RateLimitExceeded, TokenBucket};
pub use retries::{AttemptError, RetryEvent, RetryPolicy};
