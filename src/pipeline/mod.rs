//! Resilient fetch pipeline shared by search and quote.
//!
//! # Data Flow
//! ```text
//! Service (normalized RequestParams + supplier closure)
//!     → fetch.rs (cache → breaker → limiter → retry → store)
//!     → outcome.rs (Fresh | Stale | Failure → Served + Source)
//!     → http envelope
//! ```

pub mod fetch;
pub mod outcome;

pub use fetch::FetchPipeline;
pub use outcome::{CacheMeta, Outcome, Served, Source, StaleReason};
