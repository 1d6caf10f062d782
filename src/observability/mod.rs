//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events (request_id, operation, cache_key, attempt)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → logging.rs subscriber (pretty or JSON on stdout)
//!     → Prometheus scrape endpoint
//! ```

pub mod logging;
pub mod metrics;
