//! Hotel supplier backend-for-frontend.
//!
//! Brokers availability searches and rate quotes to an unreliable hotel
//! supplier and keeps answers bounded and safe when it misbehaves.
//!
//! ```text
//!   GET /v1/hotels/search ─┐                       ┌─▶ cache store (get/put)
//!                          ├─▶ service ─▶ pipeline ─┼─▶ circuit breaker
//!   POST /v1/hotels/quote ─┘                       ├─▶ token bucket
//!                                                  └─▶ retry(supplier call)
//! ```

pub mod availability;
pub mod cache;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod pipeline;
pub mod quoting;
pub mod resilience;
pub mod stay;
pub mod supplier;

pub use config::BffConfig;
pub use error::{BffError, BffResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
