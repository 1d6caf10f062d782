//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum router, request-id / trace layers)
//!     → request.rs (x-request-id extractor)
//!     → search.rs | quote.rs (extract, validate, call service)
//!     → response.rs (success or error envelope, metrics)
//!     → health.rs (breaker and limiter snapshot)
//! ```

pub mod health;
pub mod quote;
pub mod request;
pub mod response;
pub mod search;
pub mod server;

pub use request::{RequestId, X_REQUEST_ID};
pub use response::{Envelope, ErrorEnvelope};
pub use server::{AppState, HttpServer};
