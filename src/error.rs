//! Error taxonomy shared by handlers, the fetch pipeline and the supplier client.

use axum::http::StatusCode;
use thiserror::Error;

/// Errors surfaced by the BFF.
///
/// Every variant maps to a stable machine-readable code (see [`BffError::code`])
/// that clients can match on regardless of the human-readable message.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BffError {
    /// Malformed or missing request fields. Never retried.
    #[error("invalid input: {0}")]
    InputInvalid(String),

    /// Local admission control exhausted, or the supplier answered 429.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Supplier 5xx, timeout or transport failure.
    #[error("transient supplier failure: {0}")]
    TransientRetry(String),

    /// Supplier unreachable with nothing cached to fall back on.
    #[error("supplier unavailable: {0}")]
    SupplierTimeout(String),

    /// Cache-store write rejected because of a concurrent write.
    #[error("cache write conflict: {0}")]
    DataConflict(String),

    /// Anything not classified above.
    #[error("unexpected error: {0}")]
    Unknown(String),
}

impl BffError {
    /// Stable code exposed in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            BffError::InputInvalid(_) => "INPUT_INVALID",
            BffError::RateLimited(_) => "RATE_LIMITED",
            BffError::TransientRetry(_) => "TRANSIENT_RETRY",
            BffError::SupplierTimeout(_) => "SUPPLIER_TIMEOUT",
            BffError::DataConflict(_) => "DATA_CONFLICT",
            BffError::Unknown(_) => "UNKNOWN",
        }
    }

    /// HTTP status used when the error reaches a client.
    pub fn status(&self) -> StatusCode {
        match self {
            BffError::InputInvalid(_) => StatusCode::BAD_REQUEST,
            BffError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            BffError::TransientRetry(_) => StatusCode::BAD_GATEWAY,
            BffError::SupplierTimeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            BffError::DataConflict(_) => StatusCode::CONFLICT,
            BffError::Unknown(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Shape of a supplier failure once no stale cache can absorb it.
    ///
    /// Exhausted transient failures collapse into `SupplierTimeout` so that
    /// "breaker open" and "retries exhausted" look the same to clients.
    pub fn escalate(self) -> Self {
        match self {
            BffError::TransientRetry(msg) => BffError::SupplierTimeout(msg),
            other => other,
        }
    }
}

/// Result type for BFF operations.
pub type BffResult<T> = Result<T, BffError>;
