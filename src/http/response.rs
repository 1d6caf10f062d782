//! Public response envelopes.
//!
//! ```text
//! success: { ok: true, supplier, request_id, source, cache?, stale_reason?, <payload> }
//! failure: { ok: false, request_id, error: { code, message } }
//! ```

use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::{BffError, BffResult};
use crate::observability::metrics;
use crate::pipeline::{CacheMeta, Served, Source, StaleReason};

/// Success envelope. The domain payload is flattened into the top level.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub ok: bool,
    pub supplier: String,
    pub request_id: String,
    pub source: Source,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_reason: Option<StaleReason>,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn new(supplier: &str, request_id: &str, served: Served<T>) -> Self {
        Self {
            ok: true,
            supplier: supplier.to_string(),
            request_id: request_id.to_string(),
            source: served.source,
            cache: served.cache,
            stale_reason: served.stale_reason,
            payload: served.payload,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

/// Failure envelope, sent with the status of the underlying error.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub ok: bool,
    pub request_id: String,
    pub error: ErrorBody,
    #[serde(skip)]
    status: StatusCode,
}

impl ErrorEnvelope {
    pub fn new(request_id: &str, error: &BffError) -> Self {
        Self {
            ok: false,
            request_id: request_id.to_string(),
            error: ErrorBody {
                code: error.code(),
                message: error.to_string(),
            },
            status: error.status(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ErrorEnvelope {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

/// Turn a service result into the HTTP response and record it.
pub fn respond<T: Serialize>(
    operation: &'static str,
    supplier: &str,
    request_id: &str,
    start: Instant,
    result: BffResult<Served<T>>,
) -> Response {
    match result {
        Ok(served) => {
            let source = served.source.as_str().to_string();
            tracing::info!(
                operation,
                request_id,
                source = %source,
                stale_reason = served.stale_reason.map(|r| r.as_str()),
                "Request served"
            );
            metrics::record_request(operation, 200, &source, start);
            Envelope::new(supplier, request_id, served).into_response()
        }
        Err(error) => {
            let envelope = ErrorEnvelope::new(request_id, &error);
            if envelope.status().is_server_error() {
                tracing::error!(operation, request_id, code = error.code(), error = %error, "Request failed");
            } else {
                tracing::warn!(operation, request_id, code = error.code(), error = %error, "Request rejected");
            }
            metrics::record_request(operation, envelope.status().as_u16(), "error", start);
            envelope.into_response()
        }
    }
}
