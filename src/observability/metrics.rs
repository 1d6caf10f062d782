//! Metrics collection and exposition.
//!
//! # Metrics
//! - `bff_requests_total` (counter): requests by operation, status, source
//! - `bff_request_duration_seconds` (histogram): handler latency by operation
//! - `bff_cache_lookups_total` (counter): fresh / expired / miss / error
//! - `bff_cache_writes_failed_total` (counter): best-effort writes that failed
//! - `bff_supplier_retries_total` (counter): retry waits taken
//! - `bff_rate_limited_total` (counter): live fetches refused by the token bucket
//! - `bff_circuit_transitions_total` (counter): breaker state changes
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Instant;

use metrics::{counter, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resilience::CircuitState;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(operation: &'static str, status: u16, source: &str, start: Instant) {
    counter!(
        "bff_requests_total",
        "operation" => operation,
        "status" => status.to_string(),
        "source" => source.to_string()
    )
    .increment(1);
    histogram!("bff_request_duration_seconds", "operation" => operation)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(operation: &str, result: &'static str) {
    counter!(
        "bff_cache_lookups_total",
        "operation" => operation.to_string(),
        "result" => result
    )
    .increment(1);
}

pub fn record_cache_write_failure(operation: &str) {
    counter!("bff_cache_writes_failed_total", "operation" => operation.to_string()).increment(1);
}

pub fn record_retry(operation: &str) {
    counter!("bff_supplier_retries_total", "operation" => operation.to_string()).increment(1);
}

pub fn record_rate_limited(operation: &str) {
    counter!("bff_rate_limited_total", "operation" => operation.to_string()).increment(1);
}

pub fn record_circuit_transition(state: CircuitState) {
    counter!("bff_circuit_transitions_total", "state" => state.as_str()).increment(1);
}
