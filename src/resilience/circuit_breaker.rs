//! Circuit breaker guarding the supplier.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: supplier assumed down, requests fail fast
//! - Half-Open: cool-down elapsed, trial calls allowed
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= threshold
//! Open → Half-Open: first can_request() after cool-down
//! Half-Open → Closed: any success
//! Half-Open → Open: a failure (failure_count is still >= threshold)
//! ```
//!
//! Half-open does not limit concurrency: every caller that observes it may
//! attempt a call. It shapes throughput; it is not a single-flight gate.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

use crate::observability::metrics;

/// Breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half-open",
        }
    }
}

#[derive(Debug)]
struct BreakerState {
    state: CircuitState,
    failure_count: u32,
    next_attempt_at: Option<Instant>,
}

/// Consecutive-failure circuit breaker.
#[derive(Debug)]
pub struct CircuitBreaker {
    failure_threshold: u32,
    cool_down: Duration,
    inner: Mutex<BreakerState>,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, cool_down: Duration) -> Self {
        Self {
            failure_threshold,
            cool_down,
            inner: Mutex::new(BreakerState {
                state: CircuitState::Closed,
                failure_count: 0,
                next_attempt_at: None,
            }),
        }
    }

    /// Whether a new upstream call may be attempted.
    ///
    /// An open breaker whose cool-down has elapsed moves to half-open here.
    pub fn can_request(&self) -> bool {
        self.can_request_at(Instant::now())
    }

    pub fn can_request_at(&self, now: Instant) -> bool {
        let mut inner = self.lock();
        match inner.state {
            CircuitState::Closed | CircuitState::HalfOpen => true,
            CircuitState::Open => {
                let ready = inner.next_attempt_at.map_or(true, |at| now >= at);
                if ready {
                    inner.state = CircuitState::HalfOpen;
                    tracing::info!("Circuit half-open, allowing trial call");
                    metrics::record_circuit_transition(CircuitState::HalfOpen);
                }
                ready
            }
        }
    }

    /// Reset the failure count and close the circuit.
    pub fn record_success(&self) {
        let mut inner = self.lock();
        let previous = inner.state;
        inner.state = CircuitState::Closed;
        inner.failure_count = 0;
        inner.next_attempt_at = None;

        if previous != CircuitState::Closed {
            tracing::info!(from = previous.as_str(), "Circuit closed");
            metrics::record_circuit_transition(CircuitState::Closed);
        }
    }

    pub fn record_failure(&self) {
        self.record_failure_at(Instant::now())
    }

    pub fn record_failure_at(&self, now: Instant) {
        let mut inner = self.lock();
        inner.failure_count = inner.failure_count.saturating_add(1);

        if inner.failure_count >= self.failure_threshold {
            let previous = inner.state;
            inner.state = CircuitState::Open;
            inner.next_attempt_at = Some(now + self.cool_down);

            if previous != CircuitState::Open {
                tracing::warn!(
                    failures = inner.failure_count,
                    cool_down_ms = self.cool_down.as_millis() as u64,
                    "Circuit opened"
                );
                metrics::record_circuit_transition(CircuitState::Open);
            }
        }
    }

    pub fn state(&self) -> CircuitState {
        self.lock().state
    }

    pub fn failure_count(&self) -> u32 {
        self.lock().failure_count
    }

    fn lock(&self) -> MutexGuard<'_, BreakerState> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
