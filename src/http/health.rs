//! `GET /health`: breaker and limiter state of this instance.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::http::server::AppState;
use crate::resilience::CircuitState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub supplier: String,
    pub mode: &'static str,
    pub circuit: CircuitReport,
    pub rate_limit: RateLimitReport,
}

#[derive(Debug, Serialize)]
pub struct CircuitReport {
    pub state: CircuitState,
    pub failure_count: u32,
}

#[derive(Debug, Serialize)]
pub struct RateLimitReport {
    pub available: u32,
    pub capacity: u32,
}

/// Always 200; `status` is `degraded` while the breaker is not closed.
pub async fn health(State(state): State<AppState>) -> Json<HealthReport> {
    let breaker = state.pipeline.breaker();
    let limiter = state.pipeline.limiter();
    let circuit_state = breaker.state();

    Json(HealthReport {
        status: if circuit_state == CircuitState::Closed {
            "ok"
        } else {
            "degraded"
        },
        supplier: state.pipeline.supplier().to_string(),
        mode: state.upstream_mode,
        circuit: CircuitReport {
            state: circuit_state,
            failure_count: breaker.failure_count(),
        },
        rate_limit: RateLimitReport {
            available: limiter.available(),
            capacity: limiter.capacity(),
        },
    })
}
