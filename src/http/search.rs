//! `GET /v1/hotels/search`.

use std::time::Instant;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::Response;

use crate::availability::engine::OPERATION;
use crate::availability::SearchQuery;
use crate::error::BffError;
use crate::http::request::RequestId;
use crate::http::response::respond;
use crate::http::server::AppState;

pub async fn search_hotels(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    query: Result<Query<SearchQuery>, QueryRejection>,
) -> Response {
    let start = Instant::now();

    let result = async {
        let Query(query) = query.map_err(|e| BffError::InputInvalid(e.body_text()))?;
        if let Some(client_ref) = query.client_ref.as_deref() {
            tracing::debug!(request_id = %request_id, client_ref, "Search client reference");
        }
        let criteria = query.validate()?;
        state.availability.search(&criteria, &request_id).await
    }
    .await;

    respond(OPERATION, state.availability.supplier(), &request_id, start, result)
}
