//! `POST /v1/hotels/quote`.

use std::time::Instant;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;

use crate::error::BffError;
use crate::http::request::RequestId;
use crate::http::response::respond;
use crate::http::server::AppState;
use crate::quoting::engine::OPERATION;
use crate::quoting::QuoteRequestBody;

pub async fn create_quote(
    State(state): State<AppState>,
    RequestId(request_id): RequestId,
    body: Result<Json<QuoteRequestBody>, JsonRejection>,
) -> Response {
    let start = Instant::now();

    let result = async {
        let Json(body) = body.map_err(|e| BffError::InputInvalid(e.body_text()))?;
        let criteria = body.validate()?;
        tracing::debug!(
            request_id = %request_id,
            hotels = criteria.hotel_ids.len(),
            nights = criteria.stay.nights(),
            "Quote request validated"
        );
        state.quotes.quote(&criteria, &request_id).await
    }
    .await;

    respond(OPERATION, state.quotes.supplier(), &request_id, start, result)
}
