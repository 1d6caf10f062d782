//! Signed HTTP client for the hotel supplier.
//!
//! # Responsibilities
//! - Build search (`GET /hotels`) and quote (`POST /hotels/quote`) calls
//! - Attach `Api-key`, `X-Signature` and `X-Request-Id` headers
//! - Enforce the per-attempt deadline
//! - Classify every supplier failure at the call site; the retry budget bounds
//!   how often any of them is tried again

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use crate::availability::SearchCriteria;
use crate::config::SupplierConfig;
use crate::error::BffError;
use crate::quoting::QuoteCriteria;
use crate::resilience::timeouts::with_deadline;
use crate::resilience::AttemptError;
use crate::supplier::signature::{unix_now, ApiKeySigner, RequestSigner};
use crate::supplier::types::{
    HotelFilter, QuoteRequestWire, SupplierAvailability, SupplierOccupancy, SupplierQuote,
};
use crate::supplier::HotelSupplier;

const BODY_SNIPPET: usize = 200;

/// Live supplier reached over HTTP.
#[derive(Clone)]
pub struct HttpSupplier {
    name: String,
    client: Client,
    base_url: String,
    api_key: String,
    signer: Arc<dyn RequestSigner>,
    timeout: Duration,
}

impl HttpSupplier {
    pub fn from_config(config: &SupplierConfig) -> Result<Self, BffError> {
        let client = Client::builder()
            .build()
            .map_err(|e| BffError::Unknown(format!("unable to build supplier client: {}", e)))?;
        let signer = ApiKeySigner::new(config.api_key.clone(), config.api_secret.clone());

        Ok(Self::new(
            config.name.clone(),
            client,
            &config.base_url,
            config.api_key.clone(),
            Arc::new(signer),
            Duration::from_millis(config.timeout_ms),
        ))
    }

    pub fn new(
        name: impl Into<String>,
        client: Client,
        base_url: &str,
        api_key: impl Into<String>,
        signer: Arc<dyn RequestSigner>,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            signer,
            timeout,
        }
    }

    fn signed(&self, request: RequestBuilder, request_id: &str) -> RequestBuilder {
        request
            .header("Api-key", &self.api_key)
            .header("X-Signature", self.signer.sign(unix_now()))
            .header("X-Request-Id", request_id)
            .header(reqwest::header::ACCEPT, "application/json")
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, AttemptError<BffError>> {
        with_deadline(self.timeout, async {
            let response = request.send().await.map_err(|e| {
                AttemptError::retryable(BffError::TransientRetry(format!(
                    "supplier {} unreachable: {}",
                    self.name, e
                )))
            })?;

            if !response.status().is_success() {
                return Err(classify(&self.name, response).await);
            }

            response.json::<T>().await.map_err(|e| {
                AttemptError::retryable(BffError::Unknown(format!(
                    "supplier {} returned an unreadable body: {}",
                    self.name, e
                )))
            })
        })
        .await
    }
}

/// Map a non-2xx supplier answer to an error code.
///
/// 429 keeps its `RateLimited` code and 5xx becomes `TransientRetry`. Any
/// other status is `Unknown`. All of them are retried while attempts remain.
async fn classify(supplier: &str, response: Response) -> AttemptError<BffError> {
    let status = response.status();
    let mut body = response.text().await.unwrap_or_default();
    if body.len() > BODY_SNIPPET {
        let mut cut = BODY_SNIPPET;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    let message = format!("supplier {} returned {}: {}", supplier, status.as_u16(), body);

    if status == StatusCode::TOO_MANY_REQUESTS {
        AttemptError::retryable(BffError::RateLimited(message))
    } else if status.is_server_error() {
        AttemptError::retryable(BffError::TransientRetry(message))
    } else {
        AttemptError::retryable(BffError::Unknown(message))
    }
}

#[async_trait]
impl HotelSupplier for HttpSupplier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn search_availability(
        &self,
        criteria: &SearchCriteria,
        request_id: &str,
    ) -> Result<SupplierAvailability, AttemptError<BffError>> {
        let occupancies = serde_json::to_string(&[SupplierOccupancy::from(criteria.occupancy)])
            .map_err(|e| AttemptError::permanent(BffError::Unknown(e.to_string())))?;
        let check_in = criteria.stay.check_in.to_string();
        let check_out = criteria.stay.check_out.to_string();

        let request = self
            .client
            .get(format!("{}/hotels", self.base_url))
            .query(&[
                ("destination", criteria.destination.as_str()),
                ("checkIn", check_in.as_str()),
                ("checkOut", check_out.as_str()),
                ("occupancies", occupancies.as_str()),
                ("currency", criteria.currency.as_str()),
            ]);

        tracing::debug!(supplier = %self.name, request_id, destination = %criteria.destination, "Calling supplier search");
        self.execute(self.signed(request, request_id)).await
    }

    async fn quote_rates(
        &self,
        criteria: &QuoteCriteria,
        request_id: &str,
    ) -> Result<SupplierQuote, AttemptError<BffError>> {
        let body = QuoteRequestWire {
            stay: criteria.stay.into(),
            occupancies: vec![SupplierOccupancy::from(criteria.occupancy)],
            hotels: HotelFilter {
                hotel: criteria.hotel_ids.clone(),
            },
            currency: criteria.currency.clone(),
        };

        let request = self
            .client
            .post(format!("{}/hotels/quote", self.base_url))
            .json(&body);

        tracing::debug!(supplier = %self.name, request_id, hotels = criteria.hotel_ids.len(), "Calling supplier quote");
        self.execute(self.signed(request, request_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn supplier(base_url: &str) -> HttpSupplier {
        HttpSupplier::new(
            "hotelbeds",
            Client::new(),
            base_url,
            "key",
            Arc::new(|_: u64| "sig".to_string()),
            Duration::from_millis(200),
        )
    }

    #[test]
    fn test_base_url_is_trimmed() {
        assert_eq!(supplier("http://supplier.test/v1/").base_url, "http://supplier.test/v1");
    }

    #[test]
    fn test_signed_headers() {
        let s = supplier("http://supplier.test");
        let request = s
            .signed(s.client.get("http://supplier.test/hotels"), "req-1")
            .build()
            .unwrap();
        assert_eq!(request.headers()["Api-key"], "key");
        assert_eq!(request.headers()["X-Signature"], "sig");
        assert_eq!(request.headers()["X-Request-Id"], "req-1");
    }

    fn answer(status: u16, body: impl Into<String>) -> Response {
        Response::from(
            axum::http::Response::builder()
                .status(status)
                .body(body.into())
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_classify_status_codes() {
        let err = classify("hotelbeds", answer(429, "quota")).await;
        assert!(err.retryable);
        assert_eq!(err.error.code(), "RATE_LIMITED");

        let err = classify("hotelbeds", answer(502, "bad gateway")).await;
        assert!(err.retryable);
        assert_eq!(err.error.code(), "TRANSIENT_RETRY");

        let err = classify("hotelbeds", answer(400, r#"{"error":"bad hotel"}"#)).await;
        assert!(err.retryable);
        assert_eq!(err.error.code(), "UNKNOWN");
        assert!(err.error.to_string().contains("returned 400"));
    }

    #[tokio::test]
    async fn test_long_error_body_is_truncated() {
        let err = classify("hotelbeds", answer(500, "x".repeat(500))).await;
        assert!(err.error.to_string().len() < 300);
    }

    #[tokio::test]
    async fn test_unreachable_supplier_is_retryable() {
        // Port 9 (discard) is not listening on test hosts.
        let err = supplier("http://127.0.0.1:9")
            .execute::<SupplierAvailability>(Client::new().get("http://127.0.0.1:9/hotels"))
            .await
            .unwrap_err();
        assert!(err.retryable);
        assert_eq!(err.error.code(), "TRANSIENT_RETRY");
    }
}
