//! Rate quoting service.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::RequestParams;
use crate::error::BffResult;
use crate::pipeline::{FetchPipeline, Served};
use crate::quoting::types::{QuoteCriteria, QuoteResults};
use crate::supplier::{HotelSupplier, Upstream};

pub const OPERATION: &str = "quote";

/// Runs validated quote requests through the fetch pipeline.
///
/// Shares its pipeline (and so its token bucket and breaker) with the
/// availability service: both operations hit the same supplier.
#[derive(Clone)]
pub struct QuoteService {
    pipeline: Arc<FetchPipeline>,
    upstream: Upstream,
    ttl: Duration,
}

impl QuoteService {
    pub fn new(pipeline: Arc<FetchPipeline>, upstream: Upstream, ttl: Duration) -> Self {
        Self {
            pipeline,
            upstream,
            ttl,
        }
    }

    pub fn supplier(&self) -> &str {
        self.pipeline.supplier()
    }

    pub async fn quote(
        &self,
        criteria: &QuoteCriteria,
        request_id: &str,
    ) -> BffResult<Served<QuoteResults>> {
        let supplier: &dyn HotelSupplier = match &self.upstream {
            Upstream::Live(supplier) => supplier.as_ref(),
            Upstream::Fixtures(fixtures) => {
                let mut quote = fixtures.quote().await?;
                quote
                    .rates
                    .retain(|rate| criteria.hotel_ids.binary_search(&rate.hotel_code).is_ok());
                return Ok(Served::fixtures(QuoteResults::from_supplier(quote)));
            }
        };

        let params = RequestParams::from_serializable(criteria)?;
        let outcome = self
            .pipeline
            .fetch(OPERATION, &params, self.ttl, move |attempt| async move {
                tracing::debug!(request_id, attempt, "Quote attempt");
                supplier
                    .quote_rates(criteria, request_id)
                    .await
                    .map(QuoteResults::from_supplier)
            })
            .await;

        outcome.into_served(self.pipeline.supplier())
    }
}
