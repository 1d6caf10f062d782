//! Availability search service.

use std::sync::Arc;
use std::time::Duration;

use crate::availability::types::{SearchCriteria, SearchResults};
use crate::cache::RequestParams;
use crate::error::BffResult;
use crate::pipeline::{FetchPipeline, Served};
use crate::supplier::{HotelSupplier, Upstream};

pub const OPERATION: &str = "search";

/// Runs validated searches through the fetch pipeline.
#[derive(Clone)]
pub struct AvailabilityService {
    pipeline: Arc<FetchPipeline>,
    upstream: Upstream,
    ttl: Duration,
}

impl AvailabilityService {
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

    pub async fn search(
        &self,
        criteria: &SearchCriteria,
        request_id: &str,
    ) -> BffResult<Served<SearchResults>> {
        let supplier: &dyn HotelSupplier = match &self.upstream {
            Upstream::Live(supplier) => supplier.as_ref(),
            Upstream::Fixtures(fixtures) => {
                let availability = fixtures.search().await?;
                return Ok(Served::fixtures(SearchResults::from_supplier(availability)));
            }
        };

        let params = RequestParams::from_serializable(criteria)?;
        let outcome = self
            .pipeline
            .fetch(OPERATION, &params, self.ttl, move |attempt| async move {
                tracing::debug!(request_id, attempt, "Search attempt");
                supplier
                    .search_availability(criteria, request_id)
                    .await
                    .map(SearchResults::from_supplier)
            })
            .await;

        outcome.into_served(self.pipeline.supplier())
    }
}
