//! Hotel supplier subsystem.
//!
//! # Data Flow
//! ```text
//! AvailabilityService / QuoteService
//!     → Upstream::Live     → client.rs (signed HTTP, per-attempt deadline)
//!     → Upstream::Fixtures → fixtures.rs (JSON files, no pipeline)
//! ```

pub mod client;
pub mod fixtures;
pub mod signature;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::availability::SearchCriteria;
use crate::config::{SupplierConfig, SupplierMode};
use crate::error::{BffError, BffResult};
use crate::quoting::QuoteCriteria;
use crate::resilience::AttemptError;

pub use client::HttpSupplier;
pub use fixtures::FixtureSet;
pub use signature::{ApiKeySigner, RequestSigner};
pub use types::{SupplierAvailability, SupplierQuote};

/// A source of live availability and rates.
///
/// Implementations decide retryability themselves; the pipeline only reads
/// the flag.
#[async_trait]
pub trait HotelSupplier: Send + Sync {
    fn name(&self) -> &str;

    async fn search_availability(
        &self,
        criteria: &SearchCriteria,
        request_id: &str,
    ) -> Result<SupplierAvailability, AttemptError<BffError>>;

    async fn quote_rates(
        &self,
        criteria: &QuoteCriteria,
        request_id: &str,
    ) -> Result<SupplierQuote, AttemptError<BffError>>;
}

/// Where the services get their data.
#[derive(Clone)]
pub enum Upstream {
    Live(Arc<dyn HotelSupplier>),
    Fixtures(Arc<FixtureSet>),
}

impl Upstream {
    pub fn from_config(config: &SupplierConfig) -> BffResult<Self> {
        match config.mode {
            SupplierMode::Live => Ok(Upstream::Live(Arc::new(HttpSupplier::from_config(config)?))),
            SupplierMode::Fixtures => {
                let dir = config.fixtures_dir.as_deref().ok_or_else(|| {
                    BffError::Unknown("supplier.fixtures_dir is required in fixtures mode".into())
                })?;
                Ok(Upstream::Fixtures(Arc::new(FixtureSet::new(dir))))
            }
        }
    }

    pub fn mode(&self) -> &'static str {
        match self {
            Upstream::Live(_) => "live",
            Upstream::Fixtures(_) => "fixtures",
        }
    }
}
