//! Pipeline results and how they are reported to clients.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::BffError;

/// Why a stale cache entry was served instead of live data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleReason {
    /// Breaker refused the upstream call.
    CircuitOpen,
    /// The live fetch failed after retries.
    FetchFailed,
    /// The local token bucket was empty.
    RateLimited,
}

impl StaleReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaleReason::CircuitOpen => "circuit_open",
            StaleReason::FetchFailed => "fetch_failed",
            StaleReason::RateLimited => "rate_limited",
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Data within its freshness window, from cache or a live fetch.
    Fresh {
        response: T,
        from_cache: bool,
        expires_at: DateTime<Utc>,
    },
    /// Expired cached data served because the live path was unavailable.
    Stale {
        response: T,
        reason: StaleReason,
        expires_at: DateTime<Utc>,
    },
    Failure(BffError),
}

impl<T> Outcome<T> {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Outcome::Fresh { .. })
    }

    pub fn is_stale(&self) -> bool {
        matches!(self, Outcome::Stale { .. })
    }

    /// Split into what the handler sends back, or the error to surface.
    pub fn into_served(self, supplier: &str) -> Result<Served<T>, BffError> {
        match self {
            Outcome::Fresh {
                response,
                from_cache,
                expires_at,
            } => Ok(Served {
                payload: response,
                source: if from_cache {
                    Source::Cache
                } else {
                    Source::Supplier(supplier.to_string())
                },
                cache: Some(CacheMeta {
                    hit: from_cache,
                    stale: false,
                    expires_at,
                }),
                stale_reason: None,
            }),
            Outcome::Stale {
                response,
                reason,
                expires_at,
            } => Ok(Served {
                payload: response,
                source: Source::CacheStale,
                cache: Some(CacheMeta {
                    hit: true,
                    stale: true,
                    expires_at,
                }),
                stale_reason: Some(reason),
            }),
            Outcome::Failure(err) => Err(err),
        }
    }
}

/// Which branch produced the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    Cache,
    CacheStale,
    Supplier(String),
    Fixtures,
}

impl Source {
    pub fn as_str(&self) -> &str {
        match self {
            Source::Cache => "cache",
            Source::CacheStale => "cache-stale",
            Source::Supplier(name) => name,
            Source::Fixtures => "fixtures",
        }
    }
}

impl Serialize for Source {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// `cache` block of the public envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheMeta {
    pub hit: bool,
    pub stale: bool,
    pub expires_at: DateTime<Utc>,
}

/// A payload ready to be wrapped in the public envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct Served<T> {
    pub payload: T,
    pub source: Source,
    pub cache: Option<CacheMeta>,
    pub stale_reason: Option<StaleReason>,
}

impl<T> Served<T> {
    pub fn fixtures(payload: T) -> Self {
        Self {
            payload,
            source: Source::Fixtures,
            cache: None,
            stale_reason: None,
        }
    }
}
