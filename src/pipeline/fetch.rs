//! The resilient fetch pipeline.
//!
//! # Priority Order
//! ```text
//! 1. cache lookup (store errors → miss)
//! 2. fresh entry                → Fresh(cache), nothing else touched
//! 3. breaker refuses            → Stale(circuit_open) | SupplierTimeout
//! 4. token bucket empty         → Stale(rate_limited) | RateLimited
//! 5. retry(supplier call) under the request deadline
//!      ok   → breaker success, best-effort put, Fresh(live)
//!      fail → breaker failure, Stale(fetch_failed) | escalated error
//! ```
//!
//! Running out of the request deadline is a failed fetch like any other: the
//! breaker records it and an expired entry is still served.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::cache::{CacheEntry, CacheKey, CacheStore, CacheStoreError, RequestParams, Versioned, VersionedPayload};
use crate::config::BffConfig;
use crate::error::BffError;
use crate::observability::metrics;
use crate::pipeline::outcome::{Outcome, StaleReason};
use crate::resilience::timeouts::with_overall_deadline;
use crate::resilience::{AttemptError, CircuitBreaker, RetryPolicy, TokenBucket};

/// Cache-aside fetch with admission control, circuit breaking and retries.
///
/// One instance owns its bucket and breaker; build it once per process and
/// share it between the search and quote services.
pub struct FetchPipeline {
    store: Arc<dyn CacheStore>,
    limiter: TokenBucket,
    breaker: CircuitBreaker,
    retry: RetryPolicy,
    deadline: Option<Duration>,
    supplier: String,
}

impl FetchPipeline {
    pub fn new(
        store: Arc<dyn CacheStore>,
        limiter: TokenBucket,
        breaker: CircuitBreaker,
        retry: RetryPolicy,
        supplier: impl Into<String>,
    ) -> Self {
        Self {
            store,
            limiter,
            breaker,
            retry,
            deadline: None,
            supplier: supplier.into(),
        }
    }

    /// Bound the live fetch (every attempt and backoff wait) by `deadline`.
    pub fn with_fetch_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn from_config(config: &BffConfig, store: Arc<dyn CacheStore>) -> Self {
        Self::new(
            store,
            TokenBucket::new(
                config.rate_limit.capacity,
                Duration::from_millis(config.rate_limit.refill_interval_ms),
            ),
            CircuitBreaker::new(
                config.circuit_breaker.failure_threshold,
                Duration::from_millis(config.circuit_breaker.cool_down_ms),
            ),
            RetryPolicy::from_config(&config.retries),
            config.supplier.name.clone(),
        )
        .with_fetch_deadline(Duration::from_secs(config.listener.request_timeout_secs))
    }

    pub fn supplier(&self) -> &str {
        &self.supplier
    }

    pub fn breaker(&self) -> &CircuitBreaker {
        &self.breaker
    }

    pub fn limiter(&self) -> &TokenBucket {
        &self.limiter
    }

    /// Answer one logical request.
    ///
    /// `supplier_call` receives the 1-indexed attempt number and reports
    /// whether its failure is worth retrying.
    pub async fn fetch<T, F, Fut>(
        &self,
        operation: &str,
        params: &RequestParams,
        ttl: Duration,
        supplier_call: F,
    ) -> Outcome<T>
    where
        T: Versioned + Serialize + DeserializeOwned,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AttemptError<BffError>>>,
    {
        let key = CacheKey::new(operation, params);
        let cache_key = key.to_string();

        let cached = self.lookup::<T>(operation, &cache_key).await;

        if let Some((response, expires_at)) = cached {
            if Utc::now() < expires_at {
                metrics::record_cache_lookup(operation, "fresh");
                tracing::debug!(operation, cache_key = %cache_key, "Serving fresh cache entry");
                return Outcome::Fresh {
                    response,
                    from_cache: true,
                    expires_at,
                };
            }
            metrics::record_cache_lookup(operation, "expired");
            return self
                .fetch_live(operation, &key, ttl, supplier_call, Some((response, expires_at)))
                .await;
        }

        metrics::record_cache_lookup(operation, "miss");
        self.fetch_live(operation, &key, ttl, supplier_call, None).await
    }

    async fn fetch_live<T, F, Fut>(
        &self,
        operation: &str,
        key: &CacheKey,
        ttl: Duration,
        supplier_call: F,
        stale: Option<(T, DateTime<Utc>)>,
    ) -> Outcome<T>
    where
        T: Versioned + Serialize + DeserializeOwned,
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AttemptError<BffError>>>,
    {
        if !self.breaker.can_request() {
            tracing::warn!(operation, supplier = %self.supplier, "Circuit open, skipping supplier call");
            return fallback(stale, StaleReason::CircuitOpen, || {
                BffError::SupplierTimeout(format!("circuit open for supplier {}", self.supplier))
            });
        }

        if let Err(exceeded) = self.limiter.try_consume(1) {
            tracing::warn!(operation, available = exceeded.available, "Outbound rate limit reached");
            metrics::record_rate_limited(operation);
            return fallback(stale, StaleReason::RateLimited, || {
                BffError::RateLimited(format!("outbound supplier budget exhausted: {}", exceeded))
            });
        }

        let retry_loop = self.retry.retry_with(supplier_call, |event| {
            tracing::warn!(
                operation,
                attempt = event.attempt,
                wait_ms = event.wait.as_millis() as u64,
                error = %event.error,
                "Supplier call failed, retrying"
            );
            metrics::record_retry(operation);
        });
        let result = match self.deadline {
            Some(deadline) => with_overall_deadline(deadline, retry_loop).await,
            None => retry_loop.await,
        };

        match result {
            Ok(response) => {
                self.breaker.record_success();
                let expires_at = Utc::now() + chrono_ttl(ttl);
                self.store_best_effort(key, &response, expires_at).await;
                Outcome::Fresh {
                    response,
                    from_cache: false,
                    expires_at,
                }
            }
            Err(error) => {
                self.breaker.record_failure();
                tracing::error!(operation, error = %error, "Supplier call failed");
                fallback(stale, StaleReason::FetchFailed, || error.escalate())
            }
        }
    }

    async fn lookup<T>(&self, operation: &str, cache_key: &str) -> Option<(T, DateTime<Utc>)>
    where
        T: Versioned + Serialize + DeserializeOwned,
    {
        match self.store.get(cache_key).await {
            Ok(Some(entry)) => match VersionedPayload::<T>::decode(&entry.response) {
                Some(response) => Some((response, entry.expires_at)),
                None => {
                    tracing::debug!(operation, cache_key, "Cached payload has an old schema, ignoring");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(operation, cache_key, error = %e, "Cache read failed, treating as miss");
                metrics::record_cache_lookup(operation, "error");
                None
            }
        }
    }

    async fn store_best_effort<T>(&self, key: &CacheKey, response: &T, expires_at: DateTime<Utc>)
    where
        T: Versioned + Serialize + DeserializeOwned,
    {
        let encoded = match VersionedPayload::encode(response) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(operation = key.operation(), error = %e, "Unable to encode response for cache");
                return;
            }
        };

        let entry = CacheEntry {
            cache_key: key.to_string(),
            params_hash: key.params_hash().to_string(),
            response: encoded,
            etag: None,
            expires_at,
            created_at: Utc::now(),
        };

        if let Err(e) = self.store.put(entry).await {
            let error = match e {
                CacheStoreError::Conflict(msg) => BffError::DataConflict(msg),
                other => BffError::Unknown(other.to_string()),
            };
            tracing::warn!(
                operation = key.operation(),
                code = error.code(),
                error = %error,
                "Cache write failed, continuing"
            );
            metrics::record_cache_write_failure(key.operation());
        }
    }
}

fn fallback<T, E>(stale: Option<(T, DateTime<Utc>)>, reason: StaleReason, error: E) -> Outcome<T>
where
    E: FnOnce() -> BffError,
{
    match stale {
        Some((response, expires_at)) => {
            tracing::info!(reason = reason.as_str(), "Serving stale cache entry");
            Outcome::Stale {
                response,
                reason,
                expires_at,
            }
        }
        None => Outcome::Failure(error()),
    }
}

fn chrono_ttl(ttl: Duration) -> chrono::Duration {
    chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::zero())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use async_trait::async_trait;
    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::cache::MemoryCacheStore;
    use crate::resilience::CircuitState;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Rates {
        total: u32,
    }

    impl Versioned for Rates {
        const SCHEMA_VERSION: u32 = 1;
    }

    fn pipeline(store: Arc<dyn CacheStore>) -> FetchPipeline {
        FetchPipeline::new(
            store,
            TokenBucket::new(10, Duration::from_secs(1)),
            CircuitBreaker::new(5, Duration::from_secs(30)),
            RetryPolicy::new(3, Duration::from_millis(250)),
            "hotelbeds",
        )
    }

    fn params() -> RequestParams {
        RequestParams::from_value(json!({"destination": "PMI"}))
    }

    struct FailingStore;

    #[async_trait]
    impl CacheStore for FailingStore {
        async fn get(&self, _: &str) -> Result<Option<CacheEntry>, CacheStoreError> {
            Err(CacheStoreError::Status { status: 500, body: "boom".into() })
        }

        async fn put(&self, _: CacheEntry) -> Result<(), CacheStoreError> {
            Err(CacheStoreError::Conflict("duplicate".into()))
        }
    }

    #[tokio::test]
    async fn test_store_failures_do_not_block_live_fetch() {
        let pipeline = pipeline(Arc::new(FailingStore));

        let outcome = pipeline
            .fetch("search", &params(), Duration::from_secs(60), |_| async {
                Ok::<_, AttemptError<BffError>>(Rates { total: 3 })
            })
            .await;

        match outcome {
            Outcome::Fresh { response, from_cache, .. } => {
                assert_eq!(response, Rates { total: 3 });
                assert!(!from_cache);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_old_schema_entry_is_a_miss() {
        let store = MemoryCacheStore::new();
        let key = CacheKey::new("search", &params()).to_string();
        store
            .put(CacheEntry {
                cache_key: key,
                params_hash: params().params_hash(),
                response: json!({"schema_version": 0, "data": {"total": 1}}),
                etag: None,
                expires_at: Utc::now() + chrono::Duration::minutes(5),
                created_at: Utc::now(),
            })
            .await
            .unwrap();

        let calls = AtomicU32::new(0);
        let outcome = pipeline(Arc::new(store))
            .fetch("search", &params(), Duration::from_secs(60), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, AttemptError<BffError>>(Rates { total: 9 }) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(outcome.is_fresh());
    }

    #[tokio::test(start_paused = true)]
    async fn test_permanent_error_is_not_retried() {
        let store = Arc::new(MemoryCacheStore::new());
        let pipeline = pipeline(store);
        let calls = AtomicU32::new(0);

        let outcome: Outcome<Rates> = pipeline
            .fetch("quote", &params(), Duration::from_secs(60), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AttemptError::permanent(BffError::Unknown("occupancies could not be encoded".into()))) }
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(outcome, Outcome::Failure(BffError::Unknown("occupancies could not be encoded".into())));
        assert_eq!(pipeline.breaker().failure_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_supplier_429_stays_rate_limited() {
        let pipeline = pipeline(Arc::new(MemoryCacheStore::new()));

        let outcome: Outcome<Rates> = pipeline
            .fetch("search", &params(), Duration::from_secs(60), |_| async {
                Err(AttemptError::retryable(BffError::RateLimited("supplier returned 429".into())))
            })
            .await;

        assert_eq!(
            outcome,
            Outcome::Failure(BffError::RateLimited("supplier returned 429".into()))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_deadline_counts_as_failed_fetch() {
        let pipeline = pipeline(Arc::new(MemoryCacheStore::new()))
            .with_fetch_deadline(Duration::from_secs(1));

        let outcome: Outcome<Rates> = pipeline
            .fetch("search", &params(), Duration::from_secs(60), |_| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Rates { total: 1 })
            })
            .await;

        assert!(matches!(outcome, Outcome::Failure(BffError::SupplierTimeout(_))));
        assert_eq!(pipeline.breaker().failure_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_deadline_serves_expired_entry() {
        let store = MemoryCacheStore::new();
        store
            .put(CacheEntry {
                cache_key: CacheKey::new("search", &params()).to_string(),
                params_hash: params().params_hash(),
                response: VersionedPayload::encode(&Rates { total: 4 }).unwrap(),
                etag: None,
                expires_at: Utc::now() - chrono::Duration::minutes(1),
                created_at: Utc::now() - chrono::Duration::minutes(6),
            })
            .await
            .unwrap();
        let pipeline = pipeline(Arc::new(store)).with_fetch_deadline(Duration::from_secs(1));

        let outcome: Outcome<Rates> = pipeline
            .fetch("search", &params(), Duration::from_secs(60), |_| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(Rates { total: 1 })
            })
            .await;

        match outcome {
            Outcome::Stale { response, reason, .. } => {
                assert_eq!(response, Rates { total: 4 });
                assert_eq!(reason, StaleReason::FetchFailed);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(pipeline.breaker().failure_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_breaker_opens_after_repeated_failed_fetches() {
        let pipeline = FetchPipeline::new(
            Arc::new(MemoryCacheStore::new()),
            TokenBucket::new(10, Duration::from_secs(1)),
            CircuitBreaker::new(2, Duration::from_secs(30)),
            RetryPolicy::new(1, Duration::from_millis(1)),
            "hotelbeds",
        );

        for _ in 0..2 {
            let _: Outcome<Rates> = pipeline
                .fetch("search", &params(), Duration::from_secs(60), |_| async {
                    Err(AttemptError::retryable(BffError::TransientRetry("502".into())))
                })
                .await;
        }
        assert_eq!(pipeline.breaker().state(), CircuitState::Open);

        let calls = AtomicU32::new(0);
        let outcome: Outcome<Rates> = pipeline
            .fetch("search", &params(), Duration::from_secs(60), |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok::<_, AttemptError<BffError>>(Rates { total: 1 }) }
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(matches!(outcome, Outcome::Failure(BffError::SupplierTimeout(_))));
    }
}
