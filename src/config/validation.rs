//! Configuration validation.
//!
//! Serde handles syntax; this checks value ranges and cross-field
//! requirements. All problems are reported at once, not just the first.

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{BffConfig, CacheBackend, SupplierMode};
use crate::resilience::RetryPolicy;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &BffConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address", config.listener.bind_address),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new("listener.request_timeout_secs", "must be > 0"));
    }

    if config.rate_limit.capacity == 0 {
        errors.push(ValidationError::new("rate_limit.capacity", "must be > 0"));
    }
    if config.rate_limit.refill_interval_ms == 0 {
        errors.push(ValidationError::new("rate_limit.refill_interval_ms", "must be > 0"));
    }

    if config.circuit_breaker.failure_threshold == 0 {
        errors.push(ValidationError::new("circuit_breaker.failure_threshold", "must be > 0"));
    }

    if config.retries.attempts == 0 {
        errors.push(ValidationError::new("retries.attempts", "must be >= 1"));
    }
    if config.retries.max_delay_ms < config.retries.base_delay_ms {
        errors.push(ValidationError::new(
            "retries.max_delay_ms",
            "must not be smaller than retries.base_delay_ms",
        ));
    }

    let supplier = &config.supplier;
    if supplier.mode == SupplierMode::Live && config.listener.request_timeout_secs > 0 {
        let policy = RetryPolicy::from_config(&config.retries);
        let worst_case_ms = u128::from(policy.attempts()) * u128::from(supplier.timeout_ms)
            + policy.max_total_backoff().as_millis();
        let deadline_ms = u128::from(config.listener.request_timeout_secs) * 1000;
        if deadline_ms <= worst_case_ms {
            errors.push(ValidationError::new(
                "listener.request_timeout_secs",
                format!(
                    "{}ms does not cover {} supplier attempts plus backoff ({}ms)",
                    deadline_ms,
                    policy.attempts(),
                    worst_case_ms
                ),
            ));
        }
    }
    if supplier.name.trim().is_empty() {
        errors.push(ValidationError::new("supplier.name", "must not be empty"));
    }
    match supplier.mode {
        SupplierMode::Live => {
            if url::Url::parse(&supplier.base_url).is_err() {
                errors.push(ValidationError::new(
                    "supplier.base_url",
                    "a valid URL is required in live mode",
                ));
            }
            if supplier.api_key.is_empty() || supplier.api_secret.is_empty() {
                errors.push(ValidationError::new(
                    "supplier.api_key",
                    "api_key and api_secret are required in live mode",
                ));
            }
            if supplier.timeout_ms == 0 {
                errors.push(ValidationError::new("supplier.timeout_ms", "must be > 0"));
            }
        }
        SupplierMode::Fixtures => {
            if supplier.fixtures_dir.as_deref().map_or(true, str::is_empty) {
                errors.push(ValidationError::new(
                    "supplier.fixtures_dir",
                    "required in fixtures mode",
                ));
            }
        }
    }

    if config.cache.backend == CacheBackend::Memory && config.cache.memory_max_entries == 0 {
        errors.push(ValidationError::new("cache.memory_max_entries", "must be > 0"));
    }

    if config.cache.backend == CacheBackend::Http {
        match config.cache.url.as_deref().map(url::Url::parse) {
            Some(Ok(_)) => {}
            _ => errors.push(ValidationError::new(
                "cache.url",
                "a valid URL is required for the http backend",
            )),
        }
        if config.cache.table.is_empty() {
            errors.push(ValidationError::new("cache.table", "must not be empty"));
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            "not a socket address",
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live_config() -> BffConfig {
        let mut config = BffConfig::default();
        config.supplier.base_url = "https://api.test.hotelbeds.com/hotel-api/1.0".into();
        config.supplier.api_key = "key".into();
        config.supplier.api_secret = "secret".into();
        config
    }

    #[test]
    fn test_valid_live_config() {
        assert!(validate_config(&live_config()).is_ok());
    }

    #[test]
    fn test_defaults_need_supplier_credentials() {
        let errors = validate_config(&BffConfig::default()).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert!(fields.contains(&"supplier.base_url"));
        assert!(fields.contains(&"supplier.api_key"));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = live_config();
        config.rate_limit.capacity = 0;
        config.circuit_breaker.failure_threshold = 0;
        config.retries.attempts = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn test_fixtures_mode_requires_dir() {
        let mut config = BffConfig::default();
        config.supplier.mode = SupplierMode::Fixtures;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "supplier.fixtures_dir");

        config.supplier.fixtures_dir = Some("fixtures".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_request_deadline_must_cover_retries() {
        let mut config = live_config();
        // 3 x 8000ms attempts + 250ms + 500ms of backoff.
        config.listener.request_timeout_secs = 24;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "listener.request_timeout_secs");
        assert!(errors[0].message.contains("24750ms"));

        config.listener.request_timeout_secs = 25;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_memory_cache_needs_a_cap() {
        let mut config = live_config();
        config.cache.memory_max_entries = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "cache.memory_max_entries");
    }

    #[test]
    fn test_http_cache_requires_url() {
        let mut config = live_config();
        config.cache.backend = CacheBackend::Http;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].field, "cache.url");
    }
}
