//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the BFF.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the hotel BFF.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BffConfig {
    /// Listener configuration (bind address, outer request timeout).
    pub listener: ListenerConfig,

    /// Upstream supplier settings.
    pub supplier: SupplierConfig,

    /// Outbound token bucket.
    pub rate_limit: RateLimitConfig,

    /// Circuit breaker guarding the supplier.
    pub circuit_breaker: CircuitBreakerConfig,

    /// Retry configuration.
    pub retries: RetryConfig,

    /// Response cache settings.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Overall deadline for one client request in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Where supplier data comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SupplierMode {
    /// Call the real supplier through the fetch pipeline.
    #[default]
    Live,
    /// Serve canned responses from `fixtures_dir`.
    Fixtures,
}

/// Supplier connection settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SupplierConfig {
    /// Supplier name reported in envelopes and logs.
    pub name: String,

    /// Live or fixtures.
    pub mode: SupplierMode,

    /// Supplier API base URL.
    pub base_url: String,

    /// API key sent in the `Api-key` header.
    pub api_key: String,

    /// Shared secret used for request signatures.
    pub api_secret: String,

    /// Hard timeout for a single supplier attempt in milliseconds.
    pub timeout_ms: u64,

    /// Directory holding `search.json` and `quote.json` in fixtures mode.
    pub fixtures_dir: Option<String>,
}

impl Default for SupplierConfig {
    fn default() -> Self {
        Self {
            name: "hotelbeds".to_string(),
            mode: SupplierMode::Live,
            base_url: String::new(),
            api_key: String::new(),
            api_secret: String::new(),
            timeout_ms: 8_000,
            fixtures_dir: None,
        }
    }
}

/// Token bucket configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum tokens held by the bucket.
    pub capacity: u32,

    /// One token is added per interval.
    pub refill_interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 20,
            refill_interval_ms: 1_000,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens.
    pub failure_threshold: u32,

    /// Time spent open before a trial call is allowed, in milliseconds.
    pub cool_down_ms: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            cool_down_ms: 30_000,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts including the first one.
    pub attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Add up to 10% random jitter to each delay.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 250,
            max_delay_ms: 10_000,
            jitter: false,
        }
    }
}

/// Cache backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    /// Process-local map. Lost on restart.
    #[default]
    Memory,
    /// Keyed table reachable over HTTP.
    Http,
}

/// Response cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    pub backend: CacheBackend,

    /// Base URL of the table API (http backend only).
    pub url: Option<String>,

    /// Table holding cache entries.
    pub table: String,

    /// Service key for the table API.
    pub api_key: Option<String>,

    /// Timeout for a single store call in milliseconds.
    pub timeout_ms: u64,

    /// Freshness window for search responses.
    pub search_ttl_secs: u64,

    /// Freshness window for quote responses.
    pub quote_ttl_secs: u64,

    /// Entry cap for the memory backend.
    pub memory_max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Memory,
            url: None,
            table: "supplier_cache".to_string(),
            api_key: None,
            timeout_ms: 2_000,
            search_ttl_secs: 300,
            quote_ttl_secs: 60,
            memory_max_entries: 10_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BffConfig::default();
        assert_eq!(config.rate_limit.capacity, 20);
        assert_eq!(config.rate_limit.refill_interval_ms, 1_000);
        assert_eq!(config.circuit_breaker.failure_threshold, 5);
        assert_eq!(config.retries.attempts, 3);
        assert_eq!(config.retries.base_delay_ms, 250);
        assert!(!config.retries.jitter);
        assert_eq!(config.cache.backend, CacheBackend::Memory);
        assert_eq!(config.supplier.mode, SupplierMode::Live);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: BffConfig = toml::from_str(
            r#"
            [supplier]
            mode = "fixtures"
            fixtures_dir = "fixtures"

            [circuit_breaker]
            cool_down_ms = 5000
            "#,
        )
        .unwrap();

        assert_eq!(config.supplier.mode, SupplierMode::Fixtures);
        assert_eq!(config.supplier.name, "hotelbeds");
        assert_eq!(config.circuit_breaker.cool_down_ms, 5_000);
        assert_eq!(config.circuit_breaker.failure_threshold, 5);
    }
}
