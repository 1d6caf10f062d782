//! Configuration loading from disk and the environment.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::config::schema::{BffConfig, CacheBackend, LogFormat, SupplierMode};
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, value: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, value } => {
                write!(f, "Invalid value '{}' for environment variable {}", value, var)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration from an optional TOML file, apply `BFF_*` environment
/// overrides, then validate.
pub fn load_config(path: Option<&Path>) -> Result<BffConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => BffConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok())?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay environment values onto `config`.
///
/// `lookup` is injected so tests do not have to mutate the process environment.
pub fn apply_env_overrides<F>(config: &mut BffConfig, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let env = EnvReader { lookup };

    env.string("BFF_BIND_ADDRESS", &mut config.listener.bind_address);
    env.parse("BFF_REQUEST_TIMEOUT_SECS", &mut config.listener.request_timeout_secs)?;

    env.string("BFF_SUPPLIER_NAME", &mut config.supplier.name);
    if let Some(mode) = env.get("BFF_SUPPLIER_MODE") {
        config.supplier.mode = match mode.as_str() {
            "live" => SupplierMode::Live,
            "fixtures" => SupplierMode::Fixtures,
            _ => return Err(ConfigError::Env { var: "BFF_SUPPLIER_MODE", value: mode }),
        };
    }
    env.string("BFF_SUPPLIER_BASE_URL", &mut config.supplier.base_url);
    env.string("BFF_SUPPLIER_API_KEY", &mut config.supplier.api_key);
    env.string("BFF_SUPPLIER_API_SECRET", &mut config.supplier.api_secret);
    env.parse("BFF_SUPPLIER_TIMEOUT_MS", &mut config.supplier.timeout_ms)?;
    if let Some(dir) = env.get("BFF_FIXTURES_DIR") {
        config.supplier.fixtures_dir = Some(dir);
    }

    env.parse("BFF_RATE_LIMIT_CAPACITY", &mut config.rate_limit.capacity)?;
    env.parse("BFF_RATE_LIMIT_REFILL_INTERVAL_MS", &mut config.rate_limit.refill_interval_ms)?;

    env.parse("BFF_BREAKER_FAILURE_THRESHOLD", &mut config.circuit_breaker.failure_threshold)?;
    env.parse("BFF_BREAKER_COOL_DOWN_MS", &mut config.circuit_breaker.cool_down_ms)?;

    env.parse("BFF_RETRY_ATTEMPTS", &mut config.retries.attempts)?;
    env.parse("BFF_RETRY_BASE_DELAY_MS", &mut config.retries.base_delay_ms)?;
    env.parse("BFF_RETRY_MAX_DELAY_MS", &mut config.retries.max_delay_ms)?;
    env.parse("BFF_RETRY_JITTER", &mut config.retries.jitter)?;

    if let Some(backend) = env.get("BFF_CACHE_BACKEND") {
        config.cache.backend = match backend.as_str() {
            "memory" => CacheBackend::Memory,
            "http" => CacheBackend::Http,
            _ => return Err(ConfigError::Env { var: "BFF_CACHE_BACKEND", value: backend }),
        };
    }
    if let Some(url) = env.get("BFF_CACHE_URL") {
        config.cache.url = Some(url);
    }
    if let Some(key) = env.get("BFF_CACHE_API_KEY") {
        config.cache.api_key = Some(key);
    }
    env.string("BFF_CACHE_TABLE", &mut config.cache.table);
    env.parse("BFF_CACHE_SEARCH_TTL_SECS", &mut config.cache.search_ttl_secs)?;
    env.parse("BFF_CACHE_QUOTE_TTL_SECS", &mut config.cache.quote_ttl_secs)?;
    env.parse("BFF_CACHE_MEMORY_MAX_ENTRIES", &mut config.cache.memory_max_entries)?;

    env.string("BFF_LOG_LEVEL", &mut config.observability.log_level);
    if let Some(format) = env.get("BFF_LOG_FORMAT") {
        config.observability.log_format = match format.as_str() {
            "pretty" => LogFormat::Pretty,
            "json" => LogFormat::Json,
            _ => return Err(ConfigError::Env { var: "BFF_LOG_FORMAT", value: format }),
        };
    }
    env.parse("BFF_METRICS_ENABLED", &mut config.observability.metrics_enabled)?;
    env.string("BFF_METRICS_ADDRESS", &mut config.observability.metrics_address);

    Ok(())
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, var: &str) -> Option<String> {
        (self.lookup)(var).filter(|v| !v.is_empty())
    }

    fn string(&self, var: &str, target: &mut String) {
        if let Some(value) = self.get(var) {
            *target = value;
        }
    }

    fn parse<T: FromStr>(&self, var: &'static str, target: &mut T) -> Result<(), ConfigError> {
        if let Some(value) = self.get(var) {
            *target = value
                .parse()
                .map_err(|_| ConfigError::Env { var, value: value.clone() })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_env_overrides() {
        let mut config = BffConfig::default();
        apply_env_overrides(
            &mut config,
            lookup(&[
                ("BFF_RATE_LIMIT_CAPACITY", "40"),
                ("BFF_BREAKER_COOL_DOWN_MS", "1500"),
                ("BFF_RETRY_JITTER", "true"),
                ("BFF_CACHE_BACKEND", "http"),
                ("BFF_CACHE_URL", "http://localhost:54321/rest/v1"),
                ("BFF_SUPPLIER_MODE", "fixtures"),
            ]),
        )
        .unwrap();

        assert_eq!(config.rate_limit.capacity, 40);
        assert_eq!(config.circuit_breaker.cool_down_ms, 1_500);
        assert!(config.retries.jitter);
        assert_eq!(config.cache.backend, CacheBackend::Http);
        assert_eq!(config.cache.url.as_deref(), Some("http://localhost:54321/rest/v1"));
        assert_eq!(config.supplier.mode, SupplierMode::Fixtures);
    }

    #[test]
    fn test_empty_env_values_are_ignored() {
        let mut config = BffConfig::default();
        apply_env_overrides(&mut config, lookup(&[("BFF_RATE_LIMIT_CAPACITY", "")])).unwrap();
        assert_eq!(config.rate_limit.capacity, 20);
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = BffConfig::default();
        let err = apply_env_overrides(&mut config, lookup(&[("BFF_RETRY_ATTEMPTS", "three")]))
            .unwrap_err();
        assert!(err.to_string().contains("BFF_RETRY_ATTEMPTS"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_config(Some(Path::new("does-not-exist.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
