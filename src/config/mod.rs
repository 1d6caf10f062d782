//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize, BFF_* environment overrides)
//!     → validation.rs (semantic checks)
//!     → BffConfig (validated, immutable)
//!     → handed to HttpServer::new, which builds the pipeline once
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    BffConfig, CacheBackend, CacheConfig, CircuitBreakerConfig, ListenerConfig, LogFormat,
    ObservabilityConfig, RateLimitConfig, RetryConfig, SupplierConfig, SupplierMode,
};
