//! Response cache subsystem.
//!
//! # Data Flow
//! ```text
//! Handler params
//!     → keys.rs (canonical JSON → sha256 → "<operation>:<hash>")
//!     → store.rs (CacheStore::get / put, VersionedPayload envelope)
//!         → http.rs   (shared keyed table over HTTP)
//!         → memory.rs (process-local map, capped)
//! ```
//!
//! # Design Decisions
//! - Store failures never fail a request: reads become misses, writes are best-effort
//! - Upserts are last-write-wins; entries derive deterministically from their key
//! - Expiry is advisory; expired entries remain available as stale fallbacks

pub mod http;
pub mod keys;
pub mod memory;
pub mod store;

use std::sync::Arc;

use crate::config::{CacheBackend, CacheConfig};

pub use http::HttpCacheStore;
pub use keys::{CacheKey, RequestParams};
pub use memory::MemoryCacheStore;
pub use store::{CacheEntry, CacheStore, CacheStoreError, Versioned, VersionedPayload};

/// Build the configured store.
pub fn build_store(config: &CacheConfig) -> Result<Arc<dyn CacheStore>, CacheStoreError> {
    match config.backend {
        CacheBackend::Memory => Ok(Arc::new(MemoryCacheStore::with_max_entries(
            config.memory_max_entries,
        ))),
        CacheBackend::Http => Ok(Arc::new(HttpCacheStore::from_config(config)?)),
    }
}
