//! Cache entry model and the store abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One cached supplier response.
///
/// Entries are upserted on every successful fetch and never deleted;
/// `expires_at` only decides whether an entry is fresh or stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub cache_key: String,
    pub params_hash: String,
    /// Opaque JSON document, normally a [`VersionedPayload`].
    pub response: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub etag: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// Store failures. Callers treat these as a miss (reads) or ignore them
/// after logging (writes).
#[derive(Debug, Error)]
pub enum CacheStoreError {
    #[error("cache store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("cache store write conflict: {0}")]
    Conflict(String),

    #[error("cache store unreachable: {0}")]
    Transport(String),

    #[error("cache store response could not be decoded: {0}")]
    Decode(String),
}

/// Keyed response cache.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Zero or one entry for an exact key.
    async fn get(&self, cache_key: &str) -> Result<Option<CacheEntry>, CacheStoreError>;

    /// Upsert by `cache_key`, last write wins.
    async fn put(&self, entry: CacheEntry) -> Result<(), CacheStoreError>;
}

/// Payload types that can be cached carry a schema version so stale entries
/// written by an older deploy are recognised and skipped.
pub trait Versioned {
    const SCHEMA_VERSION: u32;
}

/// Envelope stored in [`CacheEntry::response`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionedPayload<T> {
    pub schema_version: u32,
    pub data: T,
}

impl<T> VersionedPayload<T>
where
    T: Versioned + Serialize + DeserializeOwned,
{
    pub fn encode(data: &T) -> Result<Value, serde_json::Error> {
        serde_json::to_value(VersionedPayload {
            schema_version: T::SCHEMA_VERSION,
            data,
        })
    }

    /// `None` when the version differs or the document does not decode.
    pub fn decode(value: &Value) -> Option<T> {
        let version = value.get("schema_version")?.as_u64()?;
        if version != u64::from(T::SCHEMA_VERSION) {
            return None;
        }
        let data = value.get("data")?.clone();
        serde_json::from_value(data).ok()
    }
}
