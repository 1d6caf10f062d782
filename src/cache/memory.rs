//! Process-local cache store.

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::cache::store::{CacheEntry, CacheStore, CacheStoreError};

/// Entry cap used by [`MemoryCacheStore::new`].
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

/// In-memory [`CacheStore`] backed by a concurrent map.
///
/// Used when no shared store is configured, and by tests. The map holds at
/// most `max_entries` keys: inserting a new key into a full store first
/// evicts the entry that expires soonest, so long-expired entries go before
/// fresh ones. Concurrent inserts may overshoot the cap by a few entries.
#[derive(Clone)]
pub struct MemoryCacheStore {
    inner: Arc<DashMap<String, CacheEntry>>,
    max_entries: usize,
}

impl Default for MemoryCacheStore {
    fn default() -> Self {
        Self::with_max_entries(DEFAULT_MAX_ENTRIES)
    }
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Direct lookup without going through the trait.
    pub fn entry(&self, cache_key: &str) -> Option<CacheEntry> {
        self.inner.get(cache_key).map(|r| r.value().clone())
    }

    fn evict_one(&self) {
        let victim = self
            .inner
            .iter()
            .min_by_key(|r| r.value().expires_at)
            .map(|r| r.key().clone());

        if let Some(key) = victim {
            self.inner.remove(&key);
            tracing::debug!(cache_key = %key, "Memory cache full, evicted entry");
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, cache_key: &str) -> Result<Option<CacheEntry>, CacheStoreError> {
        Ok(self.entry(cache_key))
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), CacheStoreError> {
        if !self.inner.contains_key(&entry.cache_key) && self.inner.len() >= self.max_entries {
            self.evict_one();
        }
        self.inner.insert(entry.cache_key.clone(), entry);
        Ok(())
    }
}
