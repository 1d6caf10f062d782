//! Cache store backed by a keyed table reachable over HTTP.
//!
//! # Contract
//! - `GET {base}/{table}?cache_key=eq.<key>&select=*&limit=1` returns a JSON
//!   array with zero or one entry
//! - `POST {base}/{table}` with a one-element array and
//!   `Prefer: resolution=merge-duplicates` upserts on `cache_key`
//! - Any non-2xx status is a store failure, never "not found"

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use url::Url;

use crate::cache::store::{CacheEntry, CacheStore, CacheStoreError};
use crate::config::CacheConfig;

/// HTTP table client.
#[derive(Clone)]
pub struct HttpCacheStore {
    client: Client,
    table_url: Url,
    api_key: Option<String>,
}

impl HttpCacheStore {
    /// Build a store from configuration. Fails on an unusable URL.
    pub fn from_config(config: &CacheConfig) -> Result<Self, CacheStoreError> {
        let base = config
            .url
            .as_deref()
            .ok_or_else(|| CacheStoreError::Transport("cache.url is not set".into()))?;
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| CacheStoreError::Transport(e.to_string()))?;

        Self::new(client, base, &config.table, config.api_key.clone())
    }

    pub fn new(
        client: Client,
        base_url: &str,
        table: &str,
        api_key: Option<String>,
    ) -> Result<Self, CacheStoreError> {
        let base = format!("{}/{}", base_url.trim_end_matches('/'), table);
        let table_url = Url::parse(&base)
            .map_err(|e| CacheStoreError::Transport(format!("invalid cache URL '{}': {}", base, e)))?;

        Ok(Self {
            client,
            table_url,
            api_key,
        })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_key {
            Some(key) => request
                .header("apikey", key)
                .header(header::AUTHORIZATION, format!("Bearer {}", key)),
            None => request,
        }
    }
}

async fn failure(response: reqwest::Response) -> CacheStoreError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::CONFLICT {
        CacheStoreError::Conflict(body)
    } else {
        CacheStoreError::Status {
            status: status.as_u16(),
            body,
        }
    }
}

#[async_trait]
impl CacheStore for HttpCacheStore {
    async fn get(&self, cache_key: &str) -> Result<Option<CacheEntry>, CacheStoreError> {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("cache_key", &format!("eq.{}", cache_key))
            .append_pair("select", "*")
            .append_pair("limit", "1");

        let response = self
            .authorize(self.client.get(url))
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| CacheStoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failure(response).await);
        }

        let mut rows: Vec<CacheEntry> = response
            .json()
            .await
            .map_err(|e| CacheStoreError::Decode(e.to_string()))?;
        Ok(if rows.is_empty() { None } else { Some(rows.swap_remove(0)) })
    }

    async fn put(&self, entry: CacheEntry) -> Result<(), CacheStoreError> {
        let response = self
            .authorize(self.client.post(self.table_url.clone()))
            .header("Prefer", "resolution=merge-duplicates")
            .json(&[entry])
            .send()
            .await
            .map_err(|e| CacheStoreError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failure(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_url() {
        let store = HttpCacheStore::new(
            Client::new(),
            "http://localhost:54321/rest/v1/",
            "supplier_cache",
            None,
        )
        .unwrap();
        assert_eq!(store.table_url.as_str(), "http://localhost:54321/rest/v1/supplier_cache");
    }

    #[test]
    fn test_missing_url() {
        let config = CacheConfig::default();
        assert!(matches!(
            HttpCacheStore::from_config(&config),
            Err(CacheStoreError::Transport(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_store_is_an_error() {
        let store = HttpCacheStore::new(Client::new(), "http://127.0.0.1:9", "t", None).unwrap();
        assert!(matches!(store.get("k").await, Err(CacheStoreError::Transport(_))));
    }
}
