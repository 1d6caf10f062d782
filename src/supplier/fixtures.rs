//! Offline fixture source.
//!
//! Reads `search.json` and `quote.json` from a directory on every call, so
//! fixtures can be edited while the service runs.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::error::{BffError, BffResult};
use crate::supplier::types::{SupplierAvailability, SupplierQuote};

pub const SEARCH_FIXTURE: &str = "search.json";
pub const QUOTE_FIXTURE: &str = "quote.json";

#[derive(Debug, Clone)]
pub struct FixtureSet {
    dir: PathBuf,
}

impl FixtureSet {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn search(&self) -> BffResult<SupplierAvailability> {
        self.load(SEARCH_FIXTURE).await
    }

    pub async fn quote(&self) -> BffResult<SupplierQuote> {
        self.load(QUOTE_FIXTURE).await
    }

    async fn load<T: DeserializeOwned>(&self, file: &str) -> BffResult<T> {
        let path = self.dir.join(file);
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            tracing::error!(path = %path.display(), error = %e, "Fixture unavailable");
            BffError::Unknown(format!("fixture {} unavailable: {}", path.display(), e))
        })?;
        serde_json::from_str(&raw)
            .map_err(|e| BffError::Unknown(format!("fixture {} is invalid: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("hotel-bff-fixtures-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn test_reads_search_fixture() {
        let dir = temp_dir("search");
        std::fs::write(
            dir.join(SEARCH_FIXTURE),
            r#"{"hotels":[{"code":"1","name":"A","minRate":"10.00","maxRate":"12.00","currency":"EUR"}]}"#,
        )
        .unwrap();

        let availability = FixtureSet::new(&dir).search().await.unwrap();
        assert_eq!(availability.hotels.len(), 1);
        assert_eq!(availability.hotels[0].category_name, None);
    }

    #[tokio::test]
    async fn test_missing_fixture_is_unknown() {
        let dir = temp_dir("missing");
        let err = FixtureSet::new(&dir).quote().await.unwrap_err();
        assert_eq!(err.code(), "UNKNOWN");
    }
}
