//! Cache key derivation.
//!
//! A cache key is `"<operation>:<sha256(normalized params)>"`. Normalization
//! sorts object keys recursively and drops null members, so logically
//! identical requests hash the same no matter how their fields were ordered
//! or whether an unset optional field was sent as `null`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::error::BffError;

/// The pricing-relevant subset of a request, in canonical form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    canonical: Value,
}

impl RequestParams {
    /// Canonicalize any serializable value.
    pub fn from_serializable<T: Serialize>(params: &T) -> Result<Self, BffError> {
        let value = serde_json::to_value(params)
            .map_err(|e| BffError::Unknown(format!("unable to serialize request params: {e}")))?;
        Ok(Self::from_value(value))
    }

    pub fn from_value(value: Value) -> Self {
        Self {
            canonical: canonicalize(value),
        }
    }

    /// Deterministic, key-sorted JSON text.
    pub fn normalize(&self) -> String {
        // Objects were rebuilt in sorted order, so plain serialization is stable.
        self.canonical.to_string()
    }

    /// Hex sha256 of [`normalize`](Self::normalize).
    pub fn params_hash(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.normalize().as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn as_value(&self) -> &Value {
        &self.canonical
    }
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            let mut out = Map::new();
            for (k, v) in sorted {
                out.insert(k, v);
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

/// Key under which a response is cached.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    operation: String,
    params_hash: String,
}

impl CacheKey {
    pub fn new(operation: &str, params: &RequestParams) -> Self {
        Self {
            operation: operation.to_string(),
            params_hash: params.params_hash(),
        }
    }

    pub fn operation(&self) -> &str {
        &self.operation
    }

    pub fn params_hash(&self) -> &str {
        &self.params_hash
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.operation, self.params_hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_key_order_does_not_matter() {
        let a: Value = serde_json::from_str(r#"{"a":1,"b":2}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{"b":2,"a":1}"#).unwrap();

        let a = RequestParams::from_value(a);
        let b = RequestParams::from_value(b);
        assert_eq!(a.normalize(), b.normalize());
        assert_eq!(a.normalize(), r#"{"a":1,"b":2}"#);
        assert_eq!(a.params_hash(), b.params_hash());
    }

    #[test]
    fn test_nested_objects_are_sorted() {
        let params = RequestParams::from_value(json!({
            "occupancy": {"rooms": 1, "adults": 2, "children": 0},
            "destination": "PMI",
        }));
        assert_eq!(
            params.normalize(),
            r#"{"destination":"PMI","occupancy":{"adults":2,"children":0,"rooms":1}}"#
        );
    }

    #[test]
    fn test_null_members_are_dropped() {
        let with_null = RequestParams::from_value(json!({
            "destination": "PMI",
            "currency": null,
            "occupancy": {"rooms": 1, "children": null},
        }));
        let without = RequestParams::from_value(json!({
            "destination": "PMI",
            "occupancy": {"rooms": 1},
        }));
        assert_eq!(with_null.normalize(), r#"{"destination":"PMI","occupancy":{"rooms":1}}"#);
        assert_eq!(with_null.params_hash(), without.params_hash());
    }

    #[test]
    fn test_none_field_hashes_like_absent_field() {
        #[derive(Serialize)]
        struct WithOption {
            destination: &'static str,
            currency: Option<&'static str>,
        }
        #[derive(Serialize)]
        struct Without {
            destination: &'static str,
        }
        let a = RequestParams::from_serializable(&WithOption { destination: "PMI", currency: None }).unwrap();
        let b = RequestParams::from_serializable(&Without { destination: "PMI" }).unwrap();
        assert_eq!(a.params_hash(), b.params_hash());
    }

    #[test]
    fn test_array_order_is_significant() {
        let a = RequestParams::from_value(json!({"ids": [1, 2]}));
        let b = RequestParams::from_value(json!({"ids": [2, 1]}));
        assert_ne!(a.params_hash(), b.params_hash());
    }

    #[test]
    fn test_cache_key_format() {
        let params = RequestParams::from_value(json!({"a": 1}));
        let key = CacheKey::new("search", &params);
        let text = key.to_string();

        assert!(text.starts_with("search:"));
        assert_eq!(text.len(), "search:".len() + 64);
        assert_eq!(key.params_hash(), params.params_hash());
    }

    #[test]
    fn test_from_serializable_struct() {
        #[derive(Serialize)]
        struct Params {
            z: u8,
            a: &'static str,
        }
        let params = RequestParams::from_serializable(&Params { z: 1, a: "x" }).unwrap();
        assert_eq!(params.normalize(), r#"{"a":"x","z":1}"#);
    }
}
