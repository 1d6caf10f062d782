//! Request signing for supplier calls.

use std::time::{SystemTime, UNIX_EPOCH};

use sha2::{Digest, Sha256};

/// Produces the `X-Signature` header value for a given unix timestamp.
///
/// Closures implement this too, so tests and alternative suppliers can swap
/// the scheme without touching the client.
pub trait RequestSigner: Send + Sync {
    fn sign(&self, unix_secs: u64) -> String;
}

impl<F> RequestSigner for F
where
    F: Fn(u64) -> String + Send + Sync,
{
    fn sign(&self, unix_secs: u64) -> String {
        self(unix_secs)
    }
}

/// `hex(sha256(api_key + secret + unix_secs))`.
#[derive(Clone)]
pub struct ApiKeySigner {
    api_key: String,
    secret: String,
}

impl ApiKeySigner {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: secret.into(),
        }
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl RequestSigner for ApiKeySigner {
    fn sign(&self, unix_secs: u64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.api_key.as_bytes());
        hasher.update(self.secret.as_bytes());
        hasher.update(unix_secs.to_string().as_bytes());
        hex::encode(hasher.finalize())
    }
}

// Secret stays out of logs.
impl std::fmt::Debug for ApiKeySigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeySigner")
            .field("api_key", &self.api_key)
            .finish_non_exhaustive()
    }
}

pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
