//! Cache port and the wire encoding shared by every backend.

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::forecast::ForecastDocument;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
    #[error("cached value for `{key}` is corrupt: {message}")]
    Corrupt { key: String, message: String },
}

impl CacheError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// TTL-bound key-value store holding forecast documents.
///
/// Implementations must be safe to share between in-flight requests.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Stored document for `key`, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<ForecastDocument>, CacheError>;

    /// Store `document` under `key`, replacing any previous value.
    ///
    /// The entry starts out with the store's default TTL.
    async fn set(&self, key: &str, document: &ForecastDocument) -> Result<(), CacheError>;

    /// Set or reset the TTL of `key`; `None` applies the store's default TTL.
    async fn expire(&self, key: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    /// Round-trip to the store without touching any key.
    async fn ping(&self) -> Result<(), CacheError>;
}

pub(crate) fn encode(key: &str, document: &ForecastDocument) -> Result<String, CacheError> {
    serde_json::to_string(document).map_err(|err| CacheError::Corrupt {
        key: key.to_string(),
        message: err.to_string(),
    })
}

pub(crate) fn decode(key: &str, raw: &str) -> Result<ForecastDocument, CacheError> {
    serde_json::from_str(raw).map_err(|err| CacheError::Corrupt {
        key: key.to_string(),
        message: err.to_string(),
    })
}

/// Whole seconds for a TTL, never below one.
pub(crate) fn ttl_seconds(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}
