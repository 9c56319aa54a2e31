//! Forecast cache.
//!
//! Forecast documents are memoized per client IP for a fixed TTL. The
//! [`CacheStore`] port hides the backing store:
//!
//! - **Redis**: shared store, expiry enforced by the server
//! - **Memory**: process-local LRU with lazy expiry, for development
//!
//! [`cache_aside_layer`] is the pipeline stage that consults the store before
//! the forecast handler runs and writes fresh documents back on a miss.

mod config;
mod lock;
mod memory;
mod middleware;
mod redis_store;
mod store;

use std::sync::Arc;

pub use config::CacheConfig;
pub use memory::MemoryStore;
pub use middleware::{CacheState, cache_aside_layer, document_response};
pub use redis_store::RedisStore;
pub use store::{CacheError, CacheStore};

use crate::config::{CacheBackend, CacheSettings};

/// Open the store selected by `settings`.
pub async fn open_store(settings: &CacheSettings) -> Result<Arc<dyn CacheStore>, CacheError> {
    let store: Arc<dyn CacheStore> = match settings.backend {
        CacheBackend::Redis => Arc::new(RedisStore::connect(&settings.redis_url, settings.ttl).await?),
        CacheBackend::Memory => Arc::new(MemoryStore::new(settings.memory_capacity, settings.ttl)),
    };
    Ok(store)
}
