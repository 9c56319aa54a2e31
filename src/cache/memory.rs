//! Process-local forecast store.

use std::{num::NonZeroUsize, sync::Mutex, time::Duration};

use async_trait::async_trait;
use lru::LruCache;
use tokio::time::Instant;

use crate::domain::forecast::ForecastDocument;

use super::{
    lock::mutex_lock,
    store::{CacheError, CacheStore, decode, encode},
};

const SOURCE: &str = "cache::memory";

struct Entry {
    raw: String,
    expires_at: Instant,
}

impl Entry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// LRU-bounded store with per-entry deadlines.
///
/// Expiry is lazy: a dead entry is dropped the next time it is read.
pub struct MemoryStore {
    entries: Mutex<LruCache<String, Entry>>,
    default_ttl: Duration,
}

impl MemoryStore {
    pub fn new(capacity: NonZeroUsize, default_ttl: Duration) -> Self {
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            default_ttl,
        }
    }

    /// Number of entries held, live or not yet swept.
    pub fn len(&self) -> usize {
        mutex_lock(&self.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<ForecastDocument>, CacheError> {
        let raw = {
            let mut entries = mutex_lock(&self.entries, SOURCE, "get");
            let now = Instant::now();
            match entries.get(key) {
                Some(entry) if entry.is_live(now) => Some(entry.raw.clone()),
                Some(_) => {
                    entries.pop(key);
                    None
                }
                None => None,
            }
        };

        raw.map(|raw| decode(key, &raw)).transpose()
    }

    async fn set(&self, key: &str, document: &ForecastDocument) -> Result<(), CacheError> {
        let entry = Entry {
            raw: encode(key, document)?,
            expires_at: Instant::now() + self.default_ttl,
        };
        mutex_lock(&self.entries, SOURCE, "set").put(key.to_string(), entry);
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let ttl = ttl.unwrap_or(self.default_ttl);
        let mut entries = mutex_lock(&self.entries, SOURCE, "expire");
        let now = Instant::now();
        if let Some(entry) = entries.peek_mut(key) {
            if entry.is_live(now) {
                entry.expires_at = now + ttl;
            }
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(ip: &str) -> ForecastDocument {
        ForecastDocument {
            ip: ip.to_string(),
            city: "Oslo".to_string(),
            temperature: -3,
            message: "Today, Oslo will be -3 degrees.".to_string(),
        }
    }

    fn store(capacity: usize) -> MemoryStore {
        MemoryStore::new(
            NonZeroUsize::new(capacity).expect("non-zero"),
            Duration::from_secs(120),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn entry_is_readable_until_ttl_elapses() {
        let store = store(8);
        store.set("1.2.3.4", &sample("1.2.3.4")).await.expect("set");
        store
            .expire("1.2.3.4", Some(Duration::from_secs(120)))
            .await
            .expect("expire");

        tokio::time::advance(Duration::from_secs(119)).await;
        assert_eq!(
            store.get("1.2.3.4").await.expect("get"),
            Some(sample("1.2.3.4"))
        );

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(store.get("1.2.3.4").await.expect("get"), None);
        assert!(store.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn set_alone_applies_default_ttl() {
        let store = MemoryStore::new(
            NonZeroUsize::new(4).expect("non-zero"),
            Duration::from_secs(5),
        );
        store.set("k", &sample("k")).await.expect("set");

        tokio::time::advance(Duration::from_secs(6)).await;
        assert_eq!(store.get("k").await.expect("get"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn expire_resets_deadline() {
        let store = store(8);
        store.set("k", &sample("k")).await.expect("set");

        tokio::time::advance(Duration::from_secs(100)).await;
        store
            .expire("k", Some(Duration::from_secs(60)))
            .await
            .expect("expire");

        tokio::time::advance(Duration::from_secs(50)).await;
        assert!(store.get("k").await.expect("get").is_some());

        tokio::time::advance(Duration::from_secs(10)).await;
        assert!(store.get("k").await.expect("get").is_none());
    }

    #[tokio::test]
    async fn expire_on_missing_key_is_a_no_op() {
        let store = store(8);
        store.expire("absent", None).await.expect("expire");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn set_overwrites_previous_value() {
        let store = store(8);
        store.set("k", &sample("first")).await.expect("set");
        store.set("k", &sample("second")).await.expect("set");
        assert_eq!(store.get("k").await.expect("get"), Some(sample("second")));
    }

    #[tokio::test]
    async fn capacity_evicts_least_recently_used() {
        let store = store(1);
        store.set("a", &sample("a")).await.expect("set");
        store.set("b", &sample("b")).await.expect("set");

        assert_eq!(store.get("a").await.expect("get"), None);
        assert_eq!(store.get("b").await.expect("get"), Some(sample("b")));
    }
}
