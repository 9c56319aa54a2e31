//! Redis-backed forecast store.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::{ConnectionLike, ConnectionManager};
use redis::{AsyncCommands, Client};
use tracing::info;

use crate::domain::forecast::ForecastDocument;

use super::store::{CacheError, CacheStore, decode, encode, ttl_seconds};

/// Forecast store on a Redis-compatible server.
///
/// `set` writes with `SETEX` using the default TTL, so a key never exists
/// without an expiry even before the explicit `expire` call lands.
#[derive(Clone)]
pub struct RedisStore<C = ConnectionManager> {
    connection: C,
    default_ttl: Duration,
}

impl RedisStore<ConnectionManager> {
    /// Connect to `url` (`redis://[:password@]host:port/[db]`).
    ///
    /// `ConnectionManager` reconnects on its own and multiplexes one socket
    /// across all in-flight requests.
    pub async fn connect(url: &str, default_ttl: Duration) -> Result<Self, CacheError> {
        let client = Client::open(url).map_err(|err| {
            CacheError::unavailable(format!("failed to create redis client: {err}"))
        })?;
        let connection = ConnectionManager::new(client).await.map_err(|err| {
            CacheError::unavailable(format!("failed to connect to redis: {err}"))
        })?;

        info!(
            target = "ipweather::cache",
            ttl_seconds = default_ttl.as_secs(),
            "connected to redis"
        );
        Ok(Self::new(connection, default_ttl))
    }
}

impl<C> RedisStore<C> {
    pub fn new(connection: C, default_ttl: Duration) -> Self {
        Self {
            connection,
            default_ttl,
        }
    }
}

#[async_trait]
impl<C> CacheStore for RedisStore<C>
where
    C: ConnectionLike + Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Result<Option<ForecastDocument>, CacheError> {
        let mut conn = self.connection.clone();
        let raw: Option<Vec<u8>> = conn.get(key).await.map_err(CacheError::unavailable)?;
        let Some(raw) = raw else {
            return Ok(None);
        };
        let text = String::from_utf8(raw).map_err(|err| CacheError::Corrupt {
            key: key.to_string(),
            message: err.to_string(),
        })?;
        decode(key, &text).map(Some)
    }

    async fn set(&self, key: &str, document: &ForecastDocument) -> Result<(), CacheError> {
        let raw = encode(key, document)?;
        let mut conn = self.connection.clone();
        let _: () = conn
            .set_ex(key, raw, ttl_seconds(self.default_ttl))
            .await
            .map_err(CacheError::unavailable)?;
        Ok(())
    }

    async fn expire(&self, key: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let seconds = ttl_seconds(ttl.unwrap_or(self.default_ttl));
        let seconds = i64::try_from(seconds).unwrap_or(i64::MAX);
        let mut conn = self.connection.clone();
        let _: () = conn
            .expire(key, seconds)
            .await
            .map_err(CacheError::unavailable)?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.connection.clone();
        let _: String = conn.ping().await.map_err(CacheError::unavailable)?;
        Ok(())
    }
}
