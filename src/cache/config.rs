//! Runtime cache policy derived from `[cache]` settings.

use std::time::Duration;

const DEFAULT_TTL_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Lifetime applied to every stored forecast.
    pub ttl: Duration,
    /// Prepended to the subject IP to form the store key.
    pub key_prefix: String,
    /// Bypass the store instead of failing requests when it is unreachable.
    pub fail_open: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECS),
            key_prefix: String::new(),
            fail_open: false,
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            ttl: settings.ttl,
            key_prefix: settings.key_prefix.clone(),
            fail_open: settings.fail_open,
        }
    }
}

impl CacheConfig {
    /// Store key for a subject IP.
    pub fn key_for(&self, subject_ip: &str) -> String {
        format!("{}{subject_ip}", self.key_prefix)
    }
}
