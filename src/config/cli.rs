use std::path::PathBuf;

use clap::{Args, Parser, builder::BoolishValueParser};

/// Command-line arguments for the ipweather binary.
#[derive(Debug, Parser)]
#[command(
    name = "ipweather",
    version,
    about = "Weather-by-IP proxy with a per-IP response cache"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "IPWEATHER_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub overrides: ServeOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct ServeOverrides {
    /// Override the listener host.
    #[arg(long = "server-host", value_name = "HOST")]
    pub server_host: Option<String>,

    /// Override the listener port.
    #[arg(long = "server-port", env = "PORT", value_name = "PORT")]
    pub server_port: Option<u16>,

    /// Trust the first `X-Forwarded-For` entry as the client address.
    #[arg(
        long = "server-trust-proxy",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub server_trust_proxy: Option<bool>,

    /// Override the graceful shutdown timeout.
    #[arg(long = "server-graceful-shutdown-seconds", value_name = "SECONDS")]
    pub server_graceful_shutdown_seconds: Option<u64>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,

    /// Select the cache backend (redis|memory).
    #[arg(long = "cache-backend", value_name = "BACKEND")]
    pub cache_backend: Option<String>,

    /// Override the Redis connection URL.
    #[arg(long = "redis-url", env = "REDIS_URL", value_name = "URL")]
    pub redis_url: Option<String>,

    /// Override the forecast cache TTL.
    #[arg(long = "cache-ttl-seconds", value_name = "SECONDS")]
    pub cache_ttl_seconds: Option<u64>,

    /// Override the cache key prefix.
    #[arg(long = "cache-key-prefix", value_name = "PREFIX")]
    pub cache_key_prefix: Option<String>,

    /// Override the in-memory cache capacity.
    #[arg(long = "cache-memory-capacity", value_name = "COUNT")]
    pub cache_memory_capacity: Option<usize>,

    /// Serve uncached responses instead of failing when the cache is unreachable.
    #[arg(
        long = "cache-fail-open",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub cache_fail_open: Option<bool>,

    /// Override the geolocation service base URL.
    #[arg(long = "geolocation-base-url", value_name = "URL")]
    pub geolocation_base_url: Option<String>,

    /// Override the weather service base URL.
    #[arg(long = "weather-base-url", value_name = "URL")]
    pub weather_base_url: Option<String>,

    /// API key sent to the weather service.
    #[arg(long = "weather-api-key", env = "WEATHER_API_KEY", value_name = "KEY")]
    pub weather_api_key: Option<String>,
}
