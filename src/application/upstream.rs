//! Resolver traits describing the third-party lookups the service composes.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::forecast::{CurrentWeather, GeoLocation};

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{service} unavailable: {message}")]
    Unavailable {
        service: &'static str,
        message: String,
    },
    #[error("{service} responded with status {status}")]
    Status { service: &'static str, status: u16 },
    #[error("{service} returned a malformed body: {message}")]
    Malformed {
        service: &'static str,
        message: String,
    },
}

impl UpstreamError {
    pub fn unavailable(service: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            service,
            message: err.to_string(),
        }
    }

    pub fn malformed(service: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Malformed {
            service,
            message: err.to_string(),
        }
    }

    pub fn service(&self) -> &'static str {
        match self {
            Self::Unavailable { service, .. }
            | Self::Status { service, .. }
            | Self::Malformed { service, .. } => service,
        }
    }
}

/// Resolves the city a client address belongs to.
#[async_trait]
pub trait GeoResolver: Send + Sync {
    /// `address` is already normalized; empty means "locate the caller".
    async fn resolve_city(&self, address: &str) -> Result<GeoLocation, UpstreamError>;
}

/// Resolves current conditions for a city.
#[async_trait]
pub trait WeatherResolver: Send + Sync {
    async fn resolve_forecast(
        &self,
        location: &GeoLocation,
    ) -> Result<CurrentWeather, UpstreamError>;
}
