//! HTTP adapters for the geolocation and weather resolver ports.

mod geolocation;
mod weather;

use std::time::{Duration, Instant};

use metrics::histogram;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::application::upstream::UpstreamError;

use super::error::InfraError;

pub use geolocation::IpApiGeolocation;
pub use weather::OpenWeatherMap;

const METRIC_UPSTREAM_REQUEST_MS: &str = "ipweather_upstream_request_ms";

fn user_agent() -> &'static str {
    concat!("ipweather/", env!("CARGO_PKG_VERSION"))
}

fn build_client(timeout: Duration) -> Result<Client, InfraError> {
    Client::builder()
        .user_agent(user_agent())
        .timeout(timeout)
        .build()
        .map_err(|err| InfraError::configuration(format!("failed to build http client: {err}")))
}

/// GET `url` once and decode the JSON body; no retries.
async fn fetch_json<T: DeserializeOwned>(
    client: &Client,
    service: &'static str,
    url: Url,
) -> Result<T, UpstreamError> {
    let started_at = Instant::now();
    let result = send(client, service, url).await;
    histogram!(METRIC_UPSTREAM_REQUEST_MS, "service" => service)
        .record(started_at.elapsed().as_secs_f64() * 1000.0);
    result
}

async fn send<T: DeserializeOwned>(
    client: &Client,
    service: &'static str,
    url: Url,
) -> Result<T, UpstreamError> {
    debug!(service, path = url.path(), "upstream request");

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|err| UpstreamError::unavailable(service, err))?;

    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|err| UpstreamError::unavailable(service, err))?;

    if !status.is_success() {
        return Err(UpstreamError::Status {
            service,
            status: status.as_u16(),
        });
    }

    serde_json::from_slice(&bytes).map_err(|err| UpstreamError::malformed(service, err))
}
