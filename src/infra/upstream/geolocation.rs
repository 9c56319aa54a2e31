use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    application::upstream::{GeoResolver, UpstreamError},
    config::GeolocationSettings,
    domain::forecast::GeoLocation,
    infra::error::InfraError,
};

use super::{build_client, fetch_json};

const SERVICE: &str = "geolocation";

#[derive(Debug, Deserialize)]
struct LookupBody {
    status: Option<String>,
    message: Option<String>,
    city: Option<String>,
    #[serde(rename = "countryCode")]
    country_code: Option<String>,
}

/// Geolocation over `GET {base}/json/{address}`.
///
/// An empty address asks the service to locate the caller.
pub struct IpApiGeolocation {
    client: Client,
    base_url: Url,
}

impl IpApiGeolocation {
    pub fn new(settings: &GeolocationSettings) -> Result<Self, InfraError> {
        Ok(Self {
            client: build_client(settings.timeout)?,
            base_url: settings.base_url.clone(),
        })
    }

    fn lookup_url(&self, address: &str) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::unavailable(SERVICE, "base url cannot carry a path"))?
            .pop_if_empty()
            .push("json")
            .push(address);
        Ok(url)
    }
}

#[async_trait]
impl GeoResolver for IpApiGeolocation {
    async fn resolve_city(&self, address: &str) -> Result<GeoLocation, UpstreamError> {
        let body: LookupBody = fetch_json(&self.client, SERVICE, self.lookup_url(address)?).await?;

        if body.status.as_deref() == Some("fail") {
            return Err(UpstreamError::malformed(
                SERVICE,
                format!(
                    "lookup failed: {}",
                    body.message.as_deref().unwrap_or("no reason given")
                ),
            ));
        }

        match (body.city, body.country_code) {
            (Some(city), Some(country_code)) => Ok(GeoLocation { city, country_code }),
            _ => Err(UpstreamError::malformed(
                SERVICE,
                "response is missing `city` or `countryCode`",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn resolver(base: &str) -> IpApiGeolocation {
        IpApiGeolocation::new(&GeolocationSettings {
            base_url: Url::parse(base).expect("url"),
            timeout: Duration::from_secs(1),
        })
        .expect("resolver")
    }

    #[test]
    fn lookup_url_appends_address() {
        let url = resolver("http://ip-api.com").lookup_url("8.8.8.8").expect("url");
        assert_eq!(url.as_str(), "http://ip-api.com/json/8.8.8.8");
    }

    #[test]
    fn empty_address_keeps_trailing_slash() {
        let url = resolver("http://ip-api.com").lookup_url("").expect("url");
        assert_eq!(url.as_str(), "http://ip-api.com/json/");
    }

    #[test]
    fn base_path_is_preserved() {
        let url = resolver("http://proxy.internal/geo/")
            .lookup_url("2001:db8::1")
            .expect("url");
        assert_eq!(url.path(), "/geo/json/2001:db8::1");
    }
}
