use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;

use crate::{
    application::upstream::{UpstreamError, WeatherResolver},
    config::WeatherSettings,
    domain::forecast::{CurrentWeather, GeoLocation},
    infra::error::InfraError,
};

use super::{build_client, fetch_json};

const SERVICE: &str = "weather";

#[derive(Debug, Deserialize)]
struct CurrentBody {
    main: MainBody,
}

#[derive(Debug, Deserialize)]
struct MainBody {
    temp: f64,
}

/// Current conditions over `GET {base}/data/2.5/weather?units=metric&q=city,cc`.
pub struct OpenWeatherMap {
    client: Client,
    base_url: Url,
    api_key: Option<String>,
}

impl OpenWeatherMap {
    pub fn new(settings: &WeatherSettings) -> Result<Self, InfraError> {
        Ok(Self {
            client: build_client(settings.timeout)?,
            base_url: settings.base_url.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    fn current_url(&self, location: &GeoLocation) -> Result<Url, UpstreamError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| UpstreamError::unavailable(SERVICE, "base url cannot carry a path"))?
            .pop_if_empty()
            .extend(["data", "2.5", "weather"]);
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("units", "metric");
            query.append_pair("q", &location.weather_query());
            if let Some(key) = self.api_key.as_deref() {
                query.append_pair("appid", key);
            }
        }
        Ok(url)
    }
}

#[async_trait]
impl WeatherResolver for OpenWeatherMap {
    async fn resolve_forecast(
        &self,
        location: &GeoLocation,
    ) -> Result<CurrentWeather, UpstreamError> {
        let body: CurrentBody = fetch_json(&self.client, SERVICE, self.current_url(location)?).await?;
        Ok(CurrentWeather {
            temperature_celsius: body.main.temp,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    fn location() -> GeoLocation {
        GeoLocation {
            city: "Mountain View".to_string(),
            country_code: "US".to_string(),
        }
    }

    fn resolver(api_key: Option<&str>) -> OpenWeatherMap {
        OpenWeatherMap::new(&WeatherSettings {
            base_url: Url::parse("http://api.openweathermap.org").expect("url"),
            api_key: api_key.map(str::to_string),
            timeout: Duration::from_secs(1),
        })
        .expect("resolver")
    }

    #[test]
    fn current_url_carries_metric_units_and_query() {
        let url = resolver(None).current_url(&location()).expect("url");
        assert_eq!(url.path(), "/data/2.5/weather");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                ("units".to_string(), "metric".to_string()),
                ("q".to_string(), "Mountain View,US".to_string()),
            ]
        );
    }

    #[test]
    fn api_key_is_sent_as_appid() {
        let url = resolver(Some("k123")).current_url(&location()).expect("url");
        assert!(
            url.query_pairs()
                .any(|(name, value)| name == "appid" && value == "k123")
        );
    }
}
