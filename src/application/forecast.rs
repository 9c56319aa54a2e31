use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{
    application::upstream::{GeoResolver, UpstreamError, WeatherResolver},
    domain::{forecast::ForecastDocument, network::geolocation_address},
};

/// Composes a forecast document from the geolocation and weather lookups.
///
/// The weather lookup depends on the city, so the two calls always run in sequence.
pub struct ForecastService {
    geo: Arc<dyn GeoResolver>,
    weather: Arc<dyn WeatherResolver>,
}

impl ForecastService {
    pub fn new(geo: Arc<dyn GeoResolver>, weather: Arc<dyn WeatherResolver>) -> Self {
        Self { geo, weather }
    }

    #[instrument(skip(self))]
    pub async fn compose(&self, ip: &str) -> Result<ForecastDocument, UpstreamError> {
        let location = self.geo.resolve_city(geolocation_address(ip)).await?;
        debug!(city = %location.city, country = %location.country_code, "resolved city");

        let weather = self.weather.resolve_forecast(&location).await?;
        Ok(ForecastDocument::compose(ip, &location, weather))
    }
}
