//! Forecast document and the pure composition rules that produce it.

use serde::{Deserialize, Serialize};

/// City resolved for a client address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoLocation {
    pub city: String,
    pub country_code: String,
}

impl GeoLocation {
    /// Weather lookup query in `city,countryCode` form.
    pub fn weather_query(&self) -> String {
        format!("{},{}", self.city, self.country_code)
    }
}

/// Current conditions for a city, metric units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CurrentWeather {
    pub temperature_celsius: f64,
}

/// Response document returned to clients and stored in the cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastDocument {
    pub ip: String,
    pub city: String,
    pub temperature: i64,
    pub message: String,
}

impl ForecastDocument {
    /// Build the document for `ip` from the resolved location and weather.
    pub fn compose(ip: impl Into<String>, location: &GeoLocation, weather: CurrentWeather) -> Self {
        let temperature = round_temperature(weather.temperature_celsius);
        Self {
            ip: ip.into(),
            city: location.city.clone(),
            temperature,
            message: forecast_message(&location.city, temperature),
        }
    }
}

/// Human-readable sentence for a city and a rounded temperature.
pub fn forecast_message(city: &str, temperature: i64) -> String {
    format!("Today, {city} will be {temperature} degrees.")
}

/// Round half up, so `-2.5` becomes `-2` and `21.5` becomes `22`.
pub fn round_temperature(celsius: f64) -> i64 {
    // `round` breaks ties away from zero; negative ties move back up.
    let rounded = celsius.round();
    if celsius - rounded == 0.5 {
        (rounded + 1.0) as i64
    } else {
        rounded as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mountain_view() -> GeoLocation {
        GeoLocation {
            city: "Mountain View".to_string(),
            country_code: "US".to_string(),
        }
    }

    #[test]
    fn compose_builds_expected_document() {
        let doc = ForecastDocument::compose(
            "8.8.8.8",
            &mountain_view(),
            CurrentWeather {
                temperature_celsius: 21.4,
            },
        );

        assert_eq!(
            doc,
            ForecastDocument {
                ip: "8.8.8.8".to_string(),
                city: "Mountain View".to_string(),
                temperature: 21,
                message: "Today, Mountain View will be 21 degrees.".to_string(),
            }
        );
    }

    #[test]
    fn message_is_stable_for_same_inputs() {
        let weather = CurrentWeather {
            temperature_celsius: 18.9,
        };
        let first = ForecastDocument::compose("1.1.1.1", &mountain_view(), weather);
        let second = ForecastDocument::compose("1.1.1.1", &mountain_view(), weather);
        assert_eq!(first.message.as_bytes(), second.message.as_bytes());
    }

    #[test]
    fn rounding_goes_half_up() {
        assert_eq!(round_temperature(21.4), 21);
        assert_eq!(round_temperature(21.5), 22);
        assert_eq!(round_temperature(-0.4), 0);
        assert_eq!(round_temperature(-2.5), -2);
        assert_eq!(round_temperature(-2.6), -3);
    }

    #[test]
    fn rounding_is_exact_near_ties() {
        assert_eq!(round_temperature(0.49999999999999994), 0);
        assert_eq!(round_temperature(-0.49999999999999994), 0);
        assert_eq!(round_temperature(-0.5), 0);
        assert_eq!(round_temperature(0.5), 1);
        assert_eq!(round_temperature(4503599627370495.5), 4503599627370496);
    }

    #[test]
    fn weather_query_joins_city_and_country() {
        assert_eq!(mountain_view().weather_query(), "Mountain View,US");
    }

    #[test]
    fn document_serializes_with_expected_fields() {
        let doc = ForecastDocument::compose(
            "8.8.8.8",
            &mountain_view(),
            CurrentWeather {
                temperature_celsius: 21.4,
            },
        );
        let value = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({
                "ip": "8.8.8.8",
                "city": "Mountain View",
                "temperature": 21,
                "message": "Today, Mountain View will be 21 degrees.",
            })
        );
    }
}
