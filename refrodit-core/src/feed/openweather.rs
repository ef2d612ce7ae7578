use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    FetchError, Units, WeatherReading,
    model::MISSING_DESCRIPTION,
};

use super::{WeatherFeed, get_json};

/// OpenWeather "current weather" endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherFeed {
    endpoint: String,
    api_key: String,
    units: Units,
    http: Client,
}

impl OpenWeatherFeed {
    pub fn new(endpoint: String, api_key: String, units: Units) -> Self {
        Self { endpoint, api_key, units, http: Client::new() }
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: i32,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    name: String,
    main: OwMain,
    #[serde(default)]
    weather: Option<Vec<OwWeather>>,
}

impl From<OwCurrentResponse> for WeatherReading {
    fn from(parsed: OwCurrentResponse) -> Self {
        let description = parsed
            .weather
            .into_iter()
            .flatten()
            .next()
            .map(|w| w.description)
            .unwrap_or_else(|| MISSING_DESCRIPTION.to_string());

        WeatherReading {
            city_name: parsed.name,
            temperature: parsed.main.temp,
            humidity: parsed.main.humidity,
            description,
        }
    }
}

#[async_trait]
impl WeatherFeed for OpenWeatherFeed {
    async fn fetch_weather(&self, city: &str) -> Result<WeatherReading, FetchError> {
        debug!(city, units = %self.units, "fetching current weather");

        let request = self.http.get(&self.endpoint).query(&[
            ("q", city),
            ("appid", self.api_key.as_str()),
            ("units", self.units.as_str()),
        ]);

        let parsed: OwCurrentResponse = get_json(request).await?;
        Ok(parsed.into())
    }
}
