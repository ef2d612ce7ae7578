use crate::{Config, CryptoQuote, FetchError, WeatherReading};
use async_trait::async_trait;
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;
use std::{fmt::Debug, sync::Arc};
use tracing::debug;

pub mod crypto;
pub mod openweather;

pub use crypto::HttpCryptoFeed;
pub use openweather::OpenWeatherFeed;

/// Read-only source of crypto quotes.
#[async_trait]
pub trait CryptoFeed: Send + Sync + Debug {
    async fn fetch_crypto_feed(&self) -> Result<Vec<CryptoQuote>, FetchError>;
}

/// Read-only source of current weather by city name.
#[async_trait]
pub trait WeatherFeed: Send + Sync + Debug {
    async fn fetch_weather(&self, city: &str) -> Result<WeatherReading, FetchError>;
}

pub fn crypto_feed_from_config(config: &Config) -> Arc<dyn CryptoFeed> {
    Arc::new(HttpCryptoFeed::new(config.crypto_feed_url()))
}

/// Fails when no API key has been configured yet.
pub fn weather_feed_from_config(config: &Config) -> anyhow::Result<Arc<dyn WeatherFeed>> {
    let api_key = config.weather_api_key()?;

    Ok(Arc::new(OpenWeatherFeed::new(
        config.weather_endpoint_url(),
        api_key.to_owned(),
        config.weather.units,
    )))
}

/// Sends `request` and decodes a 2xx JSON body into `T`.
pub(crate) async fn get_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, FetchError> {
    let res = request.send().await?;

    let status = res.status();
    if !status.is_success() {
        // The status decides the outcome; an unreadable error body must not mask it.
        let body = res.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), "feed returned non-success status");
        return Err(FetchError::status(status.as_u16(), &body));
    }

    let body = res.text().await?;

    serde_json::from_str(&body).map_err(FetchError::Decode)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weather_feed_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = weather_feed_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn weather_feed_from_config_works_when_key_set() {
        let mut cfg = Config::default();
        cfg.set_weather_api_key("KEY".to_string());

        assert!(weather_feed_from_config(&cfg).is_ok());
    }
}
