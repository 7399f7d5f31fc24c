//! OpenWeatherMap implementation of the weather source contract

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use super::{CurrentPayload, Forecast5Payload, WeatherSource};
use crate::error::WeatherError;

const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct OpenWeatherMap {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherMap {
    pub fn new(api_key: String) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build OpenWeatherMap HTTP client")?;

        Ok(Self {
            api_key,
            base_url,
            http,
        })
    }

    /// Issue a single GET against the provider. Transport failures and
    /// non-success statuses map to `SourceUnavailable`; an undecodable body
    /// maps to `MalformedResponse`. The API key travels as a query parameter
    /// and is left out of the URL reported in errors.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: String,
        latitude: f64,
        longitude: f64,
    ) -> Result<T, WeatherError> {
        let response = self
            .http
            .get(&url)
            .query(&[
                ("lat", latitude.to_string()),
                ("lon", longitude.to_string()),
                ("units", "metric".to_string()),
                ("appid", self.api_key.clone()),
            ])
            .send()
            .await
            .map_err(|_| WeatherError::source_unavailable(&url))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, %url, "provider answered with failure status");
            return Err(WeatherError::source_unavailable(&url));
        }

        response
            .json::<T>()
            .await
            .map_err(|error| WeatherError::malformed(error.to_string()))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherMap {
    async fn fetch_current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentPayload, WeatherError> {
        let url = format!("{}/weather", self.base_url);
        self.get_json(url, latitude, longitude).await
    }

    async fn fetch_forecast5(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Forecast5Payload, WeatherError> {
        let url = format!("{}/forecast", self.base_url);
        self.get_json(url, latitude, longitude).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_url_excludes_api_key() {
        let err = WeatherError::source_unavailable(format!("{DEFAULT_BASE_URL}/weather"));
        assert!(!err.to_string().contains("appid"));
        assert!(err.to_string().contains("/weather"));
    }

    #[test]
    fn test_payload_decoding() {
        let body = r#"{
            "dt": 1730201901,
            "main": {"temp": 42.0, "humidity": 24.42, "pressure": 1013.0},
            "weather": [{"description": "clear sky"}],
            "wind": {"speed": 3.2}
        }"#;
        let payload: CurrentPayload = serde_json::from_str(body).unwrap();
        assert_eq!(payload.main.temp, 42.0);
        assert_eq!(payload.description(), "clear sky");
    }

    #[test]
    fn test_forecast_slot_precipitation_defaults_to_dry() {
        let body = r#"{
            "dt": 1730201901,
            "main": {"temp": 18.0, "humidity": 60.0, "pressure": 1018.0},
            "weather": [],
            "wind": {"speed": 5.0}
        }"#;
        let slot: super::super::ForecastSlot = serde_json::from_str(body).unwrap();
        assert_eq!(slot.precipitation_mm(), 0.0);
    }
}
