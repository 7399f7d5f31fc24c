//! External weather source contract and raw payload shapes
//!
//! The adapter performs exactly one outbound request per call and never
//! retries; retry policy, if any, belongs to the caller.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::WeatherError;

pub mod openweathermap;

pub use openweathermap::OpenWeatherMap;

/// Abstraction over the upstream weather data provider
#[async_trait]
pub trait WeatherSource: Send + Sync {
    /// Fetch the raw current-weather payload for a coordinate pair.
    async fn fetch_current(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<CurrentPayload, WeatherError>;

    /// Fetch the raw 5-day forecast payload for a coordinate pair.
    async fn fetch_forecast5(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Forecast5Payload, WeatherError>;
}

/// Raw current-weather payload as returned by the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentPayload {
    /// Provider epoch timestamp of the observation
    pub dt: i64,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<Condition>,
    pub wind: Wind,
}

/// Raw 5-day / 3-hour forecast payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Forecast5Payload {
    pub list: Vec<ForecastSlot>,
}

/// One 3-hour forecast slot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastSlot {
    pub dt: i64,
    pub main: MainReadings,
    #[serde(default)]
    pub weather: Vec<Condition>,
    pub wind: Wind,
    #[serde(default)]
    pub rain: Option<Rain>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MainReadings {
    pub temp: f64,
    pub humidity: f64,
    pub pressure: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Condition {
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wind {
    pub speed: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rain {
    /// Rain volume for the last 3 hours, mm
    #[serde(rename = "3h", default)]
    pub three_hours: f64,
}

impl CurrentPayload {
    /// Condition description, falling back when the provider sends none
    #[must_use]
    pub fn description(&self) -> String {
        self.weather
            .first()
            .map(|condition| condition.description.clone())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

impl ForecastSlot {
    /// Rain volume for this slot, mm; absent means dry
    #[must_use]
    pub fn precipitation_mm(&self) -> f64 {
        self.rain.as_ref().map_or(0.0, |rain| rain.three_hours)
    }
}
