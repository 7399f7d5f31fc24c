//! Downstream farm-calendar consumer client
//!
//! Receives the periodic THI and flight-forecast pushes and serves as the
//! authoritative source of tracked locations. Pushes are fire-and-forget:
//! a failed delivery is logged by the dispatch job, never retried here.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::flight::FlightForecast;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Contract to the downstream consumer
#[async_trait]
pub trait FarmCalendar: Send + Sync {
    /// Current authoritative list of (lat, lon) pairs to track.
    async fn fetch_locations(&self) -> Result<Vec<(f64, f64)>>;

    /// Push one derived THI value for a location.
    async fn send_thi(&self, latitude: f64, longitude: f64, thi: f64) -> Result<()>;

    /// Push flight forecasts for a location and the given models.
    async fn send_flight_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        models: &[String],
        forecasts: &[FlightForecast],
    ) -> Result<()>;
}

pub struct FarmCalendarClient {
    base_url: String,
    http: Client,
}

#[derive(Debug, Deserialize)]
struct LocationEntry {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize)]
struct ThiPush {
    latitude: f64,
    longitude: f64,
    thi: f64,
}

#[derive(Debug, Serialize)]
struct FlightForecastPush<'a> {
    latitude: f64,
    longitude: f64,
    uavmodels: &'a [String],
    forecasts: &'a [FlightForecast],
}

impl FarmCalendarClient {
    pub fn new(base_url: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build farm-calendar HTTP client")?;

        Ok(Self { base_url, http })
    }
}

#[async_trait]
impl FarmCalendar for FarmCalendarClient {
    async fn fetch_locations(&self) -> Result<Vec<(f64, f64)>> {
        let url = format!("{}/api/v1/locations/", self.base_url);
        let entries: Vec<LocationEntry> = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("Failed to fetch tracked locations from {url}"))?
            .error_for_status()
            .context("Farm calendar rejected the location request")?
            .json()
            .await
            .context("Failed to parse tracked-location response")?;

        Ok(entries
            .into_iter()
            .map(|entry| (entry.latitude, entry.longitude))
            .collect())
    }

    async fn send_thi(&self, latitude: f64, longitude: f64, thi: f64) -> Result<()> {
        let url = format!("{}/api/v1/observations/thi/", self.base_url);
        self.http
            .post(&url)
            .json(&ThiPush {
                latitude,
                longitude,
                thi,
            })
            .send()
            .await
            .with_context(|| format!("Failed to push THI to {url}"))?
            .error_for_status()
            .context("Farm calendar rejected the THI push")?;

        tracing::debug!(latitude, longitude, thi, "pushed THI to farm calendar");
        Ok(())
    }

    async fn send_flight_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        models: &[String],
        forecasts: &[FlightForecast],
    ) -> Result<()> {
        let url = format!("{}/api/v1/observations/flight_forecast/", self.base_url);
        self.http
            .post(&url)
            .json(&FlightForecastPush {
                latitude,
                longitude,
                uavmodels: models,
                forecasts,
            })
            .send()
            .await
            .with_context(|| format!("Failed to push flight forecast to {url}"))?
            .error_for_status()
            .context("Farm calendar rejected the flight-forecast push")?;

        tracing::debug!(
            latitude,
            longitude,
            models = models.len(),
            forecasts = forecasts.len(),
            "pushed flight forecast to farm calendar"
        );
        Ok(())
    }
}
