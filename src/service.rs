//! Cache-or-fetch orchestration over the weather source and document store
//!
//! Both query paths follow the same policy: serve a stored record while it is
//! inside the TTL window, otherwise fetch, derive, and replace. The TTL is one
//! shared setting; it trades forecast accuracy for provider rate-limit and
//! latency protection and governs observations and forecast batches alike.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::WeatherError;
use crate::flight::{self, FlightForecast, Suitability};
use crate::models::{ForecastEntry, Point, PointKind, ThiReading, UavModel, WeatherObservation};
use crate::provider::WeatherSource;
use crate::resolver::PointResolver;
use crate::store::WeatherStore;
use crate::thi;

/// Default freshness window for cached observations and forecast batches
pub const DEFAULT_CACHE_TTL_HOURS: i64 = 3;

/// Cache decision for a stored record
enum Freshness<T> {
    Fresh(T),
    Stale,
}

pub struct WeatherService {
    store: Arc<dyn WeatherStore>,
    source: Arc<dyn WeatherSource>,
    resolver: PointResolver,
    ttl: Duration,
}

impl WeatherService {
    pub fn new(
        store: Arc<dyn WeatherStore>,
        source: Arc<dyn WeatherSource>,
        ttl_hours: i64,
    ) -> Self {
        Self {
            resolver: PointResolver::new(store.clone()),
            store,
            source,
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Resolve coordinates to their deduplicated point.
    pub async fn resolve(&self, latitude: f64, longitude: f64) -> Result<Point, WeatherError> {
        self.resolver.resolve(PointKind::Station, latitude, longitude).await
    }

    /// Current weather for a coordinate pair, served from the store while
    /// fresh; a stale or missing observation triggers exactly one upstream
    /// fetch whose result replaces the stored record.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_weather(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherObservation, WeatherError> {
        let point = self.resolve(latitude, longitude).await?;

        match self.cached_weather(&point, Utc::now()).await? {
            Freshness::Fresh(observation) => {
                debug!(point_id = %point.id, "serving cached observation");
                Ok(observation)
            }
            Freshness::Stale => self.refresh_weather(&point, latitude, longitude).await,
        }
    }

    /// 5-day forecast batch for a coordinate pair, with the same freshness
    /// policy as `get_weather`. Staleness is whole-batch.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn get_forecast5(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<ForecastEntry>, WeatherError> {
        let point = self.resolve(latitude, longitude).await?;

        match self.cached_forecast(&point, Utc::now()).await? {
            Freshness::Fresh(entries) => {
                debug!(point_id = %point.id, entries = entries.len(), "serving cached forecast batch");
                Ok(entries)
            }
            Freshness::Stale => self.refresh_forecast(&point, latitude, longitude).await,
        }
    }

    /// Current THI for a coordinate pair. The value was derived when the
    /// underlying observation was captured; it is never recomputed here.
    pub async fn get_thi(&self, latitude: f64, longitude: f64) -> Result<ThiReading, WeatherError> {
        let observation = self.get_weather(latitude, longitude).await?;
        Ok(ThiReading {
            point_id: observation.point_id,
            thi: observation.thi,
            dt: observation.dt,
        })
    }

    /// Flight-suitability forecast for one named UAV model or all known
    /// models, optionally filtered by resulting status.
    pub async fn get_flight_forecast(
        &self,
        latitude: f64,
        longitude: f64,
        model: Option<&str>,
        status_filter: Option<Suitability>,
    ) -> Result<Vec<FlightForecast>, WeatherError> {
        let entries = self.get_forecast5(latitude, longitude).await?;
        let models = self.requested_models(model).await?;
        Ok(flight::evaluate(&models, &entries, status_filter))
    }

    async fn requested_models(&self, model: Option<&str>) -> Result<Vec<UavModel>, WeatherError> {
        match model {
            Some(name) => {
                let model = self
                    .store
                    .find_uav_model(name)
                    .await?
                    .ok_or_else(|| WeatherError::not_found(format!("UAV model {name}")))?;
                Ok(vec![model])
            }
            None => Ok(self.store.list_uav_models().await?),
        }
    }

    async fn cached_weather(
        &self,
        point: &Point,
        now: DateTime<Utc>,
    ) -> Result<Freshness<WeatherObservation>, WeatherError> {
        match self.store.find_weather_for_point(&point.id).await? {
            Some(observation) if observation.is_fresh(now, self.ttl) => {
                Ok(Freshness::Fresh(observation))
            }
            _ => Ok(Freshness::Stale),
        }
    }

    async fn cached_forecast(
        &self,
        point: &Point,
        now: DateTime<Utc>,
    ) -> Result<Freshness<Vec<ForecastEntry>>, WeatherError> {
        let entries = self.store.find_predictions_for_point(&point.id).await?;
        if ForecastEntry::batch_is_fresh(&entries, now, self.ttl) {
            Ok(Freshness::Fresh(entries))
        } else {
            Ok(Freshness::Stale)
        }
    }

    async fn refresh_weather(
        &self,
        point: &Point,
        latitude: f64,
        longitude: f64,
    ) -> Result<WeatherObservation, WeatherError> {
        let payload = self.source.fetch_current(latitude, longitude).await?;
        let thi = thi::thi(payload.main.temp, payload.main.humidity);
        let observation =
            WeatherObservation::from_payload(point.id.clone(), &payload, thi, Utc::now());

        self.store.save_weather_for_point(&observation).await?;
        debug!(point_id = %point.id, "stored refreshed observation");
        Ok(observation)
    }

    async fn refresh_forecast(
        &self,
        point: &Point,
        latitude: f64,
        longitude: f64,
    ) -> Result<Vec<ForecastEntry>, WeatherError> {
        let payload = self.source.fetch_forecast5(latitude, longitude).await?;
        let entries = ForecastEntry::batch_from_payload(&payload, &point.id, Utc::now());

        self.store.save_predictions_for_point(&point.id, &entries).await?;
        debug!(point_id = %point.id, entries = entries.len(), "stored refreshed forecast batch");
        Ok(entries)
    }
}
