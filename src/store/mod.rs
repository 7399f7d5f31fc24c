//! Data-access contract for the persisted point/observation/forecast store
//!
//! The engine consumes persistence exclusively through this trait; the
//! concrete document technology stays behind it.

use anyhow::Result;
use async_trait::async_trait;

use crate::models::{ForecastEntry, Point, PointKind, UavModel, WeatherObservation};

pub mod fjall_store;

pub use fjall_store::FjallStore;

#[async_trait]
pub trait WeatherStore: Send + Sync {
    /// Find an existing point of `kind` within `tolerance_km` of the
    /// coordinates, closest first.
    async fn find_point(
        &self,
        kind: PointKind,
        latitude: f64,
        longitude: f64,
        tolerance_km: f64,
    ) -> Result<Option<Point>>;

    /// Find a point as [`find_point`](WeatherStore::find_point) does, or
    /// create one at exactly (latitude, longitude). Creation must be
    /// serialized so concurrent resolution of one place yields one point.
    async fn find_or_create_point(
        &self,
        kind: PointKind,
        latitude: f64,
        longitude: f64,
        tolerance_km: f64,
    ) -> Result<Point>;

    /// Load the single live observation for a point, if any.
    async fn find_weather_for_point(&self, point_id: &str)
    -> Result<Option<WeatherObservation>>;

    /// Persist an observation, replacing any prior one for its point.
    async fn save_weather_for_point(&self, observation: &WeatherObservation) -> Result<()>;

    /// Load the stored forecast batch for a point; empty when none exists.
    async fn find_predictions_for_point(&self, point_id: &str) -> Result<Vec<ForecastEntry>>;

    /// Replace the stored forecast batch for a point in one write, so readers
    /// never observe a partial batch.
    async fn save_predictions_for_point(
        &self,
        point_id: &str,
        entries: &[ForecastEntry],
    ) -> Result<()>;

    /// Look up one UAV model by name.
    async fn find_uav_model(&self, name: &str) -> Result<Option<UavModel>>;

    /// List all known UAV models.
    async fn list_uav_models(&self) -> Result<Vec<UavModel>>;
}
