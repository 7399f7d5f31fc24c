//! Point Resolution Module
//!
//! Resolves raw coordinate pairs into deduplicated [`Point`] identities. Two
//! requests whose coordinates fall within the proximity tolerance resolve to
//! the same point; everything farther apart gets its own.

use std::sync::Arc;

use tracing::debug;

use crate::error::WeatherError;
use crate::models::{Point, PointKind};
use crate::store::WeatherStore;

/// Proximity tolerance for point deduplication: coordinates within 100 m of
/// an existing point of the same kind reuse its identity.
pub const POINT_PROXIMITY_KM: f64 = 0.1;

/// Service for resolving coordinates into stable point identities
pub struct PointResolver {
    store: Arc<dyn WeatherStore>,
}

impl PointResolver {
    pub fn new(store: Arc<dyn WeatherStore>) -> Self {
        Self { store }
    }

    /// Resolve (kind, lat, lon) to its point, creating one lazily on first
    /// reference. The store serializes creation, so concurrent resolution of
    /// the same place cannot accumulate duplicate points.
    pub async fn resolve(
        &self,
        kind: PointKind,
        latitude: f64,
        longitude: f64,
    ) -> Result<Point, WeatherError> {
        let point = self
            .store
            .find_or_create_point(kind, latitude, longitude, POINT_PROXIMITY_KM)
            .await?;

        debug!(
            point_id = %point.id,
            "resolved ({latitude}, {longitude}) to point"
        );
        Ok(point)
    }
}
