//! Deduplicated spatial identities for geographic coordinates

use haversine::{Location as HaversineLocation, Units, distance};
use serde::{Deserialize, Serialize};

/// Kind of spatial entity a point represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointKind {
    Station,
}

impl PointKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            PointKind::Station => "station",
        }
    }
}

/// A deduplicated spatial entity. Created lazily on first reference to a
/// coordinate pair, never mutated, never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub id: String,
    pub kind: PointKind,
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Point {
    #[must_use]
    pub fn new(kind: PointKind, latitude: f64, longitude: f64) -> Self {
        Self {
            id: Self::key(kind, latitude, longitude),
            kind,
            latitude,
            longitude,
        }
    }

    /// Deterministic identity derived from kind and micro-degree coordinates.
    #[must_use]
    pub fn key(kind: PointKind, latitude: f64, longitude: f64) -> String {
        let lat_micro = (latitude * 1_000_000.0).round() as i64;
        let lon_micro = (longitude * 1_000_000.0).round() as i64;
        format!("{}:{}:{}", kind.as_str(), lat_micro, lon_micro)
    }

    /// Great-circle distance from this point to (latitude, longitude) in km.
    #[must_use]
    pub fn distance_km(&self, latitude: f64, longitude: f64) -> f64 {
        let from = HaversineLocation {
            latitude: self.latitude,
            longitude: self.longitude,
        };
        let to = HaversineLocation {
            latitude,
            longitude,
        };
        distance(from, to, Units::Kilometers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_key_is_deterministic() {
        let a = Point::key(PointKind::Station, 42.424242, 24.242424);
        let b = Point::key(PointKind::Station, 42.424242, 24.242424);
        assert_eq!(a, b);
        assert_eq!(a, "station:42424242:24242424");
    }

    #[test]
    fn test_point_distance_zero_for_same_coordinates() {
        let point = Point::new(PointKind::Station, 42.424242, 24.242424);
        assert!(point.distance_km(42.424242, 24.242424) < 1e-9);
    }

    #[test]
    fn test_point_distance_increases_with_separation() {
        let point = Point::new(PointKind::Station, 52.0, 13.0);
        // ~0.0005 degrees of latitude is roughly 55 m
        let near = point.distance_km(52.0005, 13.0);
        let far = point.distance_km(52.01, 13.0);
        assert!(near < 0.1, "expected < 100 m, got {near} km");
        assert!(far > 0.1, "expected > 100 m, got {far} km");
    }
}
