//! Current-weather observation model

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::CurrentPayload;

/// Raw current-weather capture for one point, plus its derived THI.
///
/// One live observation is retained per point; a fresh fetch replaces the
/// prior one wholesale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub point_id: String,
    /// Temperature in °C
    pub temperature_c: f64,
    /// Relative humidity in %
    pub humidity_pct: f64,
    /// Atmospheric pressure in hPa
    pub pressure_hpa: f64,
    /// Wind speed in m/s
    pub wind_speed_ms: f64,
    /// Human-readable condition description
    pub description: String,
    /// Provider epoch timestamp of the observation
    pub dt: i64,
    /// Temperature-Humidity Index, computed once at capture time
    pub thi: f64,
    /// Capture time; governs cache freshness
    pub created_at: DateTime<Utc>,
}

impl WeatherObservation {
    /// Build an observation from a raw provider payload.
    ///
    /// THI is computed by the caller from the fresh payload and stored
    /// alongside; cached reads never recompute it.
    #[must_use]
    pub fn from_payload(
        point_id: String,
        payload: &CurrentPayload,
        thi: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            point_id,
            temperature_c: payload.main.temp,
            humidity_pct: payload.main.humidity,
            pressure_hpa: payload.main.pressure,
            wind_speed_ms: payload.wind.speed,
            description: payload.description(),
            dt: payload.dt,
            thi,
            created_at,
        }
    }

    /// Whether this observation is still within the freshness window.
    #[must_use]
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.created_at <= ttl
    }
}

/// Derived THI reading for one point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThiReading {
    pub point_id: String,
    pub thi: f64,
    /// Provider epoch timestamp of the underlying observation
    pub dt: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{Condition, MainReadings, Wind};

    fn payload() -> CurrentPayload {
        CurrentPayload {
            dt: 1730201901,
            main: MainReadings {
                temp: 42.0,
                humidity: 24.42,
                pressure: 1013.0,
            },
            weather: vec![Condition {
                description: "clear sky".to_string(),
            }],
            wind: Wind { speed: 3.2 },
        }
    }

    #[test]
    fn test_observation_from_payload() {
        let now = Utc::now();
        let obs = WeatherObservation::from_payload("station:1:2".to_string(), &payload(), 86.74, now);
        assert_eq!(obs.temperature_c, 42.0);
        assert_eq!(obs.humidity_pct, 24.42);
        assert_eq!(obs.description, "clear sky");
        assert_eq!(obs.thi, 86.74);
        assert_eq!(obs.created_at, now);
    }

    #[test]
    fn test_freshness_window() {
        let now = Utc::now();
        let mut obs =
            WeatherObservation::from_payload("station:1:2".to_string(), &payload(), 86.74, now);

        obs.created_at = now - Duration::hours(2) - Duration::minutes(30);
        assert!(obs.is_fresh(now, Duration::hours(3)));

        obs.created_at = now - Duration::hours(4);
        assert!(!obs.is_fresh(now, Duration::hours(3)));
    }
}
