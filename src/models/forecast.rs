//! Forecast prediction records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::provider::Forecast5Payload;

/// Data kind stamped on every forecast record
pub const FORECAST_DATA_KIND: &str = "weather";
/// Source identifier stamped on every forecast record
pub const FORECAST_SOURCE: &str = "openweathermap";

/// Measurement a forecast value refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementKind {
    Temperature,
    Humidity,
    Pressure,
    WindSpeed,
    Precipitation,
}

impl MeasurementKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MeasurementKind::Temperature => "temperature",
            MeasurementKind::Humidity => "humidity",
            MeasurementKind::Pressure => "pressure",
            MeasurementKind::WindSpeed => "wind_speed",
            MeasurementKind::Precipitation => "precipitation",
        }
    }
}

/// One forecast value for one measurement at one future timestamp.
///
/// A 5-day fetch parses into a sequence of entries sharing one point and one
/// `created_at` batch time; staleness is evaluated on the batch, never
/// per-entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    pub value: f64,
    pub measurement: MeasurementKind,
    /// Forecast target time
    pub timestamp: DateTime<Utc>,
    pub data_kind: String,
    pub source: String,
    pub point_id: String,
    /// Batch capture time, shared by all entries of one fetch
    pub created_at: DateTime<Utc>,
}

impl ForecastEntry {
    /// Parse a raw 5-day payload into a batch of entries sharing `created_at`.
    ///
    /// Each 3-hour slot fans out into one entry per measurement kind. Slots
    /// with an unrepresentable timestamp are skipped.
    #[must_use]
    pub fn batch_from_payload(
        payload: &Forecast5Payload,
        point_id: &str,
        created_at: DateTime<Utc>,
    ) -> Vec<ForecastEntry> {
        let mut entries = Vec::with_capacity(payload.list.len() * 5);

        for slot in &payload.list {
            let Some(timestamp) = DateTime::from_timestamp(slot.dt, 0) else {
                continue;
            };

            let readings = [
                (MeasurementKind::Temperature, slot.main.temp),
                (MeasurementKind::Humidity, slot.main.humidity),
                (MeasurementKind::Pressure, slot.main.pressure),
                (MeasurementKind::WindSpeed, slot.wind.speed),
                (MeasurementKind::Precipitation, slot.precipitation_mm()),
            ];

            for (measurement, value) in readings {
                entries.push(ForecastEntry {
                    value,
                    measurement,
                    timestamp,
                    data_kind: FORECAST_DATA_KIND.to_string(),
                    source: FORECAST_SOURCE.to_string(),
                    point_id: point_id.to_string(),
                    created_at,
                });
            }
        }

        entries
    }

    /// Whether a batch with this capture time is still fresh.
    #[must_use]
    pub fn batch_is_fresh(
        entries: &[ForecastEntry],
        now: DateTime<Utc>,
        ttl: chrono::Duration,
    ) -> bool {
        entries
            .first()
            .is_some_and(|entry| now - entry.created_at <= ttl)
    }
}
