//! UAV model reference data

use serde::{Deserialize, Serialize};

/// Operating envelope for one UAV model.
///
/// Externally managed reference data; the engine only reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UavModel {
    pub name: String,
    /// Maximum tolerated wind speed in m/s
    pub max_wind_speed_ms: f64,
    /// Lower bound of the operating temperature range in °C
    pub min_temperature_c: f64,
    /// Upper bound of the operating temperature range in °C
    pub max_temperature_c: f64,
    /// Maximum tolerated precipitation per 3-hour slot in mm
    pub max_precipitation_mm: f64,
}
