//! UAV flight-suitability evaluation over forecast data
//!
//! Each forecast day is reduced to the metrics that matter for flight (max
//! wind, temperature extremes, max precipitation) and compared against a UAV
//! model's operating envelope. Evaluation is independent per (day, model)
//! pair; there is no cross-day smoothing.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{ForecastEntry, MeasurementKind, UavModel};

/// Fraction of an envelope limit treated as the marginal tolerance band.
///
/// A metric inside the band is past nominal but still within the hard limit.
pub const MARGIN_FRACTION: f64 = 0.1;

/// Flight-suitability classification for one (day, model) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Suitability {
    Suitable,
    Marginal,
    Unsuitable,
}

impl fmt::Display for Suitability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suitability::Suitable => write!(f, "SUITABLE"),
            Suitability::Marginal => write!(f, "MARGINAL"),
            Suitability::Unsuitable => write!(f, "UNSUITABLE"),
        }
    }
}

impl FromStr for Suitability {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SUITABLE" => Ok(Suitability::Suitable),
            "MARGINAL" => Ok(Suitability::Marginal),
            "UNSUITABLE" => Ok(Suitability::Unsuitable),
            other => Err(format!("unknown suitability status: {other}")),
        }
    }
}

/// Flight-relevant metrics of one forecast day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayConditions {
    pub date: NaiveDate,
    pub max_wind_speed_ms: f64,
    pub min_temperature_c: f64,
    pub max_temperature_c: f64,
    pub max_precipitation_mm: f64,
}

/// Derived flight forecast for one (point, model, day) triple; not persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightForecast {
    #[serde(rename = "uavmodel")]
    pub uav_model: String,
    pub date: NaiveDate,
    pub status: Suitability,
    pub conditions: DayConditions,
}

/// Reduce a forecast batch to per-day flight metrics, ordered by date.
#[must_use]
pub fn daily_conditions(entries: &[ForecastEntry]) -> Vec<DayConditions> {
    let mut days: BTreeMap<NaiveDate, Vec<&ForecastEntry>> = BTreeMap::new();
    for entry in entries {
        days.entry(entry.timestamp.date_naive()).or_default().push(entry);
    }

    days.into_iter()
        .map(|(date, day_entries)| {
            let fold = |kind: MeasurementKind, init: f64, pick: fn(f64, f64) -> f64| {
                day_entries
                    .iter()
                    .filter(|entry| entry.measurement == kind)
                    .map(|entry| entry.value)
                    .fold(init, pick)
            };

            DayConditions {
                date,
                max_wind_speed_ms: fold(MeasurementKind::WindSpeed, 0.0, f64::max),
                min_temperature_c: fold(MeasurementKind::Temperature, f64::INFINITY, f64::min),
                max_temperature_c: fold(MeasurementKind::Temperature, f64::NEG_INFINITY, f64::max),
                max_precipitation_mm: fold(MeasurementKind::Precipitation, 0.0, f64::max),
            }
        })
        .collect()
}

/// Classify one day against one model's envelope.
///
/// The overall status is the worst of the per-metric ratings.
#[must_use]
pub fn evaluate_day(model: &UavModel, day: &DayConditions) -> Suitability {
    let wind = rate_upper(day.max_wind_speed_ms, model.max_wind_speed_ms);
    let temperature = rate_range(
        day.min_temperature_c,
        day.max_temperature_c,
        model.min_temperature_c,
        model.max_temperature_c,
    );
    let precipitation = rate_upper(day.max_precipitation_mm, model.max_precipitation_mm);

    [wind, temperature, precipitation]
        .into_iter()
        .fold(Suitability::Suitable, Ord::max)
}

/// Evaluate every (day, model) pair, optionally keeping one status only.
#[must_use]
pub fn evaluate(
    models: &[UavModel],
    entries: &[ForecastEntry],
    status_filter: Option<Suitability>,
) -> Vec<FlightForecast> {
    let days = daily_conditions(entries);
    let mut forecasts = Vec::with_capacity(days.len() * models.len());

    for day in &days {
        for model in models {
            let status = evaluate_day(model, day);
            if status_filter.is_some_and(|wanted| wanted != status) {
                continue;
            }
            forecasts.push(FlightForecast {
                uav_model: model.name.clone(),
                date: day.date,
                status,
                conditions: day.clone(),
            });
        }
    }

    forecasts
}

/// Rate a value against an upper hard limit with the marginal band below it.
fn rate_upper(value: f64, limit: f64) -> Suitability {
    if value > limit {
        Suitability::Unsuitable
    } else if value > limit * (1.0 - MARGIN_FRACTION) {
        Suitability::Marginal
    } else {
        Suitability::Suitable
    }
}

/// Rate day temperature extremes against an operating range. The marginal
/// band is `MARGIN_FRACTION` of the range width inside each edge.
fn rate_range(day_min: f64, day_max: f64, lower: f64, upper: f64) -> Suitability {
    if day_min < lower || day_max > upper {
        return Suitability::Unsuitable;
    }
    let band = MARGIN_FRACTION * (upper - lower);
    if day_min < lower + band || day_max > upper - band {
        Suitability::Marginal
    } else {
        Suitability::Suitable
    }
}
