//! JSON-LD projections of derived results
//!
//! Shapes observations and forecast batches as OCSM-style observation
//! collections for linked-data consumers.

use serde_json::{Value, json};

use crate::models::{ForecastEntry, Point, ThiReading};

const CONTEXT: &str = "https://w3id.org/ocsm/main-context.jsonld";

fn observation(property: &str, value: f64, result_time: Value, point: &Point) -> Value {
    json!({
        "@type": "Observation",
        "observedProperty": property,
        "hasResult": {
            "@type": "Result",
            "numericValue": value,
        },
        "resultTime": result_time,
        "hasFeatureOfInterest": {
            "@type": "Point",
            "lat": point.latitude,
            "long": point.longitude,
        },
    })
}

/// Project a THI reading as a one-member observation collection.
#[must_use]
pub fn thi_to_jsonld(point: &Point, reading: &ThiReading) -> Value {
    json!({
        "@context": [CONTEXT],
        "@graph": [{
            "@type": "ObservationCollection",
            "description": "Temperature-Humidity Index",
            "hasMember": [observation("THI", reading.thi, json!(reading.dt), point)],
        }],
    })
}

/// Project a forecast batch as an observation collection, one member per
/// forecast entry.
#[must_use]
pub fn predictions_to_jsonld(point: &Point, entries: &[ForecastEntry]) -> Value {
    let members: Vec<Value> = entries
        .iter()
        .map(|entry| {
            observation(
                entry.measurement.as_str(),
                entry.value,
                json!(entry.timestamp.to_rfc3339()),
                point,
            )
        })
        .collect();

    json!({
        "@context": [CONTEXT],
        "@graph": [{
            "@type": "ObservationCollection",
            "description": "5-day weather forecast",
            "hasMember": members,
        }],
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::models::{FORECAST_DATA_KIND, FORECAST_SOURCE, MeasurementKind, PointKind};

    fn point() -> Point {
        Point::new(PointKind::Station, 42.424242, 24.242424)
    }

    #[test]
    fn test_thi_projection_shape() {
        let reading = ThiReading {
            point_id: point().id,
            thi: 86.74,
            dt: 1730201901,
        };
        let doc = thi_to_jsonld(&point(), &reading);

        assert!(doc.get("@context").is_some());
        assert_eq!(
            doc["@graph"][0]["hasMember"][0]["hasResult"]["numericValue"],
            json!(86.74)
        );
        assert_eq!(
            doc["@graph"][0]["hasMember"][0]["hasFeatureOfInterest"]["lat"],
            json!(42.424242)
        );
    }

    #[test]
    fn test_forecast_projection_has_one_member_per_entry() {
        let entries = vec![
            ForecastEntry {
                value: 18.0,
                measurement: MeasurementKind::Temperature,
                timestamp: Utc::now(),
                data_kind: FORECAST_DATA_KIND.to_string(),
                source: FORECAST_SOURCE.to_string(),
                point_id: point().id,
                created_at: Utc::now(),
            },
            ForecastEntry {
                value: 4.2,
                measurement: MeasurementKind::WindSpeed,
                timestamp: Utc::now(),
                data_kind: FORECAST_DATA_KIND.to_string(),
                source: FORECAST_SOURCE.to_string(),
                point_id: point().id,
                created_at: Utc::now(),
            },
        ];

        let doc = predictions_to_jsonld(&point(), &entries);
        let members = doc["@graph"][0]["hasMember"].as_array().unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[1]["observedProperty"], json!("wind_speed"));
    }
}
