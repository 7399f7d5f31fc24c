//! Thin HTTP layer over the weather engine
//!
//! Handlers map queries onto engine calls and engine results onto explicit
//! per-endpoint view structs; no runtime field selection happens here.

use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WeatherError;
use crate::flight::{FlightForecast, Suitability};
use crate::jsonld;
use crate::models::{ForecastEntry, Point, ThiReading, WeatherObservation};
use crate::service::WeatherService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<WeatherService>,
}

#[derive(Debug, Deserialize)]
pub struct CoordsQuery {
    lat: f64,
    lon: f64,
}

#[derive(Debug, Deserialize)]
pub struct FlightQuery {
    lat: f64,
    lon: f64,
    status_filter: Option<String>,
}

/// Request-level failures, mapped onto status codes in one place
pub enum ApiError {
    BadRequest(String),
    Engine(WeatherError),
}

impl From<WeatherError> for ApiError {
    fn from(error: WeatherError) -> Self {
        ApiError::Engine(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            ApiError::Engine(error @ WeatherError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, error.to_string()).into_response()
            }
            ApiError::Engine(error) => {
                tracing::error!(%error, "request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PointView {
    pub id: String,
    /// GeoJSON coordinate order: [longitude, latitude]
    pub coordinates: [f64; 2],
}

impl From<&Point> for PointView {
    fn from(point: &Point) -> Self {
        Self {
            id: point.id.clone(),
            coordinates: [point.longitude, point.latitude],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WeatherView {
    pub id: String,
    pub spatial_entity: PointView,
    pub data: WeatherDataView,
}

#[derive(Debug, Serialize)]
pub struct WeatherDataView {
    pub weather: Vec<ConditionView>,
    pub main: MainView,
    pub wind: WindView,
    pub dt: i64,
}

#[derive(Debug, Serialize)]
pub struct ConditionView {
    pub description: String,
}

#[derive(Debug, Serialize)]
pub struct MainView {
    pub temp: f64,
    pub humidity: f64,
    pub pressure: f64,
}

#[derive(Debug, Serialize)]
pub struct WindView {
    pub speed: f64,
}

impl WeatherView {
    fn new(point: &Point, observation: &WeatherObservation) -> Self {
        Self {
            id: point.id.clone(),
            spatial_entity: PointView::from(point),
            data: WeatherDataView {
                weather: vec![ConditionView {
                    description: observation.description.clone(),
                }],
                main: MainView {
                    temp: observation.temperature_c,
                    humidity: observation.humidity_pct,
                    pressure: observation.pressure_hpa,
                },
                wind: WindView {
                    speed: observation.wind_speed_ms,
                },
                dt: observation.dt,
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PredictionView {
    pub value: f64,
    pub timestamp: DateTime<Utc>,
    pub measurement_type: &'static str,
    pub source: String,
    /// GeoJSON coordinate order: [longitude, latitude]
    pub coordinates: [f64; 2],
}

impl PredictionView {
    fn new(point: &Point, entry: &ForecastEntry) -> Self {
        Self {
            value: entry.value,
            timestamp: entry.timestamp,
            measurement_type: entry.measurement.as_str(),
            source: entry.source.clone(),
            coordinates: [point.longitude, point.latitude],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ThiView {
    pub point_id: String,
    pub thi: f64,
    pub dt: i64,
}

impl From<ThiReading> for ThiView {
    fn from(reading: ThiReading) -> Self {
        Self {
            point_id: reading.point_id,
            thi: reading.thi,
            dt: reading.dt,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FlightForecastsView {
    pub forecasts: Vec<FlightForecast>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/data/weather", get(get_weather))
        .route("/api/data/forecast5", get(get_forecast5))
        .route("/api/data/thi", get(get_thi))
        .route("/api/data/flight_forecast5", get(get_flight_forecast_all))
        .route("/api/data/flight_forecast5/{model}", get(get_flight_forecast_model))
        .route("/api/linkeddata/forecast5", get(get_forecast5_ld))
        .route("/api/linkeddata/thi", get(get_thi_ld))
        .with_state(state)
}

async fn get_weather(
    State(state): State<AppState>,
    Query(query): Query<CoordsQuery>,
) -> Result<Json<WeatherView>, ApiError> {
    let point = state.service.resolve(query.lat, query.lon).await?;
    let observation = state.service.get_weather(query.lat, query.lon).await?;
    Ok(Json(WeatherView::new(&point, &observation)))
}

async fn get_forecast5(
    State(state): State<AppState>,
    Query(query): Query<CoordsQuery>,
) -> Result<Json<Vec<PredictionView>>, ApiError> {
    let point = state.service.resolve(query.lat, query.lon).await?;
    let entries = state.service.get_forecast5(query.lat, query.lon).await?;
    let views = entries
        .iter()
        .map(|entry| PredictionView::new(&point, entry))
        .collect();
    Ok(Json(views))
}

async fn get_thi(
    State(state): State<AppState>,
    Query(query): Query<CoordsQuery>,
) -> Result<Json<ThiView>, ApiError> {
    let reading = state.service.get_thi(query.lat, query.lon).await?;
    Ok(Json(ThiView::from(reading)))
}

async fn get_flight_forecast_all(
    State(state): State<AppState>,
    Query(query): Query<FlightQuery>,
) -> Result<Json<FlightForecastsView>, ApiError> {
    flight_forecast(state, query, None).await
}

async fn get_flight_forecast_model(
    State(state): State<AppState>,
    Path(model): Path<String>,
    Query(query): Query<FlightQuery>,
) -> Result<Json<FlightForecastsView>, ApiError> {
    flight_forecast(state, query, Some(model)).await
}

async fn flight_forecast(
    state: AppState,
    query: FlightQuery,
    model: Option<String>,
) -> Result<Json<FlightForecastsView>, ApiError> {
    let status_filter = query
        .status_filter
        .as_deref()
        .map(parse_status_filter)
        .transpose()?;

    let forecasts = state
        .service
        .get_flight_forecast(query.lat, query.lon, model.as_deref(), status_filter)
        .await?;
    Ok(Json(FlightForecastsView { forecasts }))
}

fn parse_status_filter(raw: &str) -> Result<Suitability, ApiError> {
    raw.parse().map_err(ApiError::BadRequest)
}

async fn get_forecast5_ld(
    State(state): State<AppState>,
    Query(query): Query<CoordsQuery>,
) -> Result<Json<Value>, ApiError> {
    let point = state.service.resolve(query.lat, query.lon).await?;
    let entries = state.service.get_forecast5(query.lat, query.lon).await?;
    Ok(Json(jsonld::predictions_to_jsonld(&point, &entries)))
}

async fn get_thi_ld(
    State(state): State<AppState>,
    Query(query): Query<CoordsQuery>,
) -> Result<Json<Value>, ApiError> {
    let point = state.service.resolve(query.lat, query.lon).await?;
    let reading = state.service.get_thi(query.lat, query.lon).await?;
    Ok(Json(jsonld::thi_to_jsonld(&point, &reading)))
}
