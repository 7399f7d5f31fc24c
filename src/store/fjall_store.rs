//! Fjall-backed document store
//!
//! Documents are postcard-encoded; blocking keyspace calls run on the
//! blocking pool. Forecast batches are stored as one document per point so a
//! batch replacement is atomic to readers.

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use fjall::Keyspace;
use serde::{Serialize, de::DeserializeOwned};
use tokio::task;

use super::WeatherStore;
use crate::models::{ForecastEntry, Point, PointKind, UavModel, WeatherObservation};

pub struct FjallStore {
    points: Keyspace,
    weather: Keyspace,
    predictions: Keyspace,
    uavmodels: Keyspace,
    /// Serializes point creation; see `find_or_create_point`.
    point_create: tokio::sync::Mutex<()>,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    Ok(store.get(key)?.map(|value| value.to_vec()))
}

fn scan_store(store: Keyspace, prefix: Vec<u8>) -> Result<Vec<Vec<u8>>> {
    let mut values = Vec::new();
    for item in store.prefix(prefix) {
        let (_key, value) = item.into_inner()?;
        values.push(value.to_vec());
    }
    Ok(values)
}

impl FjallStore {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path)
            .open()
            .context("Failed to open document store database")?;

        Ok(Self {
            points: db.keyspace("points", fjall::KeyspaceCreateOptions::default)?,
            weather: db.keyspace("weather", fjall::KeyspaceCreateOptions::default)?,
            predictions: db.keyspace("predictions", fjall::KeyspaceCreateOptions::default)?,
            uavmodels: db.keyspace("uavmodels", fjall::KeyspaceCreateOptions::default)?,
            point_create: tokio::sync::Mutex::new(()),
        })
    }

    /// Insert or replace UAV reference data. The engine itself only reads
    /// models; this is the write side used by operators and tests.
    pub async fn insert_uav_model(&self, model: &UavModel) -> Result<()> {
        self.put_doc(&self.uavmodels, model.name.clone(), model).await
    }

    async fn get_doc<T: DeserializeOwned>(&self, store: &Keyspace, key: String) -> Result<Option<T>> {
        let store = store.clone();
        let maybe_bytes = task::spawn_blocking(move || get_from_store(store, key.into_bytes())).await??;

        match maybe_bytes {
            Some(bytes) => Ok(Some(postcard::from_bytes(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn put_doc<T: Serialize>(&self, store: &Keyspace, key: String, value: &T) -> Result<()> {
        let store = store.clone();
        let bytes = postcard::to_stdvec(value)?;
        task::spawn_blocking(move || -> Result<()> {
            store.insert(key.into_bytes(), bytes)?;
            Ok(())
        })
        .await??;
        Ok(())
    }

    async fn scan_docs<T: DeserializeOwned>(&self, store: &Keyspace, prefix: String) -> Result<Vec<T>> {
        let store = store.clone();
        let raw = task::spawn_blocking(move || scan_store(store, prefix.into_bytes())).await??;

        let mut docs = Vec::with_capacity(raw.len());
        for bytes in raw {
            docs.push(postcard::from_bytes(&bytes)?);
        }
        Ok(docs)
    }
}

#[async_trait]
impl WeatherStore for FjallStore {
    #[tracing::instrument(level = "debug", skip(self))]
    async fn find_point(
        &self,
        kind: PointKind,
        latitude: f64,
        longitude: f64,
        tolerance_km: f64,
    ) -> Result<Option<Point>> {
        let candidates: Vec<Point> = self
            .scan_docs(&self.points, format!("{}:", kind.as_str()))
            .await?;

        let nearest = candidates
            .into_iter()
            .map(|point| (point.distance_km(latitude, longitude), point))
            .filter(|(distance, _)| *distance <= tolerance_km)
            .min_by(|(a, _), (b, _)| a.total_cmp(b));

        Ok(nearest.map(|(_, point)| point))
    }

    async fn find_or_create_point(
        &self,
        kind: PointKind,
        latitude: f64,
        longitude: f64,
        tolerance_km: f64,
    ) -> Result<Point> {
        // Creation is serialized behind this lock: two near-simultaneous
        // resolutions of the same place both pass the lookup-miss branch
        // otherwise and would mint duplicate points.
        let _guard = self.point_create.lock().await;

        if let Some(existing) = self.find_point(kind, latitude, longitude, tolerance_km).await? {
            return Ok(existing);
        }

        let point = Point::new(kind, latitude, longitude);
        self.put_doc(&self.points, point.id.clone(), &point).await?;
        tracing::debug!(point_id = %point.id, "created new point");
        Ok(point)
    }

    async fn find_weather_for_point(
        &self,
        point_id: &str,
    ) -> Result<Option<WeatherObservation>> {
        self.get_doc(&self.weather, point_id.to_string()).await
    }

    async fn save_weather_for_point(&self, observation: &WeatherObservation) -> Result<()> {
        self.put_doc(&self.weather, observation.point_id.clone(), observation)
            .await
    }

    async fn find_predictions_for_point(&self, point_id: &str) -> Result<Vec<ForecastEntry>> {
        let batch: Option<Vec<ForecastEntry>> =
            self.get_doc(&self.predictions, point_id.to_string()).await?;
        Ok(batch.unwrap_or_default())
    }

    async fn save_predictions_for_point(
        &self,
        point_id: &str,
        entries: &[ForecastEntry],
    ) -> Result<()> {
        self.put_doc(&self.predictions, point_id.to_string(), &entries.to_vec())
            .await
    }

    async fn find_uav_model(&self, name: &str) -> Result<Option<UavModel>> {
        self.get_doc(&self.uavmodels, name.to_string()).await
    }

    async fn list_uav_models(&self) -> Result<Vec<UavModel>> {
        self.scan_docs(&self.uavmodels, String::new()).await
    }
}
