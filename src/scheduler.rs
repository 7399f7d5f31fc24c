//! Periodic dispatch scheduling
//!
//! A [`Scheduler`] keeps one recurring task per deterministic job key; adding
//! a key that already exists supersedes the previous task before the new one
//! is spawned, so the two can never fire concurrently. The [`Dispatcher`]
//! builds on it to keep the farm calendar updated: per tracked location one
//! THI push job and one flight-forecast push job, plus a daily refresh of the
//! tracked-location set.
//!
//! The scheduler is an explicit instance owned by the composition root and
//! passed by reference; job registration is a method call, not module state.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{Instant, interval_at};
use tracing::{debug, info, warn};

use crate::farmcalendar::FarmCalendar;
use crate::flight;
use crate::models::UavModel;
use crate::service::WeatherService;
use crate::store::WeatherStore;

/// Interval between flight-forecast pushes, matching the forecast horizon
const FLIGHT_PUSH_INTERVAL: Duration = Duration::from_secs(5 * 24 * 60 * 60);
/// Interval between refreshes of the tracked-location set
const LOCATION_REFRESH_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Registry of keyed recurring jobs
pub struct Scheduler {
    jobs: tokio::sync::Mutex<HashMap<String, JoinHandle<()>>>,
}

impl Scheduler {
    #[must_use]
    pub fn new() -> Self {
        Self {
            jobs: tokio::sync::Mutex::new(HashMap::new()),
        }
    }

    /// Register a recurring job under `key`, firing every `period` starting
    /// one period from now. An existing job under the same key is aborted
    /// before the replacement is spawned; the registry lock is held across
    /// both steps, so at most one job per key is ever live.
    ///
    /// A firing that fails is logged and does not deregister the job; the
    /// next interval proceeds independently.
    pub async fn add_job<F, Fut>(&self, key: &str, period: Duration, job: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let mut jobs = self.jobs.lock().await;

        if let Some(previous) = jobs.remove(key) {
            previous.abort();
            debug!(key, "superseded existing job");
        }

        let job_key = key.to_string();
        let handle = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            loop {
                ticker.tick().await;
                if let Err(error) = job().await {
                    warn!(key = %job_key, %error, "scheduled job firing failed");
                }
            }
        });

        jobs.insert(key.to_string(), handle);
    }

    /// Abort and deregister every job.
    pub async fn remove_all(&self) {
        let mut jobs = self.jobs.lock().await;
        for (_, handle) in jobs.drain() {
            handle.abort();
        }
    }

    pub async fn job_count(&self) -> usize {
        self.jobs.lock().await.len()
    }

    pub async fn has_job(&self, key: &str) -> bool {
        self.jobs.lock().await.contains_key(key)
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Keeps the farm calendar updated for a rolling set of tracked locations
pub struct Dispatcher {
    scheduler: Arc<Scheduler>,
    service: Arc<WeatherService>,
    store: Arc<dyn WeatherStore>,
    consumer: Arc<dyn FarmCalendar>,
    thi_interval: Duration,
}

impl Dispatcher {
    pub fn new(
        scheduler: Arc<Scheduler>,
        service: Arc<WeatherService>,
        store: Arc<dyn WeatherStore>,
        consumer: Arc<dyn FarmCalendar>,
        thi_interval_hours: u64,
    ) -> Self {
        Self {
            scheduler,
            service,
            store,
            consumer,
            thi_interval: Duration::from_secs(thi_interval_hours * 60 * 60),
        }
    }

    #[must_use]
    pub fn thi_job_key(latitude: f64, longitude: f64) -> String {
        format!("thi_task_{latitude}_{longitude}")
    }

    #[must_use]
    pub fn flight_job_key(latitude: f64, longitude: f64) -> String {
        format!("flight_forecast_task_{latitude}_{longitude}")
    }

    /// Clear every per-location job and register a fresh pair per tracked
    /// location. Deterministic keys make the operation idempotent: the same
    /// location set always ends with exactly one job per (task, location).
    /// An empty set leaves the registry empty, which is a valid state.
    pub async fn schedule_for(&self, locations: &[(f64, f64)], models: Vec<UavModel>) {
        self.scheduler.remove_all().await;

        if locations.is_empty() {
            debug!("no locations available for scheduling");
            return;
        }

        let model_names: Vec<String> = models.iter().map(|model| model.name.clone()).collect();

        for &(latitude, longitude) in locations {
            let service = self.service.clone();
            let consumer = self.consumer.clone();
            self.scheduler
                .add_job(
                    &Self::thi_job_key(latitude, longitude),
                    self.thi_interval,
                    move || {
                        let service = service.clone();
                        let consumer = consumer.clone();
                        async move {
                            debug!(latitude, longitude, "posting THI");
                            let reading = service.get_thi(latitude, longitude).await?;
                            consumer.send_thi(latitude, longitude, reading.thi).await?;
                            Ok(())
                        }
                    },
                )
                .await;

            let service = self.service.clone();
            let consumer = self.consumer.clone();
            let job_models = models.clone();
            let job_names = model_names.clone();
            self.scheduler
                .add_job(
                    &Self::flight_job_key(latitude, longitude),
                    FLIGHT_PUSH_INTERVAL,
                    move || {
                        let service = service.clone();
                        let consumer = consumer.clone();
                        let models = job_models.clone();
                        let names = job_names.clone();
                        async move {
                            debug!(latitude, longitude, models = names.len(), "posting flight forecast");
                            let entries = service.get_forecast5(latitude, longitude).await?;
                            let forecasts = flight::evaluate(&models, &entries, None);
                            consumer
                                .send_flight_forecast(latitude, longitude, &names, &forecasts)
                                .await?;
                            Ok(())
                        }
                    },
                )
                .await;
        }

        info!(locations = locations.len(), "scheduled per-location dispatch jobs");
    }

    /// Re-fetch the authoritative location set and re-derive the schedule.
    pub async fn refresh_and_reschedule(&self) -> anyhow::Result<()> {
        let locations = self.consumer.fetch_locations().await?;
        let models = self.store.list_uav_models().await?;
        self.schedule_for(&locations, models).await;
        Ok(())
    }

    /// Build the initial schedule and spawn the daily refresh cycle. The
    /// refresh task is held apart from the keyed registry, so
    /// clear-and-reschedule never cancels the refresh itself. A failed
    /// refresh keeps the previous schedule; the next day fires regardless.
    pub async fn start(self: &Arc<Self>) {
        if let Err(error) = self.refresh_and_reschedule().await {
            warn!(%error, "initial location refresh failed; starting with empty schedule");
        }

        let dispatcher = self.clone();
        tokio::spawn(async move {
            let mut ticker = interval_at(
                Instant::now() + LOCATION_REFRESH_INTERVAL,
                LOCATION_REFRESH_INTERVAL,
            );
            loop {
                ticker.tick().await;
                if let Err(error) = dispatcher.refresh_and_reschedule().await {
                    warn!(%error, "location refresh failed; keeping previous schedule");
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[tokio::test]
    async fn test_add_job_is_keyed_and_idempotent() {
        let scheduler = Scheduler::new();

        scheduler
            .add_job("thi_task_52_13", Duration::from_secs(3600), || async { Ok(()) })
            .await;
        scheduler
            .add_job("thi_task_52_13", Duration::from_secs(3600), || async { Ok(()) })
            .await;

        assert_eq!(scheduler.job_count().await, 1);
        assert!(scheduler.has_job("thi_task_52_13").await);
    }

    #[tokio::test]
    async fn test_add_job_supersedes_previous_task() {
        let scheduler = Scheduler::new();
        let first_firings = Arc::new(AtomicUsize::new(0));
        let second_firings = Arc::new(AtomicUsize::new(0));

        let counter = first_firings.clone();
        scheduler
            .add_job("job", Duration::from_millis(20), move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        let counter = second_firings.clone();
        scheduler
            .add_job("job", Duration::from_millis(20), move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                }
            })
            .await;

        tokio::time::sleep(Duration::from_millis(90)).await;

        assert_eq!(first_firings.load(Ordering::SeqCst), 0);
        assert!(second_firings.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_failed_firing_keeps_job_registered() {
        let scheduler = Scheduler::new();
        let firings = Arc::new(AtomicUsize::new(0));

        let counter = firings.clone();
        scheduler
            .add_job("flaky", Duration::from_millis(20), move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    anyhow::bail!("downstream push failed")
                }
            })
            .await;

        tokio::time::sleep(Duration::from_millis(90)).await;

        assert!(firings.load(Ordering::SeqCst) >= 2, "job should keep firing after failures");
        assert!(scheduler.has_job("flaky").await);
    }

    #[tokio::test]
    async fn test_remove_all_clears_registry() {
        let scheduler = Scheduler::new();
        scheduler
            .add_job("a", Duration::from_secs(3600), || async { Ok(()) })
            .await;
        scheduler
            .add_job("b", Duration::from_secs(3600), || async { Ok(()) })
            .await;

        scheduler.remove_all().await;
        assert_eq!(scheduler.job_count().await, 0);
    }

    #[test]
    fn test_job_keys_are_deterministic() {
        assert_eq!(Dispatcher::thi_job_key(52.0, 13.0), "thi_task_52_13");
        assert_eq!(
            Dispatcher::flight_job_key(42.424242, 24.242424),
            "flight_forecast_task_42.424242_24.242424"
        );
    }
}
