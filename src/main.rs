use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use weathersrv::api::AppState;
use weathersrv::config::Config;
use weathersrv::farmcalendar::FarmCalendarClient;
use weathersrv::gatekeeper::{self, GatekeeperClient};
use weathersrv::provider::OpenWeatherMap;
use weathersrv::scheduler::{Dispatcher, Scheduler};
use weathersrv::service::WeatherService;
use weathersrv::store::{FjallStore, WeatherStore};
use weathersrv::web;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging_level.clone())),
        )
        .init();

    let store: Arc<dyn WeatherStore> = Arc::new(FjallStore::open(&config.database_path)?);
    let source = Arc::new(OpenWeatherMap::new(config.openweathermap_api_key.clone())?);
    let service = Arc::new(WeatherService::new(
        store.clone(),
        source,
        config.cache_ttl_hours,
    ));

    // The scheduler lives here, at the composition root, and is handed down
    // by reference; nothing registers jobs through hidden module state.
    let scheduler = Arc::new(Scheduler::new());

    match &config.farm_calendar_url {
        Some(url) => {
            let consumer = Arc::new(FarmCalendarClient::new(url.clone())?);
            let dispatcher = Arc::new(Dispatcher::new(
                scheduler.clone(),
                service.clone(),
                store.clone(),
                consumer,
                config.thi_interval_hours,
            ));
            dispatcher.start().await;
        }
        None => tracing::info!("FARM_CALENDAR_URL not set; periodic dispatch disabled"),
    }

    if let Some(url) = &config.gatekeeper_url {
        let client = GatekeeperClient::new(
            url.clone(),
            config.gatekeeper_username.clone(),
            config.gatekeeper_password.clone(),
        )?;
        let endpoints = gatekeeper::exposed_endpoints(&config.own_base_url());
        tokio::spawn(async move {
            if let Err(error) = client.register_all(&endpoints).await {
                tracing::warn!(%error, "gatekeeper registration failed; continuing unregistered");
            }
        });
    }

    web::run(config.port, AppState { service }).await
}
