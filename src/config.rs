//! Process configuration
//!
//! Everything comes from environment variables (with `.env` support) and
//! carries a default where the service can run without it.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::service::DEFAULT_CACHE_TTL_HOURS;

#[derive(Debug, Clone)]
pub struct Config {
    /// Hostname this service announces to the gatekeeper
    pub hostname: String,
    pub port: u16,
    /// Directory of the document store
    pub database_path: PathBuf,
    pub openweathermap_api_key: String,
    /// Freshness window shared by observation and forecast caching
    pub cache_ttl_hours: i64,
    /// Hours between THI pushes per tracked location
    pub thi_interval_hours: u64,
    pub logging_level: String,
    /// Gatekeeper registration is skipped when no URL is configured
    pub gatekeeper_url: Option<String>,
    pub gatekeeper_username: String,
    pub gatekeeper_password: String,
    /// Periodic dispatch is skipped when no consumer URL is configured
    pub farm_calendar_url: Option<String>,
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn var_opt(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let port: u16 = var_or("WEATHER_SRV_PORT", "8000")
            .parse()
            .context("WEATHER_SRV_PORT must be a port number")?;
        let cache_ttl_hours: i64 = var_or(
            "WEATHER_CACHE_TTL_HOURS",
            &DEFAULT_CACHE_TTL_HOURS.to_string(),
        )
        .parse()
        .context("WEATHER_CACHE_TTL_HOURS must be a number of hours")?;
        let thi_interval_hours: u64 = var_or("INTERVAL_THI_TO_FARMCALENDAR", "3")
            .parse()
            .context("INTERVAL_THI_TO_FARMCALENDAR must be a number of hours")?;

        Ok(Self {
            hostname: var_or("WEATHER_SRV_HOSTNAME", "weathersrv"),
            port,
            database_path: PathBuf::from(var_or("DATABASE_PATH", "data/weathersrv")),
            openweathermap_api_key: var_or("OPENWEATHERMAP_API_KEY", ""),
            cache_ttl_hours,
            thi_interval_hours,
            logging_level: var_or("LOGGING_LEVEL", "info"),
            gatekeeper_url: var_opt("GATEKEEPER_URL"),
            gatekeeper_username: var_or("GATEKEEPER_SUPERUSER_USERNAME", ""),
            gatekeeper_password: var_or("GATEKEEPER_SUPERUSER_PASSWORD", ""),
            farm_calendar_url: var_opt("FARM_CALENDAR_URL"),
        })
    }

    /// Base URL under which this service is reachable inside the deployment.
    #[must_use]
    pub fn own_base_url(&self) -> String {
        format!("http://{}:{}", self.hostname, self.port)
    }
}
