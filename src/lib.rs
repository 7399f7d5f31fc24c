//! Weather observations and derived agronomic/aviation metrics for
//! geographic points, backed by a freshness-bounded cache over an external
//! weather provider, with periodic derived-metric pushes to a farm-calendar
//! consumer.

pub mod api;
pub mod config;
pub mod error;
pub mod farmcalendar;
pub mod flight;
pub mod gatekeeper;
pub mod jsonld;
pub mod models;
pub mod provider;
pub mod resolver;
pub mod scheduler;
pub mod service;
pub mod store;
pub mod thi;
pub mod web;

// Re-export core types for public API
pub use config::Config;
pub use error::WeatherError;
pub use farmcalendar::{FarmCalendar, FarmCalendarClient};
pub use flight::{FlightForecast, Suitability};
pub use models::{ForecastEntry, Point, PointKind, ThiReading, UavModel, WeatherObservation};
pub use provider::{OpenWeatherMap, WeatherSource};
pub use resolver::{POINT_PROXIMITY_KM, PointResolver};
pub use scheduler::{Dispatcher, Scheduler};
pub use service::{DEFAULT_CACHE_TTL_HOURS, WeatherService};
pub use store::{FjallStore, WeatherStore};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, WeatherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
