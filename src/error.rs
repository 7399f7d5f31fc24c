//! Error types for the weather service engine

use thiserror::Error;

/// Main error type for the weather service
#[derive(Error, Debug)]
pub enum WeatherError {
    /// Upstream provider could not be reached or answered with a failure status
    #[error("weather source unavailable: {url}")]
    SourceUnavailable { url: String },

    /// Upstream answered, but the payload shape was not what we expected
    #[error("malformed source response: {message}")]
    MalformedResponse { message: String },

    /// A referenced entity (UAV model, point) does not exist
    #[error("{what} not found")]
    NotFound { what: String },

    /// Document store failures
    #[error("storage error: {source}")]
    Store {
        #[from]
        source: anyhow::Error,
    },

    /// Configuration-related errors
    #[error("configuration error: {message}")]
    Config { message: String },
}

impl WeatherError {
    /// Create a new source-unavailable error carrying the target URL
    pub fn source_unavailable<S: Into<String>>(url: S) -> Self {
        Self::SourceUnavailable { url: url.into() }
    }

    /// Create a new malformed-response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a new not-found error
    pub fn not_found<S: Into<String>>(what: S) -> Self {
        Self::NotFound { what: what.into() }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let source_err = WeatherError::source_unavailable("http://test.url");
        assert!(matches!(source_err, WeatherError::SourceUnavailable { .. }));

        let parse_err = WeatherError::malformed("unexpected payload");
        assert!(matches!(parse_err, WeatherError::MalformedResponse { .. }));

        let missing_err = WeatherError::not_found("UAV model DJI");
        assert!(matches!(missing_err, WeatherError::NotFound { .. }));
    }

    #[test]
    fn test_store_error_conversion() {
        let inner = anyhow::anyhow!("keyspace unavailable");
        let err: WeatherError = inner.into();
        assert!(matches!(err, WeatherError::Store { .. }));
        assert!(err.to_string().contains("keyspace unavailable"));
    }

    #[test]
    fn test_source_unavailable_carries_url() {
        let err = WeatherError::source_unavailable("http://api.test/weather");
        assert!(err.to_string().contains("http://api.test/weather"));
    }
}
