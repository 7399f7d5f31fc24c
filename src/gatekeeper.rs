//! Gatekeeper identity-service registration
//!
//! At startup the service logs in with its configured credentials and
//! announces every exposed endpoint in the gatekeeper's service directory.
//! Registration is best-effort: a failure is logged and the service keeps
//! running unregistered.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// One endpoint entry for the service directory
#[derive(Debug, Clone, Serialize)]
pub struct ServiceEndpoint {
    pub base_url: String,
    pub service_name: String,
    pub endpoint: String,
    pub methods: String,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    access: String,
}

pub struct GatekeeperClient {
    base_url: String,
    username: String,
    password: String,
    http: Client,
}

impl GatekeeperClient {
    pub fn new(base_url: String, username: String, password: String) -> Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build gatekeeper HTTP client")?;

        Ok(Self {
            base_url,
            username,
            password,
            http,
        })
    }

    /// Log in with the configured credentials and return the access token.
    pub async fn login(&self) -> Result<String> {
        let url = format!("{}/api/login/", self.base_url);
        let response: LoginResponse = self
            .http
            .post(&url)
            .form(&[("username", &self.username), ("password", &self.password)])
            .send()
            .await
            .with_context(|| format!("Failed to reach gatekeeper at {url}"))?
            .error_for_status()
            .context("Gatekeeper rejected the login")?
            .json()
            .await
            .context("Failed to parse gatekeeper login response")?;

        Ok(response.access)
    }

    /// Register one endpoint in the service directory.
    pub async fn register_service(&self, token: &str, service: &ServiceEndpoint) -> Result<()> {
        let url = format!("{}/api/service_directory", self.base_url);
        self.http
            .post(&url)
            .bearer_auth(token)
            .json(service)
            .send()
            .await
            .with_context(|| format!("Failed to reach gatekeeper at {url}"))?
            .error_for_status()
            .with_context(|| format!("Gatekeeper rejected registration of {}", service.endpoint))?;

        Ok(())
    }

    /// Log in once and register every endpoint, logging per-endpoint results.
    pub async fn register_all(&self, endpoints: &[ServiceEndpoint]) -> Result<()> {
        let token = self.login().await?;

        for endpoint in endpoints {
            self.register_service(&token, endpoint).await?;
            tracing::info!(endpoint = %endpoint.endpoint, "registered endpoint with gatekeeper");
        }
        Ok(())
    }
}

/// The endpoints this service announces.
#[must_use]
pub fn exposed_endpoints(own_base_url: &str) -> Vec<ServiceEndpoint> {
    [
        "/api/data/weather",
        "/api/data/forecast5",
        "/api/data/thi",
        "/api/data/flight_forecast5",
        "/api/linkeddata/forecast5",
        "/api/linkeddata/thi",
    ]
    .into_iter()
    .map(|endpoint| ServiceEndpoint {
        base_url: own_base_url.to_string(),
        service_name: "weathersrv".to_string(),
        endpoint: endpoint.to_string(),
        methods: "GET".to_string(),
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exposed_endpoints_cover_data_and_linkeddata() {
        let endpoints = exposed_endpoints("http://weathersrv:8000");
        assert_eq!(endpoints.len(), 6);
        assert!(endpoints.iter().all(|e| e.methods == "GET"));
        assert!(endpoints.iter().any(|e| e.endpoint == "/api/data/thi"));
        assert!(endpoints.iter().any(|e| e.endpoint == "/api/linkeddata/forecast5"));
    }
}
