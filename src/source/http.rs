//! HTTP client for the telemetry backend.
//!
//! Routes, relative to the configured base URL:
//!
//! | Method | Path                   | Body / response             |
//! |--------|------------------------|-----------------------------|
//! | GET    | `/leituras?limite=N`   | wrapped or bare reading list |
//! | GET    | `/thresholds`          | thresholds object           |
//! | PUT    | `/thresholds`          | thresholds object           |

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::{RawPayload, TelemetrySource};
use crate::data::Thresholds;
use crate::error::TelemetryError;
use crate::provider::ApiConfig;

/// Telemetry source backed by the REST API.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    config: ApiConfig,
    description: String,
}

impl HttpSource {
    /// Create a client for the given API location.
    pub fn new(config: ApiConfig) -> Self {
        Self::with_client(Client::new(), config)
    }

    /// Create a client reusing an existing `reqwest` client.
    pub fn with_client(client: Client, config: ApiConfig) -> Self {
        let description = format!("http: {}", config.base_url());
        Self {
            client,
            config,
            description,
        }
    }

    /// The API location this client talks to.
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
}

#[async_trait]
impl TelemetrySource for HttpSource {
    async fn fetch_latest_reading(&self, limit: u32) -> Result<RawPayload, TelemetryError> {
        let url = self.config.endpoint("leituras");
        debug!(%url, limit, "fetching readings");

        let response = self
            .client
            .get(&url)
            .query(&[("limite", limit)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TelemetryError::Http(format!(
                "API returned status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TelemetryError::Parse(e.to_string()))
    }

    async fn fetch_thresholds(&self) -> Result<Thresholds, TelemetryError> {
        let url = self.config.endpoint("thresholds");

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(TelemetryError::Http(format!(
                "API returned status {}",
                response.status()
            )));
        }

        response
            .json()
            .await
            .map_err(|e| TelemetryError::Parse(e.to_string()))
    }

    async fn write_thresholds(&self, thresholds: &Thresholds) -> Result<(), TelemetryError> {
        let url = self.config.endpoint("thresholds");

        let response = self.client.put(&url).json(thresholds).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TelemetryError::WriteRejected(status.as_u16()));
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}
