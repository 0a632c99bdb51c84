//! Layered configuration.
//!
//! Sources, lowest priority first:
//!
//! 1. built-in defaults
//! 2. an optional TOML file (`--config`)
//! 3. `SENSORWATCH_*` environment variables, with `__` between sections
//!    (e.g. `SENSORWATCH_API__URL`, `SENSORWATCH_POLL__INTERVAL`)
//! 4. command-line flags
//!
//! ```toml
//! [api]
//! host = "192.168.0.20"
//! port = 5001
//!
//! [poll]
//! interval = "3s"
//! ```

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::data::duration::parse_duration;
use crate::data::HISTORY_CAPACITY;
use crate::provider::{ApiConfig, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_SCHEME};

/// Where the backend lives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Full base URL; wins over host/port when set.
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub scheme: Option<String>,
}

impl ApiSettings {
    /// Resolve the single base URL every request uses.
    ///
    /// Explicit URL first, then host/port (each defaulting on its own),
    /// then `http://localhost:5001/api`.
    pub fn resolve(&self) -> ApiConfig {
        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            return ApiConfig::new(url);
        }

        let scheme = self.scheme.as_deref().unwrap_or(DEFAULT_SCHEME);
        let host = self.host.as_deref().filter(|h| !h.trim().is_empty()).unwrap_or(DEFAULT_HOST);
        let port = self.port.unwrap_or(DEFAULT_PORT);
        ApiConfig::from_parts(scheme.trim_end_matches(':'), host, port)
    }
}

/// Poll loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Interval between cycles, as a duration string.
    pub interval: String,
    /// Readings requested per fetch.
    pub limit: u32,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: "3000ms".to_string(),
            limit: 1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HistorySettings {
    pub capacity: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            capacity: HISTORY_CAPACITY,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerSettings {
    pub level: String,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Complete application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub api: ApiSettings,
    pub poll: PollSettings,
    pub history: HistorySettings,
    pub logger: LoggerSettings,
}

/// Values given on the command line; `None` leaves lower layers alone.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub interval: Option<String>,
    pub limit: Option<u32>,
    pub log_level: Option<String>,
}

impl Settings {
    /// Load settings from the optional file, the environment and overrides.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("SENSORWATCH").prefix_separator("_").separator("__"),
        );

        let config = builder
            .set_override_option("api.url", overrides.url.clone())?
            .set_override_option("api.host", overrides.host.clone())?
            .set_override_option("api.port", overrides.port.map(i64::from))?
            .set_override_option("poll.interval", overrides.interval.clone())?
            .set_override_option("poll.limit", overrides.limit.map(i64::from))?
            .set_override_option("logger.level", overrides.log_level.clone())?
            .build()
            .context("failed to load configuration")?;

        let settings: Settings =
            config.try_deserialize().context("invalid configuration values")?;
        settings.poll_interval()?;
        Ok(settings)
    }

    /// The poll interval as a duration.
    pub fn poll_interval(&self) -> Result<Duration> {
        let interval = parse_duration(&self.poll.interval)
            .with_context(|| format!("invalid poll interval {:?}", self.poll.interval))?;
        if interval.is_zero() {
            anyhow::bail!("poll interval must be greater than zero");
        }
        Ok(interval)
    }

    /// The resolved API location.
    pub fn api_config(&self) -> ApiConfig {
        self.api.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_resolve_defaults() {
        let api = ApiSettings::default();
        assert_eq!(api.resolve().base_url(), "http://localhost:5001/api");
    }

    #[test]
    fn test_resolve_explicit_url_wins() {
        let api = ApiSettings {
            url: Some("https://iot.example.com/api/".to_string()),
            host: Some("ignored".to_string()),
            port: Some(1),
            scheme: None,
        };
        assert_eq!(api.resolve().base_url(), "https://iot.example.com/api");
    }

    #[test]
    fn test_resolve_host_and_port_independently() {
        let host_only = ApiSettings {
            host: Some("192.168.0.20".to_string()),
            ..Default::default()
        };
        assert_eq!(host_only.resolve().base_url(), "http://192.168.0.20:5001/api");

        let port_only = ApiSettings {
            port: Some(8080),
            ..Default::default()
        };
        assert_eq!(port_only.resolve().base_url(), "http://localhost:8080/api");
    }

    #[test]
    fn test_blank_url_ignored() {
        let api = ApiSettings {
            url: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(api.resolve(), ApiConfig::default());
    }

    #[test]
    fn test_load_from_file_with_overrides() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            r#"
[api]
host = "sensor.local"
port = 6000

[poll]
interval = "5s"
limit = 3
"#
        )
        .unwrap();

        let overrides = Overrides {
            port: Some(7000),
            ..Default::default()
        };
        let settings = Settings::load(Some(file.path()), &overrides).unwrap();

        assert_eq!(settings.api_config().base_url(), "http://sensor.local:7000/api");
        assert_eq!(settings.poll_interval().unwrap(), Duration::from_secs(5));
        assert_eq!(settings.poll.limit, 3);
        assert_eq!(settings.history.capacity, HISTORY_CAPACITY);
    }

    #[test]
    fn test_load_defaults_without_file() {
        let settings = Settings::load(None, &Overrides::default()).unwrap();
        assert_eq!(settings.poll_interval().unwrap(), Duration::from_millis(3000));
        assert_eq!(settings.poll.limit, 1);
        assert_eq!(settings.logger.level, "info");
    }

    #[test]
    fn test_invalid_interval_rejected() {
        let overrides = Overrides {
            interval: Some("often".to_string()),
            ..Default::default()
        };
        assert!(Settings::load(None, &overrides).is_err());

        let zero = Overrides {
            interval: Some("0ms".to_string()),
            ..Default::default()
        };
        assert!(Settings::load(None, &zero).is_err());
    }
}
