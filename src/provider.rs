//! The resolved API address and its readiness handle.
//!
//! The base URL is resolved once (see [`crate::settings`]) and published
//! through a [`ConfigProvider`]. Consumers that may start before resolution
//! finishes wait on [`ConfigProvider::await_ready`], which always yields a
//! usable [`ApiConfig`] and says whether it is the resolved one or the
//! fallback.

use std::time::Duration;

use tokio::sync::watch;

/// Scheme used when none is configured.
pub const DEFAULT_SCHEME: &str = "http";

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "localhost";

/// Port the backend listens on by default.
pub const DEFAULT_PORT: u16 = 5001;

/// Path prefix of every API route.
pub const API_PATH: &str = "/api";

/// How long the overlay waits for the base URL before using the default.
pub const READINESS_TIMEOUT: Duration = Duration::from_millis(2000);

/// Immutable API location passed to every client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    /// Create a config from a base URL such as `http://10.0.0.5:5001/api`.
    ///
    /// Trailing slashes are dropped so endpoints join cleanly.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        Self { base_url }
    }

    /// Build `{scheme}://{host}:{port}/api`.
    pub fn from_parts(scheme: &str, host: &str, port: u16) -> Self {
        Self::new(format!("{}://{}:{}{}", scheme, host, port, API_PATH))
    }

    /// The base URL, without trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Join a route onto the base URL.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_parts(DEFAULT_SCHEME, DEFAULT_HOST, DEFAULT_PORT)
    }
}

/// Outcome of waiting for the API address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Readiness {
    /// The provider published a config in time.
    Ready(ApiConfig),
    /// Nothing was published in time; carries the default config.
    TimedOut(ApiConfig),
}

impl Readiness {
    /// The config to use, whichever way the wait ended.
    pub fn into_config(self) -> ApiConfig {
        match self {
            Readiness::Ready(config) | Readiness::TimedOut(config) => config,
        }
    }

    /// Whether the wait timed out.
    pub fn timed_out(&self) -> bool {
        matches!(self, Readiness::TimedOut(_))
    }
}

/// Publishes the resolved [`ApiConfig`] to anyone waiting on it.
#[derive(Debug, Clone)]
pub struct ConfigProvider {
    sender: watch::Sender<Option<ApiConfig>>,
}

impl Default for ConfigProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigProvider {
    /// Create a provider with nothing resolved yet.
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self { sender }
    }

    /// Create a provider that is already resolved.
    pub fn resolved(config: ApiConfig) -> Self {
        let (sender, _) = watch::channel(Some(config));
        Self { sender }
    }

    /// Publish the resolved config. Later calls replace earlier ones.
    pub fn publish(&self, config: ApiConfig) {
        self.sender.send_replace(Some(config));
    }

    /// The config, if resolved.
    pub fn current(&self) -> Option<ApiConfig> {
        self.sender.borrow().clone()
    }

    /// Get a handle for waiting on resolution.
    pub fn handle(&self) -> ReadinessHandle {
        ReadinessHandle {
            receiver: self.sender.subscribe(),
        }
    }

    /// Wait up to `timeout` for a config to be published.
    pub async fn await_ready(&self, timeout: Duration) -> Readiness {
        self.handle().await_ready(timeout).await
    }
}

/// Receiving side of a [`ConfigProvider`], movable into tasks.
#[derive(Debug, Clone)]
pub struct ReadinessHandle {
    receiver: watch::Receiver<Option<ApiConfig>>,
}

impl ReadinessHandle {
    /// Wait up to `timeout` for a config to be published.
    pub async fn await_ready(mut self, timeout: Duration) -> Readiness {
        let waited = tokio::time::timeout(timeout, self.receiver.wait_for(Option::is_some)).await;
        match waited {
            Ok(Ok(config)) => match config.clone() {
                Some(config) => Readiness::Ready(config),
                None => Readiness::TimedOut(ApiConfig::default()),
            },
            // Provider dropped before publishing, or the timeout elapsed.
            Ok(Err(_)) | Err(_) => Readiness::TimedOut(ApiConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        assert_eq!(ApiConfig::default().base_url(), "http://localhost:5001/api");
    }

    #[test]
    fn test_trailing_slash_and_endpoint() {
        let config = ApiConfig::new("http://10.0.0.5:8080/api/");
        assert_eq!(config.base_url(), "http://10.0.0.5:8080/api");
        assert_eq!(config.endpoint("/thresholds"), "http://10.0.0.5:8080/api/thresholds");
        assert_eq!(config.endpoint("leituras"), "http://10.0.0.5:8080/api/leituras");
    }

    #[tokio::test]
    async fn test_ready_when_already_resolved() {
        let provider = ConfigProvider::resolved(ApiConfig::new("http://sensor:5001/api"));
        let readiness = provider.await_ready(READINESS_TIMEOUT).await;
        assert_eq!(readiness, Readiness::Ready(ApiConfig::new("http://sensor:5001/api")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_when_published_late() {
        let provider = ConfigProvider::new();
        let handle = provider.handle();

        let waiter = tokio::spawn(handle.await_ready(READINESS_TIMEOUT));
        tokio::time::sleep(Duration::from_millis(300)).await;
        provider.publish(ApiConfig::new("http://late:5001/api"));

        let readiness = waiter.await.unwrap();
        assert!(!readiness.timed_out());
        assert_eq!(readiness.into_config().base_url(), "http://late:5001/api");
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_with_default() {
        let provider = ConfigProvider::new();
        let readiness = provider.await_ready(READINESS_TIMEOUT).await;
        assert!(readiness.timed_out());
        assert_eq!(readiness.into_config(), ApiConfig::default());
        assert!(provider.current().is_none());
    }
}
