//! Fixed-interval poll loop.
//!
//! A [`TelemetryFeed`] owns a background task that ticks every
//! `interval` (first tick immediately). Every tick spawns one independent
//! cycle that fetches the latest reading and the thresholds concurrently,
//! normalizes the reading and sends the outcome as a [`CycleUpdate`].
//!
//! Cycles are never cancelled and may overlap when the backend is slower
//! than the interval. Updates arrive in completion order, not issue order,
//! so a consumer that applies them as they come shows whichever response
//! landed last.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use super::TelemetrySource;
use crate::data::{normalize, Reading, Thresholds};
use crate::error::TelemetryError;
use crate::provider::{ApiConfig, ReadinessHandle, READINESS_TIMEOUT};

/// Default interval between cycles.
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(3000);

/// How a feed polls its source.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub interval: Duration,
    /// Readings requested per fetch.
    pub limit: u32,
    /// Completed cycles buffered before new ones wait.
    pub buffer: usize,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            limit: 1,
            buffer: 16,
        }
    }
}

/// Outcome of one fetch cycle.
///
/// The two fetches fail independently: a reading can arrive while the
/// threshold request failed, and the other way round.
#[derive(Debug)]
pub struct CycleUpdate {
    /// Issue order of the cycle, starting at 1.
    pub seq: u64,
    pub reading: Result<Reading, TelemetryError>,
    pub thresholds: Result<Thresholds, TelemetryError>,
    pub completed_at: DateTime<Utc>,
}

/// Receives completed cycles from a background poll loop.
///
/// [`TelemetryFeed::poll`] never blocks, so the TUI loop can drain it on
/// every frame.
#[derive(Debug)]
pub struct TelemetryFeed {
    receiver: mpsc::Receiver<CycleUpdate>,
    refresh: Arc<Notify>,
    description: String,
    task: Option<JoinHandle<()>>,
    disconnected: bool,
}

impl TelemetryFeed {
    /// Start polling `source` on the current tokio runtime.
    pub fn spawn(source: Arc<dyn TelemetrySource>, options: FeedOptions) -> Self {
        let (tx, rx) = mpsc::channel(options.buffer.max(1));
        let refresh = Arc::new(Notify::new());
        let description = source.description().to_string();

        let task = tokio::spawn(drive(source, options, tx, refresh.clone()));

        Self {
            receiver: rx,
            refresh,
            description,
            task: Some(task),
            disconnected: false,
        }
    }

    /// Start polling once the API address is known.
    ///
    /// Waits up to the readiness timeout for `readiness`, then builds the
    /// source from the resolved config, or from the default config if the
    /// wait timed out, and polls it as [`TelemetryFeed::spawn`] does.
    pub fn spawn_when_ready<F>(readiness: ReadinessHandle, options: FeedOptions, make_source: F) -> Self
    where
        F: FnOnce(ApiConfig) -> Arc<dyn TelemetrySource> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(options.buffer.max(1));
        let refresh = Arc::new(Notify::new());
        let notify = refresh.clone();

        let task = tokio::spawn(async move {
            let outcome = readiness.await_ready(READINESS_TIMEOUT).await;
            if outcome.timed_out() {
                warn!("API address not resolved in time, using default");
            } else {
                debug!("API address resolved");
            }
            let source = make_source(outcome.into_config());
            info!(source = source.description(), "starting feed");
            drive(source, options, tx, notify).await;
        });

        Self {
            receiver: rx,
            refresh,
            description: "awaiting API address".to_string(),
            task: Some(task),
            disconnected: false,
        }
    }

    /// Create a feed fed by an external channel instead of a poll loop.
    pub fn from_channel(receiver: mpsc::Receiver<CycleUpdate>, description: &str) -> Self {
        Self {
            receiver,
            refresh: Arc::new(Notify::new()),
            description: format!("channel: {}", description),
            task: None,
            disconnected: false,
        }
    }

    /// Create a channel pair for pushing updates into a feed.
    pub fn create(description: &str) -> (mpsc::Sender<CycleUpdate>, Self) {
        let (tx, rx) = mpsc::channel(16);
        (tx, Self::from_channel(rx, description))
    }

    /// Take the next completed cycle, if one is waiting.
    pub fn poll(&mut self) -> Option<CycleUpdate> {
        match self.receiver.try_recv() {
            Ok(update) => Some(update),
            Err(mpsc::error::TryRecvError::Empty) => None,
            Err(mpsc::error::TryRecvError::Disconnected) => {
                self.disconnected = true;
                None
            }
        }
    }

    /// Run an extra cycle now, without waiting for the next tick.
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    /// Returns a human-readable description of the polled source.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Whether the producing side has gone away.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

impl Drop for TelemetryFeed {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn drive(
    source: Arc<dyn TelemetrySource>,
    options: FeedOptions,
    tx: mpsc::Sender<CycleUpdate>,
    refresh: Arc<Notify>,
) {
    let mut ticker = tokio::time::interval(options.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut seq = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = refresh.notified() => {}
        }

        if tx.is_closed() {
            break;
        }

        seq += 1;
        tokio::spawn(run_cycle(source.clone(), options.limit, seq, tx.clone()));
    }
}

/// Run a single fetch cycle against `source`.
///
/// The reading and threshold requests are issued concurrently.
pub async fn fetch_cycle(source: &dyn TelemetrySource, limit: u32, seq: u64) -> CycleUpdate {
    let (raw, thresholds) =
        tokio::join!(source.fetch_latest_reading(limit), source.fetch_thresholds());

    let completed_at = Utc::now();
    let reading = raw.and_then(|raw| normalize(&raw, completed_at));

    CycleUpdate {
        seq,
        reading,
        thresholds,
        completed_at,
    }
}

async fn run_cycle(
    source: Arc<dyn TelemetrySource>,
    limit: u32,
    seq: u64,
    tx: mpsc::Sender<CycleUpdate>,
) {
    let update = fetch_cycle(source.as_ref(), limit, seq).await;
    debug!(
        seq,
        reading_ok = update.reading.is_ok(),
        thresholds_ok = update.thresholds.is_ok(),
        "cycle complete"
    );
    // Receiver gone means the feed was dropped.
    let _ = tx.send(update).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ConfigProvider;
    use crate::source::RawPayload;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Answers with a reading whose temperature is the call number.
    /// The first reading fetch is delayed by `first_delay`.
    #[derive(Debug, Default)]
    struct ScriptedSource {
        calls: AtomicUsize,
        first_delay: Duration,
        fail: bool,
    }

    #[async_trait]
    impl TelemetrySource for ScriptedSource {
        async fn fetch_latest_reading(&self, _limit: u32) -> Result<RawPayload, TelemetryError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(TelemetryError::Connection("refused".into()));
            }
            if call == 0 {
                tokio::time::sleep(self.first_delay).await;
            }
            Ok(json!([{ "temperatura": call as f64, "umidade": 50, "luminosidade": 200 }]))
        }

        async fn fetch_thresholds(&self) -> Result<Thresholds, TelemetryError> {
            Ok(Thresholds::default())
        }

        async fn write_thresholds(&self, _: &Thresholds) -> Result<(), TelemetryError> {
            Ok(())
        }

        fn description(&self) -> &str {
            "scripted"
        }
    }

    fn options(interval: Duration) -> FeedOptions {
        FeedOptions {
            interval,
            ..FeedOptions::default()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_cycle_is_immediate() {
        let source = Arc::new(ScriptedSource::default());
        let mut feed = TelemetryFeed::spawn(source, options(DEFAULT_INTERVAL));
        assert_eq!(feed.description(), "scripted");

        tokio::time::sleep(Duration::from_millis(10)).await;
        let update = feed.poll().expect("first cycle");
        assert_eq!(update.seq, 1);
        assert_eq!(update.reading.unwrap().temperature, 0.0);
        assert!(update.thresholds.is_ok());
        assert!(feed.poll().is_none());

        tokio::time::sleep(DEFAULT_INTERVAL).await;
        assert_eq!(feed.poll().map(|u| u.seq), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_cycles_arrive_in_completion_order() {
        let source = Arc::new(ScriptedSource {
            first_delay: Duration::from_millis(5000),
            ..Default::default()
        });
        let mut feed = TelemetryFeed::spawn(source, options(DEFAULT_INTERVAL));

        tokio::time::sleep(Duration::from_millis(5500)).await;

        let first = feed.poll().expect("second cycle lands first");
        let second = feed.poll().expect("slow first cycle lands later");
        assert_eq!(first.seq, 2);
        assert_eq!(second.seq, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_stop_the_loop() {
        let source = Arc::new(ScriptedSource {
            fail: true,
            ..Default::default()
        });
        let mut feed = TelemetryFeed::spawn(source, options(DEFAULT_INTERVAL));

        tokio::time::sleep(Duration::from_millis(3100)).await;

        let first = feed.poll().unwrap();
        let second = feed.poll().unwrap();
        assert!(matches!(first.reading, Err(TelemetryError::Connection(_))));
        assert!(second.reading.is_err());
        assert_eq!(second.seq, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_now_runs_extra_cycle() {
        let source = Arc::new(ScriptedSource::default());
        let mut feed = TelemetryFeed::spawn(source, options(Duration::from_secs(3600)));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(feed.poll().map(|u| u.seq), Some(1));

        feed.refresh_now();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(feed.poll().map(|u| u.seq), Some(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_spawn_when_ready_falls_back_to_default() {
        let provider = ConfigProvider::new();
        let seen = Arc::new(Mutex::new(None));
        let recorder = seen.clone();

        let mut feed = TelemetryFeed::spawn_when_ready(
            provider.handle(),
            options(DEFAULT_INTERVAL),
            move |config| {
                *recorder.lock().unwrap() = Some(config);
                Arc::new(ScriptedSource::default()) as Arc<dyn TelemetrySource>
            },
        );

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert!(feed.poll().is_none());

        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(feed.poll().is_some());
        assert_eq!(*seen.lock().unwrap(), Some(ApiConfig::default()));
    }

    #[tokio::test]
    async fn test_channel_feed() {
        let (tx, mut feed) = TelemetryFeed::create("test");
        assert_eq!(feed.description(), "channel: test");
        assert!(feed.poll().is_none());

        tx.send(CycleUpdate {
            seq: 7,
            reading: Err(TelemetryError::EmptyData),
            thresholds: Ok(Thresholds::default()),
            completed_at: Utc::now(),
        })
        .await
        .unwrap();

        assert_eq!(feed.poll().map(|u| u.seq), Some(7));

        drop(tx);
        assert!(feed.poll().is_none());
        assert!(feed.is_disconnected());
    }
}
