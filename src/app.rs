//! Application state and operator actions.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio::sync::oneshot;
use tracing::{info, warn};

use crate::data::{DashboardView, HistoryBuffer};
use crate::editor::ThresholdEditor;
use crate::error::TelemetryError;
use crate::source::{TelemetryFeed, TelemetrySource};
use crate::ui::Theme;
use crate::updater::{DashboardUpdater, OverlayUpdater, ViewUpdater};

/// Default file the `e` key exports to.
pub const EXPORT_PATH: &str = "sensorwatch_export.json";

/// How long a status message stays visible.
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// Result of a threshold write, shown until the operator dismisses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acknowledgment {
    pub success: bool,
    pub message: String,
}

impl Acknowledgment {
    fn from_result(result: Result<(), TelemetryError>) -> Self {
        match result {
            Ok(()) => Self {
                success: true,
                message: "Thresholds updated".to_string(),
            },
            Err(err) => Self {
                success: false,
                message: format!("Failed to update thresholds: {}", err),
            },
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub show_help: bool,
    pub show_overlay: bool,

    // Writes go straight to the source; reads come through the feeds.
    source: Arc<dyn TelemetrySource>,
    dashboard_feed: TelemetryFeed,
    overlay_feed: TelemetryFeed,

    pub dashboard: DashboardUpdater,
    pub overlay: OverlayUpdater,

    pub editor: Option<ThresholdEditor>,
    pending_write: Option<oneshot::Receiver<Result<(), TelemetryError>>>,
    pub acknowledgment: Option<Acknowledgment>,

    pub theme: Theme,
    pub status_message: Option<(String, Instant)>,
}

impl App {
    /// Create an app consuming two independent feeds.
    ///
    /// `source` is used only for threshold writes.
    pub fn new(
        source: Arc<dyn TelemetrySource>,
        dashboard_feed: TelemetryFeed,
        overlay_feed: TelemetryFeed,
        history: HistoryBuffer,
    ) -> Self {
        Self {
            running: true,
            show_help: false,
            show_overlay: true,
            source,
            dashboard_feed,
            overlay_feed,
            dashboard: DashboardUpdater::new(history),
            overlay: OverlayUpdater::new(),
            editor: None,
            pending_write: None,
            acknowledgment: None,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Returns a description of the dashboard's data source.
    pub fn source_description(&self) -> &str {
        self.dashboard_feed.description()
    }

    /// Set a temporary status message that will be shown for a few seconds.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired.
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < STATUS_TIMEOUT {
                return Some(msg);
            }
        }
        None
    }

    /// Apply every completed cycle and check on an outstanding write.
    ///
    /// Returns true if anything changed.
    pub fn tick(&mut self) -> bool {
        let mut changed = false;

        while let Some(update) = self.dashboard_feed.poll() {
            self.dashboard.apply(update);
            changed = true;
        }
        while let Some(update) = self.overlay_feed.poll() {
            self.overlay.apply(update);
            changed = true;
        }

        changed | self.poll_write()
    }

    /// The current dashboard view.
    pub fn view(&self) -> &DashboardView {
        self.dashboard.view()
    }

    /// Whether a threshold write is in flight.
    pub fn write_pending(&self) -> bool {
        self.pending_write.is_some()
    }

    /// Ask both feeds for an immediate cycle.
    pub fn refresh(&mut self) {
        self.dashboard_feed.refresh_now();
        self.overlay_feed.refresh_now();
        self.set_status_message("Refreshing...".to_string());
    }

    /// Open the threshold editor, pre-filled from the dashboard's mirror.
    pub fn open_editor(&mut self) {
        if self.write_pending() {
            self.set_status_message("A threshold update is already in progress".to_string());
            return;
        }
        self.editor = Some(ThresholdEditor::new(&self.dashboard.store().effective()));
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Validate the editor and send the thresholds to the backend.
    ///
    /// Invalid input keeps the editor open and sends nothing. The threshold
    /// mirrors are not touched; they follow the next successful read.
    pub fn submit_editor(&mut self) {
        let Some(ref editor) = self.editor else {
            return;
        };

        let thresholds = match editor.parse() {
            Ok(thresholds) => thresholds,
            Err(err) => {
                self.set_status_message(err.to_string());
                return;
            }
        };
        self.editor = None;

        info!(?thresholds, "submitting threshold update");
        let source = self.source.clone();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let result = source.write_thresholds(&thresholds).await;
            let _ = tx.send(result);
        });
        self.pending_write = Some(rx);
    }

    fn poll_write(&mut self) -> bool {
        let Some(rx) = self.pending_write.as_mut() else {
            return false;
        };

        let result = match rx.try_recv() {
            Ok(result) => result,
            Err(oneshot::error::TryRecvError::Empty) => return false,
            Err(oneshot::error::TryRecvError::Closed) => {
                Err(TelemetryError::Connection("write task ended unexpectedly".to_string()))
            }
        };
        self.pending_write = None;

        match &result {
            Ok(()) => info!("threshold update accepted"),
            Err(err) => warn!(error = %err, "threshold update failed"),
        }
        self.acknowledgment = Some(Acknowledgment::from_result(result));
        true
    }

    /// Close the write acknowledgment.
    pub fn dismiss_acknowledgment(&mut self) {
        self.acknowledgment = None;
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Toggle the floating overlay widget. Its feed keeps running.
    pub fn toggle_overlay(&mut self) {
        self.show_overlay = !self.show_overlay;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Export the current dashboard view to a file.
    pub fn export_state(&self, path: &Path) -> Result<()> {
        if self.dashboard.latest().is_none() {
            anyhow::bail!("No data to export");
        }
        write_export(self.view(), path)
    }
}

/// Write a dashboard view as pretty JSON.
pub fn write_export(view: &DashboardView, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(view)?;
    std::fs::write(path, json)
        .with_context(|| format!("failed to write export to {}", path.display()))?;
    Ok(())
}
