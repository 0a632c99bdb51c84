//! Consumers of [`CycleUpdate`]s.
//!
//! The dashboard and the overlay each own an updater, fed by their own
//! [`TelemetryFeed`](crate::source::TelemetryFeed). Neither shares state
//! with the other. A failed fetch is logged and leaves the last good view
//! on screen.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::data::{
    dashboard_view, overlay_view, DashboardView, HistoryBuffer, OverlayView, Reading,
    ThresholdStore,
};
use crate::error::TelemetryError;
use crate::source::CycleUpdate;

/// Something that turns completed cycles into display state.
pub trait ViewUpdater {
    /// Fold one cycle into the updater's state.
    fn apply(&mut self, update: CycleUpdate);
}

fn log_failure(consumer: &str, what: &str, seq: u64, err: &TelemetryError) {
    if err.is_empty_data() {
        debug!(consumer, seq, "{} fetch returned no data", what);
    } else {
        warn!(consumer, seq, error = %err, "{} fetch failed", what);
    }
}

/// State behind the full dashboard.
#[derive(Debug)]
pub struct DashboardUpdater {
    store: ThresholdStore,
    history: HistoryBuffer,
    latest: Option<Reading>,
    last_updated: Option<DateTime<Utc>>,
    view: DashboardView,
}

impl Default for DashboardUpdater {
    fn default() -> Self {
        Self::new(HistoryBuffer::new())
    }
}

impl DashboardUpdater {
    /// Create an updater around an (empty) history buffer.
    pub fn new(history: HistoryBuffer) -> Self {
        let store = ThresholdStore::new();
        let view = dashboard_view(None, &store.effective(), &history, None);
        Self {
            store,
            history,
            latest: None,
            last_updated: None,
            view,
        }
    }

    /// The current dashboard view.
    pub fn view(&self) -> &DashboardView {
        &self.view
    }

    /// The mirrored thresholds.
    pub fn store(&self) -> &ThresholdStore {
        &self.store
    }

    /// The rolling history behind the chart.
    pub fn history(&self) -> &HistoryBuffer {
        &self.history
    }

    /// The most recent reading, if any cycle has succeeded.
    pub fn latest(&self) -> Option<&Reading> {
        self.latest.as_ref()
    }

    /// When a cycle last changed the view.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    fn rebuild(&mut self) {
        self.view = dashboard_view(
            self.latest.as_ref(),
            &self.store.effective(),
            &self.history,
            self.last_updated,
        );
    }
}

impl ViewUpdater for DashboardUpdater {
    fn apply(&mut self, update: CycleUpdate) {
        let mut changed = false;

        match update.thresholds {
            Ok(thresholds) => {
                self.store.replace(thresholds);
                changed = true;
            }
            Err(err) => log_failure("dashboard", "thresholds", update.seq, &err),
        }

        match update.reading {
            Ok(reading) => {
                self.history.push(&reading);
                self.latest = Some(reading);
                changed = true;
            }
            Err(err) => log_failure("dashboard", "reading", update.seq, &err),
        }

        if changed {
            self.last_updated = Some(update.completed_at);
            self.rebuild();
        }
    }
}

/// State behind the compact overlay widget.
#[derive(Debug)]
pub struct OverlayUpdater {
    store: ThresholdStore,
    latest: Option<Reading>,
    view: OverlayView,
}

impl Default for OverlayUpdater {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayUpdater {
    /// An overlay showing placeholders until its first successful cycle.
    pub fn new() -> Self {
        let store = ThresholdStore::new();
        let view = overlay_view(None, &store.effective());
        Self {
            store,
            latest: None,
            view,
        }
    }

    /// The current overlay view.
    pub fn view(&self) -> &OverlayView {
        &self.view
    }

    /// The overlay's own threshold mirror.
    pub fn store(&self) -> &ThresholdStore {
        &self.store
    }
}

impl ViewUpdater for OverlayUpdater {
    fn apply(&mut self, update: CycleUpdate) {
        let mut changed = false;

        match update.thresholds {
            Ok(thresholds) => {
                self.store.replace(thresholds);
                changed = true;
            }
            Err(err) => log_failure("overlay", "thresholds", update.seq, &err),
        }

        match update.reading {
            Ok(reading) => {
                self.latest = Some(reading);
                changed = true;
            }
            Err(err) => log_failure("overlay", "reading", update.seq, &err),
        }

        if changed {
            self.view = overlay_view(self.latest.as_ref(), &self.store.effective());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AirBand, AlertLevel, LedState, Thresholds};
    use crate::data::view::PLACEHOLDER;

    fn reading(temperature: f64) -> Reading {
        Reading {
            timestamp: Utc::now(),
            temperature,
            humidity: 50.0,
            light: 150.0,
            air_quality: Some(1600.0),
            led_active: false,
            faces_detected: Some(1),
        }
    }

    fn ok(seq: u64, temperature: f64, thresholds: Thresholds) -> CycleUpdate {
        CycleUpdate {
            seq,
            reading: Ok(reading(temperature)),
            thresholds: Ok(thresholds),
            completed_at: Utc::now(),
        }
    }

    fn failed(seq: u64) -> CycleUpdate {
        CycleUpdate {
            seq,
            reading: Err(TelemetryError::Connection("refused".into())),
            thresholds: Err(TelemetryError::Connection("refused".into())),
            completed_at: Utc::now(),
        }
    }

    fn thresholds(temp_max: f64) -> Thresholds {
        Thresholds {
            temp_max,
            humidity_min: 40.0,
            light_min: 100,
            air_good: None,
            air_moderate: None,
        }
    }

    #[test]
    fn test_dashboard_applies_successful_cycle() {
        let mut updater = DashboardUpdater::default();
        assert_eq!(updater.view().temperature.value, PLACEHOLDER);

        updater.apply(ok(1, 31.0, thresholds(30.0)));

        let view = updater.view();
        assert_eq!(view.temperature.value, "31.0");
        assert_eq!(view.temperature.status.map(|s| s.level), Some(AlertLevel::Alert));
        assert_eq!(view.humidity.status.map(|s| s.level), Some(AlertLevel::Normal));
        assert_eq!(view.light.status.map(|s| s.level), Some(AlertLevel::Normal));
        assert_eq!(view.chart.temperature, vec![31.0]);
        assert_eq!(updater.store().current().map(|t| t.temp_max), Some(30.0));
        assert!(updater.last_updated().is_some());
    }

    #[test]
    fn test_dashboard_failure_leaves_view_untouched() {
        let mut updater = DashboardUpdater::default();
        updater.apply(ok(1, 25.0, thresholds(30.0)));
        let before = updater.view().clone();
        let updated_at = updater.last_updated();

        updater.apply(failed(2));

        assert_eq!(updater.view(), &before);
        assert_eq!(updater.last_updated(), updated_at);
        assert_eq!(updater.history().len(), 1);
    }

    #[test]
    fn test_dashboard_partial_failure() {
        let mut updater = DashboardUpdater::default();
        updater.apply(ok(1, 25.0, thresholds(30.0)));

        updater.apply(CycleUpdate {
            seq: 2,
            reading: Ok(reading(29.0)),
            thresholds: Err(TelemetryError::Http("API returned status 500".into())),
            completed_at: Utc::now(),
        });

        // New reading, previous thresholds.
        assert_eq!(updater.view().temperature.value, "29.0");
        assert_eq!(updater.view().thresholds.temp_max, 30.0);
        assert_eq!(updater.history().len(), 2);
    }

    #[test]
    fn test_dashboard_last_completed_wins() {
        let mut updater = DashboardUpdater::default();
        // Cycle 2 completes before the slower cycle 1.
        updater.apply(ok(2, 26.0, thresholds(30.0)));
        updater.apply(ok(1, 24.0, thresholds(30.0)));

        assert_eq!(updater.view().temperature.value, "24.0");
        assert_eq!(updater.view().chart.temperature, vec![26.0, 24.0]);
    }

    #[test]
    fn test_empty_data_keeps_previous_reading() {
        let mut updater = DashboardUpdater::default();
        updater.apply(ok(1, 25.0, thresholds(30.0)));
        updater.apply(CycleUpdate {
            seq: 2,
            reading: Err(TelemetryError::EmptyData),
            thresholds: Err(TelemetryError::EmptyData),
            completed_at: Utc::now(),
        });

        assert_eq!(updater.latest().map(|r| r.temperature), Some(25.0));
    }

    #[test]
    fn test_overlay_uses_its_own_thresholds() {
        let mut overlay = OverlayUpdater::new();
        assert_eq!(overlay.view().led, LedState::Unknown);

        overlay.apply(ok(1, 22.0, thresholds(30.0)));

        let view = overlay.view();
        assert_eq!(view.temperature, "22.0");
        assert_eq!(view.air_quality, "1600");
        // No air bands configured, so the defaults (500/1500) apply.
        assert_eq!(view.air_band, Some(AirBand::Poor));
        assert_eq!(view.faces, "1");
        assert_eq!(view.led, LedState::Off);
    }

    #[test]
    fn test_overlay_failure_leaves_view_untouched() {
        let mut overlay = OverlayUpdater::new();
        overlay.apply(ok(1, 22.0, thresholds(30.0)));
        let before = overlay.view().clone();

        overlay.apply(failed(2));
        assert_eq!(overlay.view(), &before);
    }
}
