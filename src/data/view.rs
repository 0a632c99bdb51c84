//! View models: what each screen region shows, computed purely from state.
//!
//! The UI layer only lays these out; every decision about text, status and
//! placeholders is made here.

use chrono::{DateTime, Local, Utc};
use serde::Serialize;

use super::classify::{classify, AirBand, Classification, MetricStatus};
use super::history::{ChartData, HistoryBuffer};
use super::reading::{Reading, Thresholds};

/// Shown where a value has not been measured or not received yet.
pub const PLACEHOLDER: &str = "–";

/// Actuator state as displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LedState {
    On,
    Off,
    Unknown,
}

impl LedState {
    fn from_reading(reading: Option<&Reading>) -> Self {
        match reading {
            Some(r) if r.led_active => LedState::On,
            Some(_) => LedState::Off,
            None => LedState::Unknown,
        }
    }

    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            LedState::On => "On",
            LedState::Off => "Off",
            LedState::Unknown => PLACEHOLDER,
        }
    }
}

/// One card on the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricCard {
    pub name: &'static str,
    pub value: String,
    pub unit: &'static str,
    /// `None` when the metric was not measured (or nothing arrived yet).
    pub status: Option<MetricStatus>,
    /// Whether the value came from the reading rather than a default.
    pub measured: bool,
}

impl MetricCard {
    fn placeholder(name: &'static str, unit: &'static str) -> Self {
        Self {
            name,
            value: PLACEHOLDER.to_string(),
            unit,
            status: None,
            measured: false,
        }
    }
}

/// Everything the full dashboard shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub temperature: MetricCard,
    pub humidity: MetricCard,
    pub light: MetricCard,
    pub faces: MetricCard,
    pub led: LedState,
    pub chart: ChartData,
    pub thresholds: Thresholds,
    pub reading_time: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
    pub any_alert: bool,
}

/// Everything the compact overlay widget shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayView {
    pub temperature: String,
    pub humidity: String,
    pub air_quality: String,
    pub led: LedState,
    pub faces: String,
    /// `false` when the reading carried no face count, so a missing count
    /// can be told apart from a measured zero.
    pub faces_measured: bool,
    /// Local time of the reading.
    pub time: String,
    /// Drives the widget border; `None` when air quality is not measured.
    pub air_band: Option<AirBand>,
}

/// Build the dashboard view.
///
/// `reading` is `None` until the first successful fetch.
pub fn dashboard_view(
    reading: Option<&Reading>,
    thresholds: &Thresholds,
    history: &HistoryBuffer,
    updated_at: Option<DateTime<Utc>>,
) -> DashboardView {
    let classification = reading.map(|r| classify(r, thresholds));

    let (temperature, humidity, light, faces) = match (reading, classification) {
        (Some(r), Some(c)) => cards(r, &c),
        _ => (
            MetricCard::placeholder("Temperature", "°C"),
            MetricCard::placeholder("Humidity", "%"),
            MetricCard::placeholder("Light", ""),
            MetricCard::placeholder("Faces", ""),
        ),
    };

    DashboardView {
        temperature,
        humidity,
        light,
        faces,
        led: LedState::from_reading(reading),
        chart: history.chart_data(),
        thresholds: thresholds.clone(),
        reading_time: reading.map(|r| r.timestamp),
        updated_at,
        any_alert: classification.is_some_and(|c| c.any_alert()),
    }
}

fn cards(r: &Reading, c: &Classification) -> (MetricCard, MetricCard, MetricCard, MetricCard) {
    let temperature = MetricCard {
        name: "Temperature",
        value: format!("{:.1}", r.temperature),
        unit: "°C",
        status: Some(c.temperature),
        measured: true,
    };
    let humidity = MetricCard {
        name: "Humidity",
        value: format!("{:.1}", r.humidity),
        unit: "%",
        status: Some(c.humidity),
        measured: true,
    };
    // Light's value is shown whatever its status.
    let light = MetricCard {
        name: "Light",
        value: format!("{}", r.light),
        unit: "",
        status: Some(c.light),
        measured: true,
    };
    let faces = MetricCard {
        name: "Faces",
        value: r.faces_detected.unwrap_or(0).to_string(),
        unit: "",
        status: c.faces,
        measured: r.faces_detected.is_some(),
    };
    (temperature, humidity, light, faces)
}

/// Build the overlay widget view.
pub fn overlay_view(reading: Option<&Reading>, thresholds: &Thresholds) -> OverlayView {
    let Some(r) = reading else {
        return OverlayView {
            temperature: PLACEHOLDER.to_string(),
            humidity: PLACEHOLDER.to_string(),
            air_quality: PLACEHOLDER.to_string(),
            led: LedState::Unknown,
            faces: PLACEHOLDER.to_string(),
            faces_measured: false,
            time: PLACEHOLDER.to_string(),
            air_band: None,
        };
    };

    let classification = classify(r, thresholds);

    OverlayView {
        temperature: format!("{:.1}", r.temperature),
        humidity: format!("{:.1}", r.humidity),
        air_quality: r
            .air_quality
            .map(|aq| aq.to_string())
            .unwrap_or_else(|| PLACEHOLDER.to_string()),
        led: LedState::from_reading(Some(r)),
        faces: r.faces_detected.unwrap_or(0).to_string(),
        faces_measured: r.faces_detected.is_some(),
        time: r.timestamp.with_timezone(&Local).format("%H:%M:%S").to_string(),
        air_band: classification.air_quality,
    }
}
