//! Threshold classification of readings.
//!
//! Everything here is a pure function of a [`Reading`] and [`Thresholds`].
//! Each result carries the text to display, since the "normal" label differs
//! per metric.

use serde::Serialize;

use super::reading::{Reading, Thresholds};

/// Label shown for any metric in alert.
pub const ALERT_LABEL: &str = "Alert";

/// Alert state of a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AlertLevel {
    Normal,
    Alert,
}

/// Classification of one metric: its level plus the label to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricStatus {
    pub level: AlertLevel,
    pub label: &'static str,
}

impl MetricStatus {
    fn from_alert(alert: bool, normal_label: &'static str) -> Self {
        if alert {
            Self {
                level: AlertLevel::Alert,
                label: ALERT_LABEL,
            }
        } else {
            Self {
                level: AlertLevel::Normal,
                label: normal_label,
            }
        }
    }

    /// Whether the metric is in alert.
    pub fn is_alert(&self) -> bool {
        self.level == AlertLevel::Alert
    }
}

/// Three-band air-quality classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum AirBand {
    Good,
    Moderate,
    Poor,
}

impl AirBand {
    /// Display label.
    pub fn label(&self) -> &'static str {
        match self {
            AirBand::Good => "Good",
            AirBand::Moderate => "Moderate",
            AirBand::Poor => "Poor",
        }
    }
}

/// Classification of every metric of a reading.
///
/// `faces` and `air_quality` are `None` when the reading did not measure
/// them; that is "no classification", not "normal".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub temperature: MetricStatus,
    pub humidity: MetricStatus,
    pub light: MetricStatus,
    pub faces: Option<MetricStatus>,
    pub air_quality: Option<AirBand>,
}

impl Classification {
    /// Whether any classified metric is in alert.
    pub fn any_alert(&self) -> bool {
        self.temperature.is_alert()
            || self.humidity.is_alert()
            || self.light.is_alert()
            || self.faces.is_some_and(|f| f.is_alert())
    }
}

/// Classify every metric of a reading.
pub fn classify(reading: &Reading, thresholds: &Thresholds) -> Classification {
    Classification {
        temperature: classify_temperature(reading.temperature, thresholds),
        humidity: classify_humidity(reading.humidity, thresholds),
        light: classify_light(reading.light, thresholds),
        faces: reading.faces_detected.map(classify_faces),
        air_quality: reading.air_quality.map(|aq| classify_air(aq, thresholds)),
    }
}

/// Alert iff `temperature > temp_max`.
pub fn classify_temperature(temperature: f64, thresholds: &Thresholds) -> MetricStatus {
    MetricStatus::from_alert(temperature > thresholds.temp_max, "Normal")
}

/// Alert iff `humidity < humidity_min`.
pub fn classify_humidity(humidity: f64, thresholds: &Thresholds) -> MetricStatus {
    MetricStatus::from_alert(humidity < thresholds.humidity_min, "Normal")
}

/// Alert iff `light < light_min`.
pub fn classify_light(light: f64, thresholds: &Thresholds) -> MetricStatus {
    MetricStatus::from_alert(light < thresholds.light_min as f64, "Good")
}

/// Any detected face is the alert condition.
pub fn classify_faces(faces: u32) -> MetricStatus {
    MetricStatus::from_alert(faces > 0, "None")
}

/// Good up to and including `air_good`, moderate up to and including
/// `air_moderate`, poor above. Missing bounds use the defaults.
pub fn classify_air(air_quality: f64, thresholds: &Thresholds) -> AirBand {
    if air_quality <= thresholds.air_good_or_default() {
        AirBand::Good
    } else if air_quality <= thresholds.air_moderate_or_default() {
        AirBand::Moderate
    } else {
        AirBand::Poor
    }
}
