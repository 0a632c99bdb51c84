//! Canonical reading and threshold types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Air-quality index at or below which the air is "good" when the backend
/// does not configure one.
pub const DEFAULT_AIR_GOOD: f64 = 500.0;

/// Air-quality index at or below which the air is "moderate" when the
/// backend does not configure one.
pub const DEFAULT_AIR_MODERATE: f64 = 1500.0;

/// Light floor used when the backend omits `luz_min`.
pub const DEFAULT_LIGHT_MIN: i64 = 100;

/// One normalized sensor snapshot.
///
/// Optional fields stay `None` when the deployment has no such sensor so
/// that "not measured" is never confused with "measured as zero".
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    /// When the value was produced; receipt time if the payload had none.
    pub timestamp: DateTime<Utc>,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Relative humidity in percent.
    pub humidity: f64,
    /// Unit-less light intensity.
    pub light: f64,
    /// Air-quality index, if the node has the sensor.
    pub air_quality: Option<f64>,
    /// Whether the actuator LED is on.
    pub led_active: bool,
    /// Number of faces seen by the vision module, if present.
    pub faces_detected: Option<u32>,
}

/// Operator-tunable comparison limits.
///
/// Field names on the wire follow the backend (`temp_max`, `umid_min`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Temperature alerts when strictly above this.
    #[serde(rename = "temp_max")]
    pub temp_max: f64,
    /// Humidity alerts when strictly below this.
    #[serde(rename = "umid_min")]
    pub humidity_min: f64,
    /// Light alerts when strictly below this.
    #[serde(rename = "luz_min", default = "default_light_min")]
    pub light_min: i64,
    /// Upper bound (inclusive) of the "good" air band.
    #[serde(rename = "ar_bom", default, skip_serializing_if = "Option::is_none")]
    pub air_good: Option<f64>,
    /// Upper bound (inclusive) of the "moderate" air band.
    #[serde(rename = "ar_moderado", default, skip_serializing_if = "Option::is_none")]
    pub air_moderate: Option<f64>,
}

fn default_light_min() -> i64 {
    DEFAULT_LIGHT_MIN
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            temp_max: 28.0,
            humidity_min: 40.0,
            light_min: DEFAULT_LIGHT_MIN,
            air_good: Some(DEFAULT_AIR_GOOD),
            air_moderate: Some(DEFAULT_AIR_MODERATE),
        }
    }
}

impl Thresholds {
    /// Good-band bound, falling back to the default.
    pub fn air_good_or_default(&self) -> f64 {
        self.air_good.unwrap_or(DEFAULT_AIR_GOOD)
    }

    /// Moderate-band bound, falling back to the default.
    pub fn air_moderate_or_default(&self) -> f64 {
        self.air_moderate.unwrap_or(DEFAULT_AIR_MODERATE)
    }
}

/// In-memory mirror of the last successfully fetched thresholds.
///
/// Only a successful read replaces the contents. Threshold writes never
/// touch the store; the next poll picks up whatever the backend accepted.
#[derive(Debug, Clone, Default)]
pub struct ThresholdStore {
    current: Option<Thresholds>,
    refreshed_at: Option<DateTime<Utc>>,
}

impl ThresholdStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the mirrored thresholds wholesale.
    pub fn replace(&mut self, thresholds: Thresholds) {
        self.current = Some(thresholds);
        self.refreshed_at = Some(Utc::now());
    }

    /// The last fetched thresholds, if any fetch has succeeded.
    pub fn current(&self) -> Option<&Thresholds> {
        self.current.as_ref()
    }

    /// The thresholds to classify against: the fetched ones, or defaults.
    pub fn effective(&self) -> Thresholds {
        self.current.clone().unwrap_or_default()
    }

    /// When the store was last refreshed.
    pub fn refreshed_at(&self) -> Option<DateTime<Utc>> {
        self.refreshed_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_backend_thresholds() {
        let json = r#"{"temp_max": 28.0, "umid_min": 40.0, "ar_bom": 500, "ar_moderado": 1500}"#;
        let t: Thresholds = serde_json::from_str(json).unwrap();
        assert_eq!(t.temp_max, 28.0);
        assert_eq!(t.humidity_min, 40.0);
        assert_eq!(t.light_min, DEFAULT_LIGHT_MIN);
        assert_eq!(t.air_good, Some(500.0));
        assert_eq!(t.air_moderate, Some(1500.0));
    }

    #[test]
    fn test_missing_air_bands_fall_back() {
        let json = r#"{"temp_max": 30, "umid_min": 35, "luz_min": 80}"#;
        let t: Thresholds = serde_json::from_str(json).unwrap();
        assert_eq!(t.light_min, 80);
        assert!(t.air_good.is_none());
        assert_eq!(t.air_good_or_default(), DEFAULT_AIR_GOOD);
        assert_eq!(t.air_moderate_or_default(), DEFAULT_AIR_MODERATE);
    }

    #[test]
    fn test_serialize_uses_wire_names_and_skips_absent() {
        let t = Thresholds {
            temp_max: 30.0,
            humidity_min: 40.0,
            light_min: 100,
            air_good: None,
            air_moderate: None,
        };
        let value = serde_json::to_value(&t).unwrap();
        assert_eq!(value["temp_max"], 30.0);
        assert_eq!(value["umid_min"], 40.0);
        assert_eq!(value["luz_min"], 100);
        assert!(value.get("ar_bom").is_none());
    }

    #[test]
    fn test_store_starts_empty_and_uses_defaults() {
        let store = ThresholdStore::new();
        assert!(store.current().is_none());
        assert!(store.refreshed_at().is_none());
        assert_eq!(store.effective(), Thresholds::default());
    }

    #[test]
    fn test_store_replace() {
        let mut store = ThresholdStore::new();
        let t = Thresholds {
            temp_max: 31.5,
            ..Thresholds::default()
        };
        store.replace(t.clone());
        assert_eq!(store.current(), Some(&t));
        assert_eq!(store.effective(), t);
        assert!(store.refreshed_at().is_some());
    }
}
