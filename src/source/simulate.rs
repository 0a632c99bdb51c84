//! In-process simulated backend.
//!
//! Each fetch produces one fresh reading, stepping through four air-quality
//! scenarios in turn. Thresholds live in memory and writes update them key
//! by key, the way the real backend does.

use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use chrono::Local;
use rand::Rng;
use serde_json::json;

use super::wire::READINGS_KEY;
use super::{RawPayload, TelemetrySource};
use crate::data::Thresholds;
use crate::error::TelemetryError;

/// Simulated environmental condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    Excellent,
    Good,
    Moderate,
    Poor,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Excellent,
        Scenario::Good,
        Scenario::Moderate,
        Scenario::Poor,
    ];

    fn temperature(&self) -> RangeInclusive<f64> {
        match self {
            Scenario::Excellent => 21.0..=23.0,
            Scenario::Good => 25.0..=27.0,
            Scenario::Moderate => 29.0..=31.0,
            Scenario::Poor => 31.0..=33.0,
        }
    }

    fn humidity(&self) -> RangeInclusive<f64> {
        match self {
            Scenario::Excellent => 50.0..=60.0,
            Scenario::Good => 60.0..=70.0,
            Scenario::Moderate => 65.0..=75.0,
            Scenario::Poor => 75.0..=85.0,
        }
    }

    fn air_quality(&self) -> RangeInclusive<u32> {
        match self {
            Scenario::Excellent => 200..=350,
            Scenario::Good => 400..=550,
            Scenario::Moderate => 600..=750,
            Scenario::Poor => 800..=1000,
        }
    }

    fn light(&self) -> RangeInclusive<u32> {
        match self {
            Scenario::Excellent => 400..=600,
            Scenario::Good => 250..=400,
            Scenario::Moderate => 120..=250,
            Scenario::Poor => 40..=120,
        }
    }

    /// The LED is switched on only when the air is poor.
    fn led_active(&self) -> bool {
        matches!(self, Scenario::Poor)
    }
}

/// Telemetry source that fabricates readings locally.
#[derive(Debug)]
pub struct SimulatedSource {
    cycle: AtomicUsize,
    thresholds: Mutex<Thresholds>,
    description: String,
}

impl Default for SimulatedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedSource {
    /// Create a simulator starting at the first scenario with the backend's
    /// default thresholds.
    pub fn new() -> Self {
        Self::with_thresholds(Thresholds::default())
    }

    /// Create a simulator with the given initial thresholds.
    pub fn with_thresholds(thresholds: Thresholds) -> Self {
        Self {
            cycle: AtomicUsize::new(0),
            thresholds: Mutex::new(thresholds),
            description: "simulated".to_string(),
        }
    }

    /// The scenario the next fetch will use.
    pub fn next_scenario(&self) -> Scenario {
        Scenario::ALL[self.cycle.load(Ordering::Relaxed) % Scenario::ALL.len()]
    }

    fn advance(&self) -> Scenario {
        let cycle = self.cycle.fetch_add(1, Ordering::Relaxed);
        Scenario::ALL[cycle % Scenario::ALL.len()]
    }

    /// Generate one reading in the backend's wire format.
    fn generate(scenario: Scenario) -> serde_json::Value {
        let mut rng = rand::rng();
        json!({
            "timestamp": Local::now().naive_local().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            "temperatura": round1(rng.random_range(scenario.temperature())),
            "umidade": round1(rng.random_range(scenario.humidity())),
            "luminosidade": rng.random_range(scenario.light()),
            "qualidadeAr": rng.random_range(scenario.air_quality()),
            "led_ativo": scenario.led_active(),
            "faces_detectadas": rng.random_range(0..=2u32),
        })
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[async_trait]
impl TelemetrySource for SimulatedSource {
    async fn fetch_latest_reading(&self, limit: u32) -> Result<RawPayload, TelemetryError> {
        // Wrapped shape is ascending, so older entries come first.
        let count = limit.max(1) as usize;
        let readings: Vec<_> = (0..count).map(|_| Self::generate(self.advance())).collect();
        Ok(json!({ "total": readings.len(), READINGS_KEY: readings }))
    }

    async fn fetch_thresholds(&self) -> Result<Thresholds, TelemetryError> {
        let thresholds = self.thresholds.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(thresholds.clone())
    }

    async fn write_thresholds(&self, update: &Thresholds) -> Result<(), TelemetryError> {
        let mut thresholds = self.thresholds.lock().unwrap_or_else(PoisonError::into_inner);
        thresholds.temp_max = update.temp_max;
        thresholds.humidity_min = update.humidity_min;
        thresholds.light_min = update.light_min;
        // Absent air bands leave the stored ones in place.
        if let Some(good) = update.air_good {
            thresholds.air_good = Some(good);
        }
        if let Some(moderate) = update.air_moderate {
            thresholds.air_moderate = Some(moderate);
        }
        Ok(())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::normalize;
    use chrono::Utc;

    #[tokio::test]
    async fn test_readings_follow_scenarios() {
        let source = SimulatedSource::new();

        for scenario in Scenario::ALL {
            assert_eq!(source.next_scenario(), scenario);
            let payload = source.fetch_latest_reading(1).await.unwrap();
            let reading = normalize(&payload, Utc::now()).unwrap();

            assert!(scenario.temperature().contains(&reading.temperature));
            assert!(scenario.humidity().contains(&reading.humidity));
            let air = reading.air_quality.unwrap();
            assert!(air >= *scenario.air_quality().start() as f64);
            assert!(air <= *scenario.air_quality().end() as f64);
            assert_eq!(reading.led_active, scenario == Scenario::Poor);
            assert!(reading.faces_detected.unwrap() <= 2);
        }

        // Wraps around.
        assert_eq!(source.next_scenario(), Scenario::Excellent);
    }

    #[tokio::test]
    async fn test_limit_produces_wrapped_list() {
        let source = SimulatedSource::new();
        let payload = source.fetch_latest_reading(3).await.unwrap();
        assert_eq!(payload["total"], 3);
        assert_eq!(payload[READINGS_KEY].as_array().map(Vec::len), Some(3));
    }

    #[tokio::test]
    async fn test_write_updates_key_by_key() {
        let source = SimulatedSource::new();
        let update = Thresholds {
            temp_max: 30.0,
            humidity_min: 35.0,
            light_min: 80,
            air_good: None,
            air_moderate: Some(1200.0),
        };
        source.write_thresholds(&update).await.unwrap();

        let stored = source.fetch_thresholds().await.unwrap();
        assert_eq!(stored.temp_max, 30.0);
        assert_eq!(stored.light_min, 80);
        assert_eq!(stored.air_good, Some(500.0));
        assert_eq!(stored.air_moderate, Some(1200.0));
    }
}
