//! Rolling history of recent readings for the chart and sparklines.

use std::collections::VecDeque;

use chrono::Local;
use serde::Serialize;

use super::reading::Reading;

/// Number of readings kept for charting.
pub const HISTORY_CAPACITY: usize = 20;

/// Light is divided by this before charting so it shares an axis with
/// temperature and humidity.
pub const LIGHT_SCALE: f64 = 10.0;

/// One of the charted series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Series {
    Temperature,
    Humidity,
    Light,
    Faces,
}

impl Series {
    /// All series in chart order.
    pub const ALL: [Series; 4] = [
        Series::Temperature,
        Series::Humidity,
        Series::Light,
        Series::Faces,
    ];

    /// Legend label.
    pub fn label(&self) -> &'static str {
        match self {
            Series::Temperature => "Temperature (°C)",
            Series::Humidity => "Humidity (%)",
            Series::Light => "Light / 10",
            Series::Faces => "Faces detected",
        }
    }
}

/// A copy of the buffer's full state, in chronological order.
///
/// This is what gets handed to the chart on every push.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub temperature: Vec<f64>,
    pub humidity: Vec<f64>,
    pub light: Vec<f64>,
    pub faces: Vec<f64>,
}

impl ChartData {
    /// Values of one series.
    pub fn values(&self, series: Series) -> &[f64] {
        match series {
            Series::Temperature => &self.temperature,
            Series::Humidity => &self.humidity,
            Series::Light => &self.light,
            Series::Faces => &self.faces,
        }
    }
}

/// Fixed-capacity sliding window of the most recent readings.
///
/// Stored as parallel series that always have the same length. A push
/// appends to every series, then evicts the oldest element of every series
/// once the capacity is exceeded.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    capacity: usize,
    labels: VecDeque<String>,
    temperature: VecDeque<f64>,
    humidity: VecDeque<f64>,
    light: VecDeque<f64>,
    faces: VecDeque<f64>,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBuffer {
    /// Create an empty buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    /// Create an empty buffer holding at most `capacity` points (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            labels: VecDeque::with_capacity(capacity + 1),
            temperature: VecDeque::with_capacity(capacity + 1),
            humidity: VecDeque::with_capacity(capacity + 1),
            light: VecDeque::with_capacity(capacity + 1),
            faces: VecDeque::with_capacity(capacity + 1),
        }
    }

    /// Record a reading.
    ///
    /// Absent face counts chart as 0 so every series gets a point.
    pub fn push(&mut self, reading: &Reading) {
        let label = reading.timestamp.with_timezone(&Local).format("%H:%M:%S").to_string();

        self.labels.push_back(label);
        self.temperature.push_back(reading.temperature);
        self.humidity.push_back(reading.humidity);
        self.light.push_back(reading.light / LIGHT_SCALE);
        self.faces.push_back(reading.faces_detected.map_or(0.0, f64::from));

        if self.labels.len() > self.capacity {
            self.labels.pop_front();
            self.temperature.pop_front();
            self.humidity.pop_front();
            self.light.pop_front();
            self.faces.pop_front();
        }
    }

    /// Number of points currently held.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Whether nothing has been pushed yet.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Maximum number of points held.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Time labels, oldest first.
    pub fn labels(&self) -> &VecDeque<String> {
        &self.labels
    }

    /// Values of one series, oldest first.
    pub fn series(&self, series: Series) -> &VecDeque<f64> {
        match series {
            Series::Temperature => &self.temperature,
            Series::Humidity => &self.humidity,
            Series::Light => &self.light,
            Series::Faces => &self.faces,
        }
    }

    /// Snapshot of every series for the chart.
    pub fn chart_data(&self) -> ChartData {
        ChartData {
            labels: self.labels.iter().cloned().collect(),
            temperature: self.temperature.iter().copied().collect(),
            humidity: self.humidity.iter().copied().collect(),
            light: self.light.iter().copied().collect(),
            faces: self.faces.iter().copied().collect(),
        }
    }

    /// Sparkline levels (0-7) for one series.
    ///
    /// Returns an empty Vec if there's not enough history.
    pub fn sparkline(&self, series: Series) -> Vec<u8> {
        let values = self.series(series);
        if values.len() < 2 {
            return Vec::new();
        }

        let max = values.iter().copied().fold(f64::MIN, f64::max);
        let min = values.iter().copied().fold(f64::MAX, f64::min);
        let range = max - min;

        values
            .iter()
            .map(|&v| {
                if range <= f64::EPSILON {
                    return 0;
                }
                let normalized = ((v - min) / range * 7.0).round() as u8;
                normalized.min(7)
            })
            .collect()
    }
}
