//! # sensorwatch
//!
//! A live terminal dashboard and library for a small IoT sensor deployment.
//!
//! A sensor node reports temperature, humidity, light, an optional
//! air-quality index, an LED state and an optional face count to a REST
//! backend. This crate polls that backend, normalizes its payloads,
//! classifies each value against operator-tunable thresholds, keeps a
//! short rolling history and renders it all in the terminal.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  settings ──▶ provider (ApiConfig, readiness)                  │
//! │                    │                                           │
//! │                    ▼                                           │
//! │  source::TelemetrySource ◀── HttpSource | SimulatedSource      │
//! │                    │                                           │
//! │        ┌───────────┴───────────┐   one TelemetryFeed each      │
//! │        ▼                       ▼                               │
//! │  DashboardUpdater        OverlayUpdater    (updater)           │
//! │        │  data::{normalize, history, classify, view}           │
//! │        ▼                       ▼                               │
//! │   ui::dashboard            ui::overlay     (ratatui)           │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`settings`]** / **[`provider`]**: layered configuration and the
//!   resolved, immutable [`ApiConfig`]
//! - **[`source`]**: the [`TelemetrySource`] trait, its HTTP and simulated
//!   implementations, and the fixed-interval [`TelemetryFeed`]
//! - **[`data`]**: pure processing: normalization, history, classification
//!   and view models
//! - **[`updater`]**: the two independent [`ViewUpdater`]s
//! - **[`app`]**, **[`events`]**, **[`ui`]**: the terminal application
//!
//! ## Usage
//!
//! ```bash
//! # Poll the default backend at http://localhost:5001/api
//! sensorwatch
//!
//! # Point at another node and poll every 5 seconds
//! sensorwatch --host 192.168.0.20 --interval 5s
//!
//! # No backend at hand
//! sensorwatch --simulate
//!
//! # Fetch once and write the dashboard state as JSON
//! sensorwatch --export state.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::sync::Arc;
//! use sensorwatch::{ApiConfig, FeedOptions, HttpSource, TelemetryFeed, DashboardUpdater, ViewUpdater};
//!
//! # tokio_test::block_on(async {
//! let source = Arc::new(HttpSource::new(ApiConfig::new("http://10.0.0.5:5001/api")));
//! let mut feed = TelemetryFeed::spawn(source, FeedOptions::default());
//! let mut dashboard = DashboardUpdater::default();
//!
//! while let Some(update) = feed.poll() {
//!     dashboard.apply(update);
//! }
//! println!("{}", dashboard.view().temperature.value);
//! # });
//! ```

pub mod app;
pub mod data;
pub mod editor;
pub mod error;
pub mod events;
pub mod provider;
pub mod settings;
pub mod source;
pub mod ui;
pub mod updater;

// Re-export main types for convenience
pub use app::App;
pub use data::{
    classify, normalize, AirBand, AlertLevel, DashboardView, HistoryBuffer, OverlayView, Reading,
    ThresholdStore, Thresholds,
};
pub use error::TelemetryError;
pub use provider::{ApiConfig, ConfigProvider, Readiness};
pub use settings::Settings;
pub use source::{
    CycleUpdate, FeedOptions, HttpSource, SimulatedSource, TelemetryFeed, TelemetrySource,
};
pub use updater::{DashboardUpdater, OverlayUpdater, ViewUpdater};
