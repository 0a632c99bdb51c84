//! Telemetry sources and the poll loop that drives them.
//!
//! A [`TelemetrySource`] is anything that can answer the backend's three
//! requests. [`HttpSource`] talks to the real API; [`SimulatedSource`]
//! produces plausible values in-process for demos and offline work.
//! [`TelemetryFeed`] runs one source on a fixed interval and hands
//! completed cycles to a consumer.

mod feed;
mod http;
mod simulate;
pub mod wire;

pub use feed::{fetch_cycle, CycleUpdate, FeedOptions, TelemetryFeed, DEFAULT_INTERVAL};
pub use http::HttpSource;
pub use simulate::{Scenario, SimulatedSource};
pub use wire::{RawPayload, WireReading};

use std::fmt::Debug;

use async_trait::async_trait;

use crate::data::Thresholds;
use crate::error::TelemetryError;

/// Trait for the backend operations the dashboard needs.
///
/// Implementations perform no retries; the feed's next tick is the retry.
/// Every failure is returned as a [`TelemetryError`], never a panic.
#[async_trait]
pub trait TelemetrySource: Send + Sync + Debug {
    /// Fetch the most recent `limit` readings as an undecoded payload.
    async fn fetch_latest_reading(&self, limit: u32) -> Result<RawPayload, TelemetryError>;

    /// Fetch the backend's current thresholds.
    async fn fetch_thresholds(&self) -> Result<Thresholds, TelemetryError>;

    /// Replace the backend's thresholds.
    async fn write_thresholds(&self, thresholds: &Thresholds) -> Result<(), TelemetryError>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the TUI header.
    fn description(&self) -> &str;
}
