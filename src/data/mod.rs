//! Data models and processing for sensor readings.
//!
//! This module turns raw backend payloads into classified, display-ready
//! state. Nothing here performs I/O.
//!
//! ## Submodules
//!
//! - [`reading`]: Canonical [`Reading`], [`Thresholds`] and the [`ThresholdStore`] mirror
//! - [`normalize`]: Reconciles the two accepted payload shapes into one [`Reading`]
//! - [`history`]: Rolling [`HistoryBuffer`] feeding the chart and sparklines
//! - [`classify`]: Per-metric alert classification and air-quality bands
//! - [`view`]: Pure view-model builders for the dashboard and overlay
//! - [`duration`]: Parsing of interval strings (e.g., "3s", "500ms")
//!
//! ## Data Flow
//!
//! ```text
//! RawPayload (JSON)
//!        │
//!        ▼
//! normalize::normalize()
//!        │
//!        ├──▶ HistoryBuffer::push()
//!        │
//!        └──▶ classify::classify() (with Thresholds from ThresholdStore)
//!                    │
//!                    ▼
//!            view::dashboard_view() / view::overlay_view()
//! ```

pub mod classify;
pub mod duration;
pub mod history;
pub mod normalize;
pub mod reading;
pub mod view;

pub use classify::{classify, AirBand, AlertLevel, Classification, MetricStatus};
pub use history::{ChartData, HistoryBuffer, Series, HISTORY_CAPACITY};
pub use normalize::{normalize, PayloadShape};
pub use reading::{Reading, ThresholdStore, Thresholds};
pub use view::{dashboard_view, overlay_view, DashboardView, LedState, MetricCard, OverlayView};
