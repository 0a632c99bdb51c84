//! Theme configuration for the TUI.
//!
//! Supports light and dark themes with automatic terminal detection.

use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::block::BorderType;

use crate::data::{AirBand, AlertLevel, MetricStatus};

/// Color and style theme for the TUI.
///
/// Use [`Theme::auto_detect()`] for automatic theme selection based on
/// terminal background, or [`Theme::dark()`]/[`Theme::light()`] explicitly.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Accent color for highlights and active elements.
    pub highlight: Color,
    /// Color for values within limits and good air.
    pub normal: Color,
    /// Color for moderate air.
    pub moderate: Color,
    /// Color for alerts and poor air.
    pub alert: Color,
    /// Color for borders of cards without a status.
    pub border: Color,
    /// Style for titles.
    pub header: Style,
    /// Style for the focused editor field.
    pub selected: Style,
    /// Chart series colors: temperature, humidity, light, faces.
    pub series: [Color; 4],
    /// Border style (rounded, plain, etc.).
    pub border_type: BorderType,
}

impl Theme {
    /// Create a dark theme suitable for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            highlight: Color::Cyan,
            normal: Color::Green,
            moderate: Color::Yellow,
            alert: Color::Red,
            border: Color::Gray,
            header: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD),
            series: [Color::LightRed, Color::LightBlue, Color::Yellow, Color::Magenta],
            border_type: BorderType::Rounded,
        }
    }

    /// Create a light theme suitable for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            highlight: Color::Blue,
            normal: Color::Green,
            moderate: Color::Yellow,
            alert: Color::Red,
            border: Color::DarkGray,
            header: Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
            selected: Style::default().bg(Color::LightBlue).add_modifier(Modifier::BOLD),
            series: [Color::Red, Color::Blue, Color::Rgb(184, 134, 11), Color::Magenta],
            border_type: BorderType::Rounded,
        }
    }

    /// Auto-detect based on terminal background
    pub fn auto_detect() -> Self {
        match terminal_light::luma() {
            Ok(luma) if luma > 0.5 => Self::light(),
            _ => Self::dark(),
        }
    }

    /// Get style for an alert level
    pub fn level_style(&self, level: AlertLevel) -> Style {
        match level {
            AlertLevel::Normal => Style::default().fg(self.normal),
            AlertLevel::Alert => Style::default().fg(self.alert).add_modifier(Modifier::BOLD),
        }
    }

    /// Style for a metric's status; dimmed when there is none.
    pub fn status_style(&self, status: Option<MetricStatus>) -> Style {
        match status {
            Some(status) => self.level_style(status.level),
            None => Style::default().add_modifier(Modifier::DIM),
        }
    }

    /// Color for an air-quality band.
    pub fn band_color(&self, band: Option<AirBand>) -> Color {
        match band {
            Some(AirBand::Good) => self.normal,
            Some(AirBand::Moderate) => self.moderate,
            Some(AirBand::Poor) => self.alert,
            None => self.border,
        }
    }
}
