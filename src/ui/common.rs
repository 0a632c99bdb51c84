//! Common UI components.
//!
//! This module contains the header bar, status bar, help overlay and the
//! threshold-write acknowledgment modal.

use chrono::{Local, Utc};
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::duration::format_age;
use crate::data::AlertLevel;

/// Render the header bar.
///
/// Displays: alert indicator, source, LED state, active thresholds.
pub fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.view();

    let level = if view.any_alert {
        AlertLevel::Alert
    } else {
        AlertLevel::Normal
    };
    let indicator = if view.reading_time.is_some() {
        Span::styled(" ● ", app.theme.level_style(level))
    } else {
        Span::styled(" ○ ", Style::default().add_modifier(Modifier::DIM))
    };

    let t = &view.thresholds;
    let line = Line::from(vec![
        indicator,
        Span::styled("SENSORWATCH ", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!("│ {} │ LED ", app.source_description())),
        Span::styled(view.led.label(), Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(
            format!(
                " │ T≤{} H≥{} L≥{}",
                t.temp_max, t.humidity_min, t.light_min
            ),
            Style::default().add_modifier(Modifier::DIM),
        ),
    ]);

    frame.render_widget(Paragraph::new(line), area);
}

/// Render the status bar at the bottom.
///
/// Shows a temporary status message if one is active, otherwise the age of
/// the last update and the available controls.
pub fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = app.get_status_message() {
        let paragraph =
            Paragraph::new(format!(" {} ", msg)).style(Style::default().fg(app.theme.highlight));
        frame.render_widget(paragraph, area);
        return;
    }

    let controls = "t:thresholds r:refresh o:overlay e:export ?:help q:quit";

    let status = if app.write_pending() {
        format!(" Updating thresholds... | {}", controls)
    } else if let Some(updated) = app.dashboard.last_updated() {
        let age = (Utc::now() - updated).to_std().unwrap_or_default();
        format!(
            " Updated {} ({} ago) | {}",
            updated.with_timezone(&Local).format("%H:%M:%S"),
            format_age(age),
            controls
        )
    } else {
        format!(" Waiting for data... | {}", controls)
    };

    let paragraph = Paragraph::new(status).style(Style::default().add_modifier(Modifier::DIM));
    frame.render_widget(paragraph, area);
}

/// Center a box of at most `width` x `height` in `area`.
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(2));
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}

/// Render the help overlay with keyboard shortcuts.
///
/// Displayed as a centered modal on top of the dashboard.
pub fn render_help(frame: &mut Frame, app: &App, area: Rect) {
    let help_text = vec![
        Line::from(vec![Span::styled("Keyboard Shortcuts", app.theme.header)]),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Dashboard",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  t         Edit thresholds"),
        Line::from("  r         Refresh now"),
        Line::from("  o         Show/hide overlay widget"),
        Line::from("  e         Export to JSON"),
        Line::from("  q         Quit"),
        Line::from(""),
        Line::from(vec![Span::styled(
            " Threshold editor",
            Style::default().add_modifier(Modifier::BOLD),
        )]),
        Line::from("  Tab/↓     Next field"),
        Line::from("  S-Tab/↑   Previous field"),
        Line::from("  Enter     Save"),
        Line::from("  Esc       Cancel"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press any key to close",
            Style::default().add_modifier(Modifier::DIM),
        )]),
    ];

    let block = Block::default()
        .title(" Help ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let paragraph = Paragraph::new(help_text).block(block);

    let help_area = centered(area, 42, 19);

    frame.render_widget(Clear, help_area);
    frame.render_widget(paragraph, help_area);
}

/// Render the result of a threshold write.
pub fn render_acknowledgment(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref ack) = app.acknowledgment else {
        return;
    };

    let color = if ack.success {
        app.theme.normal
    } else {
        app.theme.alert
    };
    let title = if ack.success { " Saved " } else { " Error " };

    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            ack.message.as_str(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Press any key to continue",
            Style::default().add_modifier(Modifier::DIM),
        )),
    ];

    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(color));

    let width = (ack.message.chars().count() as u16 + 6).max(30);
    let ack_area = centered(area, width, 6);

    frame.render_widget(Clear, ack_area);
    frame.render_widget(
        Paragraph::new(text).block(block).alignment(Alignment::Center),
        ack_area,
    );
}
