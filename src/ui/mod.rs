//! Terminal rendering.
//!
//! Every widget here lays out a view model computed elsewhere; no
//! classification or formatting decisions are made in this module.

pub mod common;
pub mod dashboard;
pub mod editor;
pub mod overlay;
pub mod theme;

pub use theme::Theme;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;

/// Minimum terminal size for a usable display.
pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 14;

/// Draw one frame.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = format!(
            "Terminal too small: {}x{}\nMinimum: {}x{}\n\nResize to continue",
            area.width, area.height, MIN_WIDTH, MIN_HEIGHT
        );
        let paragraph = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(Color::Yellow));
        let centered = Rect::new(0, (area.height / 2).saturating_sub(2), area.width, 5.min(area.height));
        frame.render_widget(paragraph, centered);
        return;
    }

    let chunks = Layout::vertical([
        Constraint::Length(1), // Header bar
        Constraint::Min(11),   // Dashboard
        Constraint::Length(1), // Status bar
    ])
    .split(area);

    common::render_header(frame, app, chunks[0]);
    dashboard::render(frame, app, chunks[1]);
    common::render_status_bar(frame, app, chunks[2]);

    if app.show_overlay {
        overlay::render(frame, app, chunks[1]);
    }

    if app.editor.is_some() {
        editor::render(frame, app, area);
    }

    if app.show_help {
        common::render_help(frame, app, area);
    }

    if app.acknowledgment.is_some() {
        common::render_acknowledgment(frame, app, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HistoryBuffer;
    use crate::source::{SimulatedSource, TelemetryFeed};
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn app() -> App {
        let (_, dashboard) = TelemetryFeed::create("dashboard");
        let (_, overlay) = TelemetryFeed::create("overlay");
        let mut app =
            App::new(Arc::new(SimulatedSource::new()), dashboard, overlay, HistoryBuffer::new());
        app.theme = Theme::dark();
        app
    }

    fn screen(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_renders_placeholders_before_data() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let app = app();
        terminal.draw(|frame| render(frame, &app)).unwrap();

        let text = screen(&terminal);
        assert!(text.contains("SENSORWATCH"));
        assert!(text.contains("Temperature"));
        assert!(text.contains("Waiting for data"));
        assert!(text.contains("Live"));
    }

    #[test]
    fn test_small_terminal_message() {
        let mut terminal = Terminal::new(TestBackend::new(40, 10)).unwrap();
        let app = app();
        terminal.draw(|frame| render(frame, &app)).unwrap();
        assert!(screen(&terminal).contains("Terminal too small"));
    }

    #[test]
    fn test_editor_modal_rendered() {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut app = app();
        app.open_editor();
        terminal.draw(|frame| render(frame, &app)).unwrap();
        assert!(screen(&terminal).contains("Thresholds"));
    }
}
