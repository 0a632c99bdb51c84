use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};

use crate::app::{App, EXPORT_PATH};

/// Poll for events with a timeout
pub fn poll_event(timeout: Duration) -> Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

/// Handle a key event
pub fn handle_key_event(app: &mut App, key: KeyEvent) {
    // The write acknowledgment blocks everything until dismissed
    if app.acknowledgment.is_some() {
        app.dismiss_acknowledgment();
        return;
    }

    // If help is shown, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    if app.editor.is_some() {
        handle_editor_input(app, key);
        return;
    }

    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => app.quit(),

        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char('o') => app.toggle_overlay(),
        KeyCode::Char('r') => app.refresh(),
        KeyCode::Char('t') => app.open_editor(),

        // Export
        KeyCode::Char('e') => {
            let export_path = PathBuf::from(EXPORT_PATH);
            match app.export_state(&export_path) {
                Ok(()) => {
                    app.set_status_message(format!("Exported to {}", export_path.display()));
                }
                Err(e) => {
                    app.set_status_message(format!("Export failed: {}", e));
                }
            }
        }

        _ => {}
    }
}

/// Handle key input while the threshold editor is open
fn handle_editor_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => app.close_editor(),
        KeyCode::Enter => app.submit_editor(),
        _ => {
            let Some(editor) = app.editor.as_mut() else {
                return;
            };
            match key.code {
                KeyCode::Tab | KeyCode::Down => editor.focus_next(),
                KeyCode::BackTab | KeyCode::Up => editor.focus_prev(),
                KeyCode::Backspace => editor.pop(),
                KeyCode::Char(c) => editor.push(c),
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::HistoryBuffer;
    use crate::editor::Field;
    use crate::source::{SimulatedSource, TelemetryFeed};
    use std::sync::Arc;

    fn app() -> App {
        let (_, dashboard) = TelemetryFeed::create("dashboard");
        let (_, overlay) = TelemetryFeed::create("overlay");
        App::new(Arc::new(SimulatedSource::new()), dashboard, overlay, HistoryBuffer::new())
    }

    fn press(app: &mut App, code: KeyCode) {
        handle_key_event(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    #[test]
    fn test_quit_and_toggles() {
        let mut app = app();
        press(&mut app, KeyCode::Char('o'));
        assert!(!app.show_overlay);

        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        // Any key closes help without acting on it
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(app.running);

        press(&mut app, KeyCode::Char('q'));
        assert!(!app.running);
    }

    #[test]
    fn test_editor_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Char('t'));
        assert!(app.editor.is_some());

        press(&mut app, KeyCode::Tab);
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Char('5'));
        // 'q' is not numeric and must not quit while editing
        press(&mut app, KeyCode::Char('q'));
        assert!(app.running);

        let editor = app.editor.as_ref().unwrap();
        assert_eq!(editor.focus(), Field::HumidityMin);
        assert_eq!(editor.value(Field::HumidityMin), "45");

        press(&mut app, KeyCode::Esc);
        assert!(app.editor.is_none());
    }

    #[test]
    fn test_export_without_data_reports_failure() {
        let mut app = app();
        press(&mut app, KeyCode::Char('e'));
        assert!(app.get_status_message().unwrap().starts_with("Export failed"));
    }
}
