//! Threshold editor modal.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::common::centered;
use crate::app::App;
use crate::editor::Field;

/// Render the editor as a centered modal.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let Some(ref editor) = app.editor else {
        return;
    };

    let mut text = vec![Line::from("")];
    for field in Field::ALL {
        let focused = editor.focus() == field;
        let value = editor.value(field);
        let shown = if value.is_empty() && field.optional() {
            "(default)".to_string()
        } else if focused {
            format!("{}_", value)
        } else {
            value.to_string()
        };

        let value_style = if focused {
            app.theme.selected
        } else if value.is_empty() {
            Style::default().add_modifier(Modifier::DIM)
        } else {
            Style::default()
        };

        text.push(Line::from(vec![
            Span::raw(format!("  {:<22}", field.label())),
            Span::styled(format!(" {:<12}", shown), value_style),
        ]));
    }
    text.push(Line::from(""));
    text.push(Line::from(Span::styled(
        "  Tab:next  Enter:save  Esc:cancel",
        Style::default().add_modifier(Modifier::DIM),
    )));

    let block = Block::default()
        .title(" Thresholds ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.highlight));

    let editor_area = centered(area, 44, 10);

    frame.render_widget(Clear, editor_area);
    frame.render_widget(Paragraph::new(text).block(block), editor_area);
}
