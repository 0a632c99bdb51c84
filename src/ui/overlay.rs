//! Floating overlay widget.
//!
//! A compact box pinned to the bottom-right corner showing the latest
//! values from the overlay's own feed. The border takes the color of the
//! air-quality band.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::view::PLACEHOLDER;

const WIDTH: u16 = 28;
const HEIGHT: u16 = 8;

/// Render the overlay widget over the bottom-right of `area`.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    if area.width < WIDTH + 2 || area.height < HEIGHT + 2 {
        return;
    }

    let view = app.overlay.view();
    let band_color = app.theme.band_color(view.air_band);

    let air = match view.air_band {
        Some(band) => format!("{} ({})", view.air_quality, band.label()),
        None => view.air_quality.clone(),
    };

    let row = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:<10}", label), Style::default().add_modifier(Modifier::DIM)),
            Span::raw(value),
        ])
    };

    let text = vec![
        row("Temp", format!("{} °C", view.temperature)),
        row("Humidity", format!("{} %", view.humidity)),
        Line::from(vec![
            Span::styled(format!("{:<10}", "Air"), Style::default().add_modifier(Modifier::DIM)),
            Span::styled(air, Style::default().fg(band_color)),
        ]),
        row("LED", view.led.label().to_string()),
        faces_row(view.faces.clone(), view.faces_measured),
        row("Time", view.time.clone()),
    ];

    let block = Block::default()
        .title(" Live ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(band_color));

    let x = area.x + area.width - WIDTH - 1;
    let y = area.y + area.height - HEIGHT - 1;
    let widget_area = Rect::new(x, y, WIDTH, HEIGHT);

    frame.render_widget(Clear, widget_area);
    frame.render_widget(Paragraph::new(text).block(block), widget_area);
}

/// The face count, dimmed and marked when the reading carried none.
fn faces_row(value: String, measured: bool) -> Line<'static> {
    let label = Span::styled(format!("{:<10}", "Faces"), Style::default().add_modifier(Modifier::DIM));
    if measured || value == PLACEHOLDER {
        Line::from(vec![label, Span::raw(value)])
    } else {
        Line::from(vec![
            label,
            Span::styled(
                format!("{} (n/a)", value),
                Style::default().add_modifier(Modifier::DIM),
            ),
        ])
    }
}
