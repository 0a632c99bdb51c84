//! Dashboard view rendering.
//!
//! Displays one card per metric (value, status label and a sparkline of
//! the recent history) above a line chart of the history buffer.

use ratatui::{
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph},
    Frame,
};

use crate::app::App;
use crate::data::{LedState, MetricCard, Series};

/// Sparkline characters (8 levels of height).
const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Render the full dashboard into `area`.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(5), // Cards
        Constraint::Min(6),    // Chart
    ])
    .split(area);

    render_cards(frame, app, chunks[0]);
    render_chart(frame, app, chunks[1]);
}

fn render_cards(frame: &mut Frame, app: &App, area: Rect) {
    let view = app.view();
    let columns = Layout::horizontal([
        Constraint::Ratio(1, 5),
        Constraint::Ratio(1, 5),
        Constraint::Ratio(1, 5),
        Constraint::Ratio(1, 5),
        Constraint::Ratio(1, 5),
    ])
    .split(area);

    let history = app.dashboard.history();
    let cards = [
        (&view.temperature, Series::Temperature),
        (&view.humidity, Series::Humidity),
        (&view.light, Series::Light),
        (&view.faces, Series::Faces),
    ];

    for (i, (card, series)) in cards.into_iter().enumerate() {
        let sparkline = render_sparkline(&history.sparkline(series));
        render_card(frame, app, columns[i], card, sparkline);
    }

    render_led(frame, app, columns[4], view.led);
}

fn render_card(frame: &mut Frame, app: &App, area: Rect, card: &MetricCard, sparkline: String) {
    let style = app.theme.status_style(card.status);
    let label = match card.status {
        Some(status) => status.label,
        None if card.measured => "",
        None => "not measured",
    };

    let value = if card.unit.is_empty() {
        card.value.clone()
    } else {
        format!("{} {}", card.value, card.unit)
    };

    let text = vec![
        Line::from(Span::styled(value, Style::default().add_modifier(Modifier::BOLD))),
        Line::from(Span::styled(label, style)),
        Line::from(Span::styled(sparkline, Style::default().fg(app.theme.highlight))),
    ];

    let border = match card.status {
        Some(_) => style,
        None => Style::default().fg(app.theme.border),
    };
    let block = Block::default()
        .title(format!(" {} ", card.name))
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(border);

    frame.render_widget(Paragraph::new(text).block(block), area);
}

fn render_led(frame: &mut Frame, app: &App, area: Rect, led: LedState) {
    let style = match led {
        LedState::On => Style::default().fg(app.theme.moderate).add_modifier(Modifier::BOLD),
        LedState::Off => Style::default(),
        LedState::Unknown => Style::default().add_modifier(Modifier::DIM),
    };

    let block = Block::default()
        .title(" LED ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(led.label(), style))).block(block),
        area,
    );
}

fn render_chart(frame: &mut Frame, app: &App, area: Rect) {
    let chart_data = &app.view().chart;

    let points: Vec<Vec<(f64, f64)>> = Series::ALL
        .iter()
        .map(|&series| {
            chart_data
                .values(series)
                .iter()
                .enumerate()
                .map(|(i, &v)| (i as f64, v))
                .collect()
        })
        .collect();

    let datasets: Vec<Dataset> = Series::ALL
        .iter()
        .zip(points.iter())
        .zip(app.theme.series.iter())
        .map(|((series, data), &color)| {
            Dataset::default()
                .name(series.label())
                .marker(symbols::Marker::Braille)
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color))
                .data(data)
        })
        .collect();

    let (y_min, y_max) = y_bounds(points.iter().flatten().map(|&(_, v)| v));
    let x_max = chart_data.labels.len().saturating_sub(1).max(1) as f64;

    let x_labels: Vec<Line> = match (chart_data.labels.first(), chart_data.labels.last()) {
        (Some(first), Some(last)) => vec![Line::from(first.as_str()), Line::from(last.as_str())],
        _ => Vec::new(),
    };

    let block = Block::default()
        .title(" History ")
        .borders(Borders::ALL)
        .border_type(app.theme.border_type)
        .border_style(Style::default().fg(app.theme.border));

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(Axis::default().bounds([0.0, x_max]).labels(x_labels))
        .y_axis(
            Axis::default()
                .bounds([y_min, y_max])
                .labels(vec![
                    Line::from(format!("{:.0}", y_min)),
                    Line::from(format!("{:.0}", y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}

/// Bounds covering every value with a little headroom.
fn y_bounds(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !min.is_finite() || !max.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((max - min) * 0.1).max(1.0);
    ((min - pad).min(0.0), max + pad)
}

fn render_sparkline(data: &[u8]) -> String {
    if data.is_empty() {
        return String::new();
    }

    // Take the last 16 values
    let values: Vec<u8> = data.iter().rev().take(16).rev().copied().collect();

    values.iter().map(|&v| SPARKLINE_CHARS[v.min(7) as usize]).collect()
}
