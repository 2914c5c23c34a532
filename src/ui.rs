use ratatui::{prelude::*, widgets::*};

use crate::models::Screen;

/// Status text color for a screen
pub fn status_color(screen: Screen) -> Color {
    match screen {
        Screen::Upload => Color::Cyan,
        Screen::Processing => Color::Yellow,
        Screen::Complete => Color::Green,
        Screen::Error => Color::Red,
    }
}

/// Progress bar for the processing screen
pub fn render_progress(percent: u16) -> Gauge<'static> {
    Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Progress "))
        .gauge_style(Style::default().fg(Color::Cyan).bg(Color::Black))
        .percent(percent.min(100))
        .label(format!("{}%", percent.min(100)))
}

/// The tail of the processing log that fits in `height` rows
pub fn log_lines(log: &[String], height: u16) -> Vec<Line<'static>> {
    let visible = height as usize;
    let start = log.len().saturating_sub(visible);
    log[start..]
        .iter()
        .map(|entry| Line::from(Span::styled(entry.clone(), Style::default().fg(Color::Gray))))
        .collect()
}

/// A key hint like `[p] play`
pub fn key_hint<'a>(key: &'a str, label: &'a str) -> Vec<Span<'a>> {
    vec![
        Span::styled(format!("[{}]", key), Style::default().fg(Color::Yellow).bold()),
        Span::raw(format!(" {}  ", label)),
    ]
}

/// Rect of the given percentage size centered in `r`
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
