// Status bar component
//
// Bottom line: record count, average stress across the history, the
// keys that matter in the current view, and the latest log entry.

use crate::tui::app::{App, View};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let stats = if app.records.is_empty() {
        " 0 dreams".to_string()
    } else {
        let avg = app
            .records
            .iter()
            .map(|r| r.stress_level as f64)
            .sum::<f64>()
            / app.records.len() as f64;
        format!(" {} dreams │ avg stress {avg:.1}", app.records.len())
    };

    let keys = match app.view {
        View::Home if app.current.is_some() => " │ n new │ e edit │ d delete │ y copy │ ? help",
        View::Home => " │ Enter submit │ ? help",
        View::History => " │ / search │ Enter open │ e edit │ d delete │ ? help",
    };

    let mut spans = vec![
        Span::styled(stats, Style::default().fg(Color::DarkGray)),
        Span::styled(keys, Style::default().fg(Color::DarkGray)),
    ];

    // Surface the newest captured log line so diagnostics are visible
    // without leaving the alternate screen
    if let Some(entry) = app.log_buffer.latest() {
        let color = match entry.level {
            crate::logging::LogLevel::Error => Color::Red,
            crate::logging::LogLevel::Warn => Color::Yellow,
            _ => Color::DarkGray,
        };
        spans.push(Span::styled(
            format!(" │ {} {}", entry.level.as_str(), entry.message),
            Style::default().fg(color),
        ));
    }

    let status = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::TOP));
    f.render_widget(status, area);
}
