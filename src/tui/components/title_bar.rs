// Title bar component
//
// App name, the two view tabs with their hotkeys, and a spinner while a
// submission is in flight.

use crate::config::VERSION;
use crate::tui::app::{App, View};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let tab = |view: View, key: &'static str| {
        let style = if app.view == view {
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        Span::styled(format!(" [{key}] {} ", view.name()), style)
    };

    let mut spans = vec![
        Span::styled(
            format!(" oneiro v{VERSION} "),
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        ),
        Span::raw("│"),
        tab(View::Home, "F1"),
        tab(View::History, "F2"),
    ];

    if app.loading {
        let frame = SPINNER_FRAMES[app.tick_frame % SPINNER_FRAMES.len()];
        spans.push(Span::styled(
            format!("│ {frame} analyzing... "),
            Style::default().fg(Color::Yellow),
        ));
    }

    let title = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(title, area);
}
