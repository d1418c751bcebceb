// History view
//
// Search bar on top, the full stress chart under it, then the timeline.
// The chart always reflects the whole history; only the timeline is
// narrowed by the search term.

use crate::tui::app::App;
use crate::tui::components::{stress_chart::StressChart, timeline::Timeline};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // search bar
            Constraint::Length(7), // stress chart
            Constraint::Min(5),    // timeline
        ])
        .split(area);

    render_search(f, chunks[0], app);
    StressChart::render(f, chunks[1], &app.records);
    Timeline::render(f, chunks[2], app);
}

fn render_search(f: &mut Frame, area: Rect, app: &App) {
    let (border, text) = if app.search_focused {
        (Color::Yellow, format!("{}█", app.search))
    } else if app.search.is_empty() {
        (Color::DarkGray, "press / to search".to_string())
    } else {
        (Color::DarkGray, app.search.clone())
    };

    let style = if app.search.is_empty() && !app.search_focused {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    let search = Paragraph::new(text).style(style).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search ")
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(search, area);
}
