// Home view
//
// Two faces: with no current record it is the dream composer (a text
// box plus a small recent-trend preview), with one it shows the full
// analysis card. Submission failures render as a banner above the
// composer so the text stays put for a retry.

use super::render_error_banner;
use crate::tui::app::App;
use crate::tui::components::{analysis_card::AnalysisCard, stress_chart::StressChart};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Recent records shown in the composer's trend preview
const PREVIEW_LEN: usize = 7;

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    if let Some(record) = &app.current {
        AnalysisCard::render(f, area, record);
        return;
    }

    let mut constraints = vec![Constraint::Min(6), Constraint::Length(6)];
    if app.error.is_some() {
        constraints.insert(0, Constraint::Length(3));
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(area);

    let mut next = 0;
    if let Some(error) = &app.error {
        render_error_banner(f, chunks[next], error);
        next += 1;
    }

    render_composer(f, chunks[next], app);
    render_preview(f, chunks[next + 1], app);
}

fn render_composer(f: &mut Frame, area: Rect, app: &App) {
    let (title, border) = if app.loading {
        (" Describe your dream (analyzing...) ", Color::Yellow)
    } else {
        (" Describe your dream (Enter to submit) ", Color::Cyan)
    };

    // A trailing marker stands in for a real cursor
    let text = if app.loading {
        app.input.clone()
    } else {
        format!("{}█", app.input)
    };

    let composer = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(composer, area);
}

fn render_preview(f: &mut Frame, area: Rect, app: &App) {
    let recent = &app.records[..app.records.len().min(PREVIEW_LEN)];
    StressChart::render(f, area, recent);
}
