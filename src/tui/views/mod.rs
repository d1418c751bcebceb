// Views module - screen-level rendering logic
//
// Each view is a full-screen experience within the TUI:
// - Home: Dream composer, or the analysis card for the current record
// - History: Stress chart, search bar and the selectable timeline
//
// This module builds the shell layout (title bar, content, status bar),
// dispatches to the active view, then draws overlays on top.

mod history;
mod home;

use super::app::{App, View};
use super::modal::{EditField, Modal};
use crate::tui::components;
use crate::util::clip;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};
use ratatui::Frame;

/// Main UI render function - called on every frame
pub fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // title bar
            Constraint::Min(10),   // content
            Constraint::Length(2), // status bar
        ])
        .split(f.area());

    components::title_bar::render(f, chunks[0], app);

    match app.view {
        View::Home => home::render(f, chunks[1], app),
        View::History => history::render(f, chunks[1], app),
    }

    components::status_bar::render(f, chunks[2], app);

    if let Some(modal) = &app.modal {
        render_modal(f, modal);
    }

    if let Some(message) = app.toast_message() {
        components::toast::render(f, f.area(), message);
    }
}

// ───────────────────────────────────────────────────────────────────────
// Modal overlays
// ───────────────────────────────────────────────────────────────────────

fn render_modal(f: &mut Frame, modal: &Modal) {
    match modal {
        Modal::Help => render_help(f),
        Modal::ConfirmDelete { summary, .. } => render_confirm_delete(f, summary),
        Modal::Edit(buffer) => render_edit(f, buffer),
    }
}

fn render_help(f: &mut Frame) {
    let area = centered_rect(50, 60, f.area());

    let lines = vec![
        Line::from(Span::styled("Global", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  F1 / F2     switch view"),
        Line::from("  Ctrl+C      quit"),
        Line::from(""),
        Line::from(Span::styled("Dream view", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  Enter       submit the dream for analysis"),
        Line::from("  n           start a new dream"),
        Line::from("  e           edit the record on display"),
        Line::from("  d           delete the record on display"),
        Line::from("  y           copy the card to the clipboard"),
        Line::from("  x           export the illustration to disk"),
        Line::from(""),
        Line::from(Span::styled("History view", Style::default().add_modifier(Modifier::BOLD))),
        Line::from("  /           focus the search box (Esc to leave)"),
        Line::from("  j/k, ↑/↓    move the selection"),
        Line::from("  Enter       open the selected record"),
        Line::from("  e / d       edit / delete the selected record"),
        Line::from(""),
        Line::from(Span::styled("  Esc or ? to close", Style::default().fg(Color::DarkGray))),
    ];

    let help = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Help ")
            .border_style(Style::default().fg(Color::Cyan)),
    );

    f.render_widget(Clear, area);
    f.render_widget(help, area);
}

fn render_confirm_delete(f: &mut Frame, summary: &str) {
    let area = centered_rect(50, 20, f.area());

    let lines = vec![
        Line::from(""),
        Line::from(format!("  Delete \"{summary}\"?")),
        Line::from(""),
        Line::from(Span::styled(
            "  y/Enter confirm    n/Esc cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let confirm = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Confirm Delete ")
            .border_style(Style::default().fg(Color::Red)),
    );

    f.render_widget(Clear, area);
    f.render_widget(confirm, area);
}

fn render_edit(f: &mut Frame, buffer: &super::modal::EditBuffer) {
    let area = centered_rect(70, 70, f.area());

    let outer = Block::default()
        .borders(Borders::ALL)
        .title(" Edit Record (Tab: next field, Enter: save, Esc: discard) ")
        .border_style(Style::default().fg(Color::Yellow));
    let inner = outer.inner(area);
    f.render_widget(Clear, area);
    f.render_widget(outer, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(inner);

    for (i, field) in [EditField::Content, EditField::Analysis, EditField::Advice]
        .into_iter()
        .enumerate()
    {
        let active = buffer.field == field;
        let style = if active {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let text = match field {
            EditField::Content => buffer.record.dream_content.as_str(),
            EditField::Analysis => buffer.record.analysis.as_str(),
            EditField::Advice => buffer.record.advice.as_str(),
        };
        // A trailing marker stands in for a real cursor
        let shown = if active {
            format!("{text}█")
        } else {
            text.to_string()
        };

        let paragraph = Paragraph::new(shown).wrap(Wrap { trim: false }).block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", field.label()))
                .border_style(style),
        );
        f.render_widget(paragraph, chunks[i]);
    }
}

// ───────────────────────────────────────────────────────────────────────
// Shared helpers
// ───────────────────────────────────────────────────────────────────────

/// Centered rect helper for modal overlays
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
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

/// Error banner shared by both views
pub(crate) fn render_error_banner(f: &mut Frame, area: Rect, message: &str) {
    let banner = Paragraph::new(clip(message, area.width.saturating_sub(4) as usize))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::Red))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        );
    f.render_widget(banner, area);
}
