// Timeline component
//
// The history list: one row per record, newest first, narrowed by the
// search term. Renders from the filtered index list the app computes so
// selection and display always agree.

use super::band_color;
use crate::record::STRESS_MAX;
use crate::tui::app::App;
use crate::util::{clip_width, one_line};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

pub struct Timeline;

impl Timeline {
    pub fn render(f: &mut Frame, area: Rect, app: &App) {
        let indices = app.filtered_indices();

        let title = if app.search.is_empty() {
            format!(" Timeline ({}) ", indices.len())
        } else {
            format!(" Timeline ({} of {}) ", indices.len(), app.records.len())
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .title(title)
            .border_style(Style::default().fg(Color::DarkGray));

        if indices.is_empty() {
            let message = if app.records.is_empty() {
                "No dreams recorded yet. Press F1 and describe one."
            } else {
                "No records match the search."
            };
            let placeholder = Paragraph::new(message)
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            f.render_widget(placeholder, area);
            return;
        }

        // Leave room for borders, the stress tag and the date column
        let content_width = area.width.saturating_sub(30) as usize;

        let items: Vec<ListItem> = indices
            .iter()
            .map(|&i| {
                let record = &app.records[i];
                let color = band_color(record.band());
                let line = Line::from(vec![
                    Span::styled(
                        format!("{:>2}/{} ", record.stress_level, STRESS_MAX),
                        Style::default().fg(color),
                    ),
                    Span::raw(clip_width(&one_line(&record.dream_content), content_width)),
                    Span::styled(
                        format!("  {}", record.date_str),
                        Style::default().fg(Color::DarkGray),
                    ),
                ]);
                ListItem::new(line)
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▶ ");

        let mut state = ListState::default();
        state.select(Some(app.selected.min(indices.len() - 1)));
        f.render_stateful_widget(list, area, &mut state);
    }
}
