// Analysis card component
//
// Renders one record in full: date header, the dream text, a colored
// stress meter, the interpretation and the advice. This is the payoff
// screen after a submission, and also what Enter opens from the timeline.

use super::band_color;
use crate::record::{DreamRecord, STRESS_MAX};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub struct AnalysisCard;

impl AnalysisCard {
    pub fn render(f: &mut Frame, area: Rect, record: &DreamRecord) {
        let outer = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", record.date_str))
            .border_style(Style::default().fg(Color::Cyan));
        let inner = outer.inner(area);
        f.render_widget(outer, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Percentage(30), // dream text
                Constraint::Length(1),      // stress meter
                Constraint::Percentage(40), // analysis
                Constraint::Min(3),         // advice
            ])
            .split(inner);

        let dream = Paragraph::new(record.dream_content.as_str())
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::BOTTOM).title(" Dream "));
        f.render_widget(dream, chunks[0]);

        f.render_widget(Self::stress_meter(record), chunks[1]);

        let analysis = Paragraph::new(record.analysis.as_str())
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::BOTTOM).title(" Analysis "));
        f.render_widget(analysis, chunks[2]);

        let advice = Paragraph::new(record.advice.as_str())
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(Color::Green))
            .block(Block::default().borders(Borders::NONE).title(" Advice "));
        f.render_widget(advice, chunks[3]);
    }

    /// One-line meter: filled blocks up to the stress level, band label,
    /// and a hint when an illustration is attached.
    fn stress_meter(record: &DreamRecord) -> Paragraph<'_> {
        let color = band_color(record.band());
        let filled = "█".repeat(record.stress_level.min(STRESS_MAX) as usize);
        let empty = "░".repeat(STRESS_MAX.saturating_sub(record.stress_level) as usize);

        let mut spans = vec![
            Span::raw(" Stress "),
            Span::styled(filled, Style::default().fg(color)),
            Span::styled(empty, Style::default().fg(Color::DarkGray)),
            Span::styled(
                format!(" {}/{} {}", record.stress_level, STRESS_MAX, record.band().label()),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
        ];

        if record.image_url.is_some() {
            spans.push(Span::styled(
                "  [x] export illustration",
                Style::default().fg(Color::DarkGray),
            ));
        }

        Paragraph::new(Line::from(spans))
    }
}
