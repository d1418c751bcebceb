// Stress chart component
//
// Sparkline of stress levels over time, oldest on the left. The store
// keeps records newest first, so the series is reversed before display.

use super::band_color;
use crate::record::{DreamRecord, STRESS_MAX};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph, Sparkline},
    Frame,
};

pub struct StressChart;

impl StressChart {
    pub fn render(f: &mut Frame, area: Rect, records: &[DreamRecord]) {
        if records.is_empty() {
            Self::render_placeholder(f, area);
            return;
        }

        let data: Vec<u64> = records
            .iter()
            .rev()
            .map(|record| record.stress_level as u64)
            .collect();

        let latest = records[0].stress_level;
        let avg = data.iter().sum::<u64>() as f64 / data.len() as f64;
        let max = data.iter().max().copied().unwrap_or(0);

        let title = format!(
            " Stress Trend (Latest: {latest}/{STRESS_MAX}, Avg: {avg:.1}, Max: {max}) "
        );

        let sparkline = Sparkline::default()
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(title)
                    .border_style(Style::default().fg(Color::DarkGray)),
            )
            .data(&data)
            .max(STRESS_MAX as u64)
            .style(Style::default().fg(band_color(records[0].band())));

        f.render_widget(sparkline, area);
    }

    fn render_placeholder(f: &mut Frame, area: Rect) {
        let placeholder = Paragraph::new("No data yet")
            .style(Style::default().fg(Color::DarkGray))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Stress Trend ")
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(placeholder, area);
    }
}
