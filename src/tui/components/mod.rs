// Components module - reusable UI building blocks
//
// Shell components are rendered in every view:
// - Title bar: App name, view tabs, loading indicator
// - Status bar: Record count, average stress, latest log line
//
// View components render the domain:
// - Analysis card: One record's full reading
// - Stress chart: Sparkline of stress levels over time
// - Timeline: Selectable, searchable history list
//
// Each component is a focused, single-responsibility module.

pub mod analysis_card;
pub mod status_bar;
pub mod stress_chart;
pub mod timeline;
pub mod title_bar;
pub mod toast;

use crate::record::StressBand;
use ratatui::style::Color;

/// Band color shared by the card, chart and timeline
pub fn band_color(band: StressBand) -> Color {
    match band {
        StressBand::Low => Color::Green,
        StressBand::Moderate => Color::Yellow,
        StressBand::High => Color::Red,
    }
}
