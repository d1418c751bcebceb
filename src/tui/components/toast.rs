//! Toast notification component
//!
//! A non-blocking overlay for short confirmations ("Record deleted",
//! "Copied to clipboard"). Renders in the bottom-right corner on top of
//! all other content; expiry is handled by the app tick.

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Style},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

/// Render a toast message in the bottom-right corner
pub fn render(f: &mut Frame, area: Rect, message: &str) {
    let width = (message.len() as u16 + 4).min(area.width.saturating_sub(4));
    let height = 3; // 1 line of text + 2 for borders

    let x = area.right().saturating_sub(width + 2);
    let y = area.bottom().saturating_sub(height + 2);
    let toast_area = Rect::new(x, y, width, height);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    let text = Paragraph::new(message)
        .alignment(Alignment::Center)
        .block(block);

    // Clear the area first so the toast appears on top
    f.render_widget(Clear, toast_area);
    f.render_widget(text, toast_area);
}
