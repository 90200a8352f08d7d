use chrono::NaiveDate;
use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    date: NaiveDate,
    hijri: Option<&str>,
    location: &str,
) {
    let gregorian_str = date.format("%A, %b %d, %Y").to_string();

    let title_line = Line::from(vec![
        Span::styled("  ميقات  ", theme::gold().add_modifier(Modifier::BOLD)),
        Span::styled("miqat", theme::gold()),
    ]);

    let mut date_spans = Vec::new();
    if let Some(hijri) = hijri {
        date_spans.push(Span::styled(hijri, theme::amber()));
        date_spans.push(Span::styled("  ·  ", theme::dim()));
    }
    date_spans.push(Span::styled(gregorian_str, theme::dim()));

    let location_line = Line::from(vec![
        Span::styled("⌖ ", theme::gold()),
        Span::styled(location, theme::dim()),
    ]);

    let text = vec![title_line, Line::from(date_spans), location_line];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD));

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
