use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Wrap},
    Frame,
};

use crate::models::Verse;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, verse: &Verse, loading: bool, manual: bool) {
    let mut title = vec![Span::styled(" Verse ", theme::gold())];
    if manual {
        title.push(Span::styled("[v] next ", theme::dim()));
    }

    let block = Block::default()
        .title(Line::from(title))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let text = if loading {
        vec![Line::from(Span::styled("Loading...", theme::dim()))]
    } else {
        vec![
            Line::from(Span::styled(
                verse.arabic.as_str(),
                theme::gold().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(Span::styled(verse.translation.as_str(), theme::bold())),
            Line::from(""),
            Line::from(Span::styled(format!("· {} ·", verse.reference), theme::amber())),
        ]
    };

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });
    frame.render_widget(paragraph, area);
}
