use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::models::{ClockFormat, Day};
use crate::prayer_times::NextPrayer;
use crate::tui::theme;
use crate::utils::format::{format_prayer_time, format_remaining};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    next_prayer: Option<NextPrayer>,
    now_minutes: u32,
    clock: ClockFormat,
) {
    let block = Block::default()
        .title(Span::styled(" Next Prayer ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let content: Vec<Line> = match next_prayer {
        None => vec![
            Line::from(""),
            Line::from(Span::styled("  No prayer times yet", theme::dim())),
        ],
        Some(next) => {
            let name = next.prayer.display_name().to_uppercase();
            let when = match next.day {
                Day::Today => format_prayer_time(next.time, clock),
                Day::Tomorrow => format!("{} tomorrow", format_prayer_time(next.time, clock)),
            };
            vec![
                Line::from(""),
                Line::from(vec![
                    Span::styled(
                        format!("  {}", name),
                        theme::gold().add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(format!("  {}", when), theme::dim()),
                ]),
                Line::from(""),
                Line::from(vec![
                    Span::styled("  in  ", theme::dim()),
                    Span::styled(
                        format_remaining(next.remaining(now_minutes)),
                        theme::amber().add_modifier(Modifier::BOLD),
                    ),
                ]),
            ]
        }
    };

    let paragraph = Paragraph::new(content)
        .block(block)
        .alignment(Alignment::Left);

    frame.render_widget(paragraph, area);
}
