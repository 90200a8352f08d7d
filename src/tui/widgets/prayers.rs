use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::models::{ClockFormat, Day, NotificationPreference};
use crate::prayer_times::PrayerRow;
use crate::tui::theme;
use crate::utils::format::{format_prayer_time, format_remaining};

pub fn render(
    frame: &mut Frame,
    area: Rect,
    rows: &[PrayerRow],
    notifications: &NotificationPreference,
    selected: usize,
    clock: ClockFormat,
) {
    let block = Block::default()
        .title(Span::styled(" Prayers ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    if rows.is_empty() {
        let list = List::new(vec![
            ListItem::new(""),
            ListItem::new(Span::styled("  Waiting for prayer times...", theme::dim())),
        ])
        .block(block);
        frame.render_widget(list, area);
        return;
    }

    let items: Vec<ListItem> = rows
        .iter()
        .enumerate()
        .map(|(i, row)| {
            let name_style = if i == selected {
                theme::gold().add_modifier(Modifier::BOLD | Modifier::REVERSED)
            } else if row.is_next {
                theme::gold().add_modifier(Modifier::BOLD)
            } else {
                theme::bold()
            };

            let (bell, bell_style) = if notifications.is_enabled(row.prayer) {
                ("♪", theme::green())
            } else {
                ("·", theme::dim())
            };

            let day = match row.day {
                Day::Today => "",
                Day::Tomorrow => "Tomorrow",
            };

            let line = Line::from(vec![
                Span::styled(format!("  {:<8}", row.prayer.display_name()), name_style),
                Span::styled(format!("{:<10}", format_prayer_time(row.time, clock)), theme::dim()),
                Span::styled(bell, bell_style),
                Span::styled(format!("  {:<9}", day), theme::amber()),
                Span::styled(format_remaining(row.remaining), theme::dim()),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
