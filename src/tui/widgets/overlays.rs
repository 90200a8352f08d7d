use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};

use crate::models::{ActiveModal, ClockFormat};
use crate::tui::theme;
use crate::utils::format::format_prayer_time;

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

fn key_line(key: &'static str, label: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), theme::gold()),
        Span::styled(label, theme::dim()),
    ])
}

pub fn azan(frame: &mut Frame, modal: &ActiveModal, clock: ClockFormat, cue_error: Option<&str>) {
    let popup_area = centered(frame.area(), 44, 10);
    frame.render_widget(Clear, popup_area);

    let mut text = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} Prayer Time", modal.prayer.display_name()),
            theme::gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format_prayer_time(modal.time, clock),
            theme::amber(),
        )),
        Line::from(""),
        Line::from(vec![
            Span::styled("[s]", theme::gold()),
            Span::styled(" stop azan   ", theme::dim()),
            Span::styled("[b]", theme::gold()),
            Span::styled(" take a break", theme::dim()),
        ]),
    ];
    if let Some(err) = cue_error {
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(err, theme::red())));
    }

    let block = Block::default()
        .title(Span::styled(" الأذان ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Double)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::surface());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);
    frame.render_widget(paragraph, popup_area);
}

pub fn focus(frame: &mut Frame) {
    let area = frame.area();
    frame.render_widget(Clear, area);

    let popup_area = centered(area, 40, 7);
    let text = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Focus mode",
            theme::gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled("Prayer alerts are paused", theme::dim())),
        Line::from(""),
        Line::from(vec![
            Span::styled("[e]", theme::gold()),
            Span::styled(" end break", theme::dim()),
        ]),
    ];
    frame.render_widget(Paragraph::new(text).alignment(Alignment::Center), popup_area);
}

pub fn input(frame: &mut Frame, title: &str, prompt: &str, buffer: &str, error: Option<&str>) {
    let area = frame.area();
    let height = if error.is_some() { 7 } else { 5 };
    let popup_area = centered(area, area.width / 2, height);

    frame.render_widget(Clear, popup_area);

    let mut text = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("  {}: ", prompt), theme::dim()),
            Span::styled(buffer, theme::gold().add_modifier(Modifier::BOLD)),
            Span::styled("█", theme::amber()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  [Enter] confirm  ·  [Esc] cancel",
            theme::dim(),
        )),
    ];

    if let Some(err) = error {
        text.push(Line::from(""));
        text.push(Line::from(Span::styled(format!("  ✗ {}", err), theme::red())));
    }

    let border_style = if error.is_some() {
        theme::red()
    } else {
        theme::amber()
    };

    let block = Block::default()
        .title(Span::styled(format!(" {} ", title), theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .style(theme::surface());

    frame.render_widget(Paragraph::new(text).block(block), popup_area);
}

pub fn help(frame: &mut Frame) {
    let area = frame.area();
    let popup_area = Rect {
        x: area.width / 4,
        y: area.height / 6,
        width: area.width / 2,
        height: (area.height * 2 / 3).max(20).min(area.height),
    };

    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            "  Keybindings",
            theme::gold().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        key_line("[space]", "Play / pause recitation"),
        key_line("[n] [p]", "Next / previous chapter"),
        key_line("[g]", "Go to chapter"),
        key_line("[a]", "Toggle auto-advance"),
        key_line("[ / ]", "Seek back / forward"),
        key_line("[v]", "Next verse (manual rotation)"),
        key_line("[w]", "Next wallpaper"),
        key_line("[↑ ↓]", "Select prayer"),
        key_line("[t]", "Toggle azan for selected prayer"),
        key_line("[r]", "Refresh prayer times"),
        key_line("[l]", "Detect location again"),
        key_line("[L]", "Enter location"),
        key_line("[b] [e]", "Take / end a break"),
        key_line("[s]", "Stop azan"),
        key_line("[?]", "Toggle help"),
        key_line("[Esc] [q]", "Quit"),
    ];

    let block = Block::default()
        .title(Span::styled(" Help ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold())
        .style(theme::surface());

    frame.render_widget(Paragraph::new(help_text).block(block), popup_area);
}
