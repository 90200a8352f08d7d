use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::media::Player;
use crate::models::CHAPTER_COUNT;
use crate::tui::theme;
use crate::utils::format::{format_playback, progress_bar};

pub fn render(frame: &mut Frame, area: Rect, player: &Player) {
    let block = Block::default()
        .title(Span::styled(" Recitation ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::border())
        .style(theme::surface());

    let state = player.state();
    let (icon, icon_style) = if state.is_playing {
        ("▶", theme::green())
    } else {
        ("⏸", theme::dim())
    };

    let bar_width = (area.width.saturating_sub(20) as usize).min(40);
    let timing = match player.duration() {
        Some(total) => format!(
            " {} / {}",
            format_playback(player.position()),
            format_playback(total)
        ),
        None => format!(" {}", format_playback(player.position())),
    };

    let auto = if state.auto_advance { "auto ✓" } else { "auto ✗" };

    let text = vec![
        Line::from(vec![
            Span::styled(format!("  {} ", icon), icon_style),
            Span::styled(
                format!("{:>3}/{} ", state.chapter, CHAPTER_COUNT),
                theme::dim(),
            ),
            Span::styled(player.title(), theme::gold().add_modifier(Modifier::BOLD)),
        ]),
        Line::from(vec![
            Span::styled("  ", theme::dim()),
            Span::styled(progress_bar(player.progress().unwrap_or(0.0), bar_width), theme::amber()),
            Span::styled(timing, theme::dim()),
        ]),
        Line::from(vec![
            Span::styled(format!("  {}  ", state.reciter), theme::dim()),
            Span::styled(auto, theme::dim()),
        ]),
    ];

    frame.render_widget(Paragraph::new(text).block(block), area);
}
