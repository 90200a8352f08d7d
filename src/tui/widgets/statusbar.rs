use std::path::Path;

use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::theme;

/// Key hints, or the latest status message when there is one. The current
/// backdrop name sits on the right.
pub fn render(frame: &mut Frame, area: Rect, status: Option<&str>, wallpaper: &str) {
    let name = Path::new(wallpaper)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let [main, side] = Layout::horizontal([
        Constraint::Min(0),
        Constraint::Length(name.chars().count() as u16 + 2),
    ])
    .areas(area);
    frame.render_widget(
        Paragraph::new(Span::styled(name, theme::dim())).alignment(Alignment::Right),
        side,
    );
    let area = main;

    if let Some(message) = status {
        let paragraph = Paragraph::new(Line::from(Span::styled(message, theme::red())))
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, area);
        return;
    }

    let hints = [
        ("[space]", " play  "),
        ("[n/p]", " chapter  "),
        ("[g]", " go to  "),
        ("[t]", " notify  "),
        ("[l/L]", " location  "),
        ("[?]", " help  "),
        ("[Esc]", " quit"),
    ];

    let mut spans = Vec::new();
    for (key, label) in &hints {
        spans.push(Span::styled(*key, theme::gold()));
        spans.push(Span::styled(*label, theme::dim()));
    }

    let line = Line::from(spans);
    let paragraph = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
