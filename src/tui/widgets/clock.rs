use chrono::NaiveTime;
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::models::ClockFormat;
use crate::tui::theme;
use crate::utils::format::format_clock;

pub fn render(frame: &mut Frame, area: Rect, now: NaiveTime, clock: ClockFormat) {
    let text = format_clock(now, clock);
    // Quadrant pixels are four columns per glyph.
    let width = (text.chars().count() as u16 * 4).min(area.width);
    let [centered] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);

    let big = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(theme::gold())
        .lines(vec![text.into()])
        .build();
    frame.render_widget(big, centered);
}
