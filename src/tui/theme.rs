use ratatui::style::{Color, Modifier, Style};

const PANEL: Color = Color::Rgb(24, 28, 30);
const EDGE: Color = Color::Rgb(52, 64, 66);
const INK: Color = Color::Rgb(232, 224, 206);
const INK_FAINT: Color = Color::Rgb(128, 130, 118);
const GOLD: Color = Color::Rgb(204, 168, 76);
const GREEN: Color = Color::Rgb(84, 156, 112);
const AMBER: Color = Color::Rgb(214, 142, 64);
const RED: Color = Color::Rgb(188, 84, 66);

// One tint per wallpaper slot; the index wraps.
const WALLPAPER_TINTS: [(u8, u8, u8); 4] = [(40, 34, 26), (22, 34, 40), (34, 26, 40), (26, 40, 30)];

/// Background for the current wallpaper, darkened by the overlay opacity.
pub fn backdrop(wallpaper_index: usize, opacity: f32) -> Style {
    let (r, g, b) = WALLPAPER_TINTS[wallpaper_index % WALLPAPER_TINTS.len()];
    let keep = 1.0 - opacity.clamp(0.0, 1.0);
    let shade = |c: u8| (c as f32 * keep).round() as u8;
    Style::default().fg(INK).bg(Color::Rgb(shade(r), shade(g), shade(b)))
}

pub fn dim() -> Style {
    Style::default().fg(INK_FAINT)
}

pub fn gold() -> Style {
    Style::default().fg(GOLD)
}

pub fn green() -> Style {
    Style::default().fg(GREEN)
}

pub fn amber() -> Style {
    Style::default().fg(AMBER)
}

pub fn red() -> Style {
    Style::default().fg(RED)
}

pub fn bold() -> Style {
    Style::default().fg(INK).add_modifier(Modifier::BOLD)
}

pub fn surface() -> Style {
    Style::default().fg(INK).bg(PANEL)
}

pub fn border() -> Style {
    Style::default().fg(EDGE)
}
