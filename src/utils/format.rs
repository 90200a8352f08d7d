use chrono::{NaiveTime, Timelike};
use std::time::Duration;

use crate::models::{ClockFormat, TimeOfDay};

/// Format a minute count as "Xh Ym" (an hour or more) or "Ym".
pub fn format_remaining(minutes: u32) -> String {
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours > 0 {
        format!("{}h {}m", hours, mins)
    } else {
        format!("{}m", mins)
    }
}

/// "5:07 AM"
pub fn format_time_12h(t: TimeOfDay) -> String {
    let period = if t.hour() >= 12 { "PM" } else { "AM" };
    let h = match t.hour() % 12 {
        0 => 12,
        h => h,
    };
    format!("{}:{:02} {}", h, t.minute(), period)
}

pub fn format_prayer_time(t: TimeOfDay, clock: ClockFormat) -> String {
    match clock {
        ClockFormat::H12 => format_time_12h(t),
        ClockFormat::H24 => t.to_string(),
    }
}

/// Wall clock with seconds: "01:05:09 PM" or "13:05:09".
pub fn format_clock(now: NaiveTime, clock: ClockFormat) -> String {
    match clock {
        ClockFormat::H12 => {
            let (pm, h) = now.hour12();
            format!(
                "{:02}:{:02}:{:02} {}",
                h,
                now.minute(),
                now.second(),
                if pm { "PM" } else { "AM" }
            )
        }
        ClockFormat::H24 => now.format("%H:%M:%S").to_string(),
    }
}

/// Playback position as "m:ss".
pub fn format_playback(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Create a simple text progress bar
pub fn progress_bar(fraction: f64, width: usize) -> String {
    let ratio = if fraction.is_finite() {
        fraction.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let filled_count = (ratio * width as f64).round() as usize;
    let empty_count = width.saturating_sub(filled_count);
    format!("{}{}", "█".repeat(filled_count), "░".repeat(empty_count))
}
