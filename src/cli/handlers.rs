use anyhow::{anyhow, Result};
use std::str::FromStr;

use crate::cli::args::{FocusCommands, LocationCommands, NotifyCommands, SettingsCommands};
use crate::jobs::Job;
use crate::models::{Day, PrayerName, Settings};
use crate::platform::Services;
use crate::prayer_times::{remaining_time, LocationStatus};
use crate::session::Session;
use crate::utils::format::{format_prayer_time, format_remaining};

// ─── ANSI helpers ────────────────────────────────────────────────────────────

macro_rules! println_colored {
    ($color:expr, $($arg:tt)*) => {{
        print!("{}", $color);
        print!($($arg)*);
        println!("\x1b[0m");
    }};
}

const GREEN: &str = "\x1b[32m";
const AMBER: &str = "\x1b[33m";
const RED: &str = "\x1b[31m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const GOLD: &str = "\x1b[38;2;196;160;68m";

fn print_location_status(session: &Session) {
    let tracker = session.tracker();
    match tracker.status() {
        LocationStatus::NeedsManual { reason } => {
            println_colored!(RED, "  {}", reason);
            println_colored!(DIM, "  Set one with: miqat location set <city or address>");
        }
        LocationStatus::Detecting => println_colored!(DIM, "  Detecting location..."),
        LocationStatus::Ready => match tracker.location() {
            Some(location) => println_colored!(
                GOLD,
                "  {}",
                location
                    .label
                    .clone()
                    .unwrap_or_else(|| location.coordinates_label())
            ),
            None => println_colored!(DIM, "  No location stored"),
        },
    }
}

// ─── Times ───────────────────────────────────────────────────────────────────

pub fn handle_times(session: &mut Session, services: &Services) -> Result<()> {
    let today = session.now().date();
    let fresh = session
        .tracker()
        .schedule()
        .is_some_and(|s| s.date == today);
    if !fresh {
        let job = if session.tracker().location().is_some() {
            session.refresh_schedule()
        } else {
            session.detect_location()
        };
        session.run_blocking(services, job.into_iter().collect());
    }
    session.run_blocking(services, vec![Job::HijriDate(today)]);

    println!();
    print_location_status(session);
    let settings = session.settings();
    let tracker = session.tracker();
    let Some(schedule) = tracker.schedule() else {
        println!();
        return Err(anyhow!("Prayer times are not available yet"));
    };
    if let Some(hijri) = session.hijri() {
        println_colored!(DIM, "  {} · {}", today.format("%A, %B %-d, %Y"), hijri);
    }
    if schedule.date != today {
        println_colored!(AMBER, "  Showing times from {}", schedule.date);
    }
    println!();

    let now_minutes = session.now_minutes();
    for row in tracker.rows(now_minutes) {
        let time = format_prayer_time(row.time, settings.clock_format);
        let bell = if tracker.notifications().is_enabled(row.prayer) {
            ""
        } else {
            "  (muted)"
        };
        let when = match row.day {
            Day::Today => "",
            Day::Tomorrow => " tomorrow",
        };
        if row.is_next {
            println_colored!(
                BOLD,
                "  {:<10}  {:>8}{}  in {}{}",
                row.prayer.display_name(),
                time,
                when,
                format_remaining(row.remaining),
                bell
            );
        } else {
            println_colored!(
                DIM,
                "  {:<10}  {:>8}{}{}",
                row.prayer.display_name(),
                time,
                when,
                bell
            );
        }
    }

    if let Some(next) = tracker.next_prayer(now_minutes) {
        println!();
        println_colored!(
            AMBER,
            "  Next: {} in {}",
            next.prayer.display_name(),
            remaining_time(next.minutes, now_minutes)
        );
    }
    println!();
    Ok(())
}

// ─── Verse ───────────────────────────────────────────────────────────────────

pub fn handle_verse(
    session: &mut Session,
    services: &Services,
    edition: Option<String>,
) -> Result<()> {
    let job = match edition {
        Some(edition) => Job::RandomVerse { edition },
        None => session.next_verse(),
    };
    session.run_blocking(services, vec![job]);

    let verse = session.verse();
    println!();
    println_colored!(GOLD, "  {}", verse.arabic);
    println!();
    println!("  {}", verse.translation);
    println_colored!(DIM, "  · {} ·", verse.reference);
    println!();
    Ok(())
}

// ─── Location ────────────────────────────────────────────────────────────────

pub fn handle_location(
    session: &mut Session,
    services: &Services,
    action: &LocationCommands,
) -> Result<()> {
    match action {
        LocationCommands::Detect => {
            let job = session.detect_location();
            session.run_blocking(services, job.into_iter().collect());
        }
        LocationCommands::Set { query } => {
            let text = query.join(" ");
            match session.set_location(&text) {
                Ok(job) => session.run_blocking(services, vec![job]),
                Err(e) => {
                    log::debug!("Rejected location '{}': {}", text, e);
                    println_colored!(RED, "  {}", e.user_message());
                    return Ok(());
                }
            }
        }
        LocationCommands::Show => {}
    }

    if let Some(status) = session.status() {
        println_colored!(RED, "  {}", status);
    }
    print_location_status(session);
    if let Some(location) = session.tracker().location() {
        println_colored!(DIM, "  {}", location.coordinates_label());
    }
    Ok(())
}

// ─── Notifications ───────────────────────────────────────────────────────────

pub fn handle_notify(session: &mut Session, action: &NotifyCommands) -> Result<()> {
    match action {
        NotifyCommands::List => {
            println!();
            let prefs = *session.tracker().notifications();
            for prayer in PrayerName::ALL {
                if prefs.is_enabled(prayer) {
                    println_colored!(GREEN, "  ✓  {}", prayer.display_name());
                } else {
                    println_colored!(DIM, "  ·  {}", prayer.display_name());
                }
            }
            println!();
        }
        NotifyCommands::Toggle { prayer } => {
            let prayer = PrayerName::from_str(prayer)?;
            if session.toggle_notification(prayer)? {
                println_colored!(GREEN, "  ✓ Azan alert on for {}", prayer.display_name());
            } else {
                println_colored!(DIM, "  Azan alert off for {}", prayer.display_name());
            }
        }
    }
    Ok(())
}

// ─── Settings ────────────────────────────────────────────────────────────────

fn print_settings(settings: &Settings) -> Result<()> {
    let text = toml::to_string_pretty(settings)?;
    println!();
    for line in text.lines() {
        println!("  {}", line);
    }
    println!();
    Ok(())
}

pub fn handle_settings(session: &mut Session, action: &SettingsCommands) -> Result<()> {
    match action {
        SettingsCommands::Show => print_settings(session.settings())?,
        SettingsCommands::Set { field, value } => {
            session.set_setting(field, value)?;
            println_colored!(GREEN, "  ✓ {} = {}", field, value.trim());
        }
        SettingsCommands::Reset => {
            session.reset_settings()?;
            println_colored!(GREEN, "  ✓ Settings restored to defaults");
            print_settings(session.settings())?;
        }
    }
    Ok(())
}

// ─── Focus mode and alerts ───────────────────────────────────────────────────

pub fn handle_focus(session: &mut Session, action: &FocusCommands) -> Result<()> {
    match action {
        FocusCommands::Start => {
            session.take_break();
            println_colored!(GREEN, "  ✓ Focus mode on. Azan alerts are paused.");
        }
        FocusCommands::End => {
            session.end_break();
            println_colored!(GREEN, "  ✓ Focus mode off");
        }
    }
    report_status(session)
}

pub fn handle_dismiss(session: &mut Session) -> Result<()> {
    if session.tracker().modal().is_none() {
        println_colored!(DIM, "  No azan alert is showing");
        return Ok(());
    }
    session.stop_azan();
    println_colored!(GREEN, "  ✓ Azan alert dismissed");
    report_status(session)
}

/// Failures inside the session only reach its status line; surface them.
fn report_status(session: &Session) -> Result<()> {
    match session.status() {
        Some(status) => Err(anyhow!("{}", status)),
        None => Ok(()),
    }
}
