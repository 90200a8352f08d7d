use chrono::{Duration, NaiveDateTime};

use crate::models::{Settings, VerseRotationMode};
use crate::utils::timer::Interval;

/// Wallpaper and verse timers. Always rebuilt as a pair from the current
/// settings, never adjusted in place.
#[derive(Debug, Clone)]
pub struct RotationTimers {
    wallpaper: Option<Interval>,
    verse: Option<Interval>,
}

impl RotationTimers {
    pub fn apply(settings: &Settings, now: NaiveDateTime) -> Self {
        let wallpaper = settings.wallpaper_rotation.then(|| {
            Interval::new(
                Duration::hours(settings.rotation_interval_hours.max(1) as i64),
                now,
            )
        });
        let verse = (settings.verse_rotation == VerseRotationMode::Automatic).then(|| {
            Interval::new(
                Duration::minutes(settings.verse_interval_minutes.max(1) as i64),
                now,
            )
        });
        log::debug!(
            "Rotation timers: wallpaper {:?}, verse {:?}",
            wallpaper.as_ref().map(Interval::period),
            verse.as_ref().map(Interval::period)
        );
        Self { wallpaper, verse }
    }

    pub fn wallpaper_due(&mut self, now: NaiveDateTime) -> bool {
        self.wallpaper.as_mut().is_some_and(|iv| iv.due(now))
    }

    pub fn verse_due(&mut self, now: NaiveDateTime) -> bool {
        self.verse.as_mut().is_some_and(|iv| iv.due(now))
    }

    /// Manual mode has no verse timer; the "next verse" control replaces it.
    pub fn manual_verse(&self) -> bool {
        self.verse.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::at;

    #[test]
    fn intervals_follow_settings() {
        let settings = Settings {
            rotation_interval_hours: 2,
            verse_interval_minutes: 15,
            ..Settings::default()
        };
        let mut timers = RotationTimers::apply(&settings, at(8, 0, 0));
        assert!(!timers.verse_due(at(8, 14, 59)));
        assert!(timers.verse_due(at(8, 15, 0)));
        assert!(!timers.wallpaper_due(at(9, 59, 0)));
        assert!(timers.wallpaper_due(at(10, 0, 0)));
    }

    #[test]
    fn manual_mode_disarms_verse_timer() {
        let settings = Settings {
            verse_rotation: VerseRotationMode::Manual,
            wallpaper_rotation: false,
            ..Settings::default()
        };
        let mut timers = RotationTimers::apply(&settings, at(8, 0, 0));
        assert!(timers.manual_verse());
        assert!(!timers.verse_due(at(23, 0, 0)));
        assert!(!timers.wallpaper_due(at(23, 0, 0)));
    }

    #[test]
    fn reapplying_restarts_both_periods() {
        let settings = Settings::default();
        let mut first = RotationTimers::apply(&settings, at(8, 0, 0));
        assert!(!first.verse_due(at(8, 20, 0)));
        let mut timers = RotationTimers::apply(&settings, at(8, 20, 0));
        assert!(!timers.verse_due(at(8, 30, 0)));
        assert!(timers.verse_due(at(8, 50, 0)));
    }
}
