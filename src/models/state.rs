use anyhow::{anyhow, bail, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::{PrayerName, TimeOfDay};

// ─── Notification preferences ───────────────────────────────────────────────

/// Per-prayer azan toggles. All enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationPreference {
    enabled: [bool; 5],
}

impl Default for NotificationPreference {
    fn default() -> Self {
        Self::all(true)
    }
}

impl NotificationPreference {
    pub fn all(enabled: bool) -> Self {
        Self { enabled: [enabled; 5] }
    }

    pub fn is_enabled(&self, prayer: PrayerName) -> bool {
        self.enabled[prayer.index()]
    }

    /// Flips the toggle and returns the new value.
    pub fn toggle(&mut self, prayer: PrayerName) -> bool {
        let slot = &mut self.enabled[prayer.index()];
        *slot = !*slot;
        *slot
    }
}

// Older installs stored a single boolean for every prayer.
#[derive(Deserialize)]
#[serde(untagged)]
enum StoredPreference {
    Legacy(bool),
    PerPrayer { enabled: [bool; 5] },
}

impl<'de> Deserialize<'de> for NotificationPreference {
    fn deserialize<D: serde::Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        Ok(match StoredPreference::deserialize(d)? {
            StoredPreference::Legacy(all) => NotificationPreference::all(all),
            StoredPreference::PerPrayer { enabled } => NotificationPreference { enabled },
        })
    }
}

// ─── Cross-instance modal ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModalKind {
    Azan,
}

/// The modal every visible dashboard must show while present in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveModal {
    #[serde(rename = "type")]
    pub kind: ModalKind,
    pub prayer: PrayerName,
    pub time: TimeOfDay,
    pub fired_at_ms: i64,
}

// ─── Location ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(default)]
    pub label: Option<String>,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng, label: None }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn coordinates_label(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}

// ─── Settings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerseRotationMode {
    Manual,
    Automatic,
}

impl FromStr for VerseRotationMode {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "manual" => Ok(VerseRotationMode::Manual),
            "automatic" => Ok(VerseRotationMode::Automatic),
            _ => Err(anyhow!("Unknown verse rotation mode: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClockFormat {
    #[serde(rename = "12")]
    H12,
    #[serde(rename = "24")]
    H24,
}

impl FromStr for ClockFormat {
    type Err = anyhow::Error;
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "12" => Ok(ClockFormat::H12),
            "24" => Ok(ClockFormat::H24),
            _ => Err(anyhow!("Clock format must be 12 or 24, got {}", s)),
        }
    }
}

/// Longest wallpaper interval: one year.
pub const MAX_ROTATION_HOURS: u32 = 24 * 365;
/// Longest verse interval: one year.
pub const MAX_VERSE_MINUTES: u32 = 60 * 24 * 365;

fn default_true() -> bool {
    true
}
fn default_rotation_hours() -> u32 {
    1
}
fn default_verse_mode() -> VerseRotationMode {
    VerseRotationMode::Automatic
}
fn default_verse_minutes() -> u32 {
    30
}
fn default_clock_format() -> ClockFormat {
    ClockFormat::H12
}
fn default_translation() -> String {
    "en.asad".to_string()
}
fn default_opacity() -> f32 {
    0.3
}

/// User settings shared by every running dashboard. Rotation fields drive
/// the wallpaper and verse timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_true")]
    pub wallpaper_rotation: bool,
    #[serde(
        default = "default_rotation_hours",
        deserialize_with = "rotation_hours_in_range"
    )]
    pub rotation_interval_hours: u32,
    #[serde(default = "default_verse_mode")]
    pub verse_rotation: VerseRotationMode,
    #[serde(
        default = "default_verse_minutes",
        deserialize_with = "verse_minutes_in_range"
    )]
    pub verse_interval_minutes: u32,
    #[serde(default = "default_clock_format")]
    pub clock_format: ClockFormat,
    #[serde(default = "default_translation")]
    pub verse_translation: String,
    #[serde(default = "default_true")]
    pub show_islamic_calendar: bool,
    #[serde(default = "default_opacity")]
    pub overlay_opacity: f32,
}

// Another instance or an older build may have written anything here.
fn rotation_hours_in_range<'de, D: serde::Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    u32::deserialize(d).map(|v| v.clamp(1, MAX_ROTATION_HOURS))
}

fn verse_minutes_in_range<'de, D: serde::Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    u32::deserialize(d).map(|v| v.clamp(1, MAX_VERSE_MINUTES))
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            wallpaper_rotation: true,
            rotation_interval_hours: default_rotation_hours(),
            verse_rotation: default_verse_mode(),
            verse_interval_minutes: default_verse_minutes(),
            clock_format: default_clock_format(),
            verse_translation: default_translation(),
            show_islamic_calendar: true,
            overlay_opacity: default_opacity(),
        }
    }
}

pub const SETTINGS_FIELDS: &[&str] = &[
    "wallpaper_rotation",
    "rotation_interval_hours",
    "verse_rotation",
    "verse_interval_minutes",
    "clock_format",
    "verse_translation",
    "show_islamic_calendar",
    "overlay_opacity",
];

impl Settings {
    /// Applies one `field = value` edit from the settings surface.
    pub fn set_field(&mut self, field: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match field {
            "wallpaper_rotation" => self.wallpaper_rotation = parse_bool(value)?,
            "rotation_interval_hours" => {
                self.rotation_interval_hours = parse_interval(value, MAX_ROTATION_HOURS)?
            }
            "verse_rotation" => self.verse_rotation = value.parse()?,
            "verse_interval_minutes" => {
                self.verse_interval_minutes = parse_interval(value, MAX_VERSE_MINUTES)?
            }
            "clock_format" => self.clock_format = value.parse()?,
            "verse_translation" => {
                if value.is_empty() {
                    bail!("Translation edition cannot be empty");
                }
                self.verse_translation = value.to_string();
            }
            "show_islamic_calendar" => self.show_islamic_calendar = parse_bool(value)?,
            "overlay_opacity" => {
                let v: f32 = value
                    .parse()
                    .map_err(|_| anyhow!("'{}' is not a valid number", value))?;
                if !(0.0..=1.0).contains(&v) {
                    bail!("Opacity must be between 0 and 1");
                }
                self.overlay_opacity = v;
            }
            _ => bail!(
                "Unknown setting '{}'. Known: {}",
                field,
                SETTINGS_FIELDS.join(", ")
            ),
        }
        Ok(())
    }
}

fn parse_bool(s: &str) -> Result<bool> {
    match s {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(anyhow!("'{}' is not a boolean (use on/off)", s)),
    }
}

fn parse_interval(s: &str, max: u32) -> Result<u32> {
    let v: u32 = s
        .parse()
        .map_err(|_| anyhow!("'{}' is not a whole number", s))?;
    if !(1..=max).contains(&v) {
        bail!("Interval must be between 1 and {}", max);
    }
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_boolean_preference_applies_to_all_prayers() {
        let prefs: NotificationPreference = serde_json::from_str("false").unwrap();
        for p in PrayerName::ALL {
            assert!(!prefs.is_enabled(p));
        }
    }

    #[test]
    fn per_prayer_preference_round_trips() {
        let mut prefs = NotificationPreference::default();
        assert!(!prefs.toggle(PrayerName::Asr));
        let json = serde_json::to_string(&prefs).unwrap();
        let back: NotificationPreference = serde_json::from_str(&json).unwrap();
        assert!(!back.is_enabled(PrayerName::Asr));
        assert!(back.is_enabled(PrayerName::Isha));
    }

    #[test]
    fn active_modal_uses_type_tag() {
        let modal = ActiveModal {
            kind: ModalKind::Azan,
            prayer: PrayerName::Maghrib,
            time: TimeOfDay::new(18, 30).unwrap(),
            fired_at_ms: 1,
        };
        let json = serde_json::to_value(&modal).unwrap();
        assert_eq!(json["type"], "azan");
        assert_eq!(json["prayer"], "Maghrib");
    }

    #[test]
    fn settings_fill_missing_fields_with_defaults() {
        let s: Settings = serde_json::from_str(r#"{"verse_rotation":"manual"}"#).unwrap();
        assert_eq!(s.verse_rotation, VerseRotationMode::Manual);
        assert_eq!(s.verse_interval_minutes, 30);
        assert_eq!(s.clock_format, ClockFormat::H12);
    }

    #[test]
    fn settings_reject_zero_intervals_and_bad_opacity() {
        let mut s = Settings::default();
        assert!(s.set_field("verse_interval_minutes", "0").is_err());
        assert!(s.set_field("overlay_opacity", "1.5").is_err());
        assert!(s.set_field("font_size", "large").is_err());
        s.set_field("clock_format", "24").unwrap();
        assert_eq!(s.clock_format, ClockFormat::H24);
    }

    #[test]
    fn settings_reject_intervals_beyond_a_year() {
        let mut s = Settings::default();
        assert!(s.set_field("rotation_interval_hours", "4000000000").is_err());
        assert!(s.set_field("rotation_interval_hours", "8761").is_err());
        assert!(s.set_field("verse_interval_minutes", "525601").is_err());
        s.set_field("rotation_interval_hours", "8760").unwrap();
        assert_eq!(s.rotation_interval_hours, MAX_ROTATION_HOURS);
    }

    #[test]
    fn stored_intervals_are_clamped_on_load() {
        let s: Settings = serde_json::from_str(
            r#"{"rotation_interval_hours":4294967295,"verse_interval_minutes":0}"#,
        )
        .unwrap();
        assert_eq!(s.rotation_interval_hours, MAX_ROTATION_HOURS);
        assert_eq!(s.verse_interval_minutes, 1);
    }

    #[test]
    fn location_validation() {
        assert!(Location::new(21.42, 39.82).is_valid());
        assert!(!Location::new(f64::NAN, 39.82).is_valid());
        assert!(!Location::new(91.0, 0.0).is_valid());
        assert_eq!(Location::new(21.42251, 39.826168).coordinates_label(), "21.4225, 39.8262");
    }
}
