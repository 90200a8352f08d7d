use anyhow::anyhow;
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PrayerName {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl PrayerName {
    /// Canonical order used for every scan over the day.
    pub const ALL: [PrayerName; 5] = [
        PrayerName::Fajr,
        PrayerName::Dhuhr,
        PrayerName::Asr,
        PrayerName::Maghrib,
        PrayerName::Isha,
    ];

    pub fn index(self) -> usize {
        match self {
            PrayerName::Fajr => 0,
            PrayerName::Dhuhr => 1,
            PrayerName::Asr => 2,
            PrayerName::Maghrib => 3,
            PrayerName::Isha => 4,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            PrayerName::Fajr => "Fajr",
            PrayerName::Dhuhr => "Dhuhr",
            PrayerName::Asr => "Asr",
            PrayerName::Maghrib => "Maghrib",
            PrayerName::Isha => "Isha",
        }
    }
}

impl std::fmt::Display for PrayerName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PrayerName {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "fajr" => Ok(PrayerName::Fajr),
            "dhuhr" | "zuhr" | "dhuhur" => Ok(PrayerName::Dhuhr),
            "asr" => Ok(PrayerName::Asr),
            "maghrib" => Ok(PrayerName::Maghrib),
            "isha" => Ok(PrayerName::Isha),
            _ => Err(anyhow!("Unknown prayer: {}", s)),
        }
    }
}

/// A wall-clock minute of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self { hour, minute })
    }

    pub fn from_time(t: NaiveTime) -> Self {
        Self {
            hour: t.hour() as u8,
            minute: t.minute() as u8,
        }
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    pub fn minutes(self) -> u32 {
        self.hour as u32 * 60 + self.minute as u32
    }

    /// Parses "HH:MM", ignoring anything after the first five characters
    /// (timing services append a zone, e.g. "05:12 (EET)").
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let head = s.trim().get(..5).ok_or_else(|| anyhow!("Bad time '{}'", s))?;
        let (h, m) = head
            .split_once(':')
            .ok_or_else(|| anyhow!("Bad time '{}'", s))?;
        let hour: u8 = h.parse().map_err(|_| anyhow!("Bad hour in '{}'", s))?;
        let minute: u8 = m.parse().map_err(|_| anyhow!("Bad minute in '{}'", s))?;
        Self::new(hour, minute).ok_or_else(|| anyhow!("Time out of range '{}'", s))
    }
}

impl std::fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = anyhow::Error;
    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<TimeOfDay> for String {
    fn from(t: TimeOfDay) -> Self {
        t.to_string()
    }
}

/// The five daily prayer times for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerTimeSet {
    pub fajr: TimeOfDay,
    pub dhuhr: TimeOfDay,
    pub asr: TimeOfDay,
    pub maghrib: TimeOfDay,
    pub isha: TimeOfDay,
}

impl PrayerTimeSet {
    pub fn get(&self, prayer: PrayerName) -> TimeOfDay {
        match prayer {
            PrayerName::Fajr => self.fajr,
            PrayerName::Dhuhr => self.dhuhr,
            PrayerName::Asr => self.asr,
            PrayerName::Maghrib => self.maghrib,
            PrayerName::Isha => self.isha,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (PrayerName, TimeOfDay)> + '_ {
        PrayerName::ALL.into_iter().map(|p| (p, self.get(p)))
    }
}

/// Today's and tomorrow's times, fetched together and replaced wholesale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrayerSchedule {
    pub date: NaiveDate,
    pub today: PrayerTimeSet,
    pub tomorrow: PrayerTimeSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Day {
    Today,
    Tomorrow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_service_time_with_zone_suffix() {
        let t = TimeOfDay::parse("05:12 (EET)").unwrap();
        assert_eq!(t.minutes(), 5 * 60 + 12);
        assert_eq!(t.to_string(), "05:12");
    }

    #[test]
    fn rejects_out_of_range_times() {
        assert!(TimeOfDay::parse("24:00").is_err());
        assert!(TimeOfDay::parse("12:60").is_err());
        assert!(TimeOfDay::parse("7:5").is_err());
    }

    #[test]
    fn prayer_names_accept_aliases() {
        assert_eq!("Zuhr".parse::<PrayerName>().unwrap(), PrayerName::Dhuhr);
        assert_eq!(" isha ".parse::<PrayerName>().unwrap(), PrayerName::Isha);
        assert!("sunrise".parse::<PrayerName>().is_err());
    }

    #[test]
    fn time_serializes_as_string() {
        let t = TimeOfDay::new(18, 30).unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"18:30\"");
        let back: TimeOfDay = serde_json::from_str("\"18:30\"").unwrap();
        assert_eq!(back, t);
    }
}
