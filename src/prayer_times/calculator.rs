use anyhow::{anyhow, Result};
use chrono::{Local, NaiveDate};
use salah::prelude::*;

use crate::api::{ApiError, PrayerTimesSource};
use crate::models::{Location, PrayerTimeSet, TimeOfDay};

/// Computes prayer times locally instead of asking the timings service.
pub struct OfflineCalculator {
    method: Method,
    madhab: Madhab,
}

impl OfflineCalculator {
    pub fn new(method: &str, madhab: &str) -> Result<Self> {
        Ok(Self {
            method: parse_method(method)?,
            madhab: parse_madhab(madhab)?,
        })
    }
}

impl PrayerTimesSource for OfflineCalculator {
    fn day_times(&self, date: NaiveDate, location: &Location) -> Result<PrayerTimeSet, ApiError> {
        let coords = Coordinates::new(location.lat, location.lng);
        let params = Configuration::with(self.method, self.madhab);

        let times = PrayerSchedule::new()
            .on(date)
            .for_location(coords)
            .with_configuration(params)
            .calculate()
            .map_err(|e| ApiError::Http(format!("Prayer calculation failed: {}", e)))?;

        let to_local = |utc: chrono::DateTime<chrono::Utc>| -> TimeOfDay {
            TimeOfDay::from_time(utc.with_timezone(&Local).time())
        };

        Ok(PrayerTimeSet {
            fajr: to_local(times.time(Prayer::Fajr)),
            dhuhr: to_local(times.time(Prayer::Dhuhr)),
            asr: to_local(times.time(Prayer::Asr)),
            maghrib: to_local(times.time(Prayer::Maghrib)),
            isha: to_local(times.time(Prayer::Isha)),
        })
    }
}

fn parse_method(s: &str) -> Result<Method> {
    match s {
        "MuslimWorldLeague" => Ok(Method::MuslimWorldLeague),
        "Egyptian" => Ok(Method::Egyptian),
        "Karachi" => Ok(Method::Karachi),
        "UmmAlQura" => Ok(Method::UmmAlQura),
        "Dubai" => Ok(Method::Dubai),
        "MoonsightingCommittee" => Ok(Method::MoonsightingCommittee),
        "NorthAmerica" => Ok(Method::NorthAmerica),
        "Kuwait" => Ok(Method::Kuwait),
        "Qatar" => Ok(Method::Qatar),
        "Singapore" => Ok(Method::Singapore),
        "Tehran" => Ok(Method::Tehran),
        "Turkey" => Ok(Method::Turkey),
        "Other" => Ok(Method::Other),
        _ => Err(anyhow!("Unknown calculation method: '{}'", s)),
    }
}

fn parse_madhab(s: &str) -> Result<Madhab> {
    match s {
        "Hanafi" => Ok(Madhab::Hanafi),
        "Shafi" | "Shafi'i" => Ok(Madhab::Shafi),
        _ => Err(anyhow!("Unknown madhab: '{}'", s)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_unknown_method() {
        assert!(OfflineCalculator::new("Lunar", "Shafi").is_err());
        assert!(OfflineCalculator::new("Karachi", "Maliki").is_err());
    }

    #[test]
    fn computes_times_in_canonical_order() {
        let calc = OfflineCalculator::new("MuslimWorldLeague", "Shafi").unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 21).unwrap();
        // Local zone of the test machine shifts every time equally; compare gaps.
        let set = calc.day_times(date, &Location::new(0.0, 0.0)).unwrap();
        let gap = |a: TimeOfDay, b: TimeOfDay| (b.minutes() + 1440 - a.minutes()) % 1440;
        assert!(gap(set.fajr, set.dhuhr) > 5 * 60);
        assert!(gap(set.dhuhr, set.asr) > 2 * 60);
        assert!(gap(set.asr, set.maghrib) > 2 * 60);
        assert!(gap(set.maghrib, set.isha) > 45);
    }
}
