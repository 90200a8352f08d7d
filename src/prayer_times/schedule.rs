use crate::models::{Day, PrayerName, PrayerSchedule, TimeOfDay, MINUTES_PER_DAY};
use crate::utils::format::format_remaining;

/// The upcoming prayer relative to some minute of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextPrayer {
    pub prayer: PrayerName,
    pub day: Day,
    pub time: TimeOfDay,
    /// Minutes since today's midnight; tomorrow's entries are offset by a day.
    pub minutes: u32,
}

impl NextPrayer {
    /// Whole minutes from `now_minutes` until this prayer.
    pub fn remaining(&self, now_minutes: u32) -> u32 {
        remaining_minutes(self.minutes, now_minutes)
    }
}

/// First of today's prayers strictly after `now_minutes`; once Isha has
/// passed, tomorrow's Fajr.
pub fn next_prayer(schedule: &PrayerSchedule, now_minutes: u32) -> NextPrayer {
    for (prayer, time) in schedule.today.iter() {
        if time.minutes() > now_minutes {
            return NextPrayer {
                prayer,
                day: Day::Today,
                time,
                minutes: time.minutes(),
            };
        }
    }

    let fajr = schedule.tomorrow.fajr;
    NextPrayer {
        prayer: PrayerName::Fajr,
        day: Day::Tomorrow,
        time: fajr,
        minutes: fajr.minutes() + MINUTES_PER_DAY,
    }
}

pub fn remaining_minutes(next_minutes: u32, now_minutes: u32) -> u32 {
    next_minutes.saturating_sub(now_minutes)
}

/// "Xh Ym" or "Ym".
pub fn remaining_time(next_minutes: u32, now_minutes: u32) -> String {
    format_remaining(remaining_minutes(next_minutes, now_minutes))
}

/// One line of the prayer table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrayerRow {
    pub prayer: PrayerName,
    pub time: TimeOfDay,
    pub day: Day,
    pub remaining: u32,
    pub is_next: bool,
}

/// Every prayer with the time it next occurs. Passed prayers show
/// tomorrow's time.
pub fn prayer_rows(schedule: &PrayerSchedule, now_minutes: u32) -> Vec<PrayerRow> {
    let next = next_prayer(schedule, now_minutes);
    PrayerName::ALL
        .into_iter()
        .map(|prayer| {
            let today = schedule.today.get(prayer);
            let (time, day, minutes) = if today.minutes() > now_minutes {
                (today, Day::Today, today.minutes())
            } else {
                let t = schedule.tomorrow.get(prayer);
                (t, Day::Tomorrow, t.minutes() + MINUTES_PER_DAY)
            };
            PrayerRow {
                prayer,
                time,
                day,
                remaining: remaining_minutes(minutes, now_minutes),
                is_next: prayer == next.prayer && day == next.day,
            }
        })
        .collect()
}
