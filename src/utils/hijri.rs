use chrono::{Datelike, Duration, NaiveDate};
use hijri_date::HijriDate;

use crate::api::HijriSource;

/// Shown when neither the date service nor the offline conversion works.
pub const HIJRI_UNAVAILABLE: &str = "Islamic Date Unavailable";

/// Islamic month names in English (index 0 = Muharram = month 1)
const HIJRI_MONTH_NAMES: &[&str] = &[
    "Muharram",
    "Safar",
    "Rabi' al-Awwal",
    "Rabi' al-Thani",
    "Jumada al-Awwal",
    "Jumada al-Thani",
    "Rajab",
    "Sha'ban",
    "Ramadan",
    "Shawwal",
    "Dhu al-Qi'dah",
    "Dhu al-Hijjah",
];

fn hijri_month_name(month: usize) -> &'static str {
    if (1..=12).contains(&month) {
        HIJRI_MONTH_NAMES[month - 1]
    } else {
        "Unknown"
    }
}

/// Offline conversion. `offset_days` adjusts for local moon sighting
/// (e.g. -1 if your country is one day behind Saudi Arabia).
pub fn offline_hijri(date: NaiveDate, offset_days: i32) -> Option<String> {
    let adjusted = date + Duration::days(offset_days as i64);
    let hd = HijriDate::from_gr(
        adjusted.year() as usize,
        adjusted.month() as usize,
        adjusted.day() as usize,
    )
    .ok()?;
    Some(format!(
        "{} {} {} AH",
        hd.day(),
        hijri_month_name(hd.month()),
        hd.year()
    ))
}

/// Service first, then offline conversion, then a fixed notice.
pub fn hijri_display(source: &dyn HijriSource, date: NaiveDate, offset_days: i32) -> String {
    match source.hijri_date(date) {
        Ok(s) => s,
        Err(e) => {
            log::warn!("Hijri date lookup failed: {}", e);
            offline_hijri(date, offset_days).unwrap_or_else(|| HIJRI_UNAVAILABLE.to_string())
        }
    }
}
