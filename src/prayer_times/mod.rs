pub mod calculator;
pub mod schedule;
pub mod tracker;

pub use schedule::{remaining_time, NextPrayer, PrayerRow};
pub use tracker::{AzanCues, LocationError, LocationStatus, PrayerTracker};
