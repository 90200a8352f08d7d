pub mod settings;

pub use settings::{AppConfig, GeolocationMode, PrayerSourceKind};
