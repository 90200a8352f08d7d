use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

fn default_geolocation() -> GeolocationMode {
    GeolocationMode::Ip
}
fn default_source() -> PrayerSourceKind {
    PrayerSourceKind::Aladhan
}
fn default_method() -> u8 {
    // ISNA
    2
}
fn default_calc_method() -> String {
    "NorthAmerica".to_string()
}
fn default_madhab() -> String {
    "Shafi".to_string()
}
fn default_aladhan_url() -> String {
    "https://api.aladhan.com/v1".to_string()
}
fn default_alquran_url() -> String {
    "https://api.alquran.cloud/v1".to_string()
}
fn default_geocode_url() -> String {
    "https://api.bigdatacloud.net/data".to_string()
}
fn default_audio_url() -> String {
    "https://cdn.islamic.network/quran/audio-surah".to_string()
}
fn default_bitrate() -> u16 {
    128
}
fn default_timeout_secs() -> u64 {
    10
}
fn default_wallpapers() -> Vec<String> {
    vec!["bg/bg_default.jpg".to_string(), "bg/bg_01.png".to_string()]
}
fn default_reciter() -> String {
    "ar.alafasy".to_string()
}
fn default_azan_cue() -> String {
    "audio/azan.mp3".to_string()
}
fn default_azan_fajr_cue() -> String {
    "audio/azan_fajr.mp3".to_string()
}
fn default_true() -> bool {
    true
}
fn default_volume() -> f32 {
    1.0
}
fn default_tick_ms() -> u64 {
    500
}
fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationMode {
    /// Look the position up from the public IP address
    Ip,
    /// Treat automatic detection as denied
    Off,
    /// No provider; behaves as an unsupported platform
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrayerSourceKind {
    Aladhan,
    Offline,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationConfig {
    #[serde(default = "default_geolocation")]
    pub geolocation: GeolocationMode,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            geolocation: default_geolocation(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrayerConfig {
    #[serde(default = "default_source")]
    pub source: PrayerSourceKind,
    /// Calculation method id understood by the timings service
    #[serde(default = "default_method")]
    pub method: u8,
    /// Method name for the offline calculator
    #[serde(default = "default_calc_method")]
    pub calc_method: String,
    #[serde(default = "default_madhab")]
    pub madhab: String,
}

impl Default for PrayerConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            method: default_method(),
            calc_method: default_calc_method(),
            madhab: default_madhab(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_aladhan_url")]
    pub aladhan_url: String,
    #[serde(default = "default_alquran_url")]
    pub alquran_url: String,
    #[serde(default = "default_geocode_url")]
    pub geocode_url: String,
    #[serde(default = "default_audio_url")]
    pub audio_url: String,
    #[serde(default = "default_bitrate")]
    pub audio_bitrate: u16,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            aladhan_url: default_aladhan_url(),
            alquran_url: default_alquran_url(),
            geocode_url: default_geocode_url(),
            audio_url: default_audio_url(),
            audio_bitrate: default_bitrate(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    #[serde(default = "default_wallpapers")]
    pub wallpapers: Vec<String>,
    #[serde(default = "default_reciter")]
    pub reciter: String,
    #[serde(default = "default_azan_cue")]
    pub azan_cue: String,
    #[serde(default = "default_azan_fajr_cue")]
    pub azan_fajr_cue: String,
    /// `false` keeps the dashboard silent.
    #[serde(default = "default_true")]
    pub audio: bool,
    /// Output gain for cues and recitations; 1.0 is unchanged.
    #[serde(default = "default_volume")]
    pub volume: f32,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            wallpapers: default_wallpapers(),
            reciter: default_reciter(),
            azan_cue: default_azan_cue(),
            azan_fajr_cue: default_azan_fajr_cue(),
            audio: true,
            volume: default_volume(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CalendarConfig {
    /// Days to add/subtract from the offline Hijri date for local moon sighting.
    #[serde(default)]
    pub hijri_offset: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub location: LocationConfig,
    #[serde(default)]
    pub prayer: PrayerConfig,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub calendar: CalendarConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

impl AppConfig {
    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("", "", "miqat").context("Could not determine project directories")
    }

    pub fn config_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn data_dir() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        Ok(dirs.data_dir().to_path_buf())
    }

    pub fn db_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("miqat.db"))
    }

    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("miqat.log"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).with_context(|| format!("Reading {:?}", path))?;
        let config: AppConfig = toml::from_str(&content).context("Parsing config.toml")?;
        Ok(config)
    }

    pub fn ensure_data_dir() -> Result<PathBuf> {
        let dir = Self::data_dir()?;
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }

    /// Relative asset paths are looked up in the data directory.
    pub fn resolve_asset(&self, path: &str) -> String {
        let p = Path::new(path);
        if p.is_absolute() || path.contains("://") {
            return path.to_string();
        }
        match Self::data_dir() {
            Ok(dir) => dir.join(p).to_string_lossy().into_owned(),
            Err(_) => path.to_string(),
        }
    }
}
