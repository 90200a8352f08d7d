pub mod audio;
pub mod geolocation;

use anyhow::Result;
use std::sync::Arc;

use crate::api::{
    AddressLookup, AladhanClient, AlQuranClient, BigDataCloudClient, HijriSource, HttpClient,
    PlaceNamer, PrayerTimesSource, VerseSource,
};
use crate::config::{AppConfig, GeolocationMode, PrayerSourceKind};
use crate::prayer_times::calculator::OfflineCalculator;

use audio::{open_output_stream, RodioAudio};
pub use audio::{AudioError, AudioEvent, AudioOutput, SilentAudio};
pub use geolocation::{
    DeniedGeolocator, GeoError, Geolocator, IpGeolocator, UnsupportedGeolocator,
};

/// Every blocking collaborator a job may call. Cheap to clone and safe to
/// hand to a worker thread.
#[derive(Clone)]
pub struct Services {
    pub prayer_times: Arc<dyn PrayerTimesSource>,
    pub verses: Arc<dyn VerseSource>,
    pub hijri: Arc<dyn HijriSource>,
    pub address_lookup: Arc<dyn AddressLookup>,
    pub place_namer: Arc<dyn PlaceNamer>,
    pub geolocator: Arc<dyn Geolocator>,
    pub hijri_offset: i32,
}

impl Services {
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let http = HttpClient::new(config.api.timeout_secs);
        let aladhan = Arc::new(AladhanClient::new(
            http.clone(),
            &config.api.aladhan_url,
            config.prayer.method,
        ));
        let geocode = Arc::new(BigDataCloudClient::new(
            http.clone(),
            &config.api.geocode_url,
        ));

        let prayer_times: Arc<dyn PrayerTimesSource> = match config.prayer.source {
            PrayerSourceKind::Aladhan => aladhan.clone(),
            PrayerSourceKind::Offline => Arc::new(OfflineCalculator::new(
                &config.prayer.calc_method,
                &config.prayer.madhab,
            )?),
        };

        let geolocator: Arc<dyn Geolocator> = match config.location.geolocation {
            GeolocationMode::Ip => Arc::new(IpGeolocator::new(BigDataCloudClient::new(
                http.clone(),
                &config.api.geocode_url,
            ))),
            GeolocationMode::Off => Arc::new(DeniedGeolocator),
            GeolocationMode::None => Arc::new(UnsupportedGeolocator),
        };

        Ok(Self {
            prayer_times,
            verses: Arc::new(AlQuranClient::new(http, &config.api.alquran_url)),
            hijri: aladhan.clone(),
            address_lookup: aladhan,
            place_namer: geocode,
            geolocator,
            hijri_offset: config.calendar.hijri_offset,
        })
    }
}

/// The azan cue output and the recitation output, sharing one device. Both
/// fall back to [`SilentAudio`] when audio is off or no device opens.
pub fn audio_from_config(config: &AppConfig) -> (Box<dyn AudioOutput>, Box<dyn AudioOutput>) {
    let silent = || -> (Box<dyn AudioOutput>, Box<dyn AudioOutput>) {
        (Box::new(SilentAudio::default()), Box::new(SilentAudio::default()))
    };
    if !config.media.audio {
        log::info!("Audio disabled in config");
        return silent();
    }
    let stream = match open_output_stream() {
        Ok(stream) => stream,
        Err(e) => {
            log::warn!("No audio output: {}", e);
            return silent();
        }
    };
    let http = HttpClient::new(config.api.timeout_secs);
    let volume = config.media.volume;
    (
        Box::new(RodioAudio::new(stream.clone(), http.clone(), volume)),
        Box::new(RodioAudio::new(stream, http, volume)),
    )
}
