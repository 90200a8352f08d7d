//! Fakes shared by the unit tests.

use chrono::{NaiveDate, NaiveDateTime};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::{
    AddressLookup, ApiError, HijriSource, PlaceNamer, PrayerTimesSource, VerseSource,
};
use crate::models::{AyahText, Location, PrayerSchedule, PrayerTimeSet, SurahInfo, TimeOfDay};
use crate::platform::{AudioError, AudioEvent, AudioOutput, GeoError, Geolocator, Services};

pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
}

pub fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    test_date().and_hms_opt(h, m, s).unwrap()
}

fn t(h: u8, m: u8) -> TimeOfDay {
    TimeOfDay::new(h, m).unwrap()
}

pub fn sample_times() -> PrayerTimeSet {
    PrayerTimeSet {
        fajr: t(5, 0),
        dhuhr: t(12, 15),
        asr: t(15, 45),
        maghrib: t(18, 30),
        isha: t(20, 0),
    }
}

pub fn sample_schedule() -> PrayerSchedule {
    let mut tomorrow = sample_times();
    tomorrow.fajr = t(4, 59);
    PrayerSchedule {
        date: test_date(),
        today: sample_times(),
        tomorrow,
    }
}

// ─── Audio ───────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct AudioState {
    loaded: Option<String>,
    playing: bool,
    position: Duration,
    duration: Option<Duration>,
    event: Option<AudioEvent>,
    fail_next_play: bool,
}

/// Scriptable audio output. Clones share state so a test can keep a handle
/// after boxing one into a component.
#[derive(Debug, Clone, Default)]
pub struct FakeAudio {
    state: Rc<RefCell<AudioState>>,
}

impl FakeAudio {
    pub fn with_duration(secs: u64) -> Self {
        let audio = Self::default();
        audio.state.borrow_mut().duration = Some(Duration::from_secs(secs));
        audio
    }

    pub fn loaded(&self) -> Option<String> {
        self.state.borrow().loaded.clone()
    }

    pub fn is_playing_now(&self) -> bool {
        self.state.borrow().playing
    }

    pub fn position_now(&self) -> Duration {
        self.state.borrow().position
    }

    /// Plays the current clip through to its end.
    pub fn finish(&self) {
        let mut s = self.state.borrow_mut();
        s.playing = false;
        s.position = Duration::ZERO;
        s.event = Some(AudioEvent::Finished);
    }

    /// The clip turns out to be unplayable after `play` succeeded.
    pub fn break_clip(&self, reason: &str) {
        let mut s = self.state.borrow_mut();
        s.playing = false;
        s.event = Some(AudioEvent::Failed(reason.to_string()));
    }

    pub fn fail_next_play(&self) {
        self.state.borrow_mut().fail_next_play = true;
    }
}

impl AudioOutput for FakeAudio {
    fn load(&mut self, source: &str) {
        let mut s = self.state.borrow_mut();
        s.loaded = Some(source.to_string());
        s.playing = false;
        s.position = Duration::ZERO;
        s.event = None;
    }

    fn play(&mut self) -> Result<(), AudioError> {
        let mut s = self.state.borrow_mut();
        if std::mem::take(&mut s.fail_next_play) {
            return Err(AudioError::Spawn("fake failure".to_string()));
        }
        if s.loaded.is_none() {
            return Err(AudioError::Unavailable("nothing loaded".to_string()));
        }
        s.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.state.borrow_mut().playing = false;
    }

    fn seek(&mut self, position: Duration) {
        self.state.borrow_mut().position = position;
    }

    fn position(&self) -> Duration {
        self.state.borrow().position
    }

    fn duration(&self) -> Option<Duration> {
        self.state.borrow().duration
    }

    fn poll(&mut self) -> Option<AudioEvent> {
        self.state.borrow_mut().event.take()
    }
}

// ─── Services ────────────────────────────────────────────────────────────────

/// Canned answers for every service port. A missing entry is an error.
#[derive(Default)]
pub struct FakeApi {
    pub position: Option<(f64, f64)>,
    pub geo_error: Option<GeoError>,
    pub times: Option<PrayerTimeSet>,
    pub places: HashMap<String, (f64, f64)>,
    pub place_name: Option<String>,
    pub hijri: Option<String>,
    pub surahs: HashMap<u16, SurahInfo>,
    pub ayahs: HashMap<(u16, u16, Option<String>), AyahText>,
    /// Every ayah reference requested, for assertions.
    pub requested_ayahs: Mutex<Vec<(u16, u16)>>,
}

impl FakeApi {
    pub fn into_services(self) -> Services {
        let api = Arc::new(self);
        Services {
            prayer_times: api.clone(),
            verses: api.clone(),
            hijri: api.clone(),
            address_lookup: api.clone(),
            place_namer: api.clone(),
            geolocator: api,
            hijri_offset: 0,
        }
    }
}

pub fn surah(number: u16, english: &str, arabic: &str, ayahs: u16) -> SurahInfo {
    SurahInfo {
        number,
        english_name: english.to_string(),
        name: arabic.to_string(),
        ayah_count: ayahs,
    }
}

pub fn ayah(text: &str, surah_name: &str, number: u16) -> AyahText {
    AyahText {
        text: text.to_string(),
        surah_english_name: surah_name.to_string(),
        number_in_surah: number,
    }
}

impl PrayerTimesSource for FakeApi {
    fn day_times(&self, _date: NaiveDate, _location: &Location) -> Result<PrayerTimeSet, ApiError> {
        self.times.clone().ok_or(ApiError::Timeout)
    }
}

impl VerseSource for FakeApi {
    fn surah(&self, number: u16) -> Result<SurahInfo, ApiError> {
        self.surahs.get(&number).cloned().ok_or(ApiError::Code(404))
    }

    fn ayah(&self, surah: u16, ayah: u16, edition: Option<&str>) -> Result<AyahText, ApiError> {
        if let Ok(mut seen) = self.requested_ayahs.lock() {
            seen.push((surah, ayah));
        }
        self.ayahs
            .get(&(surah, ayah, edition.map(String::from)))
            .cloned()
            .ok_or(ApiError::Http("offline".to_string()))
    }
}

impl HijriSource for FakeApi {
    fn hijri_date(&self, _date: NaiveDate) -> Result<String, ApiError> {
        self.hijri.clone().ok_or(ApiError::Timeout)
    }
}

impl AddressLookup for FakeApi {
    fn coordinates_for(&self, address: &str) -> Result<(f64, f64), ApiError> {
        self.places.get(address).copied().ok_or(ApiError::Code(400))
    }
}

impl PlaceNamer for FakeApi {
    fn place_name(&self, _lat: f64, _lng: f64) -> Result<String, ApiError> {
        self.place_name.clone().ok_or(ApiError::Empty)
    }
}

impl Geolocator for FakeApi {
    fn locate(&self) -> Result<(f64, f64), GeoError> {
        match (self.position, self.geo_error) {
            (Some(p), _) => Ok(p),
            (None, Some(e)) => Err(e),
            (None, None) => Err(GeoError::Unavailable),
        }
    }
}
