use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::api::ApiError;
use crate::jobs::Job;
use crate::models::{
    ActiveModal, Location, ModalKind, NotificationPreference, PrayerName, PrayerSchedule,
    TimeOfDay,
};
use crate::platform::{AudioEvent, AudioOutput, GeoError};
use crate::prayer_times::schedule::{next_prayer, prayer_rows, NextPrayer, PrayerRow};
use crate::store::{self, keys, StateStore, StoreChange};

/// Delay between the cue ending and the modal closing, and between an azan
/// and the follow-up schedule refresh.
const AZAN_GRACE_SECS: i64 = 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LocationError {
    #[error("location access denied")]
    Denied,
    #[error("location unavailable")]
    Unavailable,
    #[error("location request timed out")]
    Timeout,
    #[error("geolocation unsupported")]
    Unsupported,
    #[error("no place matches the entered location")]
    NotFound,
    #[error("invalid coordinates")]
    InvalidCoordinates,
    #[error("empty location")]
    EmptyInput,
    #[error("location lookup failed: {0}")]
    Lookup(String),
    #[error("prayer times unavailable: {0}")]
    Service(String),
}

impl From<GeoError> for LocationError {
    fn from(e: GeoError) -> Self {
        match e {
            GeoError::Denied => LocationError::Denied,
            GeoError::Unavailable => LocationError::Unavailable,
            GeoError::Timeout => LocationError::Timeout,
            GeoError::Unsupported => LocationError::Unsupported,
        }
    }
}

impl LocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            LocationError::Denied => GeoError::Denied.user_message(),
            LocationError::Unavailable => GeoError::Unavailable.user_message(),
            LocationError::Timeout => GeoError::Timeout.user_message(),
            LocationError::Unsupported => GeoError::Unsupported.user_message(),
            LocationError::NotFound => "Location not found. Please try a different location.",
            LocationError::EmptyInput => "Please enter a location",
            LocationError::Lookup(_) => "Error setting location. Please try again.",
            LocationError::InvalidCoordinates | LocationError::Service(_) => {
                "Unable to detect location automatically"
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocationStatus {
    Detecting,
    Ready,
    /// Automatic detection failed; the user has to type a place.
    NeedsManual { reason: String },
}

/// Paths of the two call-to-prayer recordings.
#[derive(Debug, Clone)]
pub struct AzanCues {
    pub standard: String,
    pub fajr: String,
}

impl AzanCues {
    fn for_prayer(&self, prayer: PrayerName) -> &str {
        match prayer {
            PrayerName::Fajr => &self.fajr,
            _ => &self.standard,
        }
    }
}

/// Follows today's schedule, raises the azan at the exact minute and keeps
/// the modal consistent with every other running dashboard.
pub struct PrayerTracker {
    schedule: Option<PrayerSchedule>,
    location: Option<Location>,
    status: LocationStatus,
    notifications: NotificationPreference,
    focus_mode: bool,
    modal: Option<ActiveModal>,
    visible: bool,
    cue: Box<dyn AudioOutput>,
    cues: AzanCues,
    cue_error: Option<String>,
    polling: bool,
    last_polled: Option<(NaiveDate, TimeOfDay)>,
    refresh_at: Option<NaiveDateTime>,
    refreshed_for: Option<NaiveDate>,
    dismiss_at: Option<NaiveDateTime>,
}

fn minute_of(now: NaiveDateTime) -> (NaiveDate, TimeOfDay) {
    (now.date(), TimeOfDay::from_time(now.time()))
}

/// Missing and undecodable values both read as absent.
fn read<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Option<T> {
    match store::get(store, key) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("Ignoring stored '{}': {:#}", key, e);
            None
        }
    }
}

impl PrayerTracker {
    pub fn new(cue: Box<dyn AudioOutput>, cues: AzanCues) -> Self {
        Self {
            schedule: None,
            location: None,
            status: LocationStatus::Detecting,
            notifications: NotificationPreference::default(),
            focus_mode: false,
            modal: None,
            visible: true,
            cue,
            cues,
            cue_error: None,
            polling: false,
            last_polled: None,
            refresh_at: None,
            refreshed_for: None,
            dismiss_at: None,
        }
    }

    /// Picks up preferences, focus mode, location and the last-known
    /// schedule left in the store.
    pub fn restore(&mut self, store: &dyn StateStore) {
        if let Some(prefs) = read(store, keys::NOTIFICATIONS) {
            self.notifications = prefs;
        }
        self.focus_mode = read(store, keys::FOCUS_MODE).unwrap_or(false);
        self.location = read::<Location>(store, keys::USER_LOCATION).filter(Location::is_valid);
        self.schedule = read(store, keys::PRAYER_SCHEDULE);
        self.polling = self.schedule.is_some();
    }

    // ─── Accessors ───────────────────────────────────────────────────────────

    pub fn schedule(&self) -> Option<&PrayerSchedule> {
        self.schedule.as_ref()
    }

    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }

    pub fn status(&self) -> &LocationStatus {
        &self.status
    }

    pub fn notifications(&self) -> &NotificationPreference {
        &self.notifications
    }

    pub fn focus_mode(&self) -> bool {
        self.focus_mode
    }

    pub fn modal(&self) -> Option<&ActiveModal> {
        self.modal.as_ref()
    }

    pub fn cue_error(&self) -> Option<&str> {
        self.cue_error.as_deref()
    }

    pub fn next_prayer(&self, now_minutes: u32) -> Option<NextPrayer> {
        self.schedule.as_ref().map(|s| next_prayer(s, now_minutes))
    }

    pub fn rows(&self, now_minutes: u32) -> Vec<PrayerRow> {
        self.schedule
            .as_ref()
            .map(|s| prayer_rows(s, now_minutes))
            .unwrap_or_default()
    }

    // ─── Location ────────────────────────────────────────────────────────────

    /// Uses the stored location when there is one, otherwise asks the
    /// geolocator.
    pub fn resolve_location(&mut self, today: NaiveDate) -> Option<Job> {
        match &self.location {
            Some(loc) => {
                let (lat, lng) = (loc.lat, loc.lng);
                self.refresh_schedule(lat, lng, today)
            }
            None => {
                self.status = LocationStatus::Detecting;
                Some(Job::Locate)
            }
        }
    }

    /// Forgets the stored location and detects it again.
    pub fn detect_location(&mut self, store: &dyn StateStore) -> Result<Job> {
        self.location = None;
        self.status = LocationStatus::Detecting;
        store.remove(keys::USER_LOCATION)?;
        Ok(Job::Locate)
    }

    /// Empty input is rejected before anything is looked up.
    pub fn set_location_manually(&mut self, text: &str) -> Result<Job, LocationError> {
        let query = text.trim();
        if query.is_empty() {
            return Err(LocationError::EmptyInput);
        }
        self.status = LocationStatus::Detecting;
        Ok(Job::Geocode(query.to_string()))
    }

    pub fn on_located(
        &mut self,
        result: Result<(f64, f64), GeoError>,
        today: NaiveDate,
        store: &dyn StateStore,
    ) -> Result<Option<Job>> {
        match result {
            Ok((lat, lng)) => self.adopt_location(Location::new(lat, lng), today, store),
            Err(e) => {
                log::warn!("Automatic location failed: {}", e);
                self.needs_manual(&LocationError::from(e));
                Ok(None)
            }
        }
    }

    pub fn on_geocoded(
        &mut self,
        query: String,
        result: Result<(f64, f64), ApiError>,
        today: NaiveDate,
        store: &dyn StateStore,
    ) -> Result<Option<Job>> {
        match result {
            Ok((lat, lng)) => {
                let location = Location {
                    lat,
                    lng,
                    label: Some(query),
                };
                self.adopt_location(location, today, store)
            }
            Err(e) => {
                log::warn!("Geocoding '{}' failed: {}", query, e);
                let err = match e {
                    ApiError::Empty | ApiError::Code(_) | ApiError::Status(404) => {
                        LocationError::NotFound
                    }
                    other => LocationError::Lookup(other.to_string()),
                };
                self.needs_manual(&err);
                Ok(None)
            }
        }
    }

    fn adopt_location(
        &mut self,
        location: Location,
        today: NaiveDate,
        store: &dyn StateStore,
    ) -> Result<Option<Job>> {
        if !location.is_valid() {
            self.needs_manual(&LocationError::InvalidCoordinates);
            return Ok(None);
        }
        log::info!("Using location {}", location.coordinates_label());
        store::set(store, keys::USER_LOCATION, &location)?;
        let (lat, lng) = (location.lat, location.lng);
        self.location = Some(location);
        Ok(self.refresh_schedule(lat, lng, today))
    }

    fn needs_manual(&mut self, err: &LocationError) {
        self.status = LocationStatus::NeedsManual {
            reason: err.user_message().to_string(),
        };
    }

    // ─── Schedule ────────────────────────────────────────────────────────────

    /// Invalid coordinates never reach the network.
    pub fn refresh_schedule(&mut self, lat: f64, lng: f64, today: NaiveDate) -> Option<Job> {
        if !Location::new(lat, lng).is_valid() {
            log::warn!("Refusing to fetch times for ({}, {})", lat, lng);
            self.needs_manual(&LocationError::InvalidCoordinates);
            return None;
        }
        self.refreshed_for = Some(today);
        Some(Job::FetchSchedule {
            lat,
            lng,
            date: today,
        })
    }

    fn refresh_current(&mut self, today: NaiveDate) -> Option<Job> {
        let (lat, lng) = self.location.as_ref().map(|l| (l.lat, l.lng))?;
        self.refresh_schedule(lat, lng, today)
    }

    pub fn on_schedule(
        &mut self,
        lat: f64,
        lng: f64,
        result: Result<PrayerSchedule, ApiError>,
        store: &dyn StateStore,
    ) -> Result<Option<Job>> {
        let schedule = match result {
            Ok(s) => s,
            Err(e) => {
                log::warn!("Fetching prayer times failed: {}", e);
                self.needs_manual(&LocationError::Service(e.to_string()));
                return Ok(None);
            }
        };
        log::info!("Prayer times loaded for {}", schedule.date);
        store::set(store, keys::PRAYER_SCHEDULE, &schedule)?;
        self.schedule = Some(schedule);
        self.polling = true;
        self.status = LocationStatus::Ready;

        let unnamed = self
            .location
            .as_ref()
            .is_some_and(|l| l.label.is_none() && l.lat == lat && l.lng == lng);
        Ok(unnamed.then_some(Job::PlaceName { lat, lng }))
    }

    /// Falls back to the coordinates when no place name is available.
    pub fn on_place_name(
        &mut self,
        lat: f64,
        lng: f64,
        result: Result<String, ApiError>,
        store: &dyn StateStore,
    ) -> Result<()> {
        let Some(location) = self.location.as_mut() else {
            return Ok(());
        };
        if location.lat != lat || location.lng != lng {
            return Ok(());
        }
        let label = result.unwrap_or_else(|e| {
            log::warn!("Reverse geocoding failed: {}", e);
            location.coordinates_label()
        });
        location.label = Some(label);
        store::set(store, keys::USER_LOCATION, &*location)
    }

    // ─── Polling and azan ────────────────────────────────────────────────────

    pub fn tick(&mut self, now: NaiveDateTime, store: &dyn StateStore) -> Result<Vec<Job>> {
        let mut jobs = Vec::new();

        if self.modal.is_some() && self.dismiss_at.is_none() {
            match self.cue.poll() {
                Some(AudioEvent::Finished) => {
                    self.dismiss_at = Some(now + Duration::seconds(AZAN_GRACE_SECS));
                }
                // The modal stays up until dismissed, with the reason shown.
                Some(AudioEvent::Failed(reason)) => {
                    log::warn!("Azan cue failed: {}", reason);
                    self.cue_error = Some("Audio not available".to_string());
                }
                None => {}
            }
        }
        if self.dismiss_at.is_some_and(|at| now >= at) {
            log::info!("Azan finished; closing modal");
            self.stop_azan(store)?;
        }

        if self.refresh_at.is_some_and(|at| now >= at) {
            self.refresh_at = None;
            jobs.extend(self.refresh_current(now.date()));
        }

        let stale = self.schedule.as_ref().is_some_and(|s| s.date != now.date());
        if stale && self.refreshed_for != Some(now.date()) {
            jobs.extend(self.refresh_current(now.date()));
        }

        self.poll_tick(now, store)?;
        Ok(jobs)
    }

    /// Checks the current minute at most once. Returns the prayer whose azan
    /// was raised, if any.
    pub fn poll_tick(
        &mut self,
        now: NaiveDateTime,
        store: &dyn StateStore,
    ) -> Result<Option<PrayerName>> {
        if !self.polling || self.focus_mode {
            return Ok(None);
        }
        let minute = minute_of(now);
        if self.last_polled == Some(minute) {
            return Ok(None);
        }
        self.last_polled = Some(minute);

        let Some(schedule) = &self.schedule else {
            return Ok(None);
        };
        let set = if schedule.date == now.date() {
            &schedule.today
        } else if schedule.date.succ_opt() == Some(now.date()) {
            &schedule.tomorrow
        } else {
            return Ok(None);
        };

        let due = set
            .iter()
            .find(|(p, t)| *t == minute.1 && self.notifications.is_enabled(*p));
        match due {
            Some((prayer, time)) => {
                self.fire_azan(prayer, time, now, store)?;
                Ok(Some(prayer))
            }
            None => Ok(None),
        }
    }

    pub fn fire_azan(
        &mut self,
        prayer: PrayerName,
        time: TimeOfDay,
        now: NaiveDateTime,
        store: &dyn StateStore,
    ) -> Result<()> {
        log::info!("{} time ({})", prayer, time);
        let modal = ActiveModal {
            kind: ModalKind::Azan,
            prayer,
            time,
            fired_at_ms: now.and_utc().timestamp_millis(),
        };
        self.show_modal(modal.clone());
        self.refresh_at = Some(now + Duration::seconds(AZAN_GRACE_SECS));
        store::set(store, keys::ACTIVE_MODAL, &modal)
    }

    fn show_modal(&mut self, modal: ActiveModal) {
        let same = self
            .modal
            .as_ref()
            .is_some_and(|m| m.prayer == modal.prayer && m.time == modal.time);
        if same {
            return;
        }
        self.dismiss_at = None;
        self.cue.load(self.cues.for_prayer(modal.prayer));
        self.cue_error = match self.cue.play() {
            Ok(()) => None,
            Err(e) => {
                log::warn!("Could not play azan: {}", e);
                Some("Audio not available".to_string())
            }
        };
        self.modal = Some(modal);
    }

    fn hide_modal(&mut self) {
        self.cue.stop();
        self.modal = None;
        self.dismiss_at = None;
        self.cue_error = None;
    }

    /// Silences the cue here and closes the modal everywhere.
    pub fn stop_azan(&mut self, store: &dyn StateStore) -> Result<()> {
        self.hide_modal();
        store.remove(keys::ACTIVE_MODAL)
    }

    pub fn take_break(&mut self, store: &dyn StateStore) -> Result<()> {
        self.stop_azan(store)?;
        self.focus_mode = true;
        store::set(store, keys::FOCUS_MODE, &true)
    }

    /// Polling resumes with the next minute; prayers missed during the break
    /// are not raised.
    pub fn end_break(&mut self, now: NaiveDateTime, store: &dyn StateStore) -> Result<()> {
        self.focus_mode = false;
        self.last_polled = Some(minute_of(now));
        store::set(store, keys::FOCUS_MODE, &false)
    }

    /// Returns the new state of the toggle.
    pub fn toggle_notification(
        &mut self,
        prayer: PrayerName,
        store: &dyn StateStore,
    ) -> Result<bool> {
        let enabled = self.notifications.toggle(prayer);
        store::set(store, keys::NOTIFICATIONS, &self.notifications)?;
        Ok(enabled)
    }

    // ─── Cross-instance state ────────────────────────────────────────────────

    pub fn on_store_change(&mut self, change: &StoreChange, now: NaiveDateTime) {
        match change.key.as_str() {
            keys::ACTIVE_MODAL => match store::decode::<ActiveModal>(change) {
                Some(modal) => {
                    if self.visible {
                        self.show_modal(modal);
                    }
                }
                None => {
                    if self.modal.is_some() {
                        self.hide_modal();
                    }
                }
            },
            keys::FOCUS_MODE => {
                let on = store::decode::<bool>(change).unwrap_or(false);
                if on != self.focus_mode {
                    self.focus_mode = on;
                    if on {
                        self.hide_modal();
                    } else {
                        self.last_polled = Some(minute_of(now));
                    }
                }
            }
            keys::NOTIFICATIONS => {
                if let Some(prefs) = store::decode(change) {
                    self.notifications = prefs;
                }
            }
            _ => {}
        }
    }

    /// Becoming visible reconciles the modal with the stored one first.
    pub fn set_visible(&mut self, visible: bool, store: &dyn StateStore) -> Result<()> {
        let became_visible = visible && !self.visible;
        self.visible = visible;
        if !became_visible {
            return Ok(());
        }
        match store::get::<ActiveModal>(store, keys::ACTIVE_MODAL)? {
            Some(modal) => self.show_modal(modal),
            None => {
                if self.modal.is_some() {
                    self.hide_modal();
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::{at, sample_schedule, FakeAudio};

    fn cues() -> AzanCues {
        AzanCues {
            standard: "azan.mp3".to_string(),
            fajr: "azan_fajr.mp3".to_string(),
        }
    }

    fn tracker_with_schedule(store: &MemoryStore) -> (PrayerTracker, FakeAudio) {
        let audio = FakeAudio::default();
        let mut tracker = PrayerTracker::new(Box::new(audio.clone()), cues());
        tracker
            .on_schedule(21.4, 39.8, Ok(sample_schedule()), store)
            .unwrap();
        (tracker, audio)
    }

    #[test]
    fn fires_once_at_the_exact_minute() {
        let store = MemoryStore::new();
        let (mut tracker, audio) = tracker_with_schedule(&store);

        assert_eq!(tracker.poll_tick(at(15, 44, 59), &store).unwrap(), None);
        assert_eq!(
            tracker.poll_tick(at(15, 45, 0), &store).unwrap(),
            Some(PrayerName::Asr)
        );
        assert_eq!(tracker.poll_tick(at(15, 45, 30), &store).unwrap(), None);
        assert_eq!(tracker.poll_tick(at(15, 46, 0), &store).unwrap(), None);

        let stored: ActiveModal = store::get(&store, keys::ACTIVE_MODAL).unwrap().unwrap();
        assert_eq!(stored.prayer, PrayerName::Asr);
        assert_eq!(audio.loaded().as_deref(), Some("azan.mp3"));
        assert!(audio.is_playing_now());
    }

    #[test]
    fn fajr_uses_its_own_cue() {
        let store = MemoryStore::new();
        let (mut tracker, audio) = tracker_with_schedule(&store);
        tracker.poll_tick(at(5, 0, 10), &store).unwrap();
        assert_eq!(audio.loaded().as_deref(), Some("azan_fajr.mp3"));
    }

    #[test]
    fn disabled_prayer_is_skipped() {
        let store = MemoryStore::new();
        let (mut tracker, _audio) = tracker_with_schedule(&store);
        assert!(!tracker.toggle_notification(PrayerName::Maghrib, &store).unwrap());

        assert_eq!(tracker.poll_tick(at(18, 30, 0), &store).unwrap(), None);
        assert!(tracker.modal().is_none());
        assert_eq!(
            tracker.poll_tick(at(20, 0, 0), &store).unwrap(),
            Some(PrayerName::Isha)
        );
    }

    #[test]
    fn focus_mode_suppresses_and_resumes_without_catch_up() {
        let store = MemoryStore::new();
        let (mut tracker, audio) = tracker_with_schedule(&store);

        tracker.poll_tick(at(12, 15, 0), &store).unwrap();
        tracker.take_break(&store).unwrap();
        assert!(tracker.modal().is_none());
        assert!(!audio.is_playing_now());
        assert_eq!(store::get::<bool>(&store, keys::FOCUS_MODE).unwrap(), Some(true));

        assert_eq!(tracker.poll_tick(at(15, 45, 0), &store).unwrap(), None);
        tracker.end_break(at(15, 45, 20), &store).unwrap();
        assert_eq!(tracker.poll_tick(at(15, 45, 40), &store).unwrap(), None);
        assert_eq!(
            tracker.poll_tick(at(18, 30, 0), &store).unwrap(),
            Some(PrayerName::Maghrib)
        );
    }

    #[test]
    fn cue_end_closes_modal_after_grace_period() {
        let store = MemoryStore::new();
        let (mut tracker, audio) = tracker_with_schedule(&store);
        tracker.poll_tick(at(18, 30, 0), &store).unwrap();

        audio.finish();
        tracker.tick(at(18, 33, 0), &store).unwrap();
        assert!(tracker.modal().is_some());
        tracker.tick(at(18, 33, 2), &store).unwrap();
        assert!(tracker.modal().is_none());
        assert_eq!(store.get_raw(keys::ACTIVE_MODAL).unwrap(), None);
    }

    #[test]
    fn azan_requests_a_schedule_refresh() {
        let store = MemoryStore::new();
        let (mut tracker, _audio) = tracker_with_schedule(&store);
        tracker.location = Some(Location::new(21.4, 39.8));
        tracker.poll_tick(at(18, 30, 0), &store).unwrap();

        assert!(tracker.tick(at(18, 30, 1), &store).unwrap().is_empty());
        let jobs = tracker.tick(at(18, 30, 2), &store).unwrap();
        assert!(matches!(jobs.as_slice(), [Job::FetchSchedule { .. }]));
    }

    #[test]
    fn failed_cue_keeps_modal_with_message() {
        let store = MemoryStore::new();
        let (mut tracker, audio) = tracker_with_schedule(&store);
        audio.fail_next_play();
        tracker.poll_tick(at(20, 0, 0), &store).unwrap();
        assert!(tracker.modal().is_some());
        assert_eq!(tracker.cue_error(), Some("Audio not available"));
    }

    #[test]
    fn cue_failing_after_start_keeps_modal_with_message() {
        let store = MemoryStore::new();
        let (mut tracker, audio) = tracker_with_schedule(&store);
        tracker.poll_tick(at(15, 45, 0), &store).unwrap();
        assert_eq!(tracker.cue_error(), None);

        audio.break_clip("decoder error");
        tracker.tick(at(15, 45, 1), &store).unwrap();
        assert_eq!(tracker.cue_error(), Some("Audio not available"));

        tracker.tick(at(15, 50, 0), &store).unwrap();
        let modal = tracker.modal().expect("modal stays open");
        assert_eq!(modal.prayer, PrayerName::Asr);
        assert!(store.get_raw(keys::ACTIVE_MODAL).unwrap().is_some());
    }

    #[test]
    fn invalid_coordinates_never_fetch() {
        let audio = FakeAudio::default();
        let mut tracker = PrayerTracker::new(Box::new(audio), cues());
        let today = at(9, 0, 0).date();
        assert!(tracker.refresh_schedule(f64::NAN, 10.0, today).is_none());
        assert!(tracker.refresh_schedule(95.0, 10.0, today).is_none());
        assert_eq!(
            tracker.status(),
            &LocationStatus::NeedsManual {
                reason: "Unable to detect location automatically".to_string()
            }
        );
    }

    #[test]
    fn empty_manual_location_is_rejected() {
        let mut tracker = PrayerTracker::new(Box::new(FakeAudio::default()), cues());
        assert_eq!(
            tracker.set_location_manually("   "),
            Err(LocationError::EmptyInput)
        );
        assert_eq!(
            tracker.set_location_manually(" Cairo ").unwrap(),
            Job::Geocode("Cairo".to_string())
        );
    }

    #[test]
    fn geolocation_failure_maps_to_message() {
        let store = MemoryStore::new();
        let mut tracker = PrayerTracker::new(Box::new(FakeAudio::default()), cues());
        let today = at(9, 0, 0).date();
        let job = tracker
            .on_located(Err(GeoError::Timeout), today, &store)
            .unwrap();
        assert!(job.is_none());
        assert_eq!(
            tracker.status(),
            &LocationStatus::NeedsManual {
                reason: "Location request timed out. Please try again or use manual detection."
                    .to_string()
            }
        );
    }

    #[test]
    fn unknown_place_asks_again() {
        let store = MemoryStore::new();
        let mut tracker = PrayerTracker::new(Box::new(FakeAudio::default()), cues());
        let today = at(9, 0, 0).date();
        tracker
            .on_geocoded("Atlantis".to_string(), Err(ApiError::Code(400)), today, &store)
            .unwrap();
        assert_eq!(
            tracker.status(),
            &LocationStatus::NeedsManual {
                reason: "Location not found. Please try a different location.".to_string()
            }
        );
    }

    #[test]
    fn schedule_failure_keeps_last_known_times() {
        let store = MemoryStore::new();
        let (mut tracker, _audio) = tracker_with_schedule(&store);
        tracker
            .on_schedule(21.4, 39.8, Err(ApiError::Timeout), &store)
            .unwrap();
        assert_eq!(tracker.schedule(), Some(&sample_schedule()));
        assert!(matches!(tracker.status(), LocationStatus::NeedsManual { .. }));
    }

    #[test]
    fn located_position_is_persisted_and_named() {
        let store = MemoryStore::new();
        let mut tracker = PrayerTracker::new(Box::new(FakeAudio::default()), cues());
        let today = at(9, 0, 0).date();
        let job = tracker.on_located(Ok((30.0444, 31.2357)), today, &store).unwrap();
        assert_eq!(
            job,
            Some(Job::FetchSchedule {
                lat: 30.0444,
                lng: 31.2357,
                date: today
            })
        );
        let next = tracker
            .on_schedule(30.0444, 31.2357, Ok(sample_schedule()), &store)
            .unwrap();
        assert_eq!(next, Some(Job::PlaceName { lat: 30.0444, lng: 31.2357 }));

        tracker
            .on_place_name(30.0444, 31.2357, Err(ApiError::Empty), &store)
            .unwrap();
        let stored: Location = store::get(&store, keys::USER_LOCATION).unwrap().unwrap();
        assert_eq!(stored.label.as_deref(), Some("30.0444, 31.2357"));
    }

    #[test]
    fn hidden_instance_reconciles_on_becoming_visible() {
        let store = MemoryStore::new();
        let (mut tracker, audio) = tracker_with_schedule(&store);
        tracker.set_visible(false, &store).unwrap();

        let modal = ActiveModal {
            kind: ModalKind::Azan,
            prayer: PrayerName::Dhuhr,
            time: TimeOfDay::new(12, 15).unwrap(),
            fired_at_ms: 0,
        };
        store::set(&store, keys::ACTIVE_MODAL, &modal).unwrap();
        let change = StoreChange {
            key: keys::ACTIVE_MODAL.to_string(),
            new_value: store.get_raw(keys::ACTIVE_MODAL).unwrap(),
        };
        tracker.on_store_change(&change, at(12, 15, 3));
        assert!(tracker.modal().is_none());

        tracker.set_visible(true, &store).unwrap();
        assert_eq!(tracker.modal(), Some(&modal));
        assert!(audio.is_playing_now());
    }
}
