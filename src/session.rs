use anyhow::Result;
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use std::collections::VecDeque;
use std::sync::mpsc::Receiver;

use crate::config::AppConfig;
use crate::jobs::{Job, JobOutput};
use crate::media::{Player, PlayerError, RecitationSource, RotationTimers, WallpaperRotator};
use crate::models::{PrayerName, Settings, Verse};
use crate::platform::{AudioOutput, Services};
use crate::prayer_times::{AzanCues, LocationError, PrayerTracker};
use crate::store::{self, keys, StateStore, StoreChange};
use crate::utils::timer::Interval;

/// Fraction of a chapter moved by one seek step.
pub const SEEK_STEP: f64 = 0.05;

/// Static inputs of a dashboard, resolved from the config file.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub wallpapers: Vec<String>,
    pub cues: AzanCues,
    pub recitations: RecitationSource,
}

impl SessionConfig {
    pub fn from_app(config: &AppConfig) -> Self {
        Self {
            wallpapers: config
                .media
                .wallpapers
                .iter()
                .map(|w| config.resolve_asset(w))
                .collect(),
            cues: AzanCues {
                standard: config.resolve_asset(&config.media.azan_cue),
                fajr: config.resolve_asset(&config.media.azan_fajr_cue),
            },
            recitations: RecitationSource {
                audio_url: config.api.audio_url.clone(),
                bitrate: config.api.audio_bitrate,
                reciter: config.media.reciter.clone(),
            },
        }
    }
}

/// All state of one running dashboard. Owned by the UI thread; every
/// mutation returns the network jobs it needs, and job results come back
/// through [`Session::complete`].
pub struct Session {
    store: Box<dyn StateStore>,
    changes: Receiver<StoreChange>,
    tracker: PrayerTracker,
    player: Player,
    wallpaper: WallpaperRotator,
    settings: Settings,
    timers: RotationTimers,
    date_timer: Interval,
    date: NaiveDate,
    verse: Verse,
    verse_loading: bool,
    hijri: Option<String>,
    status: Option<String>,
    now: NaiveDateTime,
}

impl Session {
    pub fn new(
        store: Box<dyn StateStore>,
        cue: Box<dyn AudioOutput>,
        audio: Box<dyn AudioOutput>,
        config: SessionConfig,
        now: NaiveDateTime,
    ) -> Self {
        let changes = store.subscribe();
        let settings: Settings = store::get(store.as_ref(), keys::SETTINGS)
            .unwrap_or_else(|e| {
                log::warn!("Ignoring stored settings: {:#}", e);
                None
            })
            .unwrap_or_default();
        let stored_index = store::get(store.as_ref(), keys::WALLPAPER_INDEX).unwrap_or(None);

        let mut tracker = PrayerTracker::new(cue, config.cues);
        tracker.restore(store.as_ref());

        Self {
            changes,
            tracker,
            player: Player::new(audio, config.recitations),
            wallpaper: WallpaperRotator::new(config.wallpapers, stored_index),
            timers: RotationTimers::apply(&settings, now),
            settings,
            date_timer: Interval::new(Duration::hours(1), now),
            date: now.date(),
            verse: Verse::fallback(),
            verse_loading: true,
            hijri: None,
            status: None,
            now,
            store,
        }
    }

    /// Jobs that fill the dashboard right after start.
    pub fn start(&mut self) -> Vec<Job> {
        let mut jobs = Vec::new();
        jobs.extend(self.tracker.resolve_location(self.now.date()));
        jobs.push(self.verse_job());
        jobs.push(self.player.resume(self.store.as_ref()));
        jobs.push(Job::HijriDate(self.date));
        jobs
    }

    // ─── Read access ─────────────────────────────────────────────────────────

    pub fn tracker(&self) -> &PrayerTracker {
        &self.tracker
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn verse(&self) -> &Verse {
        &self.verse
    }

    pub fn verse_loading(&self) -> bool {
        self.verse_loading
    }

    pub fn hijri(&self) -> Option<&str> {
        self.hijri.as_deref()
    }

    pub fn wallpaper(&self) -> &WallpaperRotator {
        &self.wallpaper
    }

    pub fn manual_verse(&self) -> bool {
        self.timers.manual_verse()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    pub fn now_minutes(&self) -> u32 {
        self.now.hour() * 60 + self.now.minute()
    }

    fn report(&mut self, err: anyhow::Error) {
        log::error!("{:#}", err);
        self.status = Some(format!("{:#}", err));
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    // ─── Event loop ──────────────────────────────────────────────────────────

    /// Advances every timer to `now`. Never fails; errors land in the status
    /// line.
    pub fn tick(&mut self, now: NaiveDateTime) -> Vec<Job> {
        self.now = now;
        if let Err(e) = self.store.sync() {
            log::warn!("Store sync failed: {:#}", e);
        }
        self.drain_changes();

        let mut jobs = Vec::new();
        match self.tracker.tick(now, self.store.as_ref()) {
            Ok(more) => jobs.extend(more),
            Err(e) => self.report(e),
        }
        jobs.extend(self.player.tick(self.store.as_ref()));

        if self.timers.wallpaper_due(now) {
            self.rotate_wallpaper();
        }
        if self.timers.verse_due(now) {
            jobs.push(self.verse_job());
        }

        let hourly = self.date_timer.due(now);
        if hourly || now.date() != self.date {
            self.date = now.date();
            jobs.push(Job::HijriDate(self.date));
        }
        jobs
    }

    fn drain_changes(&mut self) {
        let changes: Vec<StoreChange> = self.changes.try_iter().collect();
        for change in changes {
            self.on_store_change(&change);
        }
    }

    fn on_store_change(&mut self, change: &StoreChange) {
        log::trace!("Store change: {}", change.key);
        self.tracker.on_store_change(change, self.now);
        match change.key.as_str() {
            keys::SETTINGS => {
                let settings = store::decode(change).unwrap_or_default();
                self.apply_settings(settings);
            }
            keys::WALLPAPER_INDEX => {
                if let Some(index) = store::decode(change) {
                    self.wallpaper.adopt(index);
                }
            }
            _ => {}
        }
    }

    fn apply_settings(&mut self, settings: Settings) {
        if settings == self.settings {
            return;
        }
        self.timers = RotationTimers::apply(&settings, self.now);
        self.settings = settings;
    }

    /// Applies a finished job. May ask for follow-up jobs.
    pub fn complete(&mut self, output: JobOutput) -> Vec<Job> {
        let today = self.now.date();
        let store = self.store.as_ref();
        let result = match output {
            JobOutput::Located(r) => self.tracker.on_located(r, today, store),
            JobOutput::Geocoded { query, result } => {
                self.tracker.on_geocoded(query, result, today, store)
            }
            JobOutput::Schedule { lat, lng, result } => {
                self.tracker.on_schedule(lat, lng, result, store)
            }
            JobOutput::PlaceName { lat, lng, result } => self
                .tracker
                .on_place_name(lat, lng, result, store)
                .map(|()| None),
            JobOutput::Verse(verse) => {
                self.verse = verse;
                self.verse_loading = false;
                Ok(None)
            }
            JobOutput::ChapterTitle { chapter, result } => {
                self.player.on_chapter_title(chapter, result);
                Ok(None)
            }
            JobOutput::HijriDate(text) => {
                self.hijri = Some(text);
                Ok(None)
            }
        };
        match result {
            Ok(next) => next.into_iter().collect(),
            Err(e) => {
                self.report(e);
                Vec::new()
            }
        }
    }

    /// Runs jobs and their follow-ups to completion on this thread.
    pub fn run_blocking(&mut self, services: &Services, jobs: Vec<Job>) {
        let mut queue: VecDeque<Job> = jobs.into();
        while let Some(job) = queue.pop_front() {
            let output = job.run(services);
            queue.extend(self.complete(output));
        }
    }

    // ─── Media ───────────────────────────────────────────────────────────────

    fn verse_job(&mut self) -> Job {
        self.verse_loading = true;
        Job::RandomVerse {
            edition: self.settings.verse_translation.clone(),
        }
    }

    /// The manual "next verse" control.
    pub fn next_verse(&mut self) -> Job {
        self.verse_job()
    }

    pub fn rotate_wallpaper(&mut self) {
        if let Err(e) = self.wallpaper.rotate(self.store.as_ref()) {
            self.report(e);
        }
    }

    pub fn toggle_play(&mut self) {
        self.player.toggle_play();
    }

    pub fn next_chapter(&mut self) -> Job {
        self.player.next(false, self.store.as_ref())
    }

    pub fn previous_chapter(&mut self) -> Job {
        self.player.previous(self.store.as_ref())
    }

    pub fn jump_to_chapter(&mut self, chapter: i64) -> Result<Job, PlayerError> {
        self.player.jump_to(chapter, self.store.as_ref())
    }

    pub fn toggle_auto_advance(&mut self) -> bool {
        let on = !self.player.auto_advance();
        self.player.set_auto_advance(on);
        on
    }

    pub fn seek_forward(&mut self) {
        self.player.seek_by(SEEK_STEP);
    }

    pub fn seek_back(&mut self) {
        self.player.seek_by(-SEEK_STEP);
    }

    // ─── Settings ────────────────────────────────────────────────────────────

    /// Validates, stores, and re-arms the rotation timers.
    pub fn set_setting(&mut self, field: &str, value: &str) -> Result<()> {
        let mut settings = self.settings.clone();
        settings.set_field(field, value)?;
        store::set(self.store.as_ref(), keys::SETTINGS, &settings)?;
        self.apply_settings(settings);
        Ok(())
    }

    pub fn reset_settings(&mut self) -> Result<()> {
        let settings = Settings::default();
        store::set(self.store.as_ref(), keys::SETTINGS, &settings)?;
        self.apply_settings(settings);
        Ok(())
    }

    // ─── Prayer tracker ──────────────────────────────────────────────────────

    pub fn set_visible(&mut self, visible: bool) {
        if let Err(e) = self.tracker.set_visible(visible, self.store.as_ref()) {
            self.report(e);
        }
    }

    pub fn stop_azan(&mut self) {
        if let Err(e) = self.tracker.stop_azan(self.store.as_ref()) {
            self.report(e);
        }
    }

    pub fn take_break(&mut self) {
        if let Err(e) = self.tracker.take_break(self.store.as_ref()) {
            self.report(e);
        }
    }

    pub fn end_break(&mut self) {
        if let Err(e) = self.tracker.end_break(self.now, self.store.as_ref()) {
            self.report(e);
        }
    }

    pub fn toggle_notification(&mut self, prayer: PrayerName) -> Result<bool> {
        self.tracker.toggle_notification(prayer, self.store.as_ref())
    }

    pub fn detect_location(&mut self) -> Option<Job> {
        match self.tracker.detect_location(self.store.as_ref()) {
            Ok(job) => Some(job),
            Err(e) => {
                self.report(e);
                None
            }
        }
    }

    pub fn set_location(&mut self, text: &str) -> Result<Job, LocationError> {
        self.tracker.set_location_manually(text)
    }

    pub fn refresh_schedule(&mut self) -> Option<Job> {
        let (lat, lng) = self.tracker.location().map(|l| (l.lat, l.lng))?;
        self.tracker.refresh_schedule(lat, lng, self.now.date())
    }
}
