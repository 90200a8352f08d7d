use std::time::Duration;
use thiserror::Error;

use crate::api::ApiError;
use crate::jobs::Job;
use crate::models::{SurahInfo, CHAPTER_COUNT};
use crate::platform::{AudioError, AudioEvent, AudioOutput};
use crate::store::{self, keys, StateStore};

pub const LOADING_LABEL: &str = "Loading...";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlayerError {
    #[error("chapter must be between 1 and {max}, got {0}", max = CHAPTER_COUNT)]
    InvalidChapter(i64),
}

/// Where recitations are fetched from.
#[derive(Debug, Clone)]
pub struct RecitationSource {
    pub audio_url: String,
    pub bitrate: u16,
    pub reciter: String,
}

impl RecitationSource {
    pub fn chapter_url(&self, chapter: u16) -> String {
        format!(
            "{}/{}/{}/{}.mp3",
            self.audio_url.trim_end_matches('/'),
            self.bitrate,
            self.reciter,
            chapter
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackState {
    pub chapter: u16,
    pub is_playing: bool,
    pub auto_advance: bool,
    pub reciter: String,
}

/// Sequential transport over the 114 chapters.
pub struct Player {
    audio: Box<dyn AudioOutput>,
    source: RecitationSource,
    chapter: u16,
    is_playing: bool,
    auto_advance: bool,
    title: String,
}

fn wrap_next(chapter: u16) -> u16 {
    if chapter >= CHAPTER_COUNT {
        1
    } else {
        chapter + 1
    }
}

fn wrap_previous(chapter: u16) -> u16 {
    if chapter <= 1 {
        CHAPTER_COUNT
    } else {
        chapter - 1
    }
}

fn audio_message(err: &AudioError) -> &'static str {
    match err {
        AudioError::Unavailable(_) => "Audio not available",
        AudioError::Spawn(_) => "Audio playback failed",
    }
}

impl Player {
    pub fn new(audio: Box<dyn AudioOutput>, source: RecitationSource) -> Self {
        Self {
            audio,
            source,
            chapter: 1,
            is_playing: false,
            auto_advance: false,
            title: LOADING_LABEL.to_string(),
        }
    }

    /// Cues up the chapter left in the store (or the first one) without
    /// writing anything back.
    pub fn resume(&mut self, store: &dyn StateStore) -> Job {
        let stored = store::get::<u16>(store, keys::PLAYER_CHAPTER)
            .unwrap_or_else(|e| {
                log::warn!("Ignoring stored chapter: {:#}", e);
                None
            })
            .filter(|n| (1..=CHAPTER_COUNT).contains(n))
            .unwrap_or(1);
        self.cue_up(stored)
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState {
            chapter: self.chapter,
            is_playing: self.is_playing,
            auto_advance: self.auto_advance,
            reciter: self.source.reciter.clone(),
        }
    }

    pub fn chapter(&self) -> u16 {
        self.chapter
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn auto_advance(&self) -> bool {
        self.auto_advance
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn position(&self) -> Duration {
        self.audio.position()
    }

    pub fn duration(&self) -> Option<Duration> {
        self.audio.duration()
    }

    /// Fraction of the chapter played, when the length is known.
    pub fn progress(&self) -> Option<f64> {
        let total = self.duration()?.as_secs_f64();
        (total > 0.0).then(|| (self.position().as_secs_f64() / total).clamp(0.0, 1.0))
    }

    fn cue_up(&mut self, chapter: u16) -> Job {
        self.chapter = chapter;
        self.is_playing = false;
        self.title = LOADING_LABEL.to_string();
        self.audio.load(&self.source.chapter_url(chapter));
        if self.auto_advance {
            self.play();
        }
        Job::ChapterTitle(chapter)
    }

    /// Switches to `chapter`, remembers it, and asks for its title.
    pub fn load_chapter(&mut self, chapter: u16, store: &dyn StateStore) -> Job {
        log::debug!("Loading chapter {}", chapter);
        if let Err(e) = store::set(store, keys::PLAYER_CHAPTER, &chapter) {
            log::warn!("Could not remember chapter: {:#}", e);
        }
        self.cue_up(chapter)
    }

    pub fn play(&mut self) {
        match self.audio.play() {
            Ok(()) => self.is_playing = true,
            Err(e) => {
                log::warn!("Playback failed: {}", e);
                self.is_playing = false;
                self.title = audio_message(&e).to_string();
            }
        }
    }

    pub fn pause(&mut self) {
        self.audio.pause();
        self.is_playing = false;
    }

    pub fn toggle_play(&mut self) {
        if self.is_playing {
            self.pause();
        } else {
            self.play();
        }
    }

    /// Jumps to a fraction of the chapter. Does nothing until the length is
    /// known.
    pub fn seek(&mut self, fraction: f64) {
        let Some(total) = self.duration() else {
            return;
        };
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.audio.seek(total.mul_f64(fraction));
    }

    /// Moves by a fraction of the chapter relative to the current position.
    pub fn seek_by(&mut self, delta: f64) {
        if let Some(current) = self.progress() {
            self.seek(current + delta);
        }
    }

    /// Only an automatic advance with auto-advance on keeps playing through
    /// the switch; otherwise the player pauses first.
    pub fn next(&mut self, auto_triggered: bool, store: &dyn StateStore) -> Job {
        if !(auto_triggered && self.auto_advance) {
            self.pause();
        }
        self.load_chapter(wrap_next(self.chapter), store)
    }

    pub fn previous(&mut self, store: &dyn StateStore) -> Job {
        self.pause();
        self.load_chapter(wrap_previous(self.chapter), store)
    }

    pub fn jump_to(&mut self, chapter: i64, store: &dyn StateStore) -> Result<Job, PlayerError> {
        let n = u16::try_from(chapter)
            .ok()
            .filter(|n| (1..=CHAPTER_COUNT).contains(n))
            .ok_or(PlayerError::InvalidChapter(chapter))?;
        self.pause();
        Ok(self.load_chapter(n, store))
    }

    pub fn set_auto_advance(&mut self, on: bool) {
        self.auto_advance = on;
    }

    /// Titles for a chapter the player has already left are dropped.
    pub fn on_chapter_title(&mut self, chapter: u16, result: Result<SurahInfo, ApiError>) {
        if chapter != self.chapter {
            log::debug!("Dropping stale title for chapter {}", chapter);
            return;
        }
        // A playback error reported meanwhile stays visible.
        if self.title != LOADING_LABEL {
            return;
        }
        self.title = match result {
            Ok(info) => info.title(),
            Err(ApiError::Code(404) | ApiError::Status(404) | ApiError::Empty) => {
                "Surah not found".to_string()
            }
            Err(e) => {
                log::warn!("Chapter {} metadata failed: {}", chapter, e);
                "Error loading surah".to_string()
            }
        };
    }

    /// Handles the natural end of a chapter or a failed clip.
    pub fn tick(&mut self, store: &dyn StateStore) -> Option<Job> {
        match self.audio.poll()? {
            AudioEvent::Finished if self.auto_advance => Some(self.next(true, store)),
            AudioEvent::Finished => {
                self.is_playing = false;
                None
            }
            AudioEvent::Failed(reason) => {
                log::warn!("Chapter {} playback failed: {}", self.chapter, reason);
                self.is_playing = false;
                self.title = "Audio not available".to_string();
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::{surah, FakeAudio};

    fn player(audio: &FakeAudio) -> Player {
        Player::new(
            Box::new(audio.clone()),
            RecitationSource {
                audio_url: "https://cdn.example/quran/audio-surah/".to_string(),
                bitrate: 128,
                reciter: "ar.alafasy".to_string(),
            },
        )
    }

    #[test]
    fn chapter_navigation_wraps() {
        let store = MemoryStore::new();
        let audio = FakeAudio::default();
        let mut p = player(&audio);

        p.load_chapter(114, &store);
        assert_eq!(p.next(false, &store), Job::ChapterTitle(1));
        assert_eq!(p.chapter(), 1);
        assert_eq!(p.previous(&store), Job::ChapterTitle(114));
        assert_eq!(
            audio.loaded().as_deref(),
            Some("https://cdn.example/quran/audio-surah/128/ar.alafasy/114.mp3")
        );
        assert_eq!(store::get::<u16>(&store, keys::PLAYER_CHAPTER).unwrap(), Some(114));
    }

    #[test]
    fn manual_next_pauses() {
        let store = MemoryStore::new();
        let audio = FakeAudio::default();
        let mut p = player(&audio);
        p.load_chapter(2, &store);
        p.play();
        assert!(p.is_playing());
        p.next(false, &store);
        assert!(!p.is_playing());
        assert!(!audio.is_playing_now());
    }

    #[test]
    fn end_of_chapter_advances_only_with_auto_advance() {
        let store = MemoryStore::new();
        let audio = FakeAudio::default();
        let mut p = player(&audio);
        p.load_chapter(5, &store);
        p.play();

        audio.finish();
        assert_eq!(p.tick(&store), None);
        assert!(!p.is_playing());
        assert_eq!(p.chapter(), 5);

        p.set_auto_advance(true);
        p.play();
        audio.finish();
        assert_eq!(p.tick(&store), Some(Job::ChapterTitle(6)));
        assert!(p.is_playing());
        assert!(audio.is_playing_now());
    }

    #[test]
    fn jump_rejects_out_of_range() {
        let store = MemoryStore::new();
        let mut p = player(&FakeAudio::default());
        assert_eq!(p.jump_to(0, &store), Err(PlayerError::InvalidChapter(0)));
        assert_eq!(p.jump_to(115, &store), Err(PlayerError::InvalidChapter(115)));
        assert_eq!(p.jump_to(36, &store), Ok(Job::ChapterTitle(36)));
    }

    #[test]
    fn stale_titles_are_ignored() {
        let store = MemoryStore::new();
        let mut p = player(&FakeAudio::default());
        p.load_chapter(1, &store);
        p.load_chapter(2, &store);
        p.on_chapter_title(1, Ok(surah(1, "Al-Faatiha", "الفاتحة", 7)));
        assert_eq!(p.title(), LOADING_LABEL);
        p.on_chapter_title(2, Ok(surah(2, "Al-Baqara", "البقرة", 286)));
        assert_eq!(p.title(), "Al-Baqara (البقرة)");
    }

    #[test]
    fn title_errors() {
        let store = MemoryStore::new();
        let mut p = player(&FakeAudio::default());
        p.load_chapter(3, &store);
        p.on_chapter_title(3, Err(ApiError::Code(404)));
        assert_eq!(p.title(), "Surah not found");
        p.load_chapter(4, &store);
        p.on_chapter_title(4, Err(ApiError::Timeout));
        assert_eq!(p.title(), "Error loading surah");
    }

    #[test]
    fn playback_failure_is_labelled() {
        let store = MemoryStore::new();
        let audio = FakeAudio::default();
        let mut p = player(&audio);
        p.load_chapter(9, &store);
        audio.fail_next_play();
        p.toggle_play();
        assert!(!p.is_playing());
        assert_eq!(p.title(), "Audio playback failed");
    }

    #[test]
    fn clip_failing_mid_play_stops_the_player() {
        let store = MemoryStore::new();
        let audio = FakeAudio::default();
        let mut p = player(&audio);
        p.load_chapter(18, &store);
        p.on_chapter_title(18, Ok(surah(18, "Al-Kahf", "الكهف", 110)));
        p.play();
        assert!(p.is_playing());

        audio.break_clip("connection reset");
        assert_eq!(p.tick(&store), None);
        assert!(!p.is_playing());
        assert_eq!(p.title(), "Audio not available");
        assert_eq!(p.chapter(), 18);
    }

    #[test]
    fn replay_after_natural_end_starts_over() {
        let store = MemoryStore::new();
        let audio = FakeAudio::with_duration(300);
        let mut p = player(&audio);
        p.load_chapter(112, &store);
        p.play();
        p.seek(0.9);
        assert_eq!(audio.position_now(), Duration::from_secs(270));

        audio.finish();
        assert_eq!(p.tick(&store), None);
        assert!(!p.is_playing());

        p.toggle_play();
        assert!(p.is_playing());
        assert!(audio.is_playing_now());
        assert_eq!(p.position(), Duration::ZERO);
        assert_eq!(p.chapter(), 112);
    }

    #[test]
    fn seek_needs_a_known_length() {
        let store = MemoryStore::new();
        let unknown = FakeAudio::default();
        let mut p = player(&unknown);
        p.load_chapter(1, &store);
        p.seek(0.5);
        assert_eq!(unknown.position_now(), Duration::ZERO);

        let known = FakeAudio::with_duration(200);
        let mut p = player(&known);
        p.load_chapter(1, &store);
        p.seek(0.25);
        assert_eq!(known.position_now(), Duration::from_secs(50));
        p.seek(4.0);
        assert_eq!(known.position_now(), Duration::from_secs(200));
    }
}
