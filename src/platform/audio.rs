use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source};
use std::io::Cursor;
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

use crate::api::HttpClient;

/// Recitations are a few tens of megabytes at most.
const MAX_CLIP_BYTES: u64 = 256 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("audio unavailable: {0}")]
    Unavailable(String),
    #[error("could not start playback: {0}")]
    Spawn(String),
}

/// Something that happened to the current clip since the last poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AudioEvent {
    /// Played through to its natural end. The next `play` starts over.
    Finished,
    /// Could not be fetched or decoded. Playback has stopped.
    Failed(String),
}

/// Playback primitives for one clip at a time.
pub trait AudioOutput {
    /// Replaces the current clip; playback stops and the position resets.
    fn load(&mut self, source: &str);
    fn play(&mut self) -> Result<(), AudioError>;
    fn pause(&mut self);
    fn seek(&mut self, position: Duration);
    fn position(&self) -> Duration;
    fn duration(&self) -> Option<Duration>;
    /// Reports each end or failure of the clip exactly once.
    fn poll(&mut self) -> Option<AudioEvent>;

    fn stop(&mut self) {
        self.pause();
        self.seek(Duration::ZERO);
    }
}

// ─── Silent stub ─────────────────────────────────────────────────────────────

/// Used when audio is switched off or no output device opens. Every play
/// attempt fails, which the callers surface as a status message.
#[derive(Debug, Default)]
pub struct SilentAudio {
    source: Option<String>,
}

impl AudioOutput for SilentAudio {
    fn load(&mut self, source: &str) {
        self.source = Some(source.to_string());
    }

    fn play(&mut self) -> Result<(), AudioError> {
        Err(AudioError::Unavailable("no audio output".to_string()))
    }

    fn pause(&mut self) {}

    fn seek(&mut self, _position: Duration) {}

    fn position(&self) -> Duration {
        Duration::ZERO
    }

    fn duration(&self) -> Option<Duration> {
        None
    }

    fn poll(&mut self) -> Option<AudioEvent> {
        None
    }
}

// ─── rodio output ────────────────────────────────────────────────────────────

/// Opens the default output device once; every [`RodioAudio`] mixes into it.
pub fn open_output_stream() -> Result<Rc<OutputStream>, AudioError> {
    let mut stream = OutputStreamBuilder::open_default_stream()
        .map_err(|e| AudioError::Unavailable(e.to_string()))?;
    // The dashboard owns the terminal; nothing may print on shutdown.
    stream.log_on_drop(false);
    Ok(Rc::new(stream))
}

type ClipBytes = Arc<[u8]>;

fn fetch_clip(http: &HttpClient, source: &str) -> Result<Vec<u8>, String> {
    if source.contains("://") {
        http.get_bytes(source, MAX_CLIP_BYTES)
            .map_err(|e| e.to_string())
    } else {
        std::fs::read(source).map_err(|e| format!("{}: {}", source, e))
    }
}

fn decode(clip: &ClipBytes) -> Result<Decoder<Cursor<ClipBytes>>, String> {
    Decoder::new(Cursor::new(clip.clone())).map_err(|e| e.to_string())
}

/// Plays local files and URLs through a rodio [`Sink`]. Clips are fetched on
/// a worker thread and decoded from memory, so `load` never blocks.
pub struct RodioAudio {
    _stream: Rc<OutputStream>,
    sink: Sink,
    http: HttpClient,
    source: Option<String>,
    pending: Option<Receiver<Result<Vec<u8>, String>>>,
    clip: Option<ClipBytes>,
    duration: Option<Duration>,
    /// The decoded clip is queued in the sink.
    queued: bool,
    playing: bool,
    /// Where playback starts once the clip is queued.
    start_at: Duration,
}

impl RodioAudio {
    pub fn new(stream: Rc<OutputStream>, http: HttpClient, volume: f32) -> Self {
        let sink = Sink::connect_new(stream.mixer());
        sink.set_volume(volume.clamp(0.0, 2.0));
        sink.pause();
        Self {
            _stream: stream,
            sink,
            http,
            source: None,
            pending: None,
            clip: None,
            duration: None,
            queued: false,
            playing: false,
            start_at: Duration::ZERO,
        }
    }

    fn queue_clip(&mut self) -> Result<(), String> {
        let Some(clip) = &self.clip else {
            return Ok(());
        };
        let mut decoder = decode(clip)?;
        if !self.start_at.is_zero() {
            if let Err(e) = decoder.try_seek(self.start_at) {
                log::warn!("Seek to {:?} failed: {}", self.start_at, e);
            }
        }
        self.start_at = Duration::ZERO;
        self.sink.append(decoder);
        self.queued = true;
        Ok(())
    }

    fn accept(&mut self, bytes: Vec<u8>) -> Result<(), String> {
        let clip: ClipBytes = bytes.into();
        self.duration = decode(&clip)?.total_duration();
        self.clip = Some(clip);
        self.queue_clip()
    }

    fn fail(&mut self, reason: String) -> Option<AudioEvent> {
        log::warn!(
            "Audio {} failed: {}",
            self.source.as_deref().unwrap_or("?"),
            reason
        );
        self.sink.clear();
        self.sink.pause();
        self.queued = false;
        self.playing = false;
        Some(AudioEvent::Failed(reason))
    }
}

impl AudioOutput for RodioAudio {
    fn load(&mut self, source: &str) {
        self.sink.clear();
        self.sink.pause();
        self.source = Some(source.to_string());
        self.clip = None;
        self.duration = None;
        self.queued = false;
        self.playing = false;
        self.start_at = Duration::ZERO;

        // A superseded fetch finds its receiver gone and its result is dropped.
        let (tx, rx) = mpsc::channel();
        let http = self.http.clone();
        let source = source.to_string();
        thread::spawn(move || {
            let _ = tx.send(fetch_clip(&http, &source));
        });
        self.pending = Some(rx);
    }

    fn play(&mut self) -> Result<(), AudioError> {
        if self.source.is_none() {
            return Err(AudioError::Unavailable("nothing loaded".to_string()));
        }
        if self.clip.is_some() && !self.queued {
            self.queue_clip().map_err(AudioError::Spawn)?;
        }
        self.sink.play();
        self.playing = true;
        Ok(())
    }

    fn pause(&mut self) {
        self.sink.pause();
        self.playing = false;
    }

    fn seek(&mut self, position: Duration) {
        if !self.queued {
            self.start_at = position;
            return;
        }
        if let Err(e) = self.sink.try_seek(position) {
            log::warn!("Seek to {:?} failed: {}", position, e);
        }
    }

    fn position(&self) -> Duration {
        let pos = if self.queued {
            self.sink.get_pos()
        } else {
            self.start_at
        };
        match self.duration {
            Some(d) => pos.min(d),
            None => pos,
        }
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn poll(&mut self) -> Option<AudioEvent> {
        if let Some(rx) = &self.pending {
            let fetched = match rx.try_recv() {
                Ok(result) => result,
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => Err("loader stopped".to_string()),
            };
            self.pending = None;
            if let Err(reason) = fetched.and_then(|bytes| self.accept(bytes)) {
                return self.fail(reason);
            }
        }

        if self.playing && self.queued && self.sink.empty() {
            self.sink.pause();
            self.queued = false;
            self.playing = false;
            return Some(AudioEvent::Finished);
        }
        None
    }
}
