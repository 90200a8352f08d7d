pub mod memory;
pub mod migrations;
pub mod sqlite;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use std::sync::mpsc::Receiver;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Keys of the shared state blob.
pub mod keys {
    pub const NOTIFICATIONS: &str = "notifications";
    pub const FOCUS_MODE: &str = "focus_mode";
    pub const ACTIVE_MODAL: &str = "active_modal";
    pub const USER_LOCATION: &str = "user_location";
    pub const WALLPAPER_INDEX: &str = "wallpaper_index";
    pub const SETTINGS: &str = "settings";
    pub const PLAYER_CHAPTER: &str = "player_chapter";
    pub const PRAYER_SCHEDULE: &str = "prayer_schedule";
}

/// One key changing value. `new_value` is `None` when the key was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub key: String,
    pub new_value: Option<String>,
}

/// Persisted key/value state shared by every running dashboard.
///
/// Writes are last-writer-wins per key. Every handle announces its own writes
/// to its subscribers; writes made elsewhere (another process) are announced
/// once `sync` notices them.
pub trait StateStore {
    fn get_raw(&self, key: &str) -> Result<Option<String>>;
    fn set_raw(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
    fn subscribe(&self) -> Receiver<StoreChange>;

    /// Surface changes made through other handles. No-op for stores that
    /// are only ever written in-process.
    fn sync(&self) -> Result<()> {
        Ok(())
    }
}

pub fn get<T: DeserializeOwned>(store: &dyn StateStore, key: &str) -> Result<Option<T>> {
    match store.get_raw(key)? {
        None => Ok(None),
        Some(raw) => serde_json::from_str(&raw)
            .map(Some)
            .with_context(|| format!("Decoding stored '{}'", key)),
    }
}

pub fn set<T: Serialize + ?Sized>(store: &dyn StateStore, key: &str, value: &T) -> Result<()> {
    let raw = serde_json::to_string(value).with_context(|| format!("Encoding '{}'", key))?;
    store.set_raw(key, &raw)
}

/// Decodes the payload of a change, treating undecodable values as absent.
pub fn decode<T: DeserializeOwned>(change: &StoreChange) -> Option<T> {
    let raw = change.new_value.as_deref()?;
    match serde_json::from_str(raw) {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("Ignoring malformed value for '{}': {}", change.key, e);
            None
        }
    }
}

/// Fan-out used by both store implementations.
#[derive(Default)]
pub(crate) struct Subscribers {
    senders: Vec<std::sync::mpsc::Sender<StoreChange>>,
}

impl Subscribers {
    pub(crate) fn add(&mut self) -> Receiver<StoreChange> {
        let (tx, rx) = std::sync::mpsc::channel();
        self.senders.push(tx);
        rx
    }

    pub(crate) fn publish(&mut self, change: StoreChange) {
        // Dropped receivers are pruned on the way.
        self.senders.retain(|tx| tx.send(change.clone()).is_ok());
    }
}
