use anyhow::Result;

use crate::store::{self, keys, StateStore};

pub const DEFAULT_WALLPAPER: &str = "bg/bg_default.jpg";

/// Cycles through the configured wallpapers.
#[derive(Debug, Clone)]
pub struct WallpaperRotator {
    wallpapers: Vec<String>,
    index: usize,
}

impl WallpaperRotator {
    /// An empty list falls back to the default wallpaper. A stored index
    /// past the end wraps.
    pub fn new(wallpapers: Vec<String>, stored_index: Option<usize>) -> Self {
        let wallpapers = if wallpapers.is_empty() {
            vec![DEFAULT_WALLPAPER.to_string()]
        } else {
            wallpapers
        };
        let index = stored_index.unwrap_or(0) % wallpapers.len();
        Self { wallpapers, index }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &str {
        &self.wallpapers[self.index]
    }

    /// Advances to the next wallpaper and persists the index.
    pub fn rotate(&mut self, store: &dyn StateStore) -> Result<&str> {
        self.index = (self.index + 1) % self.wallpapers.len();
        store::set(store, keys::WALLPAPER_INDEX, &self.index)?;
        log::debug!("Wallpaper {} of {}", self.index + 1, self.wallpapers.len());
        Ok(self.current())
    }

    /// Follows an index written by another dashboard.
    pub fn adopt(&mut self, index: usize) {
        self.index = index % self.wallpapers.len();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn three() -> Vec<String> {
        ["a.jpg", "b.jpg", "c.jpg"].map(String::from).to_vec()
    }

    #[test]
    fn wraps_and_persists() {
        let store = MemoryStore::new();
        let mut rot = WallpaperRotator::new(three(), Some(1));
        assert_eq!(rot.rotate(&store).unwrap(), "c.jpg");
        assert_eq!(rot.rotate(&store).unwrap(), "a.jpg");
        assert_eq!(store::get::<usize>(&store, keys::WALLPAPER_INDEX).unwrap(), Some(0));
    }

    #[test]
    fn empty_list_uses_default() {
        let store = MemoryStore::new();
        let mut rot = WallpaperRotator::new(Vec::new(), Some(5));
        assert_eq!(rot.current(), DEFAULT_WALLPAPER);
        assert_eq!(rot.rotate(&store).unwrap(), DEFAULT_WALLPAPER);
    }

    #[test]
    fn stale_index_wraps() {
        let mut rot = WallpaperRotator::new(three(), Some(7));
        assert_eq!(rot.current(), "b.jpg");
        rot.adopt(3);
        assert_eq!(rot.current(), "a.jpg");
    }
}
