use serde::{Deserialize, Serialize};

pub const CHAPTER_COUNT: u16 = 114;

/// A single ayah with its translation, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub arabic: String,
    pub translation: String,
    pub reference: String,
}

impl Verse {
    /// Shown whenever a verse cannot be fetched, so the panel is never empty.
    pub fn fallback() -> Self {
        Self {
            arabic: "بِسْمِ اللَّهِ الرَّحْمَٰنِ الرَّحِيمِ".to_string(),
            translation: "In the name of Allah, the Most Gracious, the Most Merciful."
                .to_string(),
            reference: "Al-Fatiha 1".to_string(),
        }
    }
}

/// Chapter metadata as reported by the verse service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurahInfo {
    pub number: u16,
    pub english_name: String,
    pub name: String,
    pub ayah_count: u16,
}

impl SurahInfo {
    pub fn title(&self) -> String {
        format!("{} ({})", self.english_name, self.name)
    }
}

/// Text of one ayah in one edition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AyahText {
    pub text: String,
    pub surah_english_name: String,
    pub number_in_surah: u16,
}
