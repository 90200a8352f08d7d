pub mod prayer;
pub mod state;
pub mod verse;

pub use prayer::{Day, PrayerName, PrayerSchedule, PrayerTimeSet, TimeOfDay, MINUTES_PER_DAY};
pub use state::{
    ActiveModal, ClockFormat, Location, ModalKind, NotificationPreference, Settings,
    VerseRotationMode,
};
pub use verse::{AyahText, SurahInfo, Verse, CHAPTER_COUNT};
