pub mod player;
pub mod rotation;
pub mod verse;
pub mod wallpaper;

pub use player::{Player, PlayerError, RecitationSource};
pub use rotation::RotationTimers;
pub use wallpaper::WallpaperRotator;
