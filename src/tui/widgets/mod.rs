pub mod clock;
pub mod header;
pub mod next_prayer;
pub mod overlays;
pub mod player;
pub mod prayers;
pub mod statusbar;
pub mod verse;
