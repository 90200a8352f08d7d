pub mod format;
pub mod hijri;
pub mod timer;
