pub mod format;
pub mod misc;
