//! Output sinks.
//!
//! Sinks consume rendered frames in display order: to memory for tests, or to `ffmpeg` for files
//! and live streams picked up by OBS.

/// `ffmpeg`-based sink (file or streaming URL output via system `ffmpeg`).
pub mod ffmpeg;
/// Frame sink trait and the in-memory sink.
pub mod sink;
