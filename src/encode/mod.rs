//! Encoding sinks.
//!
//! Sinks consume rendered frames in scroll order and are fed by
//! [`crate::render::pipeline::render_scroll_to_sink`].

/// `ffmpeg`-based sinks (MP4 output via system `ffmpeg`).
pub mod ffmpeg;
/// Generic frame sink trait and the in-memory sink.
pub mod sink;
