//! The pinned "converge" section: card spawn geometry, scroll choreography and its controller.

/// Section content and tunables.
pub mod model;
/// Card geometry derived from viewport and timeline progress.
pub mod geometry;
/// Per-section lifecycle: mount, scroll, refresh and kill.
pub mod controller;
