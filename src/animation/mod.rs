//! Easing curves and the scrubbed timeline model.

/// Named easing curves.
pub mod ease;
/// Labelled, scroll-scrubbed timelines.
pub mod timeline;
