//! Scroll-linked triggers and shared viewport listeners.

/// Pin ranges and progress mapping.
pub mod trigger;
/// Visual viewport subscriptions.
pub mod signals;
