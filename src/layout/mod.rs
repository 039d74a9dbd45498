//! Responsive breakpoints and the per-breakpoint layout constants.

/// Breakpoint classification, layout constants and text sizes.
pub mod breakpoint;
