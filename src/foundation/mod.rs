//! Shared primitives: geometry re-exports, colors, viewport metrics, errors and hashing.

/// Geometry and color value types.
pub mod core;
/// Crate error taxonomy.
pub mod error;
pub(crate) mod math;
