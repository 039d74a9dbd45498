//! Image decoding and the prepared asset store.

/// Raster decode, cover crop and downscale.
pub mod decode;
/// Prepared images, font and text layout.
pub mod store;
