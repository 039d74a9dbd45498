//! Scene building and CPU rasterization.

/// Backend trait and frame type.
pub mod backend;
/// `vello_cpu` backend.
pub mod cpu;
/// Single frames and scroll-through renders.
pub mod pipeline;
/// Page state to draw list.
pub mod scene;
