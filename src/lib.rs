//! Converge renders a scroll-driven promo page.
//!
//! The page is a stack of full-viewport sections. Converge sections pin to the viewport while
//! the user scrolls through them, and a ring of image cards flies in from off-screen toward the
//! headline. The library is headless: a host feeds [`HostEvent`]s into a [`PageRuntime`], and the
//! current state can be rasterized to RGBA frames on the CPU or streamed to an MP4.
//!
//! - Load and validate a [`PageSpec`]
//! - Prepare its images and font with [`PreparedAssetStore`]
//! - Drive a [`PageRuntime`] and render single frames or whole scroll-throughs
#![forbid(unsafe_code)]

/// Easing curves and timelines.
pub mod animation;
/// Image decoding and the prepared asset store.
pub mod assets;
/// The pinned converge section.
pub mod converge;
/// Encoding sinks.
pub mod encode;
/// Shared primitives and errors.
pub mod foundation;
/// Breakpoints and responsive constants.
pub mod layout;
/// Page model, document layout and runtime.
pub mod page;
/// Scene building and rasterization.
pub mod render;
/// Scroll triggers and viewport listeners.
pub mod scroll;

pub use crate::foundation::core::{
    Affine, BezPath, CardSize, Point, Rect, Rgba8, RoundedRect, Vec2, ViewportMetrics,
};
pub use crate::foundation::error::{ConvergeError, ConvergeResult};

pub use crate::animation::{ease::Ease, timeline::Timeline};
pub use crate::assets::store::{PreparedAssetStore, PreparedImage};
pub use crate::converge::{
    controller::{ConvergeController, OverlayPlacement},
    geometry::{CardGeometry, ConvergeLayout},
    model::{ConvergeConfig, ImageDescriptor, SectionContent},
};
pub use crate::encode::ffmpeg::{FfmpegSink, FfmpegSinkOpts};
pub use crate::encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use crate::layout::breakpoint::{Breakpoint, Breakpoints, LayoutConstants};
pub use crate::page::{
    composer::PageLayout,
    model::{PageSpec, SectionSpec},
    runtime::{HostEvent, PageRuntime},
};
pub use crate::render::{
    backend::{FrameRGBA, RasterPrecision, RenderBackend, RenderSettings},
    cpu::CpuBackend,
    pipeline::{
        RenderStats, RenderThreading, RenderToMp4Opts, ScrollRenderOpts, render_frame,
        render_scroll_frames, render_to_mp4,
    },
    scene::{Scene, SceneBuilder, build_scene},
};
