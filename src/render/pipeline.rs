use rayon::prelude::*;

use crate::{
    assets::store::PreparedAssetStore,
    encode::{
        ffmpeg::{FfmpegSink, FfmpegSinkOpts},
        sink::{FrameSink, SinkConfig},
    },
    foundation::{
        core::ViewportMetrics,
        error::{ConvergeError, ConvergeResult},
    },
    page::{composer::PageLayout, model::PageSpec, runtime::PageRuntime},
    render::{
        backend::{FrameRGBA, RenderBackend, RenderSettings},
        cpu::CpuBackend,
        scene::{SceneBuilder, build_scene},
    },
};

/// Environment variable overriding the worker count of parallel renders.
pub const RENDER_THREADS_ENV: &str = "CONVERGE_RENDER_THREADS";

/// Build the scene for the runtime's current state and rasterize it.
///
/// Returns a [`FrameRGBA`] containing **premultiplied** RGBA8 pixels.
pub fn render_frame(
    runtime: &PageRuntime,
    assets: &PreparedAssetStore,
    backend: &mut dyn RenderBackend,
) -> ConvergeResult<FrameRGBA> {
    let scene = build_scene(runtime, assets);
    backend.render_scene(&scene)
}

#[derive(Clone, Debug)]
/// Threading and chunking controls for multi-frame rendering.
pub struct RenderThreading {
    /// Enable parallel rendering when `true`.
    pub parallel: bool,
    /// Chunk size in frames for batched scheduling.
    pub chunk_size: usize,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
}

impl Default for RenderThreading {
    fn default() -> Self {
        Self {
            parallel: false,
            chunk_size: 64,
            threads: None,
        }
    }
}

impl RenderThreading {
    /// Parallel threading with the worker count taken from `CONVERGE_RENDER_THREADS` when set.
    pub fn parallel_from_env() -> ConvergeResult<Self> {
        let threads = match std::env::var(RENDER_THREADS_ENV) {
            Ok(v) => Some(v.trim().parse::<usize>().map_err(|e| {
                ConvergeError::validation(format!("{RENDER_THREADS_ENV}='{v}' is not a count: {e}"))
            })?),
            Err(_) => None,
        };
        Ok(Self {
            parallel: true,
            threads,
            ..Self::default()
        })
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// Aggregated rendering counters.
pub struct RenderStats {
    /// Total requested frames.
    pub frames_total: u64,
    /// Frames that were actually rendered.
    pub frames_rendered: u64,
    /// Frames reused from the previous frame at the same scroll position.
    pub frames_elided: u64,
}

/// How a scroll-through walks the document.
#[derive(Clone, Debug)]
pub struct ScrollRenderOpts {
    pub viewport: ViewportMetrics,
    /// Scroll distance between consecutive frames, px.
    pub step_px: f64,
    /// Extra frames held on each snap point.
    pub hold_frames: u32,
    pub threading: RenderThreading,
    pub settings: RenderSettings,
}

impl Default for ScrollRenderOpts {
    fn default() -> Self {
        Self {
            viewport: ViewportMetrics::new(1280.0, 720.0),
            step_px: 24.0,
            hold_frames: 12,
            threading: RenderThreading::default(),
            settings: RenderSettings::default(),
        }
    }
}

/// Scroll offsets visited by a scroll-through: `0..=max_scroll` in `step_px` steps, pausing
/// `hold_frames` extra frames on every snap point.
pub fn scroll_positions(
    layout: &PageLayout,
    step_px: f64,
    hold_frames: u32,
) -> ConvergeResult<Vec<f64>> {
    if !step_px.is_finite() || step_px <= 0.0 {
        return Err(ConvergeError::validation(
            "scroll step must be finite and > 0",
        ));
    }
    let max = layout.max_scroll();
    let snaps = layout.snap_points();
    let mut out = Vec::new();
    let mut next_snap = 0;
    let push_hold = |out: &mut Vec<f64>, y: f64| {
        out.push(y);
        for _ in 0..hold_frames {
            out.push(y);
        }
    };

    let mut y = 0.0;
    loop {
        // snap points passed on the way to `y` get their own held frames
        while next_snap < snaps.len() && snaps[next_snap] <= y {
            let snap = snaps[next_snap];
            if out.last() != Some(&snap) {
                push_hold(&mut out, snap);
            }
            next_snap += 1;
        }
        if out.last() != Some(&y) {
            out.push(y);
        }
        if y >= max {
            break;
        }
        y = (y + step_px).min(max);
    }
    Ok(out)
}

/// Render every frame of a scroll-through and return them with rendering stats.
#[tracing::instrument(skip_all, fields(step_px = opts.step_px, parallel = opts.threading.parallel))]
pub fn render_scroll_frames(
    spec: &PageSpec,
    assets: &PreparedAssetStore,
    opts: &ScrollRenderOpts,
) -> ConvergeResult<(Vec<FrameRGBA>, RenderStats)> {
    let mut sink = crate::encode::sink::InMemorySink::new();
    let stats = render_scroll_to_sink(spec, assets, opts, 30, &mut sink)?;
    let frames = sink.into_frames().into_iter().map(|(_, f)| f).collect();
    Ok((frames, stats))
}

/// Render a scroll-through and push frames to `sink` in order.
pub fn render_scroll_to_sink(
    spec: &PageSpec,
    assets: &PreparedAssetStore,
    opts: &ScrollRenderOpts,
    fps: u32,
    sink: &mut dyn FrameSink,
) -> ConvergeResult<RenderStats> {
    let viewport = opts.viewport.sanitized();
    let mut runtime = PageRuntime::new(spec.clone(), viewport)?;
    let positions = scroll_positions(runtime.layout(), opts.step_px, opts.hold_frames)?;
    let chunk_size = normalized_chunk_size(opts.threading.chunk_size);

    let width = viewport.width.ceil().max(1.0) as u32;
    let height = viewport.height.ceil().max(1.0) as u32;
    sink.begin(SinkConfig { width, height, fps })?;

    let pool = if opts.threading.parallel {
        Some(build_thread_pool(opts.threading.threads)?)
    } else {
        None
    };
    let mut backend = CpuBackend::new(opts.settings.clone());
    let mut scenes = SceneBuilder::new();
    let mut stats = RenderStats::default();
    let mut idx = 0u64;

    for chunk in positions.chunks(chunk_size) {
        // consecutive frames at the same position render once
        let mut unique = Vec::<f64>::with_capacity(chunk.len());
        let mut frame_to_unique = Vec::<usize>::with_capacity(chunk.len());
        for &y in chunk {
            if unique.last() != Some(&y) {
                unique.push(y);
            }
            frame_to_unique.push(unique.len() - 1);
        }

        let rendered = match pool.as_ref() {
            Some(pool) => render_positions_parallel(spec, assets, viewport, &unique, &opts.settings, pool)?,
            None => {
                let mut out = Vec::with_capacity(unique.len());
                for &y in &unique {
                    runtime.scroll_to(y);
                    let scene = scenes.build(&runtime, assets);
                    out.push(backend.render_scene(&scene)?);
                }
                out
            }
        };

        for &u in &frame_to_unique {
            let frame = rendered.get(u).ok_or_else(|| {
                ConvergeError::render("internal error: unique frame index out of range")
            })?;
            sink.push_frame(idx, frame)?;
            idx += 1;
        }
        stats.frames_total += chunk.len() as u64;
        stats.frames_rendered += unique.len() as u64;
        stats.frames_elided += (chunk.len() - unique.len()) as u64;
    }

    sink.end()?;
    tracing::debug!(
        frames = stats.frames_total,
        rendered = stats.frames_rendered,
        "scroll-through rendered"
    );
    Ok(stats)
}

fn render_positions_parallel(
    spec: &PageSpec,
    assets: &PreparedAssetStore,
    viewport: ViewportMetrics,
    positions: &[f64],
    settings: &RenderSettings,
    pool: &rayon::ThreadPool,
) -> ConvergeResult<Vec<FrameRGBA>> {
    let rendered = pool.install(|| {
        positions
            .par_iter()
            .map_init(
                || {
                    (
                        PageRuntime::new(spec.clone(), viewport),
                        SceneBuilder::new(),
                        CpuBackend::new(settings.clone()),
                    )
                },
                |(runtime, scenes, backend), &y| -> ConvergeResult<FrameRGBA> {
                    let runtime = runtime.as_mut().map_err(|e| {
                        ConvergeError::render(format!("worker page setup failed: {e}"))
                    })?;
                    runtime.scroll_to(y);
                    let scene = scenes.build(runtime, assets);
                    backend.render_scene(&scene)
                },
            )
            .collect::<Vec<_>>()
    });
    rendered.into_iter().collect()
}

/// Options for [`render_to_mp4`].
#[derive(Clone, Debug)]
pub struct RenderToMp4Opts {
    pub scroll: ScrollRenderOpts,
    /// Output frames per second.
    pub fps: u32,
    /// Background color to flatten alpha over (RGBA8, straight alpha).
    pub bg_rgba: [u8; 4],
    /// Whether to overwrite `out_path` if it already exists.
    pub overwrite: bool,
}

impl Default for RenderToMp4Opts {
    fn default() -> Self {
        Self {
            scroll: ScrollRenderOpts::default(),
            fps: 30,
            bg_rgba: [255, 255, 255, 255],
            overwrite: true,
        }
    }
}

/// Render a scroll-through to an MP4 by invoking the system `ffmpeg` binary.
///
/// `ffmpeg` must be installed and on `PATH`. The viewport must have even dimensions.
#[tracing::instrument(skip(spec, assets, out_path, opts), fields(out = %out_path.as_ref().display()))]
pub fn render_to_mp4(
    spec: &PageSpec,
    assets: &PreparedAssetStore,
    out_path: impl AsRef<std::path::Path>,
    opts: &RenderToMp4Opts,
) -> ConvergeResult<RenderStats> {
    if opts.fps == 0 {
        return Err(ConvergeError::validation("fps must be non-zero"));
    }
    let mut sink = FfmpegSink::new(FfmpegSinkOpts {
        out_path: out_path.as_ref().to_path_buf(),
        overwrite: opts.overwrite,
        bg_rgba: opts.bg_rgba,
    });
    render_scroll_to_sink(spec, assets, &opts.scroll, opts.fps, &mut sink)
}

fn build_thread_pool(threads: Option<usize>) -> ConvergeResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ConvergeError::validation(
            "render threading 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder
        .build()
        .map_err(|e| ConvergeError::render(format!("failed to build rayon thread pool: {e}")))
}

fn normalized_chunk_size(chunk_size: usize) -> usize {
    if chunk_size == 0 { 1 } else { chunk_size }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
