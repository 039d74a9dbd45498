use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "converge", version)]
struct Cli {
    /// Tracing filter, e.g. `converge=debug`. Defaults to `RUST_LOG`, else `warn`.
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render the page at one scroll offset as a PNG.
    Frame(FrameArgs),
    /// Render a scroll-through MP4 (requires `ffmpeg` on PATH).
    Render(RenderArgs),
    /// Print one converge section's card geometry at a given progress as JSON.
    Sample(SampleArgs),
    /// Print section offsets, pin ranges and snap points as JSON.
    Layout(LayoutArgs),
}

#[derive(Args, Debug, Clone, Copy)]
struct ViewportArgs {
    /// Viewport width in px.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport height in px.
    #[arg(long, default_value_t = 720.0)]
    height: f64,
}

impl ViewportArgs {
    fn metrics(self) -> converge::ViewportMetrics {
        converge::ViewportMetrics::new(self.width, self.height)
    }
}

#[derive(Args, Debug)]
struct FrameArgs {
    /// Input page JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Document scroll offset in px.
    #[arg(long, default_value_t = 0.0)]
    scroll: f64,

    /// Snap to the nearest snap point before rendering.
    #[arg(long)]
    settle: bool,

    #[command(flatten)]
    viewport: ViewportArgs,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Input page JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    /// Output frames per second.
    #[arg(long, default_value_t = 30)]
    fps: u32,

    /// Scroll distance per frame in px.
    #[arg(long, default_value_t = 24.0)]
    step: f64,

    /// Extra frames held on every snap point.
    #[arg(long, default_value_t = 12)]
    hold: u32,

    /// Render frames on a rayon pool (`CONVERGE_RENDER_THREADS` sets its size).
    #[arg(long)]
    parallel: bool,

    /// Composite with u8 arithmetic instead of f32.
    #[arg(long)]
    fast_raster: bool,

    #[command(flatten)]
    viewport: ViewportArgs,
}

#[derive(Args, Debug)]
struct SampleArgs {
    /// Input page JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Index of a converge section.
    #[arg(long)]
    section: usize,

    /// Scroll progress through the pinned region, 0..=1.
    #[arg(long)]
    progress: f64,

    #[command(flatten)]
    viewport: ViewportArgs,
}

#[derive(Args, Debug)]
struct LayoutArgs {
    /// Input page JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    viewport: ViewportArgs,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref())?;
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Render(args) => cmd_render(args),
        Command::Sample(args) => cmd_sample(args),
        Command::Layout(args) => cmd_layout(args),
    }
}

fn init_tracing(filter: Option<&str>) -> anyhow::Result<()> {
    let filter = match filter {
        Some(f) => EnvFilter::try_new(f).with_context(|| format!("invalid --log filter '{f}'"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn read_page(path: &Path) -> anyhow::Result<converge::PageSpec> {
    let spec = converge::PageSpec::from_path(path)
        .with_context(|| format!("load page '{}'", path.display()))?;
    Ok(spec)
}

fn asset_root(in_path: &Path) -> &Path {
    in_path.parent().unwrap_or_else(|| Path::new("."))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let spec = read_page(&args.in_path)?;
    let assets = converge::PreparedAssetStore::prepare(&spec, asset_root(&args.in_path))?;

    let mut runtime = converge::PageRuntime::new(spec, args.viewport.metrics())?;
    runtime.handle(converge::HostEvent::Scroll { y: args.scroll });
    if args.settle {
        runtime.settle();
    }

    let mut backend = converge::CpuBackend::new(converge::RenderSettings::default());
    let frame = converge::render_frame(&runtime, &assets, &mut backend)?;

    if let Some(parent) = args.out.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    image::save_buffer_with_format(
        &args.out,
        &frame.to_straight_rgba8(),
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let spec = read_page(&args.in_path)?;
    let assets = converge::PreparedAssetStore::prepare(&spec, asset_root(&args.in_path))?;

    let threading = if args.parallel {
        converge::RenderThreading::parallel_from_env()?
    } else {
        converge::RenderThreading::default()
    };
    let opts = converge::RenderToMp4Opts {
        scroll: converge::ScrollRenderOpts {
            viewport: args.viewport.metrics(),
            step_px: args.step,
            hold_frames: args.hold,
            threading,
            settings: converge::RenderSettings {
                precision: if args.fast_raster {
                    converge::RasterPrecision::Fast
                } else {
                    converge::RasterPrecision::Exact
                },
                ..converge::RenderSettings::default()
            },
        },
        fps: args.fps,
        ..converge::RenderToMp4Opts::default()
    };

    let stats = converge::render_to_mp4(&spec, &assets, &args.out, &opts)?;
    eprintln!(
        "wrote {} ({} frames, {} rendered)",
        args.out.display(),
        stats.frames_total,
        stats.frames_rendered
    );
    Ok(())
}

fn cmd_sample(args: SampleArgs) -> anyhow::Result<()> {
    anyhow::ensure!(
        args.progress.is_finite() && (0.0..=1.0).contains(&args.progress),
        "--progress must be within 0..=1"
    );
    let spec = read_page(&args.in_path)?;
    let mut runtime = converge::PageRuntime::new(spec, args.viewport.metrics())?;
    let pin = runtime
        .layout()
        .section(args.section)
        .and_then(|s| s.pin)
        .with_context(|| format!("section {} is not a converge section", args.section))?;
    runtime.scroll_to(pin.start + pin.distance * args.progress);

    let controller = runtime
        .controller(args.section)
        .with_context(|| format!("section {} has no controller", args.section))?;
    let out = serde_json::json!({
        "section": args.section,
        "progress": controller.progress(),
        "pinned": controller.is_pinned(),
        "text_scale": controller.text_scale(),
        "breakpoint": controller.layout().map(|l| l.constants.breakpoint),
        "cards": controller.cards(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let spec = read_page(&args.in_path)?;
    spec.validate()?;
    let layout = converge::PageLayout::compose(&spec, args.viewport.metrics());
    let out = serde_json::json!({
        "viewport": layout.viewport,
        "document_height": layout.document_height,
        "max_scroll": layout.max_scroll(),
        "sections": layout.sections,
        "snap_points": layout.snap_points(),
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
