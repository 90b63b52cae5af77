use std::io::Write as _;
use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "splatpipe", version)]
struct Cli {
    /// Log pipeline stages at debug level (overridden by `RUST_LOG`).
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run frames of an orbiting camera and print per-frame stats as JSON lines.
    Run(RunArgs),
    /// Write a synthetic scene JSON.
    Synth(SynthArgs),
    /// Write the footprint atlas as a grayscale PNG.
    Atlas(AtlasArgs),
}

#[derive(Parser, Debug)]
struct RunArgs {
    /// Input scene JSON. A synthetic scene is generated when omitted.
    #[arg(long = "in")]
    in_path: Option<PathBuf>,

    /// Splat count for the synthetic scene.
    #[arg(long, default_value_t = 2000)]
    synthetic: usize,

    /// Seed for the synthetic scene.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Half-size of the synthetic scene cube.
    #[arg(long, default_value_t = 5.0)]
    extent: f32,

    /// Number of frames to run.
    #[arg(long, default_value_t = 30)]
    frames: u32,

    /// Pipeline config JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Orbit radius around the origin.
    #[arg(long, default_value_t = 15.0)]
    radius: f64,

    /// Orbit step per frame in degrees.
    #[arg(long, default_value_t = 1.0)]
    step_deg: f64,

    /// Write a tile-load heatmap PNG of the last frame.
    #[arg(long)]
    heatmap: Option<PathBuf>,

    /// Write a footprint-atlas composite PNG of the last frame.
    #[arg(long)]
    preview: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct SynthArgs {
    /// Number of splats.
    #[arg(long, default_value_t = 2000)]
    count: usize,

    /// Generator seed.
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Half-size of the scene cube.
    #[arg(long, default_value_t = 5.0)]
    extent: f32,

    /// Output scene JSON path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct AtlasArgs {
    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Run(args) => cmd_run(args),
        Command::Synth(args) => cmd_synth(args),
        Command::Atlas(args) => cmd_atlas(args),
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "splatpipe=debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn orbit_camera(
    frame: u32,
    args: &RunArgs,
    cfg: &splatpipe::PipelineConfig,
) -> anyhow::Result<splatpipe::Camera> {
    let theta = (f64::from(frame) * args.step_deg).to_radians();
    let eye = splatpipe::Vec3::from_f64(
        args.radius * theta.sin(),
        args.radius * 0.25,
        -args.radius * theta.cos(),
    );
    let aspect = f64::from(cfg.screen_width) / f64::from(cfg.screen_height);
    let lens = splatpipe::Lens::from_degrees(60.0, aspect, 0.1, args.radius * 4.0);
    let viewport = splatpipe::Viewport::new(cfg.screen_width, cfg.screen_height);
    let up = splatpipe::Vec3::from_f64(0.0, 1.0, 0.0);
    Ok(splatpipe::Camera::look_at(
        eye,
        splatpipe::Vec3::ZERO,
        up,
        lens,
        viewport,
    )?)
}

fn cmd_run(args: RunArgs) -> anyhow::Result<()> {
    let cfg = match &args.config {
        Some(p) => splatpipe::PipelineConfig::load(p)?,
        None => splatpipe::PipelineConfig::default(),
    };
    let scene = match &args.in_path {
        Some(p) => splatpipe::SceneDesc::load(p)?,
        None => splatpipe::SceneDesc::synthetic(args.synthetic, args.extent, args.seed),
    };
    let splats = scene.to_splats().context("convert scene")?;
    tracing::info!(splats = splats.len(), frames = args.frames, "starting run");

    let mut pipeline = splatpipe::SplatPipeline::new(cfg.clone())?;
    let mut out = splatpipe::FrameOutput::default();
    let stdout = std::io::stdout();
    let mut w = stdout.lock();
    for frame in 0..args.frames {
        let camera = orbit_camera(frame, &args, &cfg)?;
        pipeline
            .render_frame(&splats, &camera, &mut out)
            .with_context(|| format!("frame {frame}"))?;
        serde_json::to_writer(&mut w, &out.stats).context("write stats")?;
        writeln!(w).context("write stats")?;
    }

    if let Some(path) = &args.heatmap {
        let grid = pipeline.scheduler().grid();
        let img = splatpipe::tile_heatmap(grid, &out.tiles, &out.splats2d);
        splatpipe::save_png(&img, path)?;
        eprintln!("wrote {}", path.display());
    }
    if let Some(path) = &args.preview {
        let atlas = splatpipe::footprint_atlas();
        let grid = pipeline.scheduler().grid();
        let img = splatpipe::splat_preview(grid, &out.tiles, &out.splats2d, &atlas);
        splatpipe::save_png(&img, path)?;
        eprintln!("wrote {}", path.display());
    }
    Ok(())
}

fn cmd_synth(args: SynthArgs) -> anyhow::Result<()> {
    let scene = splatpipe::SceneDesc::synthetic(args.count, args.extent, args.seed);
    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = std::fs::File::create(&args.out)
        .with_context(|| format!("create scene '{}'", args.out.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(f), &scene)
        .context("write scene JSON")?;
    eprintln!("wrote {} splats to {}", scene.splats.len(), args.out.display());
    Ok(())
}

fn cmd_atlas(args: AtlasArgs) -> anyhow::Result<()> {
    let atlas = splatpipe::footprint_atlas();
    splatpipe::save_png(&atlas, &args.out)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}
