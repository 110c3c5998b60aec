use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rayfan::{FanDriver, FanFrame, FanParams, HostEvent, PngDirSink, Surface, Viewport};

#[derive(Parser, Debug)]
#[command(name = "rayfan", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Render a fixed-fps frame sequence through the animation driver.
    Sequence(SequenceArgs),
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Fan parameters JSON; stock parameters when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Logical viewport width.
    #[arg(long)]
    width: f64,

    /// Logical viewport height.
    #[arg(long)]
    height: f64,

    /// Device scale factor (device px per logical px).
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Elapsed time in seconds to evaluate at.
    #[arg(long, default_value_t = 0.0)]
    t: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct SequenceArgs {
    /// Fan parameters JSON; stock parameters when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Logical viewport width.
    #[arg(long)]
    width: f64,

    /// Logical viewport height.
    #[arg(long)]
    height: f64,

    /// Device scale factor (device px per logical px).
    #[arg(long, default_value_t = 1.0)]
    scale: f64,

    /// Refresh rate to synthesize.
    #[arg(long, default_value_t = 30.0)]
    fps: f64,

    /// Sequence length in seconds.
    #[arg(long, default_value_t = 2.0)]
    duration: f64,

    /// Output directory for frame_NNNN.png files.
    #[arg(long = "out-dir")]
    out_dir: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Sequence(args) => cmd_sequence(args),
    }
}

fn read_params(path: Option<&Path>) -> anyhow::Result<FanParams> {
    let Some(path) = path else {
        return Ok(FanParams::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read config '{}'", path.display()))?;
    let params = FanParams::from_json_str(&text)
        .with_context(|| format!("parse config '{}'", path.display()))?;
    Ok(params)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let params = read_params(args.config.as_deref())?;

    let mut surface = Surface::new();
    surface.fit(Some(Viewport::new(args.width, args.height)), args.scale)?;
    if surface.is_blank() {
        anyhow::bail!(
            "viewport {}x{} at scale {} has no pixels",
            args.width,
            args.height,
            args.scale
        );
    }

    let frame = FanFrame::eval(&params, args.t, surface.viewport());
    let (width, height) = surface.device_size();
    let scale = surface.scale();
    rayfan::paint_fan(surface.data_mut(), width, height, scale, &frame)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    rayfan::sink::write_png(&args.out, surface.frame())?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_sequence(args: SequenceArgs) -> anyhow::Result<()> {
    if !args.fps.is_finite() || args.fps <= 0.0 {
        anyhow::bail!("fps must be finite and positive");
    }
    if !args.duration.is_finite() || args.duration < 0.0 {
        anyhow::bail!("duration must be finite and non-negative");
    }
    let params = read_params(args.config.as_deref())?;

    let mut driver = FanDriver::new(params)?;
    let mut sink = PngDirSink::new(&args.out_dir);

    let frames = (args.duration * args.fps).ceil() as u64;
    let dt = 1.0 / args.fps;
    let events = std::iter::once(HostEvent::Resize {
        viewport: Some(Viewport::new(args.width, args.height)),
        scale: args.scale,
    })
    .chain((0..frames).map(|i| HostEvent::Refresh {
        now_s: i as f64 * dt,
    }));

    let stats = driver.run(events, &mut sink)?;

    eprintln!(
        "wrote {} frames to {} ({} refreshes, {} resizes)",
        stats.frames_painted,
        args.out_dir.display(),
        stats.refreshes,
        stats.resizes
    );
    Ok(())
}
