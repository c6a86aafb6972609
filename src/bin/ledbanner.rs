use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use ledbanner::{
    CarouselFeed, CpuBackend, DisplayConfig, DisplayLoop, FeedHandle, FeedUpdate, FfmpegSink,
    FfmpegSinkOpts, FontBook, FrameScheduler, LoadStrategy, RenderBackend, SourceLoader, ZoneSet,
    feed::adapters,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ledbanner", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate a config and zone profile.
    Check(CommonArgs),
    /// Render a single frame as a PNG.
    Frame(FrameArgs),
    /// Record a fixed number of seconds to a file or stream (requires `ffmpeg` on PATH).
    Record(RecordArgs),
    /// Run the real-time display loop into a file or stream until the feed input closes.
    Play(PlayArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Display config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Zone profile JSON (array of four zones or `{ "zones_data": [...] }`).
    #[arg(long)]
    zones: Option<PathBuf>,

    /// Feed updates as JSON lines, applied before the first frame.
    #[arg(long)]
    feed: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FrameArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Timestamp of the frame, in milliseconds from the first tick.
    #[arg(long, default_value_t = 0.0)]
    at_ms: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct RecordArgs {
    #[command(flatten)]
    common: CommonArgs,

    /// Output file path or stream URL (`udp://`, `srt://`, `tcp://`, `rtmp://`).
    #[arg(long)]
    out: String,

    /// Recorded length in seconds.
    #[arg(long, default_value_t = 10.0)]
    secs: f64,

    /// Overwrite output if it already exists.
    #[arg(long, default_value_t = true)]
    overwrite: bool,
}

#[derive(Args, Debug)]
struct PlayArgs {
    /// Display config JSON. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Zone profile JSON.
    #[arg(long)]
    zones: Option<PathBuf>,

    /// Live feed updates as JSON lines; `-` reads stdin.
    #[arg(long, default_value = "-")]
    feed: String,

    /// Output file path or stream URL.
    #[arg(long)]
    out: String,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Record(args) => cmd_record(args),
        Command::Play(args) => cmd_play(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DisplayConfig> {
    match path {
        Some(p) => Ok(DisplayConfig::load(p)?),
        None => {
            let mut cfg = DisplayConfig::default();
            cfg.apply_env_overrides()?;
            cfg.validate()?;
            Ok(cfg)
        }
    }
}

fn load_zones(path: Option<&Path>) -> anyhow::Result<ZoneSet> {
    match path {
        Some(p) => {
            let text = std::fs::read_to_string(p)
                .with_context(|| format!("read zones '{}'", p.display()))?;
            Ok(ZoneSet::from_json_str(&text)?)
        }
        None => Ok(ZoneSet::blank()),
    }
}

fn load_fonts(cfg: &DisplayConfig) -> anyhow::Result<FontBook> {
    let mut book = match cfg.fonts_dir.as_deref() {
        Some(dir) => FontBook::from_dir(dir)?,
        None => FontBook::new(),
    };
    if book.is_empty() {
        tracing::warn!("no fonts registered, text will not be drawn");
    }
    book.set_default(cfg.default_font.clone());
    Ok(book)
}

fn build_scheduler(
    cfg: &DisplayConfig,
    zones: ZoneSet,
    strategy: LoadStrategy,
) -> anyhow::Result<FrameScheduler> {
    let loader = Arc::new(SourceLoader::new(cfg.video.clone())?);
    let mut scheduler = FrameScheduler::new(cfg.clone(), zones, loader, strategy)?;
    scheduler.set_carousel(CarouselFeed::Informational, adapters::fallback_elements());
    Ok(scheduler)
}

fn apply_feed_file(scheduler: &mut FrameScheduler, path: &Path) -> anyhow::Result<()> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("read feed '{}'", path.display()))?;
    let now = chrono::Utc::now();
    for (i, line) in text.lines().enumerate() {
        let update = FeedUpdate::parse_line(line)
            .with_context(|| format!("{}:{}", path.display(), i + 1))?;
        if let Some(update) = update {
            scheduler.apply_update(update, now);
        }
    }
    Ok(())
}

fn prepare(
    common: &CommonArgs,
    strategy: LoadStrategy,
) -> anyhow::Result<(DisplayConfig, FrameScheduler)> {
    let cfg = load_config(common.config.as_deref())?;
    let zones = load_zones(common.zones.as_deref())?;
    let mut scheduler = build_scheduler(&cfg, zones, strategy)?;
    if let Some(feed) = common.feed.as_deref() {
        apply_feed_file(&mut scheduler, feed)?;
    }
    Ok((cfg, scheduler))
}

fn cmd_check(args: CommonArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let zones = load_zones(args.zones.as_deref())?;
    for zone in zones.iter() {
        let rect = cfg.zone_rect(zone.id);
        eprintln!(
            "{}: {}x{} at y={} speed={}",
            zone.id,
            rect.width(),
            rect.height(),
            rect.y0,
            zone.speed
        );
    }
    eprintln!("ok");
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    // Inline loads land on the next tick, so a stepped timeline shows its backgrounds.
    let (cfg, mut scheduler) = prepare(&args.common, LoadStrategy::Inline)?;
    let mut backend = CpuBackend::new(load_fonts(&cfg)?);

    let step_ms = 1000.0 / f64::from(cfg.fps);
    let steps = (args.at_ms.max(0.0) / step_ms).floor() as u64;
    for i in 0..steps {
        scheduler.tick(i as f64 * step_ms, &mut backend);
    }
    let plan = scheduler.tick(args.at_ms.max(0.0), &mut backend);
    let frame = backend.render_plan(&plan)?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let data = if frame.premultiplied {
        unpremultiply(&frame.data)
    } else {
        frame.data
    };
    image::save_buffer_with_format(
        &args.out,
        &data,
        frame.width,
        frame.height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", args.out.display()))?;

    scheduler.teardown();
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn unpremultiply(data: &[u8]) -> Vec<u8> {
    data.chunks_exact(4)
        .flat_map(|px| ledbanner::Rgba8Premul {
            r: px[0],
            g: px[1],
            b: px[2],
            a: px[3],
        }
        .to_straight_rgba())
        .collect()
}

fn cmd_record(args: RecordArgs) -> anyhow::Result<()> {
    anyhow::ensure!(args.secs > 0.0, "--secs must be positive");
    let (cfg, scheduler) = prepare(&args.common, LoadStrategy::Inline)?;
    let backend = CpuBackend::new(load_fonts(&cfg)?);

    let mut opts = FfmpegSinkOpts::new(&args.out);
    opts.overwrite = args.overwrite;
    let sink = FfmpegSink::new(opts);

    let frames = (args.secs * f64::from(cfg.fps)).round() as u64;
    let display = DisplayLoop::new(scheduler, backend, sink)?;
    let (stats, _sink) = display.run_frames(frames, chrono::Utc::now())?;

    eprintln!(
        "wrote {} ({} frames, {} failed)",
        args.out, stats.frames, stats.failed_frames
    );
    Ok(())
}

fn cmd_play(args: PlayArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let zones = load_zones(args.zones.as_deref())?;
    let mut scheduler = build_scheduler(&cfg, zones, LoadStrategy::Background)?;
    let handle = scheduler.connect_feeds();
    let backend = CpuBackend::new(load_fonts(&cfg)?);
    let sink = FfmpegSink::new(FfmpegSinkOpts::new(&args.out));

    let display = DisplayLoop::new(scheduler, backend, sink)?;
    let stop = display.stop_handle();

    let feed = args.feed.clone();
    let reader = std::thread::spawn(move || {
        let result = if feed == "-" {
            pump_feed(std::io::stdin().lock(), &handle)
        } else {
            std::fs::File::open(&feed)
                .with_context(|| format!("open feed '{feed}'"))
                .and_then(|f| pump_feed(std::io::BufReader::new(f), &handle))
        };
        if let Err(e) = result {
            tracing::error!(error = %e, "feed reader stopped");
        }
        stop.store(true, std::sync::atomic::Ordering::Relaxed);
    });

    let (stats, _sink) = display.run()?;
    if reader.join().is_err() {
        tracing::warn!("feed reader panicked");
    }
    eprintln!(
        "played {} frames to {} ({} failed)",
        stats.frames, args.out, stats.failed_frames
    );
    Ok(())
}

/// Forward JSON lines to the scheduler. Malformed lines are logged and skipped.
fn pump_feed(input: impl BufRead, handle: &FeedHandle) -> anyhow::Result<()> {
    for line in input.lines() {
        let line = line.context("read feed line")?;
        match FeedUpdate::parse_line(&line) {
            Ok(Some(update)) => handle.publish(update)?,
            Ok(None) => {}
            Err(e) => tracing::warn!(error = %e, "skipping malformed feed line"),
        }
    }
    Ok(())
}
