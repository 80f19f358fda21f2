use clap::{Parser, Subcommand};
use image::{DynamicImage, ImageReader, Rgb, RgbImage};
use imageproc::drawing::draw_filled_circle_mut;
use std::path::{Path, PathBuf};

use huecircle::detection::preprocessing::rgb_to_hsv;
use huecircle::{BackgroundSubtractorKind, DebugDump, Detector, DetectorConfig};

#[derive(Parser)]
#[command(name = "huecircle")]
#[command(about = "Find a circular object of a known colour in a sequence of frames")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run detection on frames in the order given
    Detect(DetectArgs),
    /// Print the HSV value of one pixel, to help choose colour bounds
    Pick {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,
        x: u32,
        y: u32,
    },
}

#[derive(clap::Args)]
struct DetectArgs {
    /// Frame images, processed in order
    #[arg(value_name = "FRAMES", required = true)]
    frames: Vec<PathBuf>,

    /// TOML detector config; flags below override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Lower HSV bound as H,S,V
    #[arg(long, value_parser = parse_triple)]
    lower: Option<[u8; 3]>,

    /// Upper HSV bound as H,S,V
    #[arg(long, value_parser = parse_triple)]
    upper: Option<[u8; 3]>,

    #[arg(long, value_enum)]
    subtractor: Option<BackgroundSubtractorKind>,

    #[arg(long)]
    fps: Option<i32>,

    /// Canny thresholds as LOW,HIGH
    #[arg(long, value_parser = parse_pair)]
    canny: Option<(u32, u32)>,

    /// Background-only frames used to warm up the background model
    #[arg(long, value_name = "FILE")]
    background: Vec<PathBuf>,

    /// Draw every detected centre onto a black canvas and save it here
    #[arg(long, value_name = "OUT")]
    annotate: Option<PathBuf>,

    /// Save intermediate masks to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,
}

fn parse_triple(s: &str) -> Result<[u8; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected H,S,V but got '{}'", s));
    }
    let mut out = [0u8; 3];
    for (slot, part) in out.iter_mut().zip(parts) {
        *slot = part
            .parse()
            .map_err(|e| format!("invalid channel '{}': {}", part, e))?;
    }
    Ok(out)
}

fn parse_pair(s: &str) -> Result<(u32, u32), String> {
    let (low, high) = s
        .split_once(',')
        .ok_or_else(|| format!("expected LOW,HIGH but got '{}'", s))?;
    let parse = |v: &str| {
        v.trim()
            .parse::<u32>()
            .map_err(|e| format!("invalid threshold '{}': {}", v, e))
    };
    Ok((parse(low)?, parse(high)?))
}

fn load_frame(path: &Path) -> anyhow::Result<DynamicImage> {
    ImageReader::open(path)?
        .decode()
        .map_err(|e| anyhow::anyhow!("Failed to decode image {}: {}", path.display(), e))
}

fn build_config(args: &DetectArgs) -> anyhow::Result<DetectorConfig> {
    let mut config = match &args.config {
        Some(path) => DetectorConfig::load(path)?,
        None => DetectorConfig::default(),
    };

    if args.lower.is_some() || args.upper.is_some() {
        let lower = args.lower.unwrap_or(config.lower_colour_bound());
        let upper = args.upper.unwrap_or(config.upper_colour_bound());
        config.set_colour_bounds(lower, upper);
    }
    if let Some(kind) = args.subtractor {
        config.set_background_subtractor(kind);
    }
    if let Some(fps) = args.fps {
        if fps <= 0 {
            return Err(anyhow::anyhow!("--fps must be positive, got {}", fps));
        }
        config.set_frames_per_second(fps);
    }
    if let Some((low, high)) = args.canny {
        config.set_canny_threshold(low, high);
    }

    Ok(config)
}

fn run_detect(args: DetectArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;
    log::info!(
        "bounds {:?}..{:?}, subtractor {}, fps {}, canny {}/{}",
        config.lower_colour_bound(),
        config.upper_colour_bound(),
        config.background_subtractor(),
        config.frames_per_second(),
        config.canny_threshold_low(),
        config.canny_threshold_high()
    );

    let mut detector = Detector::new(config);
    if let Some(dir) = args.debug_out {
        detector = detector.with_debug(DebugDump::new(dir)?);
    }

    for path in &args.background {
        let frame = load_frame(path)?;
        if !detector.supply_background_image(&frame) {
            log::warn!("skipping empty background frame {}", path.display());
        }
    }
    if !args.background.is_empty() {
        log::info!("background model warmed with {} frames", args.background.len());
    }

    let mut canvas: Option<RgbImage> = None;
    let mut hits = 0;

    for path in &args.frames {
        let frame = load_frame(path)?;
        let canvas = canvas.get_or_insert_with(|| RgbImage::new(frame.width(), frame.height()));

        let circle = detector.detect_circular_object_centers(&frame);
        if circle.is_empty() {
            println!("{}: no detection", path.display());
            continue;
        }

        hits += 1;
        println!(
            "{}: centre=({:.1}, {:.1}) radius={:.1}",
            path.display(),
            circle.center_x(),
            circle.center_y(),
            circle.radius()
        );
        let centre = circle.center();
        draw_filled_circle_mut(
            canvas,
            (centre.x.round() as i32, centre.y.round() as i32),
            4,
            Rgb([0, 255, 0]),
        );
    }

    log::info!("{} of {} frames had a detection", hits, args.frames.len());

    if let (Some(out), Some(canvas)) = (args.annotate, canvas) {
        canvas
            .save(&out)
            .map_err(|e| anyhow::anyhow!("Failed to save {}: {}", out.display(), e))?;
        log::info!("saved detection trace to {}", out.display());
    }

    Ok(())
}

fn run_pick(image_path: &Path, x: u32, y: u32) -> anyhow::Result<()> {
    let img = load_frame(image_path)?.to_rgb8();
    if x >= img.width() || y >= img.height() {
        return Err(anyhow::anyhow!(
            "pixel ({}, {}) is outside the {}x{} image",
            x,
            y,
            img.width(),
            img.height()
        ));
    }
    let [h, s, v] = rgb_to_hsv(*img.get_pixel(x, y));
    println!("H={},S={},V={}", h, s, v);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match args.command {
        Command::Detect(detect) => run_detect(detect),
        Command::Pick { image_path, x, y } => run_pick(&image_path, x, y),
    }
}
