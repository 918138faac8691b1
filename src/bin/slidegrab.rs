use std::{
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::Parser;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::{Value, json};
use slidegrab::{
    CropRectangle, FfmpegLogLevel, FilterOptions, FrameSource, OperationType, Pipeline,
    PipelineOptions, PipelineReport, PixelFormat, ProgressCallback, ProgressInfo, SamplingMode,
    SamplingOptions, VideoFile, VideoMetadata,
};

const CLI_AFTER_HELP: &str = "Examples:\n  slidegrab --input lecture.mp4 --output slides\n  slidegrab --input lecture.mp4 --output slides --time_init 60 --time_end 600 --inter 5 --progress\n  slidegrab --input lecture.mp4 --output slides --time-points 12 1:30 4:05.5 --skip-crop\n  slidegrab --input lecture.mp4 --output slides --info-only --json";

#[derive(Debug, Parser)]
#[command(
    name = "slidegrab",
    version,
    about = "Extract the distinct slides of a lecture recording as cropped images",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Source video.
    #[arg(long)]
    input: PathBuf,

    /// Directory for the frame images (created if missing).
    #[arg(long)]
    output: PathBuf,

    /// Sampling start, in seconds.
    #[arg(long = "time_init", default_value_t = 0)]
    time_init: u64,

    /// Sampling end, in seconds.
    #[arg(long = "time_end", default_value_t = 50)]
    time_end: u64,

    /// Seconds between two sampled frames (0 samples every frame).
    #[arg(long, default_value_t = 2)]
    inter: u64,

    /// Crop rectangle as top bottom left right, in pixels.
    #[arg(
        long = "box",
        num_args = 4,
        value_names = ["Y0", "Y1", "X0", "X1"],
        default_values_t = [95, 588, 285, 1160]
    )]
    crop_box: Vec<u32>,

    /// Print the video information and stop.
    #[arg(long)]
    info_only: bool,

    /// Extract one frame at each of these times (seconds, MM:SS or
    /// HH:MM:SS). Overrides the range options.
    #[arg(long, num_args = 1..)]
    time_points: Vec<String>,

    /// Ignore --time_end and sample until the video ends.
    #[arg(long)]
    until_end: bool,

    /// File name prefix of the frame images.
    #[arg(long, default_value = "frame")]
    prefix: String,

    /// Image extension (jpg, jpeg, png, bmp, tif, tiff, webp).
    #[arg(long, default_value = "jpg")]
    ext: String,

    /// JPEG quality, 0-100.
    #[arg(long, default_value_t = 100)]
    quality: u8,

    /// Write grayscale frames.
    #[arg(long)]
    gray: bool,

    /// Similarity above which a frame counts as a duplicate of the previous one.
    #[arg(long, default_value_t = slidegrab::DEFAULT_SIMILARITY_THRESHOLD)]
    threshold: f64,

    /// Keep every extracted frame.
    #[arg(long)]
    skip_dedup: bool,

    /// Keep the frames at full size.
    #[arg(long)]
    skip_crop: bool,

    /// Print the final report as JSON.
    #[arg(long)]
    json: bool,

    /// Show a progress bar.
    #[arg(long)]
    progress: bool,

    /// Show debug log records.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, error, warning, info, debug).
    #[arg(long)]
    log_level: Option<String>,
}

fn parse_timecode(value: &str) -> Result<Duration, Box<dyn std::error::Error>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err("time value cannot be empty".into());
    }

    let total_seconds = if let Ok(seconds) = trimmed.parse::<f64>() {
        seconds
    } else {
        let parts: Vec<&str> = trimmed.split(':').collect();
        let (hours, minutes, seconds) = match parts.as_slice() {
            [minutes, seconds] => (0_u64, minutes.parse::<u64>()?, seconds.parse::<f64>()?),
            [hours, minutes, seconds] => (
                hours.parse::<u64>()?,
                minutes.parse::<u64>()?,
                seconds.parse::<f64>()?,
            ),
            _ => return Err(format!("invalid time format: {trimmed}").into()),
        };
        (hours as f64 * 3600.0) + (minutes as f64 * 60.0) + seconds
    };

    if !total_seconds.is_finite() || total_seconds < 0.0 {
        return Err(format!("time must be a non-negative number of seconds: {trimmed}").into());
    }
    Ok(Duration::from_secs_f64(total_seconds))
}

fn sampling_mode(cli: &Cli) -> Result<SamplingMode, Box<dyn std::error::Error>> {
    if cli.info_only {
        return Ok(SamplingMode::InfoOnly);
    }
    if !cli.time_points.is_empty() {
        let points = cli
            .time_points
            .iter()
            .map(|value| parse_timecode(value))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(SamplingMode::TimePoints(points));
    }
    Ok(SamplingMode::Range {
        initial: Duration::from_secs(cli.time_init),
        end: (!cli.until_end).then(|| Duration::from_secs(cli.time_end)),
        interval: (cli.inter > 0).then(|| Duration::from_secs(cli.inter)),
    })
}

fn crop_rectangle(values: &[u32]) -> Result<CropRectangle, Box<dyn std::error::Error>> {
    match *values {
        [top, bottom, left, right] => Ok(CropRectangle::new(top, bottom, left, right)?),
        _ => Err(format!("--box takes exactly four values, got {}", values.len()).into()),
    }
}

fn pipeline_options(cli: &Cli) -> Result<PipelineOptions, Box<dyn std::error::Error>> {
    let pixel_format = if cli.gray {
        PixelFormat::Gray8
    } else {
        PixelFormat::Rgb8
    };
    let sampling = SamplingOptions::new()
        .with_mode(sampling_mode(cli)?)
        .with_prefix(cli.prefix.clone())
        .with_extension(&cli.ext)
        .with_quality(cli.quality)
        .with_pixel_format(pixel_format);

    let mut options = PipelineOptions::new(sampling)
        .with_filter(FilterOptions::new().with_threshold(cli.threshold))
        .with_crop(crop_rectangle(&cli.crop_box)?);
    if cli.skip_dedup {
        options = options.without_filter();
    }
    if cli.skip_crop {
        options = options.without_crop();
    }
    if cli.progress {
        options = options.with_progress(Arc::new(TerminalProgress::new()?));
    }
    Ok(options)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

/// Drives one `indicatif` bar through all three stages.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {msg:<12} {bar:40.cyan/blue} {pos}/{len}",
        )?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let label = match info.operation {
            OperationType::FrameExtraction => "extracting",
            OperationType::DuplicateFiltering => "comparing",
            OperationType::Cropping => "cropping",
            _ => "working",
        };
        if info.current == 1 {
            self.bar.reset();
            self.bar.set_message(label);
        }
        self.bar.set_length(info.total.unwrap_or(info.current));
        self.bar.set_position(info.current);
        if info.total == Some(info.current) {
            self.bar.finish();
        }
    }
}

fn metadata_json(metadata: &VideoMetadata) -> Value {
    json!({
        "width": metadata.width,
        "height": metadata.height,
        "frames_per_second": metadata.frames_per_second,
        "frame_count": metadata.frame_count,
        "duration_seconds": metadata.duration().as_secs_f64(),
        "codec": metadata.codec,
    })
}

fn paths_json(paths: &[PathBuf]) -> Value {
    paths
        .iter()
        .map(|path| Value::String(path.display().to_string()))
        .collect()
}

fn report_json(report: &PipelineReport) -> Value {
    json!({
        "video": metadata_json(&report.sampling.metadata),
        "extraction": {
            "frames": paths_json(&report.sampling.frames),
            "ended_early": report.sampling.ended_early(),
        },
        "deduplication": report.filter.as_ref().map(|filter| json!({
            "candidates": filter.candidates,
            "comparisons": filter.plan.comparisons,
            "deleted": paths_json(&filter.deleted),
            "verdicts": filter.plan.verdicts.iter().map(|verdict| json!({
                "previous": verdict.previous.display().to_string(),
                "duplicate": verdict.duplicate.display().to_string(),
                "score": verdict.score,
            })).collect::<Vec<_>>(),
        })),
        "crop": report.crop.as_ref().map(|crop| json!({
            "top": crop.rectangle.top,
            "bottom": crop.rectangle.bottom,
            "left": crop.rectangle.left,
            "right": crop.rectangle.right,
            "cropped": crop.cropped.len(),
        })),
    })
}

fn print_summary(report: &PipelineReport, output: &Path) {
    let sampling = &report.sampling;
    println!(
        "{} {}",
        "extracted:".green().bold(),
        format!("{} frame(s) to {}", sampling.frames.len(), output.display()).green()
    );
    if sampling.ended_early() {
        eprintln!(
            "{} {}",
            "warning:".yellow().bold(),
            "the video ended or failed to decode before the requested range was covered".yellow()
        );
    }

    if let Some(filter) = &report.filter {
        for verdict in &filter.plan.verdicts {
            println!(
                "{} {} ~ {} ({:.4})",
                "duplicate".yellow().bold(),
                verdict.duplicate.display(),
                verdict.previous.display(),
                verdict.score
            );
        }
        println!(
            "{} {}",
            "deduplicated:".green().bold(),
            format!(
                "{} deleted, {} remaining",
                filter.deleted.len(),
                filter.remaining()
            )
            .green()
        );
    }

    if let Some(crop) = &report.crop {
        println!(
            "{} {}",
            "cropped:".green().bold(),
            format!(
                "{} frame(s) to {} ({}x{})",
                crop.cropped.len(),
                crop.rectangle,
                crop.rectangle.width(),
                crop.rectangle.height()
            )
            .green()
        );
    }
}

/// The info block printed before extraction; `None` when stdout is JSON.
fn video_info(cli: &Cli, metadata: &VideoMetadata) -> Option<String> {
    (!cli.json).then(|| metadata.to_string())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let level = match &cli.log_level {
        Some(level) => level.parse::<FfmpegLogLevel>()?,
        None => FfmpegLogLevel::default(),
    };
    slidegrab::set_ffmpeg_log_level(level);

    let pipeline = Pipeline::new(pipeline_options(&cli)?)?;
    let mut video = VideoFile::open(&cli.input)?;

    if let Some(info) = video_info(&cli, video.metadata()) {
        println!("{}", info.cyan());
    }
    if cli.info_only && !cli.json {
        return Ok(());
    }

    let report = pipeline.run(&mut video, &cli.output)?;
    if cli.json {
        let payload = if cli.info_only {
            metadata_json(&report.sampling.metadata)
        } else {
            report_json(&report)
        };
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        print_summary(&report, &cli.output);
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
