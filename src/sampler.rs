//! Frame sampling.
//!
//! [`FrameSampler`] resolves a [`SamplePlan`] against a [`FrameSource`] and
//! writes one numbered image per decoded frame. Numbering is 1-based and
//! gap-free: the counter only advances when a file has been written, and the
//! first failed seek or decode ends the run.

use std::{
    fs,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    time::Duration,
};

use image::{DynamicImage, ImageFormat, codecs::jpeg::JpegEncoder};

use crate::{
    catalog::frame_file_name,
    configuration::{FrameOutputOptions, SamplingOptions},
    error::SlidegrabError,
    metadata::VideoMetadata,
    plan::{SamplePlan, interval_timestamp},
    progress::{OperationType, ProgressTracker},
    source::FrameSource,
};

/// Outcome of a sampling run.
#[derive(Debug, Clone)]
#[must_use]
pub struct SamplingReport {
    /// Metadata of the sampled video.
    pub metadata: VideoMetadata,
    /// The schedule that was executed.
    pub plan: SamplePlan,
    /// Written files, in extraction order.
    pub frames: Vec<PathBuf>,
}

impl SamplingReport {
    /// `true` if a seek or decode failure cut the schedule short.
    ///
    /// Open-ended plans (no end time) always run until a failure, so they
    /// never count as cut short.
    pub fn ended_early(&self) -> bool {
        self.plan
            .expected_frames()
            .is_some_and(|expected| (self.frames.len() as u64) < expected)
    }
}

/// Writes sampled frames of a video into a directory.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use slidegrab::{FrameSampler, SamplingMode, SamplingOptions, VideoFile};
///
/// let mut video = VideoFile::open("lecture.mp4")?;
/// let sampler = FrameSampler::new(SamplingOptions::new().with_mode(SamplingMode::Range {
///     initial: Duration::ZERO,
///     end: Some(Duration::from_secs(50)),
///     interval: Some(Duration::from_secs(2)),
/// }))?;
/// let report = sampler.run(&mut video, "frames".as_ref())?;
/// println!("wrote {} frames", report.frames.len());
/// # Ok::<(), slidegrab::SlidegrabError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FrameSampler {
    options: SamplingOptions,
}

impl FrameSampler {
    /// Create a sampler.
    ///
    /// # Errors
    ///
    /// Returns the error from [`SamplingOptions::validate`].
    pub fn new(options: SamplingOptions) -> Result<Self, SlidegrabError> {
        options.validate()?;
        Ok(Self { options })
    }

    /// The options this sampler was built with.
    pub fn options(&self) -> &SamplingOptions {
        &self.options
    }

    /// Sample `source` into `output_directory`.
    ///
    /// The plan is resolved first, so configuration errors leave the
    /// filesystem untouched. The directory is then created if missing. A
    /// failed seek or decode ends the run without an error; the frames
    /// written so far are kept.
    ///
    /// # Errors
    ///
    /// - Any configuration error from [`SamplePlan::resolve`].
    /// - [`SlidegrabError::IoError`] / [`SlidegrabError::ImageError`] if the
    ///   directory or a frame file cannot be written.
    pub fn run<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        output_directory: &Path,
    ) -> Result<SamplingReport, SlidegrabError> {
        let metadata = source.metadata().clone();
        let plan = SamplePlan::resolve(&self.options.mode, &metadata)?;

        if plan == SamplePlan::InfoOnly {
            log::info!(
                "Video info only: {:.3}s, {} frames, {:.3} fps",
                metadata.duration().as_secs_f64(),
                metadata.frame_count,
                metadata.frames_per_second,
            );
            return Ok(SamplingReport {
                metadata,
                plan,
                frames: Vec::new(),
            });
        }

        fs::create_dir_all(output_directory)?;
        log::info!("Converting a video into frames in {}", output_directory.display());

        let mut writer = FrameWriter {
            directory: output_directory,
            output: &self.options.output,
            tracker: ProgressTracker::new(
                self.options.progress.clone(),
                OperationType::FrameExtraction,
                plan.expected_frames(),
            ),
            written: Vec::new(),
        };

        match &plan {
            SamplePlan::InfoOnly => {}
            SamplePlan::TimePoints(points) => {
                for &timestamp in points {
                    match seek_and_decode(source, timestamp) {
                        Some(image) => writer.write(image, Some(timestamp))?,
                        None => break,
                    }
                }
            }
            SamplePlan::EveryFrame { start, max_frames } => {
                let positioned = start.is_zero() || seek(source, *start);
                while positioned && max_frames.is_none_or(|max| writer.count() < max) {
                    match decode(source) {
                        Some(image) => writer.write(image, None)?,
                        None => break,
                    }
                }
            }
            SamplePlan::Interval {
                start,
                interval,
                max_steps,
            } => {
                let mut step = 0_u64;
                while max_steps.is_none_or(|max| step < max) {
                    let Some(timestamp) = interval_timestamp(*start, *interval, step) else {
                        break;
                    };
                    match seek_and_decode(source, timestamp) {
                        Some(image) => writer.write(image, Some(timestamp))?,
                        None => break,
                    }
                    step += 1;
                }
            }
        }

        let frames = writer.written;
        log::info!(
            "Extracted {} frame(s) into {}",
            frames.len(),
            output_directory.display()
        );

        let report = SamplingReport {
            metadata,
            plan,
            frames,
        };
        if report.ended_early() {
            log::warn!(
                "Extraction stopped early after {} of {:?} frame(s)",
                report.frames.len(),
                report.plan.expected_frames(),
            );
        }
        Ok(report)
    }
}

/// Seek, logging and swallowing failures. Returns `false` on failure.
fn seek<S: FrameSource + ?Sized>(source: &mut S, timestamp: Duration) -> bool {
    match source.seek(timestamp) {
        Ok(()) => true,
        Err(error) => {
            log::warn!("Seek to {timestamp:?} failed, stopping extraction: {error}");
            false
        }
    }
}

/// Decode one frame, logging and swallowing failures.
fn decode<S: FrameSource + ?Sized>(source: &mut S) -> Option<DynamicImage> {
    match source.next_frame() {
        Ok(Some(image)) => Some(image),
        Ok(None) => {
            log::debug!("Video source exhausted");
            None
        }
        Err(error) => {
            log::warn!("Frame decode failed, stopping extraction: {error}");
            None
        }
    }
}

fn seek_and_decode<S: FrameSource + ?Sized>(
    source: &mut S,
    timestamp: Duration,
) -> Option<DynamicImage> {
    if seek(source, timestamp) {
        decode(source)
    } else {
        None
    }
}

/// Numbers, converts and encodes frames as they arrive.
struct FrameWriter<'a> {
    directory: &'a Path,
    output: &'a FrameOutputOptions,
    tracker: ProgressTracker,
    written: Vec<PathBuf>,
}

impl FrameWriter<'_> {
    fn count(&self) -> u64 {
        self.written.len() as u64
    }

    fn write(&mut self, image: DynamicImage, timestamp: Option<Duration>) -> Result<(), SlidegrabError> {
        let index = self.count() + 1;
        let path = self.directory.join(frame_file_name(
            &self.output.prefix,
            index,
            &self.output.extension,
        ));
        let image = self.output.pixel_format.apply(image);
        save_image(&image, &path, self.output.quality)?;

        log::info!("Write a new frame: {}", path.display());
        self.tracker.advance(Some(path.clone()), timestamp);
        self.written.push(path);
        Ok(())
    }
}

/// Encode `image` to `path`, picking the encoder from the extension.
///
/// JPEG files use `jpeg_quality`; other formats ignore it. The image is
/// encoded into a hidden file next to `path` and renamed over it, so a
/// failed encode leaves an existing `path` as it was.
pub(crate) fn save_image(
    image: &DynamicImage,
    path: &Path,
    jpeg_quality: u8,
) -> Result<(), SlidegrabError> {
    let directory = path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let mut staged = tempfile::Builder::new()
        .prefix(".slidegrab-")
        .suffix(".part")
        .tempfile_in(directory)?;

    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        if is_jpeg_path(path) {
            // The JPEG encoder accepts 1-100.
            let encoder = JpegEncoder::new_with_quality(&mut writer, jpeg_quality.clamp(1, 100));
            if image.color().has_alpha() {
                DynamicImage::ImageRgb8(image.to_rgb8()).write_with_encoder(encoder)?;
            } else {
                image.write_with_encoder(encoder)?;
            }
        } else {
            image.write_to(&mut writer, ImageFormat::from_path(path)?)?;
        }
        writer.flush()?;
    }

    staged.persist(path).map_err(|error| error.error)?;
    Ok(())
}

fn is_jpeg_path(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            extension.eq_ignore_ascii_case("jpg") || extension.eq_ignore_ascii_case("jpeg")
        })
}
