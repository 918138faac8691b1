//! # slidegrab
//!
//! Turn a lecture or presentation recording into a deck of slide images.
//!
//! `slidegrab` samples frames from a video, deletes frames that are
//! near-duplicates of the frame before them (a slide that stays on screen
//! for a minute produces one image, not thirty), and crops every remaining
//! frame to the slide area. Decoding is done by FFmpeg through the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate; similarity is
//! the mean structural similarity index (MSSIM).
//!
//! ## Quick Start
//!
//! ### Run the Whole Pipeline
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use slidegrab::{CropRectangle, Pipeline, PipelineOptions, SamplingMode, SamplingOptions, VideoFile};
//!
//! let sampling = SamplingOptions::new().with_mode(SamplingMode::Range {
//!     initial: Duration::ZERO,
//!     end: Some(Duration::from_secs(50)),
//!     interval: Some(Duration::from_secs(2)),
//! });
//! let options = PipelineOptions::new(sampling).with_crop(CropRectangle::new(95, 588, 285, 1160)?);
//!
//! let mut video = VideoFile::open("lecture.mp4")?;
//! let report = Pipeline::new(options)?.run(&mut video, "slides".as_ref())?;
//! # Ok::<(), slidegrab::SlidegrabError>(())
//! ```
//!
//! ### Inspect a Video
//!
//! ```no_run
//! use slidegrab::{FrameSource, VideoFile};
//!
//! let video = VideoFile::open("lecture.mp4")?;
//! println!("{}", video.metadata());
//! # Ok::<(), slidegrab::SlidegrabError>(())
//! ```
//!
//! ### Run One Stage
//!
//! Each stage works on a directory and can be used on its own:
//!
//! ```no_run
//! use slidegrab::{DuplicateFilter, FilterOptions};
//!
//! let report = DuplicateFilter::new(FilterOptions::new())?.run("slides".as_ref())?;
//! println!("{} duplicate(s) removed", report.deleted.len());
//! # Ok::<(), slidegrab::SlidegrabError>(())
//! ```
//!
//! ## Stages
//!
//! - **Sampling** ([`FrameSampler`]): explicit time points, one frame per
//!   interval, or every frame of a range. Out-of-range times are rejected
//!   before anything is written.
//! - **Duplicate filtering** ([`DuplicateFilter`]): adjacent frames scoring
//!   above the threshold (0.9 by default) lose their later frame.
//! - **Cropping** ([`RegionCropper`]): every frame is rewritten to one
//!   [`CropRectangle`].
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

pub mod catalog;
pub mod configuration;
mod conversion;
pub mod crop;
pub mod dedup;
pub mod error;
pub mod ffmpeg;
pub mod metadata;
pub mod pipeline;
pub mod plan;
pub mod progress;
pub mod sampler;
pub mod similarity;
pub mod source;
pub mod video;

pub use catalog::{IMAGE_EXTENSIONS, collect_frames, frame_file_name, is_image_path};
pub use configuration::{
    DEFAULT_SIMILARITY_THRESHOLD, FilterOptions, FrameOutputOptions, PixelFormat, SamplingOptions,
};
pub use crop::{CropRectangle, CropReport, RegionCropper};
pub use dedup::{DeletionPlan, DuplicateFilter, DuplicateVerdict, FilterReport};
pub use error::SlidegrabError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use metadata::VideoMetadata;
pub use pipeline::{Pipeline, PipelineOptions, PipelineReport};
pub use plan::{SamplePlan, SamplingMode};
pub use progress::{OperationType, ProgressCallback, ProgressInfo};
pub use sampler::{FrameSampler, SamplingReport};
pub use similarity::{SimilarityScorer, StructuralSimilarity};
pub use source::FrameSource;
pub use video::VideoFile;
