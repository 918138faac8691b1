//! Error types for the `slidegrab` crate.
//!
//! This module defines [`SlidegrabError`], the error type returned by every
//! fallible operation in the crate. Variants carry the paths, timestamps and
//! bounds involved so a message is enough to diagnose a failed run.

use std::{io::Error as IoError, path::PathBuf, time::Duration};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

use crate::crop::CropRectangle;

/// The unified error type for all `slidegrab` operations.
///
/// Configuration variants are raised before any file is written; see
/// [`is_configuration_error`](SlidegrabError::is_configuration_error).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SlidegrabError {
    /// The video file could not be opened.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// A video frame could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// A requested time point lies past the end of the video.
    #[error("Time point {timestamp:?} is larger than the video duration ({duration:?})")]
    InvalidTimestamp {
        /// The offending time point.
        timestamp: Duration,
        /// Duration of the video.
        duration: Duration,
    },

    /// The end of the sampling range precedes its start.
    #[error("Invalid range: end ({end:?}) is less than the initial time ({start:?})")]
    InvalidRange {
        /// Requested start of the range.
        start: Duration,
        /// Requested end of the range.
        end: Duration,
    },

    /// The sampling interval is shorter than one frame period.
    #[error("Interval {interval:?} is less than the frame period ({frame_period:?})")]
    IntervalTooShort {
        /// Requested interval.
        interval: Duration,
        /// Time between two consecutive frames of the video.
        frame_period: Duration,
    },

    /// The sampling interval is longer than the whole video.
    #[error("Interval {interval:?} is larger than the video duration ({duration:?})")]
    IntervalTooLong {
        /// Requested interval.
        interval: Duration,
        /// Duration of the video.
        duration: Duration,
    },

    /// Time-point sampling was requested with an empty list.
    #[error("No time points were given")]
    NoTimePoints,

    /// The video reports a frame rate that cannot be sampled.
    #[error("Invalid frame rate: {0} fps")]
    InvalidFrameRate(f64),

    /// The crop rectangle is empty or inverted.
    #[error("Invalid crop rectangle {0}: top must be below bottom and left below right")]
    InvalidCropRectangle(CropRectangle),

    /// The crop rectangle does not fit inside an image.
    #[error("Crop rectangle {rectangle} exceeds the {width}x{height} image {path}")]
    CropOutOfBounds {
        /// Rectangle that was applied.
        rectangle: CropRectangle,
        /// Width of the image.
        width: u32,
        /// Height of the image.
        height: u32,
        /// Image that could not be cropped.
        path: PathBuf,
    },

    /// Two images handed to the similarity metric differ in shape.
    #[error(
        "Cannot compare {first} ({first_shape}) with {second} ({second_shape}): images differ in shape"
    )]
    ImageShapeMismatch {
        /// Earlier image of the pair.
        first: PathBuf,
        /// Shape of the earlier image, e.g. `640x480 Rgb8`.
        first_shape: String,
        /// Later image of the pair.
        second: PathBuf,
        /// Shape of the later image.
        second_shape: String,
    },

    /// The similarity metric failed.
    #[error("Similarity computation failed: {0}")]
    SimilarityError(String),

    /// JPEG quality outside 0–100.
    #[error("Image quality must be between 0 and 100, got {0}")]
    InvalidQuality(u8),

    /// Similarity threshold that is not a finite number.
    #[error("Similarity threshold must be a finite number, got {0}")]
    InvalidThreshold(f64),

    /// Output prefix or extension that cannot form a frame file name.
    #[error("Invalid output file name component: {0:?}")]
    InvalidOutputName(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading, writing or deleting files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while decoding or encoding a frame.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl SlidegrabError {
    /// Returns `true` for errors raised by pre-flight validation, before any
    /// file has been touched.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            SlidegrabError::InvalidTimestamp { .. }
                | SlidegrabError::InvalidRange { .. }
                | SlidegrabError::IntervalTooShort { .. }
                | SlidegrabError::IntervalTooLong { .. }
                | SlidegrabError::NoTimePoints
                | SlidegrabError::InvalidFrameRate(_)
                | SlidegrabError::InvalidCropRectangle(_)
                | SlidegrabError::InvalidQuality(_)
                | SlidegrabError::InvalidThreshold(_)
                | SlidegrabError::InvalidOutputName(_)
        )
    }
}

impl From<FfmpegError> for SlidegrabError {
    fn from(error: FfmpegError) -> Self {
        SlidegrabError::FfmpegError(error.to_string())
    }
}
