//! Per-stage options.
//!
//! [`SamplingOptions`] and [`FilterOptions`] are builders in the same style:
//! `with_*` methods never fail, and the stage that consumes them validates
//! the whole value once, when it is constructed.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use slidegrab::{PixelFormat, SamplingMode, SamplingOptions};
//!
//! let options = SamplingOptions::new()
//!     .with_mode(SamplingMode::TimePoints(vec![Duration::from_secs(3)]))
//!     .with_prefix("slide")
//!     .with_quality(90)
//!     .with_pixel_format(PixelFormat::Gray8);
//! assert!(options.validate().is_ok());
//! ```

use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::sync::Arc;

use image::DynamicImage;

use crate::{
    catalog::IMAGE_EXTENSIONS,
    error::SlidegrabError,
    plan::SamplingMode,
    progress::{NoOpProgress, ProgressCallback},
};

/// Similarity score above which a frame counts as a duplicate of its
/// predecessor.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.9;

/// Pixel layout of the written frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PixelFormat {
    /// 8-bit RGB. This is the default.
    #[default]
    Rgb8,
    /// 8-bit grayscale.
    Gray8,
}

impl PixelFormat {
    /// Convert a decoded frame to this layout.
    pub(crate) fn apply(self, image: DynamicImage) -> DynamicImage {
        match self {
            PixelFormat::Rgb8 => match image {
                DynamicImage::ImageRgb8(_) => image,
                other => DynamicImage::ImageRgb8(other.to_rgb8()),
            },
            PixelFormat::Gray8 => match image {
                DynamicImage::ImageLuma8(_) => image,
                other => DynamicImage::ImageLuma8(other.to_luma8()),
            },
        }
    }
}

/// How frame files are named and encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOutputOptions {
    /// File name prefix; files are `<prefix>_<index>.<extension>`.
    pub prefix: String,
    /// File extension, which also selects the encoder.
    pub extension: String,
    /// JPEG quality, 0–100 (ignored by other encoders).
    pub quality: u8,
    /// Colour or grayscale output.
    pub pixel_format: PixelFormat,
}

impl Default for FrameOutputOptions {
    fn default() -> Self {
        Self {
            prefix: "frame".to_string(),
            extension: "jpg".to_string(),
            quality: 100,
            pixel_format: PixelFormat::Rgb8,
        }
    }
}

impl FrameOutputOptions {
    fn validate(&self) -> Result<(), SlidegrabError> {
        if self.quality > 100 {
            return Err(SlidegrabError::InvalidQuality(self.quality));
        }
        if self.prefix.is_empty()
            || self
                .prefix
                .chars()
                .any(|character| std::path::is_separator(character) || character == '\0')
        {
            return Err(SlidegrabError::InvalidOutputName(self.prefix.clone()));
        }
        if !IMAGE_EXTENSIONS
            .iter()
            .any(|known| known.eq_ignore_ascii_case(&self.extension))
        {
            return Err(SlidegrabError::InvalidOutputName(self.extension.clone()));
        }
        Ok(())
    }
}

/// Options for the [`FrameSampler`](crate::FrameSampler).
#[derive(Clone)]
pub struct SamplingOptions {
    pub(crate) mode: SamplingMode,
    pub(crate) output: FrameOutputOptions,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for SamplingOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("SamplingOptions")
            .field("mode", &self.mode)
            .field("output", &self.output)
            .finish_non_exhaustive()
    }
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl SamplingOptions {
    /// Every frame of the whole video, written as `frame_######.jpg` at
    /// quality 100 in colour, with no progress callback.
    pub fn new() -> Self {
        Self {
            mode: SamplingMode::default(),
            output: FrameOutputOptions::default(),
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Select which frames to extract.
    #[must_use]
    pub fn with_mode(mut self, mode: SamplingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the file name prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.output.prefix = prefix.into();
        self
    }

    /// Set the output image extension (a leading dot is ignored).
    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.output.extension = extension.trim_start_matches('.').to_ascii_lowercase();
        self
    }

    /// Set the JPEG quality (0–100).
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.output.quality = quality;
        self
    }

    /// Write colour or grayscale frames.
    #[must_use]
    pub fn with_pixel_format(mut self, format: PixelFormat) -> Self {
        self.output.pixel_format = format;
        self
    }

    /// Attach a progress callback, invoked once per written frame.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// The selected sampling mode.
    pub fn mode(&self) -> &SamplingMode {
        &self.mode
    }

    /// The file naming and encoding settings.
    pub fn output(&self) -> &FrameOutputOptions {
        &self.output
    }

    /// Check the naming and encoding settings.
    ///
    /// Time bounds are checked later against the video, by
    /// [`SamplePlan::resolve`](crate::SamplePlan::resolve).
    ///
    /// # Errors
    ///
    /// [`SlidegrabError::InvalidQuality`] or
    /// [`SlidegrabError::InvalidOutputName`].
    pub fn validate(&self) -> Result<(), SlidegrabError> {
        self.output.validate()
    }
}

/// Options for the [`DuplicateFilter`](crate::DuplicateFilter).
#[derive(Clone)]
pub struct FilterOptions {
    pub(crate) threshold: f64,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for FilterOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("FilterOptions")
            .field("threshold", &self.threshold)
            .finish_non_exhaustive()
    }
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl FilterOptions {
    /// Threshold [`DEFAULT_SIMILARITY_THRESHOLD`], no progress callback.
    pub fn new() -> Self {
        Self {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Scores strictly above `threshold` mark a duplicate.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Attach a progress callback, invoked once per compared pair.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// The configured threshold.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// # Errors
    ///
    /// [`SlidegrabError::InvalidThreshold`] for NaN or infinite thresholds.
    pub fn validate(&self) -> Result<(), SlidegrabError> {
        if !self.threshold.is_finite() {
            return Err(SlidegrabError::InvalidThreshold(self.threshold));
        }
        Ok(())
    }
}
