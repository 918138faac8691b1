//! Fixed-region cropping of extracted frames.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::Arc,
};

use image::{DynamicImage, GenericImageView};

use crate::{
    catalog::collect_frames,
    error::SlidegrabError,
    progress::{NoOpProgress, OperationType, ProgressCallback, ProgressTracker},
    sampler::save_image,
};

/// A pixel rectangle: rows `top..bottom`, columns `left..right`.
///
/// Bounds are half-open, so the cropped image is
/// `(bottom - top) x (right - left)` pixels (height x width).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CropRectangle {
    /// First row kept.
    pub top: u32,
    /// Row after the last row kept.
    pub bottom: u32,
    /// First column kept.
    pub left: u32,
    /// Column after the last column kept.
    pub right: u32,
}

impl CropRectangle {
    /// The rectangle used for 16:9 lecture recordings when none is given.
    pub const DEFAULT: CropRectangle = CropRectangle {
        top: 95,
        bottom: 588,
        left: 285,
        right: 1160,
    };

    /// Build a rectangle from `top..bottom` rows and `left..right` columns.
    ///
    /// # Errors
    ///
    /// [`SlidegrabError::InvalidCropRectangle`] unless `top < bottom` and
    /// `left < right`.
    pub fn new(top: u32, bottom: u32, left: u32, right: u32) -> Result<Self, SlidegrabError> {
        let rectangle = Self {
            top,
            bottom,
            left,
            right,
        };
        if top >= bottom || left >= right {
            return Err(SlidegrabError::InvalidCropRectangle(rectangle));
        }
        Ok(rectangle)
    }

    /// Width of the cropped image.
    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left)
    }

    /// Height of the cropped image.
    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top)
    }

    /// `true` if the rectangle lies inside a `width` x `height` image.
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.bottom <= height && self.right <= width
    }
}

impl Default for CropRectangle {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl Display for CropRectangle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(
            f,
            "[{}:{}, {}:{}]",
            self.top, self.bottom, self.left, self.right
        )
    }
}

/// Outcome of a cropping run.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct CropReport {
    /// The rectangle that was applied.
    pub rectangle: CropRectangle,
    /// Files written, in frame order.
    pub cropped: Vec<PathBuf>,
}

/// Rewrites every frame in a directory to one fixed sub-rectangle.
///
/// Cropping is destructive and not idempotent: a second run crops the
/// already-cropped images again, and fails as soon as the rectangle no
/// longer fits.
///
/// # Example
///
/// ```no_run
/// use slidegrab::{CropRectangle, RegionCropper};
///
/// let cropper = RegionCropper::new(CropRectangle::new(95, 588, 285, 1160)?)?;
/// let report = cropper.run("frames".as_ref())?;
/// println!("cropped {} frame(s)", report.cropped.len());
/// # Ok::<(), slidegrab::SlidegrabError>(())
/// ```
#[derive(Clone)]
pub struct RegionCropper {
    rectangle: CropRectangle,
    quality: u8,
    progress: Arc<dyn ProgressCallback>,
}

impl std::fmt::Debug for RegionCropper {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("RegionCropper")
            .field("rectangle", &self.rectangle)
            .field("quality", &self.quality)
            .finish_non_exhaustive()
    }
}

impl RegionCropper {
    /// A cropper writing JPEG files at quality 100.
    ///
    /// # Errors
    ///
    /// [`SlidegrabError::InvalidCropRectangle`] if `rectangle` is empty or
    /// inverted. Its fields are public, so a rectangle built without
    /// [`CropRectangle::new`] is checked here.
    pub fn new(rectangle: CropRectangle) -> Result<Self, SlidegrabError> {
        let CropRectangle {
            top,
            bottom,
            left,
            right,
        } = rectangle;
        Ok(Self {
            rectangle: CropRectangle::new(top, bottom, left, right)?,
            quality: 100,
            progress: Arc::new(NoOpProgress),
        })
    }

    /// JPEG quality used when re-encoding (clamped to 1–100).
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality;
        self
    }

    /// Attach a progress callback, invoked once per cropped frame.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// The rectangle this cropper applies.
    pub fn rectangle(&self) -> CropRectangle {
        self.rectangle
    }

    /// Crop one decoded image.
    ///
    /// `path` is only used for the error message.
    ///
    /// # Errors
    ///
    /// [`SlidegrabError::CropOutOfBounds`] if the rectangle does not fit.
    pub fn crop_image(
        &self,
        image: &DynamicImage,
        path: &Path,
    ) -> Result<DynamicImage, SlidegrabError> {
        let (width, height) = image.dimensions();
        if !self.rectangle.fits(width, height) {
            return Err(SlidegrabError::CropOutOfBounds {
                rectangle: self.rectangle,
                width,
                height,
                path: path.to_path_buf(),
            });
        }
        Ok(image.crop_imm(
            self.rectangle.left,
            self.rectangle.top,
            self.rectangle.width(),
            self.rectangle.height(),
        ))
    }

    /// Crop every frame under `directory`.
    ///
    /// Each result is written under its own file name directly in
    /// `directory`, so frames found in subdirectories are copied up to the
    /// top level. A frame is replaced only once its cropped version has been
    /// fully encoded. Stops at the first frame that cannot be read or
    /// cropped; frames processed before it stay cropped.
    ///
    /// # Errors
    ///
    /// - [`SlidegrabError::IoError`] if the directory cannot be listed or a
    ///   file cannot be written.
    /// - [`SlidegrabError::ImageError`] if a frame cannot be decoded.
    /// - [`SlidegrabError::CropOutOfBounds`] from [`crop_image`](Self::crop_image).
    pub fn run(&self, directory: &Path) -> Result<CropReport, SlidegrabError> {
        let frames = collect_frames(directory)?;
        let mut tracker = ProgressTracker::new(
            self.progress.clone(),
            OperationType::Cropping,
            Some(frames.len() as u64),
        );

        let mut cropped = Vec::with_capacity(frames.len());
        for path in &frames {
            let image = image::open(path)?;
            let region = self.crop_image(&image, path)?;

            let Some(file_name) = path.file_name() else {
                continue;
            };
            let destination = directory.join(file_name);
            save_image(&region, &destination, self.quality)?;
            log::debug!("Cropped {} to {}", path.display(), self.rectangle);

            tracker.advance(Some(destination.clone()), None);
            cropped.push(destination);
        }

        log::info!(
            "Cropped {} frame(s) to {}x{}",
            cropped.len(),
            self.rectangle.width(),
            self.rectangle.height()
        );
        Ok(CropReport {
            rectangle: self.rectangle,
            cropped,
        })
    }
}
