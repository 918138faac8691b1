//! The sample → filter → crop pipeline.
//!
//! The three stages hand off through files in one output directory. Every
//! option is validated when the [`Pipeline`] is built, before the first
//! stage runs.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::Path,
    sync::Arc,
};

use crate::{
    configuration::{FilterOptions, SamplingOptions},
    crop::{CropRectangle, CropReport, RegionCropper},
    dedup::{DuplicateFilter, FilterReport},
    error::SlidegrabError,
    plan::SamplePlan,
    progress::ProgressCallback,
    sampler::{FrameSampler, SamplingReport},
    source::FrameSource,
};

/// Options for a full pipeline run.
///
/// The filter and cropper stages are optional; leaving either out runs the
/// rest of the pipeline unchanged.
#[derive(Clone)]
pub struct PipelineOptions {
    sampling: SamplingOptions,
    filter: Option<FilterOptions>,
    crop: Option<CropRectangle>,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl Debug for PipelineOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("PipelineOptions")
            .field("sampling", &self.sampling)
            .field("filter", &self.filter)
            .field("crop", &self.crop)
            .field("progress", &self.progress.is_some())
            .finish()
    }
}

impl PipelineOptions {
    /// Sample with `sampling`, then filter with the default threshold and
    /// crop to [`CropRectangle::DEFAULT`].
    pub fn new(sampling: SamplingOptions) -> Self {
        Self {
            sampling,
            filter: Some(FilterOptions::new()),
            crop: Some(CropRectangle::DEFAULT),
            progress: None,
        }
    }

    /// Run the duplicate filter with `options`.
    #[must_use]
    pub fn with_filter(mut self, options: FilterOptions) -> Self {
        self.filter = Some(options);
        self
    }

    /// Keep every extracted frame.
    #[must_use]
    pub fn without_filter(mut self) -> Self {
        self.filter = None;
        self
    }

    /// Crop the surviving frames to `rectangle`.
    #[must_use]
    pub fn with_crop(mut self, rectangle: CropRectangle) -> Self {
        self.crop = Some(rectangle);
        self
    }

    /// Leave the frames at full size.
    #[must_use]
    pub fn without_crop(mut self) -> Self {
        self.crop = None;
        self
    }

    /// Report progress of every stage to `callback`.
    ///
    /// Applied when the pipeline is built, so it also reaches a filter
    /// enabled after this call. Overrides the callbacks of the stage options.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(callback);
        self
    }

    /// Sampling stage options.
    pub fn sampling(&self) -> &SamplingOptions {
        &self.sampling
    }

    /// Filter stage options, if the filter runs.
    pub fn filter(&self) -> Option<&FilterOptions> {
        self.filter.as_ref()
    }

    /// Crop rectangle, if the cropper runs.
    pub fn crop(&self) -> Option<CropRectangle> {
        self.crop
    }
}

/// What each stage of a pipeline run did.
#[derive(Debug, Clone)]
#[must_use]
pub struct PipelineReport {
    /// The sampler's report.
    pub sampling: SamplingReport,
    /// The filter's report, if it ran.
    pub filter: Option<FilterReport>,
    /// The cropper's report, if it ran.
    pub crop: Option<CropReport>,
}

/// Runs sampler, filter and cropper in order on one directory.
///
/// # Example
///
/// ```no_run
/// use slidegrab::{Pipeline, PipelineOptions, SamplingOptions, VideoFile};
///
/// let pipeline = Pipeline::new(PipelineOptions::new(SamplingOptions::new()))?;
/// let mut video = VideoFile::open("lecture.mp4")?;
/// let report = pipeline.run(&mut video, "frames".as_ref())?;
/// println!("{} slide(s) kept", report.crop.map_or(0, |crop| crop.cropped.len()));
/// # Ok::<(), slidegrab::SlidegrabError>(())
/// ```
pub struct Pipeline {
    sampler: FrameSampler,
    filter: Option<DuplicateFilter>,
    cropper: Option<RegionCropper>,
}

impl Pipeline {
    /// Validate every stage's options and build the pipeline.
    ///
    /// # Errors
    ///
    /// Any configuration error from the sampling options, the filter options
    /// or the crop rectangle.
    pub fn new(options: PipelineOptions) -> Result<Self, SlidegrabError> {
        let PipelineOptions {
            mut sampling,
            mut filter,
            crop,
            progress,
        } = options;

        if let Some(callback) = progress {
            sampling = sampling.with_progress(callback.clone());
            filter = filter.map(|filter| filter.with_progress(callback));
        }

        let cropper = crop
            .map(|rectangle| {
                RegionCropper::new(rectangle).map(|cropper| {
                    cropper
                        .with_quality(sampling.output().quality)
                        .with_progress(sampling.progress.clone())
                })
            })
            .transpose()?;
        let filter = filter.map(DuplicateFilter::new).transpose()?;
        let sampler = FrameSampler::new(sampling)?;

        Ok(Self {
            sampler,
            filter,
            cropper,
        })
    }

    /// Sample `source` into `output_directory`, then filter and crop there.
    ///
    /// An info-only sampling mode stops after the first stage.
    ///
    /// # Errors
    ///
    /// The first error raised by any stage; later stages do not run.
    pub fn run<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        output_directory: &Path,
    ) -> Result<PipelineReport, SlidegrabError> {
        let sampling = self.sampler.run(source, output_directory)?;
        if sampling.plan == SamplePlan::InfoOnly {
            return Ok(PipelineReport {
                sampling,
                filter: None,
                crop: None,
            });
        }

        let filter = self
            .filter
            .as_ref()
            .map(|filter| filter.run(output_directory))
            .transpose()?;
        let crop = self
            .cropper
            .as_ref()
            .map(|cropper| cropper.run(output_directory))
            .transpose()?;

        Ok(PipelineReport {
            sampling,
            filter,
            crop,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_can_be_switched_off() {
        let options = PipelineOptions::new(SamplingOptions::new())
            .without_filter()
            .without_crop();
        assert!(options.filter().is_none());
        assert!(options.crop().is_none());

        let pipeline = Pipeline::new(options).unwrap();
        assert!(pipeline.filter.is_none());
        assert!(pipeline.cropper.is_none());
    }

    #[test]
    fn every_stage_is_validated_up_front() {
        let bad_threshold = PipelineOptions::new(SamplingOptions::new())
            .with_filter(FilterOptions::new().with_threshold(f64::INFINITY));
        assert!(matches!(
            Pipeline::new(bad_threshold),
            Err(SlidegrabError::InvalidThreshold(_))
        ));

        let inverted = CropRectangle {
            top: 10,
            bottom: 5,
            left: 0,
            right: 5,
        };
        let bad_crop = PipelineOptions::new(SamplingOptions::new()).with_crop(inverted);
        assert!(matches!(
            Pipeline::new(bad_crop),
            Err(SlidegrabError::InvalidCropRectangle(_))
        ));

        let bad_quality = PipelineOptions::new(SamplingOptions::new().with_quality(120));
        assert!(Pipeline::new(bad_quality).is_err());
    }

    #[test]
    fn debug_hides_the_progress_callback() {
        let options = PipelineOptions::new(SamplingOptions::new())
            .with_progress(Arc::new(crate::progress::NoOpProgress));
        let rendered = format!("{options:?}");
        assert!(rendered.contains("progress: true"));
    }
}
