//! The decoding seam between the sampler and a video backend.

use std::time::Duration;

use image::DynamicImage;

use crate::{error::SlidegrabError, metadata::VideoMetadata};

/// A seekable, sequentially decodable video.
///
/// [`VideoFile`](crate::VideoFile) implements this on top of FFmpeg. The
/// [`FrameSampler`](crate::FrameSampler) only ever talks to this trait, so
/// any other backend (or an in-memory fake in tests) can be sampled the
/// same way.
pub trait FrameSource {
    /// Metadata of the stream. Constant for the lifetime of the source.
    fn metadata(&self) -> &VideoMetadata;

    /// Position the source so the next call to
    /// [`next_frame`](FrameSource::next_frame) returns the frame displayed at
    /// `timestamp`.
    fn seek(&mut self, timestamp: Duration) -> Result<(), SlidegrabError>;

    /// Decode the next frame in presentation order.
    ///
    /// Returns `Ok(None)` once the stream is exhausted.
    fn next_frame(&mut self) -> Result<Option<DynamicImage>, SlidegrabError>;
}

impl<S: FrameSource + ?Sized> FrameSource for &mut S {
    fn metadata(&self) -> &VideoMetadata {
        (**self).metadata()
    }

    fn seek(&mut self, timestamp: Duration) -> Result<(), SlidegrabError> {
        (**self).seek(timestamp)
    }

    fn next_frame(&mut self) -> Result<Option<DynamicImage>, SlidegrabError> {
        (**self).next_frame()
    }
}
