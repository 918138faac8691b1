//! FFmpeg-backed video source.
//!
//! [`VideoFile`] opens a container, picks its best video stream and exposes
//! it through [`FrameSource`]: a seek positions the demuxer on the nearest
//! keyframe before the target and the decoder then discards frames until the
//! requested presentation time is reached, so a seek followed by
//! [`next_frame`](FrameSource::next_frame) yields the frame shown at that
//! time.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{
    conversion::{duration_to_seek_timestamp, frame_to_buffer, pts_to_seconds, rational_to_rate},
    error::SlidegrabError,
    metadata::VideoMetadata,
    source::FrameSource,
};

/// A video file opened for frame sampling.
///
/// Holds the demuxer, decoder and RGB scaler for the best video stream.
/// Everything is released when the value is dropped.
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
///
/// use slidegrab::{FrameSource, VideoFile};
///
/// let mut video = VideoFile::open("lecture.mp4")?;
/// video.seek(Duration::from_secs(30))?;
/// if let Some(frame) = video.next_frame()? {
///     frame.save("slide.png")?;
/// }
/// # Ok::<(), slidegrab::SlidegrabError>(())
/// ```
pub struct VideoFile {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    time_base: Rational,
    metadata: VideoMetadata,
    path: PathBuf,
    /// Frames presented before this many seconds are dropped (set by a seek).
    skip_before: Option<f64>,
    /// End of input reached; only buffered frames remain in the decoder.
    draining: bool,
}

impl Debug for VideoFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoFile")
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .finish_non_exhaustive()
    }
}

impl VideoFile {
    /// Open a video file.
    ///
    /// Initializes FFmpeg (idempotent), locates the best video stream and
    /// reads its metadata. The frame count comes from the stream header when
    /// the container records it, otherwise it is estimated from the container
    /// duration and the average frame rate.
    ///
    /// # Errors
    ///
    /// - [`SlidegrabError::FileOpen`] if the file cannot be opened or its
    ///   decoder cannot be created.
    /// - [`SlidegrabError::NoVideoStream`] if the file has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, SlidegrabError> {
        let path = path.as_ref().to_path_buf();
        log::debug!("Opening video file: {}", path.display());

        ffmpeg_next::init().map_err(|error| SlidegrabError::FileOpen {
            path: path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| SlidegrabError::FileOpen {
                path: path.clone(),
                reason: error.to_string(),
            })?;

        let container_duration = match input_context.duration() {
            micros if micros > 0 => Duration::from_micros(micros as u64),
            _ => Duration::ZERO,
        };

        let (video_stream_index, time_base, frames_per_second, header_frames, decoder) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or(SlidegrabError::NoVideoStream)?;

            let frames_per_second = rational_to_rate(stream.avg_frame_rate())
                .or_else(|| rational_to_rate(stream.rate()))
                .unwrap_or(0.0);

            let decoder_context =
                CodecContext::from_parameters(stream.parameters()).map_err(|error| {
                    SlidegrabError::FileOpen {
                        path: path.clone(),
                        reason: format!("Failed to read video codec parameters: {error}"),
                    }
                })?;
            let decoder =
                decoder_context
                    .decoder()
                    .video()
                    .map_err(|error| SlidegrabError::FileOpen {
                        path: path.clone(),
                        reason: format!("Failed to create video decoder: {error}"),
                    })?;

            (
                stream.index(),
                stream.time_base(),
                frames_per_second,
                stream.frames(),
                decoder,
            )
        };

        let frame_count = if header_frames > 0 {
            header_frames as u64
        } else {
            (container_duration.as_secs_f64() * frames_per_second) as u64
        };

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            frames_per_second,
            frame_count,
            codec,
        };

        let scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            metadata.width,
            metadata.height,
            ScalingFlags::BILINEAR,
        )?;

        log::debug!(
            "Opened {}: {}x{} @ {:.3} fps, {} frames",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler,
            video_stream_index,
            time_base,
            metadata,
            path,
            skip_before: None,
            draining: false,
        })
    }

    /// Path the video was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scale a decoded frame to RGB24 and wrap it as an image.
    fn convert_frame(&mut self, decoded_frame: &VideoFrame) -> Result<DynamicImage, SlidegrabError> {
        let mut rgb_frame = VideoFrame::empty();
        self.scaler.run(decoded_frame, &mut rgb_frame)?;

        let width = self.metadata.width;
        let height = self.metadata.height;
        let buffer = frame_to_buffer(&rgb_frame, width, height, 3);
        let rgb_image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            SlidegrabError::VideoDecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(rgb_image))
    }
}

impl FrameSource for VideoFile {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn seek(&mut self, timestamp: Duration) -> Result<(), SlidegrabError> {
        let target = duration_to_seek_timestamp(timestamp);
        self.input_context.seek(target, ..target)?;
        self.decoder.flush();
        self.draining = false;

        // Half a frame of tolerance so rounding in the PTS never skips the
        // frame that is on screen at `timestamp`.
        let tolerance = self.metadata.frame_period().as_secs_f64() / 2.0;
        self.skip_before = Some(timestamp.as_secs_f64() - tolerance);
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<DynamicImage>, SlidegrabError> {
        let mut decoded_frame = VideoFrame::empty();

        loop {
            if self.decoder.receive_frame(&mut decoded_frame).is_ok() {
                let presented_at = decoded_frame
                    .timestamp()
                    .or_else(|| decoded_frame.pts())
                    .map(|pts| pts_to_seconds(pts, self.time_base));

                if let (Some(threshold), Some(seconds)) = (self.skip_before, presented_at) {
                    if seconds < threshold {
                        continue;
                    }
                }
                self.skip_before = None;
                return self.convert_frame(&decoded_frame).map(Some);
            }

            if self.draining {
                return Ok(None);
            }

            let next_packet = self
                .input_context
                .packets()
                .next()
                .map(|(stream, packet)| (stream.index(), packet));

            match next_packet {
                Some((index, packet)) if index == self.video_stream_index => {
                    self.decoder.send_packet(&packet)?;
                }
                Some(_) => {}
                None => {
                    self.decoder.send_eof()?;
                    self.draining = true;
                }
            }
        }
    }
}
