//! Video metadata.
//!
//! [`VideoMetadata`] is read once when a [`FrameSource`](crate::FrameSource)
//! is opened and stays constant for the rest of the run. The sampling plan
//! validates every requested time against it.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::time::Duration;

/// Metadata for the video stream being sampled.
///
/// # Example
///
/// ```no_run
/// use slidegrab::{FrameSource, VideoFile};
///
/// let video = VideoFile::open("lecture.mp4").unwrap();
/// let metadata = video.metadata();
/// println!("{} frames at {:.2} fps", metadata.frame_count, metadata.frames_per_second);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second (may be approximate for variable-frame-rate content).
    pub frames_per_second: f64,
    /// Number of frames in the stream.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
}

impl VideoMetadata {
    /// Total duration, computed as `frame_count / frames_per_second`.
    ///
    /// Zero when the frame rate is unknown.
    pub fn duration(&self) -> Duration {
        if self.frames_per_second > 0.0 && self.frames_per_second.is_finite() {
            Duration::from_secs_f64(self.frame_count as f64 / self.frames_per_second)
        } else {
            Duration::ZERO
        }
    }

    /// Time between two consecutive frames.
    ///
    /// Zero when the frame rate is unknown.
    pub fn frame_period(&self) -> Duration {
        if self.frames_per_second > 0.0 && self.frames_per_second.is_finite() {
            Duration::from_secs_f64(1.0 / self.frames_per_second)
        } else {
            Duration::ZERO
        }
    }
}

impl Display for VideoMetadata {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        writeln!(
            f,
            "Duration of the video: {:.3} seconds",
            self.duration().as_secs_f64()
        )?;
        writeln!(f, "Number of frames: {}", self.frame_count)?;
        writeln!(f, "Frames per second (FPS): {:.3}", self.frames_per_second)?;
        write!(f, "Resolution: {}x{} [{}]", self.width, self.height, self.codec)
    }
}
