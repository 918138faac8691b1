//! Sampling modes and their validated schedules.
//!
//! A [`SamplingMode`] says what the caller asked for; [`SamplePlan::resolve`]
//! checks it against the video's [`VideoMetadata`] and turns it into a
//! concrete schedule. Resolution is pure, so every out-of-range time is
//! rejected before the sampler touches the filesystem.

use std::time::Duration;

use crate::{error::SlidegrabError, metadata::VideoMetadata};

/// Absorbs floating-point noise before a `ceil`, so `9.000000001` steps
/// count as nine.
const CEIL_EPSILON: f64 = 1e-9;

/// Which frames to extract from a video.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use slidegrab::SamplingMode;
///
/// // One frame every two seconds between 0 s and 50 s.
/// let mode = SamplingMode::Range {
///     initial: Duration::ZERO,
///     end: Some(Duration::from_secs(50)),
///     interval: Some(Duration::from_secs(2)),
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum SamplingMode {
    /// Report the video's duration, frame count and frame rate only.
    InfoOnly,
    /// One frame at each listed time, in the given order.
    TimePoints(Vec<Duration>),
    /// Frames between `initial` and `end` (the end of the video when
    /// `None`), either every decodable frame (`interval` is `None` or zero)
    /// or one frame per `interval`.
    Range {
        /// Start of the range.
        initial: Duration,
        /// Inclusive end of the range.
        end: Option<Duration>,
        /// Time between two sampled frames.
        interval: Option<Duration>,
    },
}

impl Default for SamplingMode {
    /// Every frame of the whole video.
    fn default() -> Self {
        SamplingMode::Range {
            initial: Duration::ZERO,
            end: None,
            interval: None,
        }
    }
}

/// A validated extraction schedule.
#[derive(Debug, Clone, PartialEq)]
pub enum SamplePlan {
    /// Nothing to extract.
    InfoOnly,
    /// Seek to each time and decode one frame.
    TimePoints(Vec<Duration>),
    /// Seek once to `start` (when non-zero), then decode sequentially.
    EveryFrame {
        /// Where decoding starts.
        start: Duration,
        /// Frame budget; `None` decodes until the source is exhausted.
        max_frames: Option<u64>,
    },
    /// Seek to `start + k * interval` for k = 0, 1, ... and decode one frame
    /// per step.
    Interval {
        /// Time of the first step.
        start: Duration,
        /// Distance between steps.
        interval: Duration,
        /// Step budget; `None` steps until a seek or decode fails.
        max_steps: Option<u64>,
    },
}

impl SamplePlan {
    /// Validate `mode` against `metadata` and build the schedule.
    ///
    /// Checks run in this order: time points against the duration; for
    /// ranges, `initial` against the duration, then `end` against the
    /// duration and against `initial`, then a non-zero interval against the
    /// frame period and the duration.
    ///
    /// # Errors
    ///
    /// - [`SlidegrabError::InvalidFrameRate`] if the video has no usable
    ///   frame rate and frames were requested.
    /// - [`SlidegrabError::NoTimePoints`] for an empty time-point list.
    /// - [`SlidegrabError::InvalidTimestamp`] for any time past the end.
    /// - [`SlidegrabError::InvalidRange`] if `end` precedes `initial`.
    /// - [`SlidegrabError::IntervalTooShort`] /
    ///   [`SlidegrabError::IntervalTooLong`] for an out-of-bounds interval.
    pub fn resolve(mode: &SamplingMode, metadata: &VideoMetadata) -> Result<Self, SlidegrabError> {
        if matches!(mode, SamplingMode::InfoOnly) {
            return Ok(SamplePlan::InfoOnly);
        }

        let frames_per_second = metadata.frames_per_second;
        if !(frames_per_second > 0.0 && frames_per_second.is_finite()) {
            return Err(SlidegrabError::InvalidFrameRate(frames_per_second));
        }
        let duration = metadata.duration();

        match mode {
            SamplingMode::InfoOnly => Ok(SamplePlan::InfoOnly),
            SamplingMode::TimePoints(points) => {
                let latest = points.iter().max().ok_or(SlidegrabError::NoTimePoints)?;
                if *latest > duration {
                    return Err(SlidegrabError::InvalidTimestamp {
                        timestamp: *latest,
                        duration,
                    });
                }
                Ok(SamplePlan::TimePoints(points.clone()))
            }
            SamplingMode::Range {
                initial,
                end,
                interval,
            } => {
                let initial = *initial;
                if initial > duration {
                    return Err(SlidegrabError::InvalidTimestamp {
                        timestamp: initial,
                        duration,
                    });
                }
                if let Some(end) = *end {
                    if end > duration {
                        return Err(SlidegrabError::InvalidTimestamp {
                            timestamp: end,
                            duration,
                        });
                    }
                    if initial > end {
                        return Err(SlidegrabError::InvalidRange {
                            start: initial,
                            end,
                        });
                    }
                }

                match interval.filter(|interval| !interval.is_zero()) {
                    None => {
                        let max_frames = end.map(|end| {
                            let span = (end - initial).as_secs_f64() * frames_per_second;
                            ceil_count(span) + 1
                        });
                        Ok(SamplePlan::EveryFrame {
                            start: initial,
                            max_frames,
                        })
                    }
                    Some(interval) => {
                        let frame_period = metadata.frame_period();
                        if interval < frame_period {
                            return Err(SlidegrabError::IntervalTooShort {
                                interval,
                                frame_period,
                            });
                        }
                        if interval > duration {
                            return Err(SlidegrabError::IntervalTooLong { interval, duration });
                        }
                        let max_steps = end.map(|end| {
                            let steps = (end - initial).as_secs_f64() / interval.as_secs_f64();
                            ceil_count(steps) + 1
                        });
                        Ok(SamplePlan::Interval {
                            start: initial,
                            interval,
                            max_steps,
                        })
                    }
                }
            }
        }
    }

    /// Number of frames the plan will write if decoding never fails.
    ///
    /// `None` when the plan runs until the source is exhausted.
    pub fn expected_frames(&self) -> Option<u64> {
        match self {
            SamplePlan::InfoOnly => Some(0),
            SamplePlan::TimePoints(points) => Some(points.len() as u64),
            SamplePlan::EveryFrame { max_frames, .. } => *max_frames,
            SamplePlan::Interval { max_steps, .. } => *max_steps,
        }
    }
}

/// Time of step `step` in an interval schedule, or `None` on overflow.
pub(crate) fn interval_timestamp(start: Duration, interval: Duration, step: u64) -> Option<Duration> {
    let step = u32::try_from(step).ok()?;
    start.checked_add(interval.checked_mul(step)?)
}

fn ceil_count(value: f64) -> u64 {
    (value - CEIL_EPSILON).ceil().max(0.0) as u64
}
