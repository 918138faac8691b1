//! Shared helpers for the integration tests.
//!
//! [`SyntheticVideo`] is an in-memory [`FrameSource`] so the sampler and the
//! pipeline can be exercised without FFmpeg fixtures.

#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use image::{DynamicImage, Rgb, RgbImage};
use rand::{Rng, SeedableRng, rngs::SmallRng};
use slidegrab::{FrameSource, SlidegrabError, VideoMetadata};

pub const WIDTH: u32 = 64;
pub const HEIGHT: u32 = 48;

/// A frame of random pixels. Different seeds give structurally unrelated
/// frames; the same seed gives identical frames.
pub fn noise_frame(seed: u64) -> DynamicImage {
    let mut rng = SmallRng::seed_from_u64(seed);
    DynamicImage::ImageRgb8(RgbImage::from_fn(WIDTH, HEIGHT, |_, _| {
        Rgb([rng.r#gen(), rng.r#gen(), rng.r#gen()])
    }))
}

/// Write `image` as `<prefix>_<index>.png` in `directory`.
pub fn write_frame(directory: &Path, index: u64, image: &DynamicImage) -> PathBuf {
    let path = directory.join(slidegrab::frame_file_name("frame", index, "png"));
    image.save(&path).expect("Failed to write test frame");
    path
}

/// File names in `directory`, sorted.
pub fn file_names(directory: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(directory)
        .expect("Failed to list directory")
        .map(|entry| {
            entry
                .expect("Failed to read entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// An in-memory video: one image per frame at a constant frame rate.
pub struct SyntheticVideo {
    frames: Vec<DynamicImage>,
    metadata: VideoMetadata,
    position: usize,
    fail_at: Option<usize>,
    pub seeks: Vec<Duration>,
}

impl SyntheticVideo {
    pub fn new(frames: Vec<DynamicImage>, frames_per_second: f64) -> Self {
        let (width, height) = frames
            .first()
            .map_or((WIDTH, HEIGHT), |frame| (frame.width(), frame.height()));
        let metadata = VideoMetadata {
            width,
            height,
            frames_per_second,
            frame_count: frames.len() as u64,
            codec: "synthetic".to_string(),
        };
        Self {
            frames,
            metadata,
            position: 0,
            fail_at: None,
            seeks: Vec::new(),
        }
    }

    /// `count` unrelated noise frames.
    pub fn noise(count: u64, frames_per_second: f64) -> Self {
        Self::new((1..=count).map(noise_frame).collect(), frames_per_second)
    }

    /// Decoding the frame at `index` fails.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }
}

impl FrameSource for SyntheticVideo {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn seek(&mut self, timestamp: Duration) -> Result<(), SlidegrabError> {
        self.seeks.push(timestamp);
        let duration = self.metadata.duration();
        if timestamp > duration {
            return Err(SlidegrabError::InvalidTimestamp {
                timestamp,
                duration,
            });
        }
        self.position = (timestamp.as_secs_f64() * self.metadata.frames_per_second).round() as usize;
        Ok(())
    }

    fn next_frame(&mut self) -> Result<Option<DynamicImage>, SlidegrabError> {
        if self.fail_at == Some(self.position) {
            return Err(SlidegrabError::VideoDecodeError(format!(
                "corrupt frame {}",
                self.position
            )));
        }
        let frame = self.frames.get(self.position).cloned();
        if frame.is_some() {
            self.position += 1;
        }
        Ok(frame)
    }
}
