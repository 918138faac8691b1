//! Progress reporting.
//!
//! Every pipeline stage reports per-item progress through a
//! [`ProgressCallback`]. Callbacks only observe: they cannot stop a stage.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use slidegrab::{ProgressCallback, ProgressInfo, SamplingOptions};
//!
//! struct PrintProgress;
//!
//! impl ProgressCallback for PrintProgress {
//!     fn on_progress(&self, info: &ProgressInfo) {
//!         println!("[{:?}] {} done", info.operation, info.current);
//!     }
//! }
//!
//! let options = SamplingOptions::new().with_progress(Arc::new(PrintProgress));
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// The pipeline stage currently reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum OperationType {
    /// Writing sampled frames to disk.
    FrameExtraction,
    /// Comparing adjacent frames for near-duplicates.
    DuplicateFiltering,
    /// Cropping the surviving frames.
    Cropping,
}

/// A snapshot of stage progress.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Which stage is reporting.
    pub operation: OperationType,
    /// How many items have been processed so far.
    pub current: u64,
    /// Total items expected, if known ahead of time.
    pub total: Option<u64>,
    /// Completion percentage (0.0 – 100.0), if `total` is known.
    pub percentage: Option<f32>,
    /// Wall-clock time elapsed since the stage started.
    pub elapsed: Duration,
    /// The file just written, compared or cropped.
    pub current_path: Option<PathBuf>,
    /// Video time of the frame just written (extraction only).
    pub current_timestamp: Option<Duration>,
}

/// Receives progress updates from a pipeline stage.
pub trait ProgressCallback: Send + Sync {
    /// Called after each processed item.
    fn on_progress(&self, info: &ProgressInfo);
}

/// Discards all progress notifications. The default callback.
pub(crate) struct NoOpProgress;

impl ProgressCallback for NoOpProgress {
    fn on_progress(&self, _info: &ProgressInfo) {}
}

/// Tracks timing for one stage and forwards snapshots to the callback.
pub(crate) struct ProgressTracker {
    callback: Arc<dyn ProgressCallback>,
    operation: OperationType,
    total: Option<u64>,
    current: u64,
    start_time: Instant,
}

impl ProgressTracker {
    pub(crate) fn new(
        callback: Arc<dyn ProgressCallback>,
        operation: OperationType,
        total: Option<u64>,
    ) -> Self {
        Self {
            callback,
            operation,
            total,
            current: 0,
            start_time: Instant::now(),
        }
    }

    /// Record one completed item and notify the callback.
    pub(crate) fn advance(&mut self, path: Option<PathBuf>, timestamp: Option<Duration>) {
        self.current += 1;

        let percentage = self
            .total
            .filter(|&total| total > 0)
            .map(|total| (self.current as f32 / total as f32) * 100.0);

        let info = ProgressInfo {
            operation: self.operation,
            current: self.current,
            total: self.total,
            percentage,
            elapsed: self.start_time.elapsed(),
            current_path: path,
            current_timestamp: timestamp,
        };

        self.callback.on_progress(&info);
    }
}
