//! Near-duplicate frame removal.
//!
//! Removal runs in two phases. [`DuplicateFilter::plan`] scans an immutable
//! snapshot of the ordered frame list and decides which files to delete;
//! [`DuplicateFilter::apply`] deletes them afterwards. Every verdict is
//! therefore made against the pre-deletion images, and a deleted frame is
//! never compared again.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use image::DynamicImage;

use crate::{
    catalog::collect_frames,
    configuration::FilterOptions,
    error::SlidegrabError,
    progress::{OperationType, ProgressTracker},
    similarity::{SimilarityScorer, StructuralSimilarity, describe_shape, same_shape},
};

/// One adjacent pair judged to be a near-duplicate.
#[derive(Debug, Clone, PartialEq)]
pub struct DuplicateVerdict {
    /// The frame just before `duplicate` in the snapshot it was compared
    /// against. It may itself be the duplicate of an earlier verdict, so it
    /// is not necessarily a surviving frame.
    pub previous: PathBuf,
    /// The later frame, scheduled for deletion.
    pub duplicate: PathBuf,
    /// Similarity score of the pair.
    pub score: f64,
}

/// The decision phase's result: which files to delete and why.
#[derive(Debug, Clone, Default, PartialEq)]
#[must_use]
pub struct DeletionPlan {
    /// Number of adjacent pairs that were scored.
    pub comparisons: usize,
    /// Pairs above the threshold, in scan order.
    pub verdicts: Vec<DuplicateVerdict>,
}

impl DeletionPlan {
    /// Files to delete, in scan order.
    pub fn duplicates(&self) -> impl Iterator<Item = &Path> {
        self.verdicts.iter().map(|verdict| verdict.duplicate.as_path())
    }

    /// Number of files scheduled for deletion.
    pub fn len(&self) -> usize {
        self.verdicts.len()
    }

    /// `true` if nothing is scheduled for deletion.
    pub fn is_empty(&self) -> bool {
        self.verdicts.is_empty()
    }
}

/// Outcome of a full filter run.
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct FilterReport {
    /// Frames found in the directory before filtering.
    pub candidates: usize,
    /// The decision phase's result.
    pub plan: DeletionPlan,
    /// Files actually removed from disk.
    pub deleted: Vec<PathBuf>,
}

impl FilterReport {
    /// Frames left after filtering.
    pub fn remaining(&self) -> usize {
        self.candidates - self.plan.len()
    }
}

/// Deletes frames that are near-duplicates of their predecessor.
///
/// # Example
///
/// ```no_run
/// use slidegrab::{DuplicateFilter, FilterOptions};
///
/// let filter = DuplicateFilter::new(FilterOptions::new().with_threshold(0.9))?;
/// let report = filter.run("frames".as_ref())?;
/// println!("deleted {} duplicate frame(s)", report.deleted.len());
/// # Ok::<(), slidegrab::SlidegrabError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DuplicateFilter<S = StructuralSimilarity> {
    options: FilterOptions,
    scorer: S,
}

impl DuplicateFilter<StructuralSimilarity> {
    /// A filter scoring with [`StructuralSimilarity`].
    ///
    /// # Errors
    ///
    /// Returns the error from [`FilterOptions::validate`].
    pub fn new(options: FilterOptions) -> Result<Self, SlidegrabError> {
        Self::with_scorer(options, StructuralSimilarity)
    }
}

impl<S: SimilarityScorer> DuplicateFilter<S> {
    /// A filter with a custom similarity metric.
    ///
    /// # Errors
    ///
    /// Returns the error from [`FilterOptions::validate`].
    pub fn with_scorer(options: FilterOptions, scorer: S) -> Result<Self, SlidegrabError> {
        options.validate()?;
        Ok(Self { options, scorer })
    }

    /// Collect the frames in `directory`, plan, then delete.
    ///
    /// # Errors
    ///
    /// Any error from [`collect_frames`], [`plan`](Self::plan) or
    /// [`apply`](Self::apply). Nothing is deleted if planning fails.
    pub fn run(&self, directory: &Path) -> Result<FilterReport, SlidegrabError> {
        let frames = collect_frames(directory)?;
        let plan = self.plan(&frames)?;
        let deleted = self.apply(&plan)?;
        log::info!(
            "Deleted {} near-duplicate frame(s) under {}",
            deleted.len(),
            directory.display()
        );
        Ok(FilterReport {
            candidates: frames.len(),
            plan,
            deleted,
        })
    }

    /// Decide which of `frames` are near-duplicates of their predecessor.
    ///
    /// Compares each adjacent pair `(i, i + 1)` of the list. A score strictly
    /// above the threshold schedules `i + 1` for deletion. The scan always
    /// advances by one, so a run of static frames keeps only its first
    /// frame. If a file of a pair no longer exists the scan stops there.
    ///
    /// # Errors
    ///
    /// - [`SlidegrabError::ImageError`] if a frame cannot be decoded.
    /// - [`SlidegrabError::ImageShapeMismatch`] if a pair differs in size or
    ///   colour layout.
    /// - Any error from the scorer.
    pub fn plan(&self, frames: &[PathBuf]) -> Result<DeletionPlan, SlidegrabError> {
        let mut plan = DeletionPlan::default();
        let Some((first, rest)) = frames.split_first() else {
            return Ok(plan);
        };

        let mut tracker = ProgressTracker::new(
            self.options.progress.clone(),
            OperationType::DuplicateFiltering,
            Some(rest.len() as u64),
        );

        if !first.exists() {
            log::warn!("{} no longer exists, stopping the scan", first.display());
            return Ok(plan);
        }
        let mut previous_path = first;
        let mut previous = image::open(first)?;

        for path in rest {
            if !path.exists() {
                log::warn!("{} no longer exists, stopping the scan", path.display());
                break;
            }
            let current = image::open(path)?;
            let score = self.compare(previous_path, &previous, path, &current)?;
            plan.comparisons += 1;

            if score > self.options.threshold {
                log::debug!(
                    "Near-duplicate: {} ~ {} (score {score:.4})",
                    previous_path.display(),
                    path.display()
                );
                plan.verdicts.push(DuplicateVerdict {
                    previous: previous_path.clone(),
                    duplicate: path.clone(),
                    score,
                });
            } else {
                log::debug!(
                    "Distinct: {} vs {} (score {score:.4})",
                    previous_path.display(),
                    path.display()
                );
            }

            tracker.advance(Some(path.clone()), None);
            previous_path = path;
            previous = current;
        }

        Ok(plan)
    }

    /// Delete every file scheduled by `plan`.
    ///
    /// Files that are already gone are skipped, so applying the same plan
    /// twice is harmless. Returns the files this call removed.
    ///
    /// # Errors
    ///
    /// [`SlidegrabError::IoError`] for any failure other than a missing file.
    pub fn apply(&self, plan: &DeletionPlan) -> Result<Vec<PathBuf>, SlidegrabError> {
        let mut deleted = Vec::with_capacity(plan.len());
        for path in plan.duplicates() {
            match fs::remove_file(path) {
                Ok(()) => deleted.push(path.to_path_buf()),
                Err(error) if error.kind() == ErrorKind::NotFound => {
                    log::debug!("{} was already removed", path.display());
                }
                Err(error) => return Err(error.into()),
            }
        }
        Ok(deleted)
    }

    fn compare(
        &self,
        first_path: &Path,
        first: &DynamicImage,
        second_path: &Path,
        second: &DynamicImage,
    ) -> Result<f64, SlidegrabError> {
        if !same_shape(first, second) {
            return Err(SlidegrabError::ImageShapeMismatch {
                first: first_path.to_path_buf(),
                first_shape: describe_shape(first),
                second: second_path.to_path_buf(),
                second_shape: describe_shape(second),
            });
        }
        self.scorer.score(first, second)
    }
}
