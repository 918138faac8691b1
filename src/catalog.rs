//! Frame file naming and directory listing.
//!
//! The sampler names files `<prefix>_<6-digit index>.<ext>`. The filter and
//! the cropper read the directory back through [`collect_frames`], which
//! walks it recursively, keeps only image files and orders them by the
//! numeric suffix of their stem. Filesystem enumeration order is never
//! relied upon.

use std::{
    cmp::Ordering,
    fs,
    path::{Path, PathBuf},
};

use crate::error::SlidegrabError;

/// File extensions treated as frame images (compared case-insensitively).
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];

/// Name of the `index`-th frame file (1-based).
///
/// ```
/// assert_eq!(slidegrab::frame_file_name("frame", 7, "jpg"), "frame_000007.jpg");
/// ```
pub fn frame_file_name(prefix: &str, index: u64, extension: &str) -> String {
    format!("{prefix}_{index:06}.{extension}")
}

/// Returns `true` if `path` has one of the [`IMAGE_EXTENSIONS`].
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(extension))
        })
}

/// The trailing run of digits in a file stem, e.g. `42` for `frame_000042`.
pub(crate) fn numeric_suffix(path: &Path) -> Option<u64> {
    let stem = path.file_stem()?.to_str()?;
    let digits_start = stem
        .char_indices()
        .rev()
        .take_while(|(_, character)| character.is_ascii_digit())
        .last()
        .map(|(index, _)| index)?;
    stem[digits_start..].parse().ok()
}

/// Orders numbered frames first by number, then everything else by path.
fn frame_order(a: &Path, b: &Path) -> Ordering {
    match (numeric_suffix(a), numeric_suffix(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Every image file under `directory`, recursively, in frame order.
///
/// Non-image files are skipped. Files in subdirectories are included and
/// sorted together with the top-level ones.
///
/// # Errors
///
/// Returns [`SlidegrabError::IoError`] if a directory cannot be read.
pub fn collect_frames(directory: &Path) -> Result<Vec<PathBuf>, SlidegrabError> {
    let mut frames = Vec::new();
    walk(directory, &mut frames)?;
    frames.sort_by(|a, b| frame_order(a, b));
    log::debug!(
        "Found {} frame image(s) under {}",
        frames.len(),
        directory.display()
    );
    Ok(frames)
}

fn walk(directory: &Path, frames: &mut Vec<PathBuf>) -> Result<(), SlidegrabError> {
    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, frames)?;
        } else if path.is_file() {
            if is_image_path(&path) {
                frames.push(path);
            } else {
                log::debug!("Skipping non-image file {}", path.display());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_zero_padded_to_six_digits() {
        assert_eq!(frame_file_name("frame", 1, "jpg"), "frame_000001.jpg");
        assert_eq!(frame_file_name("slide", 123_456, "png"), "slide_123456.png");
        assert_eq!(frame_file_name("x", 1_234_567, "png"), "x_1234567.png");
    }

    #[test]
    fn image_extensions_are_case_insensitive() {
        assert!(is_image_path(Path::new("a/frame_000001.JPG")));
        assert!(is_image_path(Path::new("frame.png")));
        assert!(!is_image_path(Path::new("notes.txt")));
        assert!(!is_image_path(Path::new("frame_000001")));
    }

    #[test]
    fn numeric_suffix_reads_trailing_digits() {
        assert_eq!(numeric_suffix(Path::new("frame_000042.jpg")), Some(42));
        assert_eq!(numeric_suffix(Path::new("dir/10.png")), Some(10));
        assert_eq!(numeric_suffix(Path::new("cover.png")), None);
    }

    #[test]
    fn frames_sort_numerically_not_lexically() {
        let mut paths = vec![
            PathBuf::from("cover.png"),
            PathBuf::from("frame_10.jpg"),
            PathBuf::from("frame_9.jpg"),
            PathBuf::from("frame_100.jpg"),
        ];
        paths.sort_by(|a, b| frame_order(a, b));
        assert_eq!(
            paths,
            vec![
                PathBuf::from("frame_9.jpg"),
                PathBuf::from("frame_10.jpg"),
                PathBuf::from("frame_100.jpg"),
                PathBuf::from("cover.png"),
            ]
        );
    }

    #[test]
    fn collect_walks_subdirectories_and_skips_other_files() {
        let directory = tempfile::tempdir().unwrap();
        let nested = directory.path().join("nested");
        fs::create_dir(&nested).unwrap();
        fs::write(directory.path().join("frame_000002.jpg"), b"").unwrap();
        fs::write(nested.join("frame_000001.jpg"), b"").unwrap();
        fs::write(directory.path().join("notes.txt"), b"hello").unwrap();

        let frames = collect_frames(directory.path()).unwrap();
        assert_eq!(
            frames,
            vec![
                nested.join("frame_000001.jpg"),
                directory.path().join("frame_000002.jpg"),
            ]
        );
    }

    #[test]
    fn collect_fails_on_a_missing_directory() {
        let directory = tempfile::tempdir().unwrap();
        let result = collect_frames(&directory.path().join("missing"));
        assert!(matches!(result, Err(SlidegrabError::IoError(_))));
    }
}
