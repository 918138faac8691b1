//! DuplicateFilter integration tests on real image files.

mod common;

use std::fs;

use common::{file_names, noise_frame, write_frame};
use slidegrab::{DuplicateFilter, FilterOptions, SlidegrabError};

fn filter() -> DuplicateFilter {
    DuplicateFilter::new(FilterOptions::new()).expect("Default options are valid")
}

#[test]
fn static_sequence_keeps_only_its_first_frame() {
    let directory = tempfile::tempdir().unwrap();
    let slide = noise_frame(7);
    for index in 1..=10 {
        write_frame(directory.path(), index, &slide);
    }

    let report = filter().run(directory.path()).expect("Filter failed");

    assert_eq!(report.candidates, 10);
    assert_eq!(report.plan.comparisons, 9);
    assert_eq!(report.deleted.len(), 9);
    assert_eq!(file_names(directory.path()), vec!["frame_000001.png"]);
    assert!(report.plan.verdicts.iter().all(|verdict| verdict.score > 0.9));
}

#[test]
fn distinct_frames_are_all_kept() {
    let directory = tempfile::tempdir().unwrap();
    for index in 1..=6 {
        write_frame(directory.path(), index, &noise_frame(index));
    }
    let before = file_names(directory.path());

    let report = filter().run(directory.path()).expect("Filter failed");

    assert!(report.deleted.is_empty());
    assert_eq!(report.remaining(), 6);
    assert_eq!(file_names(directory.path()), before);
}

#[test]
fn frames_are_compared_in_numeric_order() {
    let directory = tempfile::tempdir().unwrap();
    // Lexically frame_10 sorts before frame_9; numerically 9 and 10 are
    // neighbours and identical.
    let same = noise_frame(1);
    image::DynamicImage::save(&same, directory.path().join("frame_9.png")).unwrap();
    image::DynamicImage::save(&same, directory.path().join("frame_10.png")).unwrap();
    image::DynamicImage::save(&noise_frame(2), directory.path().join("frame_8.png")).unwrap();

    let report = filter().run(directory.path()).unwrap();

    assert_eq!(report.deleted, vec![directory.path().join("frame_10.png")]);
}

#[test]
fn non_image_files_are_ignored() {
    let directory = tempfile::tempdir().unwrap();
    write_frame(directory.path(), 1, &noise_frame(1));
    write_frame(directory.path(), 2, &noise_frame(1));
    fs::write(directory.path().join("notes.txt"), "slide notes").unwrap();

    let report = filter().run(directory.path()).unwrap();

    assert_eq!(report.candidates, 2);
    assert_eq!(
        file_names(directory.path()),
        vec!["frame_000001.png", "notes.txt"]
    );
}

#[test]
fn subdirectories_are_scanned() {
    let directory = tempfile::tempdir().unwrap();
    let nested = directory.path().join("part2");
    fs::create_dir(&nested).unwrap();
    write_frame(directory.path(), 1, &noise_frame(3));
    write_frame(&nested, 2, &noise_frame(3));

    let report = filter().run(directory.path()).unwrap();

    assert_eq!(report.deleted, vec![nested.join("frame_000002.png")]);
}

#[test]
fn lower_threshold_catches_more_duplicates() {
    let directory = tempfile::tempdir().unwrap();
    for index in 1..=3 {
        write_frame(directory.path(), index, &noise_frame(index));
    }

    // Unrelated noise scores well above -1.
    let filter = DuplicateFilter::new(FilterOptions::new().with_threshold(-1.0)).unwrap();
    let report = filter.run(directory.path()).unwrap();

    assert_eq!(report.deleted.len(), 2);
}

#[test]
fn mixed_sizes_abort_without_deleting() {
    let directory = tempfile::tempdir().unwrap();
    write_frame(directory.path(), 1, &noise_frame(1));
    write_frame(directory.path(), 2, &noise_frame(1));
    write_frame(
        directory.path(),
        3,
        &image::DynamicImage::new_rgb8(common::WIDTH / 2, common::HEIGHT),
    );

    let error = filter().run(directory.path()).unwrap_err();

    assert!(matches!(error, SlidegrabError::ImageShapeMismatch { .. }));
    assert_eq!(file_names(directory.path()).len(), 3);
}

#[test]
fn missing_directory_is_an_io_error() {
    let directory = tempfile::tempdir().unwrap();
    let error = filter()
        .run(&directory.path().join("does-not-exist"))
        .unwrap_err();
    assert!(matches!(error, SlidegrabError::IoError(_)));
}
