//! FrameSampler integration tests against an in-memory video.

mod common;

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use common::{SyntheticVideo, file_names};
use image::GenericImageView;
use slidegrab::{
    FrameSampler, PixelFormat, ProgressCallback, ProgressInfo, SamplePlan, SamplingMode,
    SamplingOptions, SlidegrabError,
};

fn sampler(mode: SamplingMode) -> FrameSampler {
    FrameSampler::new(SamplingOptions::new().with_mode(mode)).expect("Valid options")
}

fn range(initial: u64, end: Option<u64>, interval: Option<Duration>) -> SamplingMode {
    SamplingMode::Range {
        initial: Duration::from_secs(initial),
        end: end.map(Duration::from_secs),
        interval,
    }
}

// ── configuration errors leave the filesystem alone ────────────────

#[test]
fn time_point_past_the_end_fails_before_writing() {
    let directory = tempfile::tempdir().unwrap();
    let output = directory.path().join("frames");
    let mut video = SyntheticVideo::noise(10, 1.0);

    let mode = SamplingMode::TimePoints(vec![Duration::from_secs(2), Duration::from_secs(11)]);
    let error = sampler(mode).run(&mut video, &output).unwrap_err();

    assert!(matches!(error, SlidegrabError::InvalidTimestamp { .. }));
    assert!(error.is_configuration_error());
    assert!(!output.exists());
    assert!(video.seeks.is_empty());
}

#[test]
fn inverted_range_fails_before_writing() {
    let directory = tempfile::tempdir().unwrap();
    let output = directory.path().join("frames");
    let mut video = SyntheticVideo::noise(10, 1.0);

    let error = sampler(range(6, Some(3), None))
        .run(&mut video, &output)
        .unwrap_err();

    assert!(matches!(error, SlidegrabError::InvalidRange { .. }));
    assert!(!output.exists());
}

#[test]
fn interval_shorter_than_a_frame_is_rejected() {
    let directory = tempfile::tempdir().unwrap();
    let mut video = SyntheticVideo::noise(60, 30.0);

    let error = sampler(range(0, None, Some(Duration::from_millis(10))))
        .run(&mut video, directory.path())
        .unwrap_err();

    assert!(matches!(error, SlidegrabError::IntervalTooShort { .. }));
    assert!(file_names(directory.path()).is_empty());
}

#[test]
fn empty_time_point_list_is_rejected() {
    let directory = tempfile::tempdir().unwrap();
    let mut video = SyntheticVideo::noise(10, 1.0);

    let error = sampler(SamplingMode::TimePoints(Vec::new()))
        .run(&mut video, directory.path())
        .unwrap_err();
    assert!(matches!(error, SlidegrabError::NoTimePoints));
}

// ── naming and ordering ────────────────────────────────────────────

#[test]
fn interval_sampling_numbers_files_without_gaps() {
    let directory = tempfile::tempdir().unwrap();
    let output = directory.path().join("nested").join("frames");
    let mut video = SyntheticVideo::noise(10, 1.0);

    let report = sampler(range(0, Some(9), Some(Duration::from_secs(3))))
        .run(&mut video, &output)
        .expect("Sampling failed");

    // 0, 3, 6, 9
    assert_eq!(report.frames.len(), 4);
    assert!(!report.ended_early());
    assert_eq!(
        file_names(&output),
        vec![
            "frame_000001.jpg",
            "frame_000002.jpg",
            "frame_000003.jpg",
            "frame_000004.jpg",
        ]
    );
    assert_eq!(
        video.seeks,
        vec![
            Duration::from_secs(0),
            Duration::from_secs(3),
            Duration::from_secs(6),
            Duration::from_secs(9),
        ]
    );
}

#[test]
fn time_points_are_sampled_in_the_given_order() {
    let directory = tempfile::tempdir().unwrap();
    let mut video = SyntheticVideo::noise(10, 1.0);

    let mode = SamplingMode::TimePoints(vec![Duration::from_secs(7), Duration::from_secs(2)]);
    let report = sampler(mode)
        .run(&mut video, directory.path())
        .expect("Sampling failed");

    assert_eq!(report.frames.len(), 2);
    assert_eq!(
        video.seeks,
        vec![Duration::from_secs(7), Duration::from_secs(2)]
    );
}

#[test]
fn custom_prefix_and_extension_are_used() {
    let directory = tempfile::tempdir().unwrap();
    let mut video = SyntheticVideo::noise(3, 1.0);

    let options = SamplingOptions::new()
        .with_mode(SamplingMode::TimePoints(vec![Duration::ZERO]))
        .with_prefix("slide")
        .with_extension("png");
    FrameSampler::new(options)
        .unwrap()
        .run(&mut video, directory.path())
        .unwrap();

    assert_eq!(file_names(directory.path()), vec!["slide_000001.png"]);
}

// ── every-frame mode ───────────────────────────────────────────────

#[test]
fn every_frame_with_an_end_stops_after_the_frame_budget() {
    let directory = tempfile::tempdir().unwrap();
    let mut video = SyntheticVideo::noise(10, 1.0);

    let report = sampler(range(2, Some(5), Some(Duration::ZERO)))
        .run(&mut video, directory.path())
        .unwrap();

    assert_eq!(
        report.plan,
        SamplePlan::EveryFrame {
            start: Duration::from_secs(2),
            max_frames: Some(4),
        }
    );
    assert_eq!(report.frames.len(), 4);
    assert_eq!(video.seeks, vec![Duration::from_secs(2)]);
}

#[test]
fn every_frame_from_zero_does_not_seek() {
    let directory = tempfile::tempdir().unwrap();
    let mut video = SyntheticVideo::noise(5, 1.0);

    let report = sampler(range(0, None, None))
        .run(&mut video, directory.path())
        .unwrap();

    assert_eq!(report.frames.len(), 5);
    assert!(video.seeks.is_empty());
    assert!(!report.ended_early());
}

// ── early termination ──────────────────────────────────────────────

#[test]
fn decode_failure_keeps_the_frames_written_so_far() {
    let directory = tempfile::tempdir().unwrap();
    let mut video = SyntheticVideo::noise(10, 1.0).failing_at(4);

    let report = sampler(range(0, Some(9), Some(Duration::from_secs(2))))
        .run(&mut video, directory.path())
        .expect("A decode failure is not an error");

    // 0 and 2 decode, 4 fails.
    assert_eq!(report.frames.len(), 2);
    assert!(report.ended_early());
    assert_eq!(
        file_names(directory.path()),
        vec!["frame_000001.jpg", "frame_000002.jpg"]
    );
}

#[test]
fn open_ended_interval_runs_until_the_source_ends() {
    let directory = tempfile::tempdir().unwrap();
    let mut video = SyntheticVideo::noise(10, 1.0);

    let report = sampler(range(1, None, Some(Duration::from_secs(4))))
        .run(&mut video, directory.path())
        .unwrap();

    // 1, 5, 9, then 13 is past the end.
    assert_eq!(report.frames.len(), 3);
    assert!(!report.ended_early());
}

// ── output format and side channels ────────────────────────────────

#[test]
fn grayscale_output_is_single_channel() {
    let directory = tempfile::tempdir().unwrap();
    let mut video = SyntheticVideo::noise(2, 1.0);

    let options = SamplingOptions::new()
        .with_mode(SamplingMode::TimePoints(vec![Duration::ZERO]))
        .with_extension("png")
        .with_pixel_format(PixelFormat::Gray8);
    let report = FrameSampler::new(options)
        .unwrap()
        .run(&mut video, directory.path())
        .unwrap();

    let image = image::open(&report.frames[0]).unwrap();
    assert_eq!(image.color(), image::ColorType::L8);
    assert_eq!(image.dimensions(), (common::WIDTH, common::HEIGHT));
}

#[test]
fn info_only_writes_nothing() {
    let directory = tempfile::tempdir().unwrap();
    let output = directory.path().join("frames");
    let mut video = SyntheticVideo::noise(10, 2.0);

    let report = sampler(SamplingMode::InfoOnly)
        .run(&mut video, &output)
        .unwrap();

    assert!(report.frames.is_empty());
    assert_eq!(report.metadata.duration(), Duration::from_secs(5));
    assert!(!output.exists());
}

#[test]
fn progress_is_reported_per_frame() {
    struct Counting(Mutex<Vec<(u64, Option<u64>)>>);

    impl ProgressCallback for Counting {
        fn on_progress(&self, info: &ProgressInfo) {
            self.0.lock().unwrap().push((info.current, info.total));
        }
    }

    let directory = tempfile::tempdir().unwrap();
    let mut video = SyntheticVideo::noise(10, 1.0);
    let counting = Arc::new(Counting(Mutex::new(Vec::new())));

    let options = SamplingOptions::new()
        .with_mode(range(0, Some(4), Some(Duration::from_secs(2))))
        .with_progress(counting.clone());
    let _ = FrameSampler::new(options)
        .unwrap()
        .run(&mut video, directory.path())
        .unwrap();

    let calls = counting.0.lock().unwrap();
    assert_eq!(*calls, vec![(1, Some(3)), (2, Some(3)), (3, Some(3))]);
}
