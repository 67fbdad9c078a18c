//! Export pipeline integration tests (requires "export" feature)
//!
//! Exercises the whole chain: snapshot -> tail resolution -> planning ->
//! capture -> trim -> WAV output.
//!
//! Run with:
//! ```bash
//! cargo test --test export_pipeline --features "export"
//! ```

#![cfg(feature = "export")]

#[path = "helpers/mod.rs"]
mod helpers;

use cadenza::export::{ExportError, ExportStatus, MAX_TAIL_SECONDS, MIN_TAIL_SECONDS};
use cadenza::prelude::*;
use helpers::{audio_project_seconds, one_note_project, peak, SAMPLE_RATE};

/// Scenario: 10 seconds of content and no effects resolves to the
/// minimum tail, and the exported length is the ceiling of 10.3s.
#[test]
fn test_ten_second_content_minimum_tail() {
    let project = audio_project_seconds(10.0);
    let outcome = ExportOrchestrator::new().render(&project, |_| {}).unwrap();

    assert!((outcome.plan.total_duration - 10.3).abs() < 1e-9);
    assert_eq!(outcome.plan.tail_seconds, MIN_TAIL_SECONDS);
    assert_eq!(outcome.audio.frames() as u64, outcome.plan.target_frames);
    assert_eq!(outcome.plan.target_frames, 494400);
}

/// Scenario: an empty project still exports the minimum tail.
#[test]
fn test_empty_project_exports_tail_floor() {
    let project = ProjectSnapshot::new(SAMPLE_RATE, 120.0);
    let outcome = ExportOrchestrator::new().render(&project, |_| {}).unwrap();

    assert_eq!(outcome.plan.content_duration, 0.0);
    assert_eq!(outcome.plan.total_duration, MIN_TAIL_SECONDS);
    assert_eq!(outcome.audio.frames(), 14400);
}

/// Scenario: a single scheduled note produces audible samples.
#[test]
fn test_single_note_produces_audio() {
    let outcome = ExportOrchestrator::new()
        .render(&one_note_project(), |_| {})
        .unwrap();

    // The first half second carries the note
    let audible = &outcome.audio.left[..24000];
    assert!(peak(audible) > 0.01, "peak {}", peak(audible));
}

/// Exported length always equals the plan's target, never the capture
/// capacity.
#[test]
fn test_exported_length_excludes_drain() {
    for project in [
        ProjectSnapshot::new(SAMPLE_RATE, 120.0),
        one_note_project(),
        audio_project_seconds(2.5),
    ] {
        let outcome = ExportOrchestrator::new().render(&project, |_| {}).unwrap();
        assert_eq!(outcome.audio.frames() as u64, outcome.plan.target_frames);
        assert!(
            (outcome.audio.frames() as u64) < outcome.plan.total_capacity_frames,
            "drain must never be delivered"
        );
    }
}

/// An effect's reported tail extends the export, bounded by the ceiling.
#[test]
fn test_effect_tail_extends_export() {
    // 0.25s delay at feedback 0.5 reports a 2.5s tail
    let rack = EffectRack::new().with_unit(Box::new(FeedbackDelay::new(0.25, 0.5, 0.5, SAMPLE_RATE)));
    let samples = vec![0.1f32; SAMPLE_RATE as usize];
    let project = ProjectSnapshot::new(SAMPLE_RATE, 120.0).with_track(
        TrackSnapshot::new(
            "audio",
            TrackContent::Audio(AudioRegion::new(BeatPosition::ZERO, samples)),
        )
        .with_rack(rack),
    );

    let outcome = ExportOrchestrator::new().render(&project, |_| {}).unwrap();
    assert!((outcome.plan.tail_seconds - 2.5).abs() < 1e-9);
    assert!((outcome.plan.total_duration - 3.5).abs() < 1e-9);
}

/// The tail ceiling bounds any effect's report.
#[test]
fn test_tail_ceiling_bounds_export() {
    // Feedback 0.98 would ring for ~85 seconds unclamped
    let rack =
        EffectRack::new().with_unit(Box::new(FeedbackDelay::new(0.25, 0.98, 0.5, SAMPLE_RATE)));
    let project = ProjectSnapshot::new(SAMPLE_RATE, 120.0).with_track(
        TrackSnapshot::new(
            "audio",
            TrackContent::Audio(AudioRegion::new(BeatPosition::ZERO, vec![0.1; 4800])),
        )
        .with_rack(rack),
    );

    let outcome = ExportOrchestrator::new().render(&project, |_| {}).unwrap();
    assert_eq!(outcome.plan.tail_seconds, MAX_TAIL_SECONDS);
    assert!(outcome.plan.total_duration - outcome.plan.content_duration <= MAX_TAIL_SECONDS);
}

/// Progress is monotonically non-decreasing, never exceeds 1.0, and ends
/// at exactly 1.0 despite the drain period.
#[test]
fn test_progress_monotonic_and_clamped() {
    let mut events = Vec::new();
    ExportOrchestrator::new()
        .render(&one_note_project(), |p| events.push(p))
        .unwrap();

    assert!(!events.is_empty());
    let mut last = 0.0f32;
    for p in &events {
        assert!(*p >= last, "progress regressed: {} -> {}", last, p);
        assert!(*p <= 1.0, "progress exceeded 1.0: {}", p);
        last = *p;
    }
    assert_eq!(last, 1.0);

    // The drain period emits multiple events, all pinned at 1.0
    let at_ceiling = events.iter().filter(|p| **p == 1.0).count();
    assert!(at_ceiling >= 2, "expected drain blocks at 1.0");
}

/// Export writes a WAV of exactly the planned length.
#[test]
fn test_wav_file_has_planned_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mix.wav");

    let outcome = ExportOrchestrator::new()
        .export_to_file(&one_note_project(), &path, |_| {})
        .unwrap();

    let reader = hound::WavReader::open(&path).unwrap();
    assert_eq!(reader.spec().channels, 2);
    assert_eq!(reader.spec().sample_rate, SAMPLE_RATE as u32);
    assert_eq!(reader.len() as u64 / 2, outcome.plan.target_frames);
}

/// A track whose effect cannot clone still exports; the failure shows up
/// in the summary.
#[test]
fn test_clone_failure_degrades_not_aborts() {
    use cadenza::EffectError;

    struct Unclonable;

    impl EffectUnit for Unclonable {
        fn name(&self) -> &str {
            "stateful-plugin"
        }

        fn process(&mut self, _: &mut [f32], _: &mut [f32]) -> Result<(), EffectError> {
            Ok(())
        }

        fn clone_export(&self) -> Result<Box<dyn EffectUnit>, EffectError> {
            Err(EffectError::CloneFailed("editor session open".into()))
        }
    }

    let region = MidiRegion::new(vec![NoteEvent::new(60, 100, BeatPosition::ZERO, 1.0)]);
    let rack = EffectRack::new()
        .with_unit(Box::new(Gain::new(0.9)))
        .with_unit(Box::new(Unclonable));
    let project = ProjectSnapshot::new(SAMPLE_RATE, 120.0)
        .with_track(TrackSnapshot::new("keys", TrackContent::Midi(region)).with_rack(rack));

    let outcome = ExportOrchestrator::new().render(&project, |_| {}).unwrap();
    assert_eq!(outcome.summary.cloned_effects, 1);
    assert_eq!(outcome.summary.failed_effects.len(), 1);
    assert_eq!(outcome.summary.failed_effects[0].effect, "stateful-plugin");
    assert!(!outcome.summary.all_cloned());
}

/// Cancellation before the file write leaves nothing on disk.
#[test]
fn test_cancel_writes_no_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("canceled.wav");

    let orchestrator = ExportOrchestrator::new();
    orchestrator.cancel_handle().cancel();

    let result = orchestrator.export_to_file(&audio_project_seconds(5.0), &path, |_| {});
    assert!(matches!(result, Err(ExportError::Canceled)));
    assert!(!path.exists());
}

/// Background export completes and reports through the handle.
#[test]
fn test_background_export_handle() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("background.wav");

    let mut handle = ExportOrchestrator::new().start(one_note_project(), &path);

    loop {
        match handle.progress() {
            ExportStatus::Complete => break,
            ExportStatus::Failed(e) => panic!("export failed: {}", e),
            ExportStatus::Pending | ExportStatus::Running(_) => {
                std::thread::sleep(std::time::Duration::from_millis(1));
            }
        }
    }

    let outcome = handle.wait().unwrap();
    assert!(path.exists());
    assert_eq!(outcome.audio.frames() as u64, outcome.plan.target_frames);
}

/// Automated volume shapes the captured signal.
#[test]
fn test_volume_automation_applies() {
    use cadenza::core::automation::Constant;
    use std::sync::Arc;

    let samples = vec![0.5f32; 48000];
    let track = TrackSnapshot::new(
        "audio",
        TrackContent::Audio(AudioRegion::new(BeatPosition::ZERO, samples.clone())),
    )
    .with_automation(Arc::new(Constant(0.0)));
    let project = ProjectSnapshot::new(SAMPLE_RATE, 120.0).with_track(track);

    let muted = ExportOrchestrator::new().render(&project, |_| {}).unwrap();
    assert_eq!(peak(&muted.audio.left), 0.0);

    let track = TrackSnapshot::new(
        "audio",
        TrackContent::Audio(AudioRegion::new(BeatPosition::ZERO, samples)),
    );
    let project = ProjectSnapshot::new(SAMPLE_RATE, 120.0).with_track(track);
    let unmuted = ExportOrchestrator::new().render(&project, |_| {}).unwrap();
    assert!(peak(&unmuted.audio.left) > 0.3);
}
