//! Shared helpers for integration tests.

#![allow(dead_code)]

use cadenza::prelude::*;

pub const SAMPLE_RATE: f64 = 48000.0;
pub const TEMPO: f64 = 120.0;

/// Project with one MIDI track playing a single note: pitch 60,
/// velocity 100, start beat 0, one beat long.
pub fn one_note_project() -> ProjectSnapshot {
    let region = MidiRegion::new(vec![NoteEvent::new(60, 100, BeatPosition::ZERO, 1.0)]);
    ProjectSnapshot::new(SAMPLE_RATE, TEMPO)
        .with_track(TrackSnapshot::new("keys", TrackContent::Midi(region)))
}

/// Project with one silent audio track spanning exactly `seconds`.
pub fn audio_project_seconds(seconds: f64) -> ProjectSnapshot {
    let samples = vec![0.0f32; (seconds * SAMPLE_RATE) as usize];
    ProjectSnapshot::new(SAMPLE_RATE, TEMPO).with_track(TrackSnapshot::new(
        "audio",
        TrackContent::Audio(AudioRegion::new(BeatPosition::ZERO, samples)),
    ))
}

pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().map(|s| s * s).sum();
    (sum / samples.len() as f32).sqrt()
}

pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |a, s| a.max(s.abs()))
}

pub fn is_silent(samples: &[f32]) -> bool {
    samples.iter().all(|s| *s == 0.0)
}

/// Assert two buffers match within the pipeline's determinism tolerance.
pub fn assert_streams_match(a: &[f32], b: &[f32]) {
    assert_eq!(a.len(), b.len(), "stream lengths differ");
    for (i, (x, y)) in a.iter().zip(b.iter()).enumerate() {
        assert!((x - y).abs() < 1e-5, "frame {}: {} vs {}", i, x, y);
    }
}
