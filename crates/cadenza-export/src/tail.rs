//! Tail-time resolution over export-scoped effect chains.

use crate::track::ExportTrack;

/// Tail floor in seconds. Guarantees a synth release is never truncated
/// even when no effect reports a tail.
pub const MIN_TAIL_SECONDS: f64 = 0.3;

/// Tail ceiling in seconds. A misbehaving effect cannot stretch an export
/// without bound.
pub const MAX_TAIL_SECONDS: f64 = 10.0;

/// Maximum self-reported tail across all export-scoped chains, clamped to
/// `[MIN_TAIL_SECONDS, MAX_TAIL_SECONDS]`.
///
/// Operates only on the clones assembled for this export; live instances
/// are never queried. Idempotent and side-effect-free: units are read
/// through `&self` and nothing is mutated. A unit that fails to report
/// (or reports a non-finite value) contributes 0 rather than aborting.
pub fn resolve_tail_time(tracks: &[ExportTrack]) -> f64 {
    let mut max_tail = 0.0f64;

    for track in tracks {
        for unit in track.rack.units() {
            match unit.reported_tail_seconds() {
                Ok(tail) if tail.is_finite() => max_tail = max_tail.max(tail),
                Ok(tail) => {
                    log::warn!(
                        "effect '{}' on track '{}' reported non-finite tail {}, using 0",
                        unit.name(),
                        track.name,
                        tail
                    );
                }
                Err(e) => {
                    log::warn!(
                        "effect '{}' on track '{}' could not report a tail, using 0: {}",
                        unit.name(),
                        track.name,
                        e
                    );
                }
            }
        }
    }

    max_tail.clamp(MIN_TAIL_SECONDS, MAX_TAIL_SECONDS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadenza_core::effect::{EffectRack, EffectUnit, FeedbackDelay, Gain};
    use cadenza_core::project::{AudioRegion, TrackContent, TrackSnapshot};
    use cadenza_core::{BeatPosition, EffectError};

    fn track_with_rack(rack: EffectRack) -> ExportTrack {
        let snapshot = TrackSnapshot::new(
            "t",
            TrackContent::Audio(AudioRegion::new(BeatPosition::ZERO, vec![])),
        )
        .with_rack(rack);
        let (track, _) = ExportTrack::from_snapshot(&snapshot, 120.0, 48000.0).unwrap();
        track
    }

    struct FixedTail(f64);

    impl EffectUnit for FixedTail {
        fn name(&self) -> &str {
            "fixed-tail"
        }

        fn process(&mut self, _: &mut [f32], _: &mut [f32]) -> Result<(), EffectError> {
            Ok(())
        }

        fn reported_tail_seconds(&self) -> Result<f64, EffectError> {
            Ok(self.0)
        }

        fn clone_export(&self) -> Result<Box<dyn EffectUnit>, EffectError> {
            Ok(Box::new(FixedTail(self.0)))
        }
    }

    struct NoTailReport;

    impl EffectUnit for NoTailReport {
        fn name(&self) -> &str {
            "no-tail-report"
        }

        fn process(&mut self, _: &mut [f32], _: &mut [f32]) -> Result<(), EffectError> {
            Ok(())
        }

        fn reported_tail_seconds(&self) -> Result<f64, EffectError> {
            Err(EffectError::TailUnavailable("unsupported".into()))
        }

        fn clone_export(&self) -> Result<Box<dyn EffectUnit>, EffectError> {
            Ok(Box::new(NoTailReport))
        }
    }

    #[test]
    fn test_no_tracks_yields_floor() {
        assert_eq!(resolve_tail_time(&[]), MIN_TAIL_SECONDS);
    }

    #[test]
    fn test_no_effects_yields_floor() {
        let tracks = vec![track_with_rack(EffectRack::new())];
        assert_eq!(resolve_tail_time(&tracks), MIN_TAIL_SECONDS);
    }

    #[test]
    fn test_max_over_tracks() {
        let tracks = vec![
            track_with_rack(EffectRack::new().with_unit(Box::new(FixedTail(1.5)))),
            track_with_rack(
                EffectRack::new()
                    .with_unit(Box::new(Gain::new(1.0)))
                    .with_unit(Box::new(FixedTail(4.0))),
            ),
        ];
        assert_eq!(resolve_tail_time(&tracks), 4.0);
    }

    #[test]
    fn test_ceiling_clamp() {
        let tracks = vec![track_with_rack(
            EffectRack::new().with_unit(Box::new(FixedTail(120.0))),
        )];
        assert_eq!(resolve_tail_time(&tracks), MAX_TAIL_SECONDS);
    }

    #[test]
    fn test_failing_report_contributes_zero() {
        let tracks = vec![track_with_rack(
            EffectRack::new()
                .with_unit(Box::new(NoTailReport))
                .with_unit(Box::new(FixedTail(2.0))),
        )];
        assert_eq!(resolve_tail_time(&tracks), 2.0);

        // Alone, a failing unit falls back to the floor
        let tracks = vec![track_with_rack(
            EffectRack::new().with_unit(Box::new(NoTailReport)),
        )];
        assert_eq!(resolve_tail_time(&tracks), MIN_TAIL_SECONDS);
    }

    #[test]
    fn test_idempotent() {
        let tracks = vec![track_with_rack(
            EffectRack::new().with_unit(Box::new(FeedbackDelay::new(0.25, 0.5, 0.5, 48000.0))),
        )];
        let first = resolve_tail_time(&tracks);
        let second = resolve_tail_time(&tracks);
        assert_eq!(first, second);
    }
}
