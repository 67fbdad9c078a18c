//! Musical time: beat positions, time signatures, and frame conversion.
//!
//! Every duration-to-frame-count conversion in the render pipeline goes
//! through [`frames_ceil`] so the exported length, the capture capacity
//! and the progress denominator all agree on the same rounding rule.

use crate::{Error, Result};

/// A position in musical time, measured in beats from project start.
///
/// Never negative: the constructor clamps. Arithmetic produces new values,
/// the position itself is immutable.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct BeatPosition {
    beats: f64,
}

impl BeatPosition {
    pub const ZERO: Self = Self { beats: 0.0 };

    /// Create a position, clamping negative input to 0.
    #[inline]
    pub fn new(beats: f64) -> Self {
        Self {
            beats: beats.max(0.0),
        }
    }

    #[inline]
    pub fn beats(&self) -> f64 {
        self.beats
    }

    /// Convert to elapsed seconds at a fixed tempo.
    #[inline]
    pub fn to_seconds(&self, tempo_bpm: f64) -> f64 {
        self.beats * 60.0 / tempo_bpm
    }

    /// Position corresponding to `seconds` of elapsed time at a fixed tempo.
    #[inline]
    pub fn from_seconds(seconds: f64, tempo_bpm: f64) -> Self {
        Self::new(seconds * tempo_bpm / 60.0)
    }

    /// Bar number (0-based) under the given time signature.
    pub fn bar(&self, signature: TimeSignature) -> u32 {
        (self.beats / signature.beats_per_bar()) as u32
    }

    /// Beat within the current bar (fractional).
    pub fn beat_in_bar(&self, signature: TimeSignature) -> f64 {
        self.beats % signature.beats_per_bar()
    }

    /// Fractional subdivision within the current beat.
    #[inline]
    pub fn subdivision(&self) -> f64 {
        self.beats.fract()
    }
}

impl core::ops::Add<f64> for BeatPosition {
    type Output = Self;

    #[inline]
    fn add(self, beats: f64) -> Self {
        Self::new(self.beats + beats)
    }
}

impl core::ops::Sub<f64> for BeatPosition {
    type Output = Self;

    /// Saturates at zero, keeping the non-negative invariant.
    #[inline]
    fn sub(self, beats: f64) -> Self {
        Self::new(self.beats - beats)
    }
}

impl core::ops::Sub<BeatPosition> for BeatPosition {
    type Output = f64;

    #[inline]
    fn sub(self, other: BeatPosition) -> f64 {
        self.beats - other.beats
    }
}

/// A time signature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeSignature {
    pub numerator: u32,
    pub denominator: u32,
}

impl TimeSignature {
    pub const fn new(numerator: u32, denominator: u32) -> Self {
        Self {
            numerator,
            denominator,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.numerator == 0 || self.denominator == 0 || !self.denominator.is_power_of_two() {
            return Err(Error::InvalidTimeSignature {
                numerator: self.numerator,
                denominator: self.denominator,
            });
        }
        Ok(())
    }

    /// Quarter-note beats per bar.
    #[inline]
    pub fn beats_per_bar(&self) -> f64 {
        self.numerator as f64 * 4.0 / self.denominator as f64
    }
}

impl Default for TimeSignature {
    fn default() -> Self {
        Self::new(4, 4)
    }
}

/// Relative tolerance for products that land a few ULPs off an integer
/// frame count (0.4 * 48000 is not exactly 19200 in f64). Such values
/// snap to the integer before the rounding rule applies, keeping the
/// rule stable against representation noise.
const FRAME_SNAP_EPSILON: f64 = 1e-9;

#[inline]
fn snap_frames(frames: f64) -> Option<u64> {
    let nearest = frames.round();
    if (frames - nearest).abs() <= FRAME_SNAP_EPSILON * nearest.max(1.0) {
        Some(nearest as u64)
    } else {
        None
    }
}

/// Convert a duration in seconds to a frame count, rounding up.
///
/// Ceiling is the pipeline-wide rule for spans: a span never loses its
/// final partial frame, so audio is never truncated. Values within
/// representation noise of an exact frame count snap to it first.
#[inline]
pub fn frames_ceil(seconds: f64, sample_rate: f64) -> u64 {
    let frames = seconds * sample_rate;
    snap_frames(frames).unwrap_or_else(|| frames.ceil() as u64)
}

/// Convert a point in time to the frame it falls in, rounding down.
///
/// Positions (note starts, region starts) floor so an event at time zero
/// lands on frame zero. Spans use [`frames_ceil`]; both share the same
/// snap-to-integer treatment of representation noise.
#[inline]
pub fn frame_at(seconds: f64, sample_rate: f64) -> u64 {
    let frames = seconds * sample_rate;
    snap_frames(frames).unwrap_or_else(|| frames.floor() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_position_clamps_negative() {
        let pos = BeatPosition::new(-3.0);
        assert_eq!(pos.beats(), 0.0);
    }

    #[test]
    fn test_beats_to_seconds() {
        // 4 beats at 120 BPM = 2 seconds
        let pos = BeatPosition::new(4.0);
        assert_relative_eq!(pos.to_seconds(120.0), 2.0);

        // Round trip
        let back = BeatPosition::from_seconds(2.0, 120.0);
        assert_relative_eq!(back.beats(), 4.0);
    }

    #[test]
    fn test_bar_and_beat_in_bar() {
        let sig = TimeSignature::default();
        let pos = BeatPosition::new(9.5);
        assert_eq!(pos.bar(sig), 2);
        assert_relative_eq!(pos.beat_in_bar(sig), 1.5);
        assert_relative_eq!(pos.subdivision(), 0.5);
    }

    #[test]
    fn test_beats_per_bar_compound() {
        // 6/8 = 3 quarter-note beats per bar
        let sig = TimeSignature::new(6, 8);
        assert_relative_eq!(sig.beats_per_bar(), 3.0);
    }

    #[test]
    fn test_signature_validation() {
        assert!(TimeSignature::new(4, 4).validate().is_ok());
        assert!(TimeSignature::new(0, 4).validate().is_err());
        assert!(TimeSignature::new(4, 3).validate().is_err());
    }

    #[test]
    fn test_arithmetic_saturates() {
        let pos = BeatPosition::new(1.0) - 5.0;
        assert_eq!(pos.beats(), 0.0);

        let pos = BeatPosition::new(2.0) + 1.5;
        assert_relative_eq!(pos.beats(), 3.5);
    }

    #[test]
    fn test_frames_ceil_never_truncates() {
        // A hair over one frame still counts the partial frame
        assert_eq!(frames_ceil(1.5 / 48000.0, 48000.0), 2);
        assert_eq!(frames_ceil(0.0, 48000.0), 0);
        assert_eq!(frames_ceil(0.3, 48000.0), 14400);
    }

    #[test]
    fn test_frames_ceil_snaps_representation_noise() {
        // 0.4 * 48000 lands a few ULPs above 19200 in f64; the rule must
        // still read it as 19200, not 19201
        assert_eq!(frames_ceil(0.4, 48000.0), 19200);
        assert_eq!(frames_ceil(0.1, 44100.0), 4410);
    }

    #[test]
    fn test_frame_at_floors() {
        assert_eq!(frame_at(0.0, 48000.0), 0);
        assert_eq!(frame_at(1.9 / 48000.0, 48000.0), 1);
        // Snap applies on the floor side too
        assert_eq!(frame_at(0.4, 48000.0), 19200);
    }
}
