//! Effect chain interface for per-track processing.
//!
//! The render pipeline only ever processes through export-scoped clones:
//! [`EffectRack::clone_export`] builds a disjoint chain from the live one,
//! so tail queries and block processing never touch instances owned by the
//! interactive playback graph.

use crate::EffectError;

/// A single effect instance processing stereo blocks in place.
pub trait EffectUnit: Send {
    /// Display name, used in failure reports.
    fn name(&self) -> &str;

    /// Process one block in place. Both channels have the same length.
    fn process(&mut self, left: &mut [f32], right: &mut [f32]) -> Result<(), EffectError>;

    /// Seconds of non-negligible output after input silences.
    ///
    /// Units with no meaningful tail report 0. Callers treat an error as a
    /// tail of 0; it must never abort an export. Must not mutate state.
    fn reported_tail_seconds(&self) -> Result<f64, EffectError> {
        Ok(0.0)
    }

    /// Clear internal runtime state (delay lines, envelopes).
    fn reset(&mut self) {}

    /// Duplicate this unit for export-only use.
    ///
    /// The clone starts from the unit's configuration with clean runtime
    /// state, fully detached from the live instance.
    fn clone_export(&self) -> Result<Box<dyn EffectUnit>, EffectError>;
}

/// A degraded unit recorded while cloning a rack for export.
#[derive(Debug, Clone)]
pub struct DegradedUnit {
    pub effect: String,
    pub reason: String,
}

/// An ordered chain of effect units on one track.
#[derive(Default)]
pub struct EffectRack {
    units: Vec<Box<dyn EffectUnit>>,
}

impl EffectRack {
    pub fn new() -> Self {
        Self { units: Vec::new() }
    }

    pub fn push(&mut self, unit: Box<dyn EffectUnit>) {
        self.units.push(unit);
    }

    pub fn with_unit(mut self, unit: Box<dyn EffectUnit>) -> Self {
        self.push(unit);
        self
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[Box<dyn EffectUnit>] {
        &self.units
    }

    /// Process one block through every unit in order.
    ///
    /// Returns the name of the failing unit alongside its error.
    pub fn process(
        &mut self,
        left: &mut [f32],
        right: &mut [f32],
    ) -> Result<(), (String, EffectError)> {
        for unit in &mut self.units {
            unit.process(left, right)
                .map_err(|e| (unit.name().to_string(), e))?;
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        for unit in &mut self.units {
            unit.reset();
        }
    }

    /// Clone every unit for export use.
    ///
    /// A unit that fails to clone is dropped from the export chain rather
    /// than aborting; each drop is reported back for the export summary.
    pub fn clone_export(&self) -> (EffectRack, Vec<DegradedUnit>) {
        let mut cloned = EffectRack::new();
        let mut degraded = Vec::new();

        for unit in &self.units {
            match unit.clone_export() {
                Ok(clone) => cloned.push(clone),
                Err(e) => {
                    log::warn!("effect '{}' excluded from export: {}", unit.name(), e);
                    degraded.push(DegradedUnit {
                        effect: unit.name().to_string(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        (cloned, degraded)
    }
}

/// Fixed linear gain. No tail.
#[derive(Debug, Clone)]
pub struct Gain {
    gain: f32,
}

impl Gain {
    pub fn new(gain: f32) -> Self {
        Self { gain }
    }
}

impl EffectUnit for Gain {
    fn name(&self) -> &str {
        "gain"
    }

    fn process(&mut self, left: &mut [f32], right: &mut [f32]) -> Result<(), EffectError> {
        for sample in left.iter_mut().chain(right.iter_mut()) {
            *sample *= self.gain;
        }
        Ok(())
    }

    fn clone_export(&self) -> Result<Box<dyn EffectUnit>, EffectError> {
        Ok(Box::new(self.clone()))
    }
}

/// Feedback delay line.
///
/// Buffers internally, so its output keeps arriving after the input
/// silences; the reported tail covers the echoes until they decay below
/// -60 dB.
pub struct FeedbackDelay {
    delay_seconds: f64,
    feedback: f32,
    mix: f32,
    sample_rate: f64,
    buf_left: Vec<f32>,
    buf_right: Vec<f32>,
    write_pos: usize,
}

impl FeedbackDelay {
    pub fn new(delay_seconds: f64, feedback: f32, mix: f32, sample_rate: f64) -> Self {
        let delay_frames = ((delay_seconds * sample_rate) as usize).max(1);
        Self {
            delay_seconds,
            feedback: feedback.clamp(0.0, 0.99),
            mix: mix.clamp(0.0, 1.0),
            sample_rate,
            buf_left: vec![0.0; delay_frames],
            buf_right: vec![0.0; delay_frames],
            write_pos: 0,
        }
    }
}

impl EffectUnit for FeedbackDelay {
    fn name(&self) -> &str {
        "feedback-delay"
    }

    fn process(&mut self, left: &mut [f32], right: &mut [f32]) -> Result<(), EffectError> {
        for i in 0..left.len().min(right.len()) {
            let delayed_l = self.buf_left[self.write_pos];
            let delayed_r = self.buf_right[self.write_pos];

            self.buf_left[self.write_pos] = left[i] + delayed_l * self.feedback;
            self.buf_right[self.write_pos] = right[i] + delayed_r * self.feedback;
            self.write_pos = (self.write_pos + 1) % self.buf_left.len();

            left[i] += delayed_l * self.mix;
            right[i] += delayed_r * self.mix;
        }
        Ok(())
    }

    fn reported_tail_seconds(&self) -> Result<f64, EffectError> {
        if self.feedback <= 0.0 {
            return Ok(self.delay_seconds);
        }
        // Echoes until feedback^n falls below -60 dB
        let echoes = (0.001f64.ln() / (self.feedback as f64).ln()).ceil();
        Ok(self.delay_seconds * echoes)
    }

    fn reset(&mut self) {
        self.buf_left.fill(0.0);
        self.buf_right.fill(0.0);
        self.write_pos = 0;
    }

    fn clone_export(&self) -> Result<Box<dyn EffectUnit>, EffectError> {
        Ok(Box::new(Self::new(
            self.delay_seconds,
            self.feedback,
            self.mix,
            self.sample_rate,
        )))
    }
}
