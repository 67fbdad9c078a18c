//! Synth voice parameters.

/// Oscillator waveform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    #[default]
    Sine,
    Saw,
    Square,
    Triangle,
}

impl Waveform {
    /// Sample the waveform at a normalized phase in `[0, 1)`.
    #[inline]
    pub fn sample(&self, phase: f32) -> f32 {
        match self {
            Waveform::Sine => (phase * core::f32::consts::TAU).sin(),
            Waveform::Saw => 2.0 * phase - 1.0,
            Waveform::Square => {
                if phase < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            Waveform::Triangle => {
                if phase < 0.5 {
                    4.0 * phase - 1.0
                } else {
                    -4.0 * phase + 3.0
                }
            }
        }
    }
}

/// ADSR envelope parameters.
#[derive(Debug, Clone, Copy)]
pub struct Envelope {
    pub attack: f32,  // seconds
    pub decay: f32,   // seconds
    pub sustain: f32, // 0.0 - 1.0
    pub release: f32, // seconds
}

impl Default for Envelope {
    fn default() -> Self {
        Self {
            attack: 0.01,
            decay: 0.1,
            sustain: 0.7,
            // Kept under the export tail floor (0.3s) so a release is
            // never cut off even with zero configured effect tail.
            release: 0.2,
        }
    }
}

/// Parameters shared by every voice of one renderer.
#[derive(Debug, Clone, Copy)]
pub struct SynthParams {
    pub waveform: Waveform,
    pub envelope: Envelope,
    /// Linear output gain.
    pub volume: f32,
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            waveform: Waveform::Sine,
            envelope: Envelope::default(),
            volume: 1.0,
        }
    }
}

/// Equal-tempered frequency for a MIDI note number.
#[inline]
pub fn midi_note_to_hz(note: u8) -> f32 {
    440.0 * 2.0f32.powf((note as f32 - 69.0) / 12.0)
}
