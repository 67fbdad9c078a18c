//! # Cadenza Synth
//!
//! Deterministic offline note rendering:
//!
//! - [`OfflineNoteRenderer`] - renders scheduled notes as a pure function
//!   of frame position, safe under concurrent schedule/reset calls
//! - [`SynthParams`] - waveform, ADSR envelope, and output gain
//!
//! The renderer exists for export: it never touches a wall clock, an
//! audio device, or the live playback graph. One instance serves one
//! track; instances are fully independent and render in parallel when a
//! project has several MIDI tracks.

mod params;
mod renderer;

pub use params::{midi_note_to_hz, Envelope, SynthParams, Waveform};
pub use renderer::OfflineNoteRenderer;
