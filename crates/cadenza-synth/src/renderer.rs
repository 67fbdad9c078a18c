//! Offline note renderer.
//!
//! Renders a track's scheduled notes into caller-provided storage as a
//! pure function of "frames rendered so far", never of wall-clock time.
//! Phase and envelope are evaluated from each note's absolute frame
//! offset, so the signal cannot depend on how render calls are chunked
//! and two renders of the same range are identical.
//!
//! Shared state (schedule, cursor, params) sits behind one [`SpinMutex`]
//! with short critical sections: `render` reserves its frame range and
//! snapshots the schedule up front, then synthesizes outside the lock.
//! A `schedule_region` call therefore takes effect for renders that begin
//! after it returns; a render already in flight keeps its snapshot.

use crate::params::{midi_note_to_hz, Envelope, SynthParams};
use cadenza_core::project::MidiRegion;
use cadenza_core::time::{frame_at, frames_ceil};
use cadenza_core::{Result, SpinMutex};
use std::sync::Arc;

/// A note resolved to absolute frame positions at schedule time.
#[derive(Debug, Clone, Copy)]
struct ScheduledNote {
    start_frame: u64,
    length_frames: u64,
    frequency: f32,
    /// Normalized velocity (0.0-1.0).
    velocity: f32,
}

struct Shared {
    cursor: u64,
    notes: Arc<Vec<ScheduledNote>>,
    params: SynthParams,
}

/// Deterministic per-track note renderer for offline export.
///
/// Independent instances share nothing and may render concurrently
/// without synchronization; one instance's `render`, `schedule_region`
/// and `reset` may be called from different threads.
pub struct OfflineNoteRenderer {
    sample_rate: f64,
    state: SpinMutex<Shared>,
}

impl OfflineNoteRenderer {
    pub fn new(sample_rate: f64) -> Self {
        Self::with_params(sample_rate, SynthParams::default())
    }

    pub fn with_params(sample_rate: f64, params: SynthParams) -> Self {
        Self {
            sample_rate,
            state: SpinMutex::new(Shared {
                cursor: 0,
                notes: Arc::new(Vec::new()),
                params,
            }),
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Replace the output gain for frames rendered after this returns.
    pub fn set_volume(&self, volume: f32) {
        self.state.lock().params.volume = volume;
    }

    /// Current read cursor in frames.
    pub fn cursor(&self) -> u64 {
        self.state.lock().cursor
    }

    /// Convert a region's notes to absolute frame positions at the given
    /// tempo and install them, replacing any prior schedule.
    ///
    /// Visible to every `render` call that begins after this returns; a
    /// render already in flight completes on the schedule it started with.
    pub fn schedule_region(&self, region: &MidiRegion, tempo_bpm: f64) -> Result<()> {
        let mut notes = Vec::with_capacity(region.notes.len());
        for note in &region.notes {
            note.validate()?;
            let start_seconds = note.start.to_seconds(tempo_bpm);
            let duration_seconds = note.duration_beats * 60.0 / tempo_bpm;
            notes.push(ScheduledNote {
                start_frame: frame_at(start_seconds, self.sample_rate),
                length_frames: frames_ceil(duration_seconds, self.sample_rate),
                frequency: midi_note_to_hz(note.pitch),
                velocity: note.velocity as f32 / 127.0,
            });
        }

        self.state.lock().notes = Arc::new(notes);
        Ok(())
    }

    /// Return the read cursor to frame 0.
    ///
    /// The schedule is retained. There is no per-voice runtime state to
    /// clear: synthesis is a pure function of frame position.
    pub fn reset(&self) {
        self.state.lock().cursor = 0;
    }

    /// Synthesize `frame_count` frames from the current cursor into
    /// `destination`, then advance the cursor.
    ///
    /// Frames outside every note window are exact zeros. `frame_count`
    /// of 0 is a no-op; arbitrarily large counts render in one call.
    /// At most `destination.len()` frames are written.
    pub fn render(&self, destination: &mut [f32], frame_count: usize) {
        let frames = frame_count.min(destination.len());
        if frames == 0 {
            return;
        }

        // Reserve this call's frame range and snapshot the schedule.
        let (range_start, notes, params) = {
            let mut shared = self.state.lock();
            let start = shared.cursor;
            shared.cursor += frames as u64;
            (start, Arc::clone(&shared.notes), shared.params)
        };

        let out = &mut destination[..frames];
        out.fill(0.0);

        let release_frames = frames_ceil(params.envelope.release as f64, self.sample_rate);
        let range_end = range_start + frames as u64;

        for note in notes.iter() {
            let note_end = note.start_frame + note.length_frames + release_frames;
            let lo = note.start_frame.max(range_start);
            let hi = note_end.min(range_end);
            if lo >= hi {
                continue;
            }

            for abs in lo..hi {
                let offset = abs - note.start_frame;
                let phase =
                    (note.frequency as f64 * offset as f64 / self.sample_rate).fract() as f32;
                let osc = params.waveform.sample(phase);
                let env = envelope_at(offset, note.length_frames, &params.envelope, self.sample_rate);
                out[(abs - range_start) as usize] += osc * env * note.velocity;
            }
        }

        if params.volume != 1.0 {
            for sample in out.iter_mut() {
                *sample *= params.volume;
            }
        }
    }
}

/// Envelope gain at `offset` frames into a note held for `length` frames.
///
/// Pure function of the offset. Past the release span the gain is exactly
/// zero.
fn envelope_at(offset: u64, length: u64, env: &Envelope, sample_rate: f64) -> f32 {
    let attack = (env.attack as f64 * sample_rate).max(1.0);
    let decay = (env.decay as f64 * sample_rate).max(1.0);
    let release = (env.release as f64 * sample_rate).max(1.0);

    let held = |x: f64| -> f32 {
        if x < attack {
            (x / attack) as f32
        } else if x < attack + decay {
            1.0 - (1.0 - env.sustain) * ((x - attack) / decay) as f32
        } else {
            env.sustain
        }
    };

    if offset < length {
        held(offset as f64)
    } else {
        let ratio = (offset - length) as f64 / release;
        if ratio >= 1.0 {
            0.0
        } else {
            held(length as f64) * (1.0 - ratio) as f32
        }
    }
}
