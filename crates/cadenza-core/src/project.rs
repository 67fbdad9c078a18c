//! Immutable project snapshot consumed by the export pipeline.
//!
//! A snapshot is built once, passed explicitly into an export, and never
//! shared with the live editing model, so the pipeline cannot observe a
//! torn read across concurrent edits.

use crate::automation::AutomationEvaluator;
use crate::config::EngineConfig;
use crate::effect::EffectRack;
use crate::time::{BeatPosition, TimeSignature};
use crate::{Error, Result};
use std::sync::Arc;

/// One note scheduled in a MIDI region.
#[derive(Debug, Clone, Copy)]
pub struct NoteEvent {
    /// MIDI note number (0-127).
    pub pitch: u8,
    /// Velocity (0-127).
    pub velocity: u8,
    pub start: BeatPosition,
    pub duration_beats: f64,
    /// MIDI channel (0-15).
    pub channel: u8,
}

impl NoteEvent {
    pub fn new(pitch: u8, velocity: u8, start: BeatPosition, duration_beats: f64) -> Self {
        Self {
            pitch,
            velocity,
            start,
            duration_beats,
            channel: 0,
        }
    }

    pub fn with_channel(mut self, channel: u8) -> Self {
        self.channel = channel;
        self
    }

    pub fn end(&self) -> BeatPosition {
        self.start + self.duration_beats
    }

    pub fn validate(&self) -> Result<()> {
        if !self.duration_beats.is_finite() || self.duration_beats < 0.0 {
            return Err(Error::InvalidNote {
                start: self.start.beats(),
                reason: format!("duration {} beats", self.duration_beats),
            });
        }
        Ok(())
    }
}

/// A region of scheduled notes on a MIDI track.
#[derive(Debug, Clone, Default)]
pub struct MidiRegion {
    pub notes: Vec<NoteEvent>,
}

impl MidiRegion {
    pub fn new(notes: Vec<NoteEvent>) -> Self {
        Self { notes }
    }

    /// End of the last note, in beats.
    pub fn end(&self) -> BeatPosition {
        self.notes
            .iter()
            .map(NoteEvent::end)
            .fold(BeatPosition::ZERO, |a, b| if b > a { b } else { a })
    }
}

/// Recorded audio placed on the timeline.
#[derive(Debug, Clone)]
pub struct AudioRegion {
    pub start: BeatPosition,
    /// Mono samples at the project sample rate.
    pub samples: Arc<[f32]>,
}

impl AudioRegion {
    pub fn new(start: BeatPosition, samples: Vec<f32>) -> Self {
        Self {
            start,
            samples: samples.into(),
        }
    }

    pub fn end_seconds(&self, tempo_bpm: f64, sample_rate: f64) -> f64 {
        self.start.to_seconds(tempo_bpm) + self.samples.len() as f64 / sample_rate
    }
}

/// What a track contributes to the timeline.
pub enum TrackContent {
    Midi(MidiRegion),
    Audio(AudioRegion),
}

impl TrackContent {
    fn end_seconds(&self, tempo_bpm: f64, sample_rate: f64) -> f64 {
        match self {
            TrackContent::Midi(region) => region.end().to_seconds(tempo_bpm),
            TrackContent::Audio(region) => region.end_seconds(tempo_bpm, sample_rate),
        }
    }
}

/// One track in the snapshot: content, mix settings, and the live effect
/// rack (cloned, never processed directly, by the export pipeline).
pub struct TrackSnapshot {
    pub name: String,
    pub volume: f32,
    /// -1.0 = full left, 0.0 = center, 1.0 = full right.
    pub pan: f32,
    pub content: TrackContent,
    pub rack: EffectRack,
    pub automation: Option<Arc<dyn AutomationEvaluator>>,
}

impl TrackSnapshot {
    pub fn new(name: impl Into<String>, content: TrackContent) -> Self {
        Self {
            name: name.into(),
            volume: 1.0,
            pan: 0.0,
            content,
            rack: EffectRack::new(),
            automation: None,
        }
    }

    pub fn with_volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_pan(mut self, pan: f32) -> Self {
        self.pan = pan;
        self
    }

    pub fn with_rack(mut self, rack: EffectRack) -> Self {
        self.rack = rack;
        self
    }

    pub fn with_automation(mut self, evaluator: Arc<dyn AutomationEvaluator>) -> Self {
        self.automation = Some(evaluator);
        self
    }
}

/// Read-only snapshot of the project handed to the export pipeline.
pub struct ProjectSnapshot {
    pub sample_rate: f64,
    pub tempo: f64,
    pub time_signature: TimeSignature,
    pub tracks: Vec<TrackSnapshot>,
}

impl ProjectSnapshot {
    pub fn new(sample_rate: f64, tempo: f64) -> Self {
        Self {
            sample_rate,
            tempo,
            time_signature: TimeSignature::default(),
            tracks: Vec::new(),
        }
    }

    pub fn with_track(mut self, track: TrackSnapshot) -> Self {
        self.tracks.push(track);
        self
    }

    pub fn validate(&self) -> Result<()> {
        EngineConfig {
            sample_rate: self.sample_rate,
        }
        .validate()?;
        if !(20.0..=999.0).contains(&self.tempo) {
            return Err(Error::InvalidTempo(self.tempo));
        }
        self.time_signature.validate()?;
        for track in &self.tracks {
            if let TrackContent::Midi(region) = &track.content {
                for note in &region.notes {
                    note.validate()?;
                }
            }
        }
        Ok(())
    }

    /// Content span in seconds: the furthest region end over all tracks.
    ///
    /// Recomputed on every call; an empty project spans 0.
    pub fn content_duration_seconds(&self) -> f64 {
        self.tracks
            .iter()
            .map(|t| t.content.end_seconds(self.tempo, self.sample_rate))
            .fold(0.0, f64::max)
    }
}
