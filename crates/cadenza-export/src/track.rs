//! Export-scoped track assembly.
//!
//! An [`ExportTrack`] is the disjoint object graph one export works on:
//! the track's effect rack cloned for export use, and a source that
//! produces the track's signal offline (a note renderer for MIDI tracks,
//! the region samples for audio tracks). The live track is never touched
//! again once this is built.

use crate::error::{ExportError, Result};
use cadenza_core::automation::{AutomationEvaluator, AutomationTarget};
use cadenza_core::effect::{DegradedUnit, EffectRack};
use cadenza_core::project::{TrackContent, TrackSnapshot};
use cadenza_core::time::frame_at;
use cadenza_synth::OfflineNoteRenderer;
use std::sync::Arc;

/// Offline signal source for one track.
pub enum TrackSource {
    Midi(OfflineNoteRenderer),
    Audio {
        start_frame: u64,
        samples: Arc<[f32]>,
    },
}

/// One track, assembled for a single export.
pub struct ExportTrack {
    pub name: String,
    pub volume: f32,
    pub pan: f32,
    pub automation: Option<Arc<dyn AutomationEvaluator>>,
    pub source: TrackSource,
    /// Export-scoped clone; never the live rack.
    pub rack: EffectRack,
}

impl ExportTrack {
    /// Build the export-scoped counterpart of a live track.
    ///
    /// Effect units that fail to clone are dropped and reported in the
    /// returned list. A malformed note schedule is fatal: it would
    /// corrupt the render rather than degrade it.
    pub fn from_snapshot(
        track: &TrackSnapshot,
        tempo_bpm: f64,
        sample_rate: f64,
    ) -> Result<(Self, Vec<DegradedUnit>)> {
        let (rack, degraded) = track.rack.clone_export();

        let source = match &track.content {
            TrackContent::Midi(region) => {
                let renderer = OfflineNoteRenderer::new(sample_rate);
                renderer.schedule_region(region, tempo_bpm).map_err(|e| {
                    ExportError::Render(format!("track '{}': {}", track.name, e))
                })?;
                TrackSource::Midi(renderer)
            }
            TrackContent::Audio(region) => TrackSource::Audio {
                start_frame: frame_at(region.start.to_seconds(tempo_bpm), sample_rate),
                samples: Arc::clone(&region.samples),
            },
        };

        Ok((
            Self {
                name: track.name.clone(),
                volume: track.volume,
                pan: track.pan,
                automation: track.automation.clone(),
                source,
                rack,
            },
            degraded,
        ))
    }

    /// Produce this track's next block of source signal (pre-effects).
    ///
    /// Mono sources are duplicated onto both channels. `block_start` is
    /// the absolute frame of the block's first sample; the MIDI renderer
    /// tracks the same position through its own cursor.
    pub(crate) fn fill_block(&mut self, left: &mut [f32], right: &mut [f32], block_start: u64) {
        match &mut self.source {
            TrackSource::Midi(renderer) => {
                let frames = left.len();
                renderer.render(left, frames);
            }
            TrackSource::Audio {
                start_frame,
                samples,
            } => {
                left.fill(0.0);
                let block_end = block_start + left.len() as u64;
                let region_end = *start_frame + samples.len() as u64;
                let lo = (*start_frame).max(block_start);
                let hi = region_end.min(block_end);
                for abs in lo..hi {
                    left[(abs - block_start) as usize] = samples[(abs - *start_frame) as usize];
                }
            }
        }
        right.copy_from_slice(left);
    }

    /// Effective volume and pan for a block starting at `at_beat`.
    ///
    /// With an automation evaluator attached, its curves override the
    /// static settings: volume scales by the curve value, pan maps the
    /// `[0, 1]` curve onto `[-1, 1]`.
    pub(crate) fn mix_settings(&self, at_beat: f64) -> (f32, f32) {
        match &self.automation {
            Some(evaluator) => {
                let volume = self.volume * evaluator.value(AutomationTarget::Volume, at_beat);
                let pan = evaluator.value(AutomationTarget::Pan, at_beat) * 2.0 - 1.0;
                (volume, pan)
            }
            None => (self.volume, self.pan),
        }
    }
}
