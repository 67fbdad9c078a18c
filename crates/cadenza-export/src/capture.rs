//! Capture buffer management and the offline render loop.
//!
//! Capacity and delivered length are different things: the buffer is
//! allocated for `target + drain` frames so block-based effects can flush
//! internal latency past the nominal end, but the caller only ever
//! receives exactly `target` frames. Progress reads against the target,
//! never the capacity, so it sits at 1.0 for the whole drain period.

use crate::error::{ExportError, Result};
use crate::plan::{RenderPlan, RENDER_BLOCK_FRAMES};
use crate::track::ExportTrack;
use cadenza_core::AtomicFlag;

/// The final, trimmed output of one export.
#[derive(Debug, Clone)]
pub struct RenderedAudio {
    pub left: Vec<f32>,
    pub right: Vec<f32>,
    pub sample_rate: f64,
}

impl RenderedAudio {
    pub fn frames(&self) -> usize {
        self.left.len()
    }

    pub fn duration_seconds(&self) -> f64 {
        self.left.len() as f64 / self.sample_rate
    }

    /// Peak level (linear).
    pub fn peak(&self) -> f32 {
        self.left
            .iter()
            .chain(self.right.iter())
            .map(|s| s.abs())
            .fold(0.0f32, f32::max)
    }

    /// Interleaved stereo data `[L, R, L, R, ...]`.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut result = Vec::with_capacity(self.left.len() * 2);
        for (l, r) in self.left.iter().zip(self.right.iter()) {
            result.push(*l);
            result.push(*r);
        }
        result
    }
}

/// Output buffer for one export, owned by the capture loop.
///
/// Created at export start, discarded at export end; never shared across
/// concurrent exports.
pub struct CaptureBuffer {
    left: Vec<f32>,
    right: Vec<f32>,
    target_frames: u64,
    capacity_frames: u64,
    sample_rate: f64,
}

impl CaptureBuffer {
    /// Allocate for the plan's full capacity.
    ///
    /// Allocation failure (a pathologically long project) is reported as
    /// [`ExportError::DurationTooLarge`] before any rendering happens.
    pub fn allocate(plan: &RenderPlan) -> Result<Self> {
        let capacity = usize::try_from(plan.total_capacity_frames).map_err(|_| {
            ExportError::DurationTooLarge {
                frames: plan.total_capacity_frames,
            }
        })?;

        let mut left = Vec::new();
        let mut right = Vec::new();
        left.try_reserve_exact(capacity)
            .and_then(|_| right.try_reserve_exact(capacity))
            .map_err(|_| ExportError::DurationTooLarge {
                frames: plan.total_capacity_frames,
            })?;

        Ok(Self {
            left,
            right,
            target_frames: plan.target_frames,
            capacity_frames: plan.total_capacity_frames,
            sample_rate: plan.sample_rate,
        })
    }

    pub fn captured_frames(&self) -> u64 {
        self.left.len() as u64
    }

    pub fn target_frames(&self) -> u64 {
        self.target_frames
    }

    pub fn is_full(&self) -> bool {
        self.captured_frames() >= self.capacity_frames
    }

    /// Copy up to one block into the buffer, clamped to the remaining
    /// capacity. Returns the number of frames taken.
    pub fn commit_block(&mut self, left: &[f32], right: &[f32]) -> usize {
        let remaining = (self.capacity_frames - self.captured_frames()) as usize;
        let take = left.len().min(right.len()).min(remaining);
        self.left.extend_from_slice(&left[..take]);
        self.right.extend_from_slice(&right[..take]);
        take
    }

    /// Capture progress in `[0, 1]`.
    ///
    /// Reads `min(captured, target) / target`: once capture crosses the
    /// target and drains, this is exactly 1.0, never more, and it cannot
    /// regress.
    pub fn progress(&self) -> f32 {
        if self.target_frames == 0 {
            return 1.0;
        }
        let done = self.captured_frames().min(self.target_frames);
        (done as f64 / self.target_frames as f64) as f32
    }

    /// Discard the drain period and hand back exactly the target length.
    pub fn trim(mut self) -> RenderedAudio {
        let target = self.target_frames as usize;
        self.left.truncate(target);
        self.right.truncate(target);
        RenderedAudio {
            left: self.left,
            right: self.right,
            sample_rate: self.sample_rate,
        }
    }
}

/// Equal power pan: -1.0 = full left, 0.0 = center, 1.0 = full right.
fn pan_gains(pan: f32, volume: f32) -> (f32, f32) {
    let normalized = (pan.clamp(-1.0, 1.0) + 1.0) * 0.5;
    let angle = normalized * core::f32::consts::FRAC_PI_2;
    (angle.cos() * volume, angle.sin() * volume)
}

/// The render loop for one export.
pub struct CaptureSession<'a> {
    plan: &'a RenderPlan,
    tracks: &'a mut [ExportTrack],
    cancel: Option<&'a AtomicFlag>,
}

impl<'a> CaptureSession<'a> {
    pub fn new(plan: &'a RenderPlan, tracks: &'a mut [ExportTrack]) -> Self {
        Self {
            plan,
            tracks,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: &'a AtomicFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Run the capture loop to completion and return the trimmed audio.
    ///
    /// Per-block: each track's source renders one block, its export rack
    /// processes it, and the result mixes in with equal power panning.
    /// A failing effect or a non-finite sample aborts the whole export;
    /// the partial buffer is dropped, not delivered.
    pub fn run(self, mut on_progress: impl FnMut(f32)) -> Result<RenderedAudio> {
        let mut buffer = CaptureBuffer::allocate(self.plan)?;

        let mut mix_left = vec![0.0f32; RENDER_BLOCK_FRAMES];
        let mut mix_right = vec![0.0f32; RENDER_BLOCK_FRAMES];
        let mut track_left = vec![0.0f32; RENDER_BLOCK_FRAMES];
        let mut track_right = vec![0.0f32; RENDER_BLOCK_FRAMES];

        let beats_per_frame = self.plan.tempo / 60.0 / self.plan.sample_rate;

        while !buffer.is_full() {
            if self.cancel.is_some_and(AtomicFlag::get) {
                return Err(ExportError::Canceled);
            }

            let block_start = buffer.captured_frames();
            let at_beat = block_start as f64 * beats_per_frame;
            mix_left.fill(0.0);
            mix_right.fill(0.0);

            for track in self.tracks.iter_mut() {
                track.fill_block(&mut track_left, &mut track_right, block_start);

                track
                    .rack
                    .process(&mut track_left, &mut track_right)
                    .map_err(|(effect, e)| {
                        ExportError::Render(format!(
                            "track '{}', effect '{}': {}",
                            track.name, effect, e
                        ))
                    })?;

                if track_left
                    .iter()
                    .chain(track_right.iter())
                    .any(|s| !s.is_finite())
                {
                    return Err(ExportError::Render(format!(
                        "track '{}': non-finite sample in render block",
                        track.name
                    )));
                }

                let (volume, pan) = track.mix_settings(at_beat);
                let (left_gain, right_gain) = pan_gains(pan, volume);
                for i in 0..RENDER_BLOCK_FRAMES {
                    mix_left[i] += track_left[i] * left_gain;
                    mix_right[i] += track_right[i] * right_gain;
                }
            }

            buffer.commit_block(&mix_left, &mix_right);
            on_progress(buffer.progress());
        }

        Ok(buffer.trim())
    }
}
