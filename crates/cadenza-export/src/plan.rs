//! Duration planning for one export.

use cadenza_core::time::frames_ceil;
use cadenza_core::ProjectSnapshot;

/// Frames rendered per capture-loop block.
pub const RENDER_BLOCK_FRAMES: usize = 4096;

/// Extra capture margin, two render blocks, giving block-based effects
/// room to flush internally buffered samples past the nominal end. Never
/// part of the exported length.
pub const DRAIN_FRAMES: u64 = 2 * RENDER_BLOCK_FRAMES as u64;

/// The frame budget for one export, fixed before rendering starts.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub sample_rate: f64,
    pub tempo: f64,
    /// Content span in seconds (furthest region end).
    pub content_duration: f64,
    /// Resolved tail in seconds, already clamped by the resolver.
    pub tail_seconds: f64,
    /// `content_duration + tail_seconds`.
    pub total_duration: f64,
    /// Nominal exported length in frames (ceiling of `total_duration`).
    pub target_frames: u64,
    pub drain_frames: u64,
    /// `target_frames + drain_frames`; capture stops here.
    pub total_capacity_frames: u64,
}

impl RenderPlan {
    /// Compute the plan for a project and a resolved tail time.
    ///
    /// Pure: callable standalone, no render required, same result for the
    /// same inputs.
    pub fn plan(project: &ProjectSnapshot, tail_seconds: f64) -> Self {
        let content_duration = project.content_duration_seconds();
        let total_duration = content_duration + tail_seconds;
        let target_frames = frames_ceil(total_duration, project.sample_rate);

        Self {
            sample_rate: project.sample_rate,
            tempo: project.tempo,
            content_duration,
            tail_seconds,
            total_duration,
            target_frames,
            drain_frames: DRAIN_FRAMES,
            total_capacity_frames: target_frames + DRAIN_FRAMES,
        }
    }
}
