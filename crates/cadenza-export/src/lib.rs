//! # Cadenza Export
//!
//! The offline render and export pipeline:
//!
//! - **Tail resolution**: [`resolve_tail_time`] over export-scoped effect
//!   chains, clamped to `[0.3s, 10.0s]`
//! - **Duration planning**: [`RenderPlan`] fixes the frame budget
//!   (content + tail + drain margin) before rendering starts
//! - **Capture**: [`CaptureSession`] drives the block loop and trims the
//!   drain period off the delivered buffer
//! - **Orchestration**: [`ExportOrchestrator`] clones effect chains,
//!   coordinates the stages, and writes WAV output, synchronously or on a
//!   background thread via [`ExportHandle`]
//!
//! Exports are deterministic: the same snapshot renders to the same
//! samples, and the delivered length is always exactly the planned target
//! frame count.

pub mod capture;
pub mod error;
pub mod format;
pub mod handle;
pub mod options;
pub mod orchestrator;
pub mod plan;
pub mod tail;
pub mod track;

pub use capture::{CaptureBuffer, CaptureSession, RenderedAudio};
pub use error::{ExportError, Result};
pub use handle::{ExportHandle, ExportStatus};
pub use options::{BitDepth, ExportOptions};
pub use orchestrator::{
    CancelHandle, EffectFailure, ExportOrchestrator, ExportSummary, RenderOutcome,
};
pub use plan::{RenderPlan, DRAIN_FRAMES, RENDER_BLOCK_FRAMES};
pub use tail::{resolve_tail_time, MAX_TAIL_SECONDS, MIN_TAIL_SECONDS};
pub use track::{ExportTrack, TrackSource};
