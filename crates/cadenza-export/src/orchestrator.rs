//! Export orchestration.
//!
//! The orchestrator owns the sequence: clone every track's effect rack
//! for export-only use, resolve the tail time from the clones, plan the
//! frame budget, drive the capture loop, and hand the trimmed buffer to
//! the file writer. Per-effect clone failures degrade and are reported in
//! the summary; render-loop failures abort with no file written.

use crate::capture::{CaptureSession, RenderedAudio};
use crate::error::{ExportError, Result};
use crate::handle::ExportHandle;
use crate::options::ExportOptions;
use crate::plan::RenderPlan;
use crate::tail::resolve_tail_time;
use crate::track::ExportTrack;
use cadenza_core::{AtomicFlag, ProjectSnapshot};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// An effect that could not be carried into the export.
#[derive(Debug, Clone)]
pub struct EffectFailure {
    pub track: String,
    pub effect: String,
    pub reason: String,
}

/// Per-export accounting of effect cloning.
///
/// Surfaced to the user alongside the result so degraded exports are
/// never silent.
#[derive(Debug, Clone, Default)]
pub struct ExportSummary {
    /// Units successfully cloned into export chains.
    pub cloned_effects: usize,
    /// Units dropped from the export, with reasons.
    pub failed_effects: Vec<EffectFailure>,
}

impl ExportSummary {
    pub fn all_cloned(&self) -> bool {
        self.failed_effects.is_empty()
    }
}

/// Everything an export produces besides the file itself.
pub struct RenderOutcome {
    pub audio: RenderedAudio,
    pub plan: RenderPlan,
    pub summary: ExportSummary,
}

/// Cancellation handle for an in-progress export.
///
/// Cloneable and thread-safe; cancel from any thread. An aborted export
/// writes no partial file.
#[derive(Clone)]
pub struct CancelHandle(Arc<AtomicFlag>);

impl CancelHandle {
    pub fn cancel(&self) {
        self.0.set(true);
    }

    pub fn is_canceled(&self) -> bool {
        self.0.get()
    }
}

/// Coordinates one export of a project snapshot.
#[derive(Default)]
pub struct ExportOrchestrator {
    options: ExportOptions,
    cancel: Arc<AtomicFlag>,
}

impl ExportOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ExportOptions) -> Self {
        Self {
            options,
            cancel: Arc::default(),
        }
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        CancelHandle(Arc::clone(&self.cancel))
    }

    /// Render the project to a trimmed in-memory buffer.
    ///
    /// `on_progress` receives a non-decreasing fraction in `[0, 1]` as
    /// capture advances.
    pub fn render(
        &self,
        project: &ProjectSnapshot,
        on_progress: impl FnMut(f32),
    ) -> Result<RenderOutcome> {
        project
            .validate()
            .map_err(|e| ExportError::Render(e.to_string()))?;

        let mut summary = ExportSummary::default();
        let mut tracks = Vec::with_capacity(project.tracks.len());

        for snapshot in &project.tracks {
            let (track, degraded) =
                ExportTrack::from_snapshot(snapshot, project.tempo, project.sample_rate)?;
            summary.cloned_effects += track.rack.len();
            for unit in degraded {
                summary.failed_effects.push(EffectFailure {
                    track: snapshot.name.clone(),
                    effect: unit.effect,
                    reason: unit.reason,
                });
            }
            tracks.push(track);
        }

        let tail_seconds = resolve_tail_time(&tracks);
        let plan = RenderPlan::plan(project, tail_seconds);
        log::debug!(
            "export plan: content {:.3}s + tail {:.3}s = {} target frames ({} capacity)",
            plan.content_duration,
            plan.tail_seconds,
            plan.target_frames,
            plan.total_capacity_frames
        );

        let audio = CaptureSession::new(&plan, &mut tracks)
            .with_cancel(&self.cancel)
            .run(on_progress)?;

        if !summary.all_cloned() {
            log::warn!(
                "export degraded: {} of {} effects excluded",
                summary.failed_effects.len(),
                summary.cloned_effects + summary.failed_effects.len()
            );
        }

        Ok(RenderOutcome {
            audio,
            plan,
            summary,
        })
    }

    /// Render and write the result to `path`.
    ///
    /// The format is determined by the file extension; only `.wav` is
    /// currently supported.
    pub fn export_to_file(
        &self,
        project: &ProjectSnapshot,
        path: impl AsRef<Path>,
        on_progress: impl FnMut(f32),
    ) -> Result<RenderOutcome> {
        let path = path.as_ref();
        let supported = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        if !supported {
            return Err(ExportError::UnsupportedFormat(format!(
                "{}: only .wav output is supported",
                path.display()
            )));
        }

        let outcome = self.render(project, on_progress)?;
        crate::format::wav::write_wav(path, &outcome.audio, &self.options)?;
        log::debug!(
            "wrote {} frames to {}",
            outcome.audio.frames(),
            path.display()
        );
        Ok(outcome)
    }

    /// Start a non-blocking background export on a dedicated thread.
    ///
    /// Poll the returned [`ExportHandle`] for progress, or wait on it for
    /// the outcome. The handle can also cancel the export.
    pub fn start(self, project: ProjectSnapshot, path: impl Into<PathBuf>) -> ExportHandle {
        let path = path.into();
        let (tx, rx) = crossbeam_channel::bounded(64);
        let cancel = self.cancel_handle();

        let thread = std::thread::Builder::new()
            .name("cadenza-export".into())
            .spawn(move || {
                self.export_to_file(&project, &path, |p| {
                    let _ = tx.try_send(p); // drop if full, the UI will catch up
                })
            })
            .expect("failed to spawn export thread");

        ExportHandle::new(rx, thread, cancel)
    }
}
