//! Non-blocking export handle with progress polling.

use crate::error::{ExportError, Result};
use crate::orchestrator::{CancelHandle, RenderOutcome};
use crossbeam_channel::Receiver;
use std::thread::JoinHandle;

/// Status of a background export operation.
#[derive(Debug)]
pub enum ExportStatus {
    /// No progress yet (just started).
    Pending,
    /// Export is in progress; fraction in `[0, 1]`.
    Running(f32),
    /// Export completed successfully; take the outcome with
    /// [`ExportHandle::wait`].
    Complete,
    /// Export failed with an error message.
    Failed(String),
}

/// Handle to a background export started by
/// [`ExportOrchestrator::start`](crate::ExportOrchestrator::start).
///
/// Poll [`progress`](Self::progress) each frame, or block on
/// [`wait`](Self::wait) for the outcome.
pub struct ExportHandle {
    progress_rx: Receiver<f32>,
    thread: Option<JoinHandle<Result<RenderOutcome>>>,
    finished: Option<Result<RenderOutcome>>,
    last_progress: Option<f32>,
    cancel: CancelHandle,
}

impl ExportHandle {
    pub(crate) fn new(
        progress_rx: Receiver<f32>,
        thread: JoinHandle<Result<RenderOutcome>>,
        cancel: CancelHandle,
    ) -> Self {
        Self {
            progress_rx,
            thread: Some(thread),
            finished: None,
            last_progress: None,
            cancel,
        }
    }

    /// Poll for the latest status (non-blocking).
    ///
    /// Drains pending progress messages and returns the most recent one;
    /// once the export thread finishes, reports `Complete` or `Failed`.
    pub fn progress(&mut self) -> ExportStatus {
        while let Ok(p) = self.progress_rx.try_recv() {
            self.last_progress = Some(p);
        }

        if self
            .thread
            .as_ref()
            .is_some_and(|thread| thread.is_finished())
        {
            let thread = self.thread.take().expect("thread present");
            self.finished = Some(match thread.join() {
                Ok(result) => result,
                Err(_) => Err(ExportError::Render("export thread panicked".into())),
            });
        }

        match &self.finished {
            Some(Ok(_)) => ExportStatus::Complete,
            Some(Err(e)) => ExportStatus::Failed(e.to_string()),
            None => match self.last_progress {
                Some(p) => ExportStatus::Running(p),
                None => ExportStatus::Pending,
            },
        }
    }

    /// Block until the export finishes and return the outcome.
    pub fn wait(mut self) -> Result<RenderOutcome> {
        if let Some(thread) = self.thread.take() {
            return match thread.join() {
                Ok(result) => result,
                Err(_) => Err(ExportError::Render("export thread panicked".into())),
            };
        }
        self.finished
            .take()
            .unwrap_or(Err(ExportError::Render("export already consumed".into())))
    }

    /// Request cancellation; the render loop aborts at the next block.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the export thread has finished (non-blocking).
    pub fn is_done(&self) -> bool {
        self.finished.is_some()
            || self
                .thread
                .as_ref()
                .map(|thread| thread.is_finished())
                .unwrap_or(true)
    }
}
