//! Error types for cadenza-export.
//!
//! Per-effect clone and tail failures are deliberately absent here: they
//! degrade and accumulate in the export summary instead of aborting (see
//! the orchestrator module). These variants cover the failures that end
//! an export.

use std::io;
use thiserror::Error;

/// Export error type.
#[derive(Error, Debug)]
pub enum ExportError {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The per-block render step failed; the export is aborted and no
    /// file is produced.
    #[error("Render error: {0}")]
    Render(String),

    /// Output buffer allocation was refused before rendering began.
    #[error("Export duration too large: {frames} frames could not be allocated")]
    DurationTooLarge { frames: u64 },

    /// The export was canceled; no partial file is written.
    #[error("Export canceled")]
    Canceled,

    /// Invalid export options.
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// Unsupported output format.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Result type for export operations.
pub type Result<T> = std::result::Result<T, ExportError>;

// Convert the encoder's error type at the API boundary.
impl From<hound::Error> for ExportError {
    fn from(e: hound::Error) -> Self {
        ExportError::Io(io::Error::other(e))
    }
}
