//! Error types for cadenza-core.

use thiserror::Error;

/// Error type for cadenza-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid tempo: {0}. Must be between 20.0 and 999.0 BPM")]
    InvalidTempo(f64),

    #[error("Invalid note at beat {start}: {reason}")]
    InvalidNote { start: f64, reason: String },

    #[error("Invalid time signature: {numerator}/{denominator}")]
    InvalidTimeSignature { numerator: u32, denominator: u32 },
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised by individual effect units.
///
/// These are recoverable at the chain level: a unit that fails to clone or
/// to report its tail is skipped or counted as tail-less, never fatal to
/// the caller.
#[derive(Error, Debug)]
pub enum EffectError {
    #[error("Tail time unavailable: {0}")]
    TailUnavailable(String),

    #[error("Clone for export failed: {0}")]
    CloneFailed(String),

    #[error("Processing failed: {0}")]
    ProcessFailed(String),
}
