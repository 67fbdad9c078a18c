//! # Cadenza Core
//!
//! Core types for the Cadenza offline render engine:
//!
//! - **Musical time**: [`BeatPosition`], [`TimeSignature`], and the
//!   pipeline-wide duration-to-frames conversion rule
//! - **Project model**: immutable [`ProjectSnapshot`] passed explicitly
//!   into the export pipeline
//! - **Effect chains**: the [`EffectUnit`] seam with export-scoped cloning
//! - **Lock-free primitives**: atomics and a spin lock for render-thread
//!   state

pub mod automation;
pub mod config;
pub mod effect;
pub mod error;
pub mod lockfree;
pub mod project;
pub mod time;

pub use automation::{AutomationEvaluator, AutomationTarget, Constant};
pub use config::EngineConfig;
pub use effect::{DegradedUnit, EffectRack, EffectUnit, FeedbackDelay, Gain};
pub use error::{EffectError, Error, Result};
pub use lockfree::{AtomicDouble, AtomicFlag, AtomicFloat, SpinMutex, SpinMutexGuard};
pub use project::{
    AudioRegion, MidiRegion, NoteEvent, ProjectSnapshot, TrackContent, TrackSnapshot,
};
pub use time::{frame_at, frames_ceil, BeatPosition, TimeSignature};
