//! # Cadenza - Offline Render & Export Engine
//!
//! Cadenza turns a multi-track project snapshot (audio regions,
//! scheduled note events, per-track effect chains) into a fixed-length,
//! sample-accurate buffer suitable for writing to a file.
//!
//! ## Architecture
//!
//! Umbrella crate coordinating:
//! - **cadenza-core** - Musical time, project snapshots, effect chains,
//!   lock-free primitives
//! - **cadenza-synth** - Deterministic offline note rendering
//! - **cadenza-export** - Tail resolution, duration planning, capture
//!   loop, orchestration, WAV output
//!
//! ## Quick Start
//!
//! ```ignore
//! use cadenza::prelude::*;
//!
//! let region = MidiRegion::new(vec![NoteEvent::new(60, 100, BeatPosition::ZERO, 1.0)]);
//! let project = ProjectSnapshot::new(48000.0, 120.0)
//!     .with_track(TrackSnapshot::new("keys", TrackContent::Midi(region)));
//!
//! let outcome = ExportOrchestrator::new()
//!     .export_to_file(&project, "out.wav", |p| println!("{:.0}%", p * 100.0))?;
//! ```
//!
//! ## Feature Flags
//!
//! - `default` / `full` - Everything enabled
//! - `synth` - Offline note rendering
//! - `export` - Render and export pipeline (implies `synth`)

/// Re-export of cadenza-core for direct access
pub use cadenza_core as core;

// Core types
pub use cadenza_core::{
    // Lock-free primitives
    AtomicDouble,
    AtomicFlag,
    AtomicFloat,
    // Automation boundary
    AutomationEvaluator,
    AutomationTarget,
    // Musical time
    BeatPosition,
    // Effect seam
    EffectError,
    EffectRack,
    EffectUnit,
    EngineConfig,
    // Error
    Error,
    ProjectSnapshot,
    Result,
    SpinMutex,
    TimeSignature,
    TrackSnapshot,
};

// Project model
pub use cadenza_core::project::{AudioRegion, MidiRegion, NoteEvent, TrackContent};

// Synth subsystem
#[cfg(feature = "synth")]
pub use cadenza_synth as synth;

#[cfg(feature = "synth")]
pub use cadenza_synth::{Envelope, OfflineNoteRenderer, SynthParams, Waveform};

// Export subsystem
#[cfg(feature = "export")]
pub use cadenza_export as export;

#[cfg(feature = "export")]
pub use cadenza_export::{
    BitDepth, CancelHandle, ExportError, ExportHandle, ExportOptions, ExportOrchestrator,
    ExportStatus, ExportSummary, RenderOutcome, RenderPlan, RenderedAudio,
};

pub mod prelude {
    // Project model
    pub use crate::core::project::{
        AudioRegion, MidiRegion, NoteEvent, ProjectSnapshot, TrackContent, TrackSnapshot,
    };
    pub use crate::core::{BeatPosition, EffectRack, EffectUnit, TimeSignature};

    // Built-in effects
    pub use crate::core::{FeedbackDelay, Gain};

    // Synthesis
    #[cfg(feature = "synth")]
    pub use crate::synth::{OfflineNoteRenderer, SynthParams};

    // Export pipeline
    #[cfg(feature = "export")]
    pub use crate::export::{
        ExportOptions, ExportOrchestrator, ExportStatus, RenderPlan, RenderedAudio,
    };
}
