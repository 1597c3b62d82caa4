//! Convenient re-exports for common usage patterns.
//!
//! # Example
//!
//! ```
//! use scorm_track::prelude::*;
//!
//! let tree = reconstruct(
//!     [("cmi.interactions.0.id", "q1")],
//!     "cmi.interactions",
//!     &[],
//!     ReconstructOptions::new(SchemaVersion::Scorm12),
//! )?;
//! assert_eq!(tree.count(), 1);
//! # Ok::<(), scorm_track::Error>(())
//! ```

// Unified error handling
pub use crate::error::{Error, Result};

// Tracks and their stores
pub use crate::track::{
    ActivityId, MemoryTrackStore, ScoId, ScoSummary, Track, TrackQuery, TrackStore,
    UpsertOutcome, UserId,
};

// Activity declarations
pub use crate::activity::{ActivityCatalog, ActivityDeclaration, MemoryCatalog};

// Grading
pub use crate::grading::{
    AttemptGrade, AttemptMethod, CrossAttemptMethod, Grade, GradebookSink, GradingPolicy,
    GradingService, MemoryGradebook, RecordOutcome, UserGrade,
};

// Data-model reconstruction
pub use crate::cmi::{
    ElementTree, ReconstructOptions, SchemaVersion, ScriptWriter, element_cmp, reconstruct,
};

// Persistent store (requires "kv" feature)
#[cfg(feature = "kv")]
pub use crate::kv::FjallTrackStore;

// Configuration (requires "config" feature)
#[cfg(feature = "config")]
pub use crate::config::Config;
