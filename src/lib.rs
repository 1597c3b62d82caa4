//! SCORM attempt grading and CMI data-model reconstruction.
//!
//! Learner interactions arrive as flat tracks: one `(element, value)` pair
//! per user, activity, sub-unit (SCO) and attempt. This library turns them
//! into grades and back into the nested data model a SCORM runtime expects.
//!
//! # Quick Start
//!
//! ```
//! use scorm_track::prelude::*;
//!
//! let catalog = MemoryCatalog::new();
//! catalog.declare(
//!     ActivityDeclaration::new(ActivityId(1), [ScoId(1), ScoId(2)])
//!         .with_policy(GradingPolicy::new(AttemptMethod::Sum, CrossAttemptMethod::Highest)),
//! )?;
//! let service = GradingService::new(MemoryTrackStore::new(), catalog, MemoryGradebook::new());
//!
//! let user = UserId(7);
//! for (sco, score) in [(1, "40"), (2, "45")] {
//!     service.record_track(Track::new(
//!         user, ActivityId(1), ScoId(sco), 1, "cmi.core.score.raw", score, 1_700_000_000,
//!     ))?;
//! }
//! assert_eq!(service.grade_user(user, ActivityId(1))?.score(), Some(85.0));
//! # Ok::<(), scorm_track::Error>(())
//! ```
//!
//! # Modules
//!
//! - [`track`] - Track model and the [`TrackStore`] collaborator, with an in-memory store
//! - [`activity`] - Activity declarations and the [`ActivityCatalog`] collaborator
//! - [`grading`] - Attempt aggregation, cross-attempt selection, gradebook push
//! - [`cmi`] - Element-path ordering and data-model reconstruction
//! - [`kv`] - Persistent track store backed by fjall (requires `kv` feature)
//! - [`config`] - TOML configuration (requires `config` feature)
//!
//! # Feature Flags
//!
//! - `kv` - Enable the fjall track store (enabled by default)
//! - `logging` - Enable library-level tracing (consumers provide their own subscriber)
//! - `config` - Enable TOML configuration loading
//! - `full` - Enable all features

pub mod activity;
pub mod cmi;
#[cfg(feature = "config")]
pub mod config;
pub mod grading;
#[cfg(feature = "kv")]
pub mod kv;
mod logging;
pub mod prelude;
pub mod track;

mod error;

// Re-export the unified error type
pub use error::{Error, Result};

pub use activity::{ActivityCatalog, ActivityDeclaration, CatalogError, MemoryCatalog};
pub use cmi::{ElementTree, ReconstructOptions, SchemaVersion, ScriptWriter, reconstruct};
pub use grading::{
    AttemptMethod, CrossAttemptMethod, Grade, GradebookSink, GradingPolicy, GradingService,
    MemoryGradebook,
};
pub use track::{ActivityId, MemoryTrackStore, ScoId, StoreError, Track, TrackStore, UserId};

#[cfg(feature = "config")]
pub use config::{Config, ConfigError};
#[cfg(feature = "kv")]
pub use kv::FjallTrackStore;
