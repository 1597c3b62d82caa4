//! Unified error type for the scorm-track library.
//!
//! Each module has its own error enum. [`Error`] wraps all of them so
//! application code can use a single `Result` type.

use thiserror::Error;

use crate::activity::CatalogError;
use crate::cmi::{ParseSchemaError, ReconstructError};
#[cfg(feature = "config")]
use crate::config::ConfigError;
use crate::grading::{ParsePolicyError, SinkError};
use crate::track::StoreError;

/// Unified error type for all scorm-track operations.
///
/// # Example
///
/// ```
/// use scorm_track::prelude::*;
///
/// fn last_attempt(store: &MemoryTrackStore) -> Result<u32> {
///     Ok(store.last_attempt_number(UserId(1), ActivityId(1))?)
/// }
/// # assert_eq!(last_attempt(&MemoryTrackStore::new()).unwrap(), 0);
/// ```
#[derive(Error, Debug)]
pub enum Error {
    /// Track store read or write failed.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Activity lookup failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Gradebook write failed.
    #[error(transparent)]
    Gradebook(#[from] SinkError),

    /// Element path rejected during strict reconstruction.
    #[error(transparent)]
    Reconstruct(#[from] ReconstructError),

    #[error(transparent)]
    Policy(#[from] ParsePolicyError),

    #[error(transparent)]
    Schema(#[from] ParseSchemaError),

    /// Configuration could not be loaded.
    #[cfg(feature = "config")]
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A [`Result`] type alias using the unified [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` if this is a track store error.
    pub fn is_store(&self) -> bool {
        matches!(self, Self::Store(_))
    }

    /// Returns `true` if this is an activity catalog error.
    pub fn is_catalog(&self) -> bool {
        matches!(self, Self::Catalog(_))
    }

    /// Returns `true` if this is a gradebook error.
    pub fn is_gradebook(&self) -> bool {
        matches!(self, Self::Gradebook(_))
    }

    /// Returns `true` if this is a reconstruction error.
    pub fn is_reconstruct(&self) -> bool {
        matches!(self, Self::Reconstruct(_))
    }

    /// Returns `true` if this is a configuration error.
    #[cfg(feature = "config")]
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
