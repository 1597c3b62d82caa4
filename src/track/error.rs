//! Error types for track storage.

use thiserror::Error;

/// Errors that can occur during track store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "kv")]
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Track store not initialized at {0}")]
    NotInitialized(String),

    #[error("Track store unavailable: {0}")]
    Unavailable(String),
}
