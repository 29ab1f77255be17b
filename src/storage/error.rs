//! Storage error types

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by the artifact store
#[derive(Debug, Error)]
pub enum StorageError {
    /// A storage root could not be created
    #[error("Failed to create directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing an upload failed (disk full, permission denied)
    #[error("Failed to write artifact: {0}")]
    Write(#[source] std::io::Error),

    /// Opening or inspecting a stored artifact failed
    #[error("Failed to read artifact: {0}")]
    Read(#[source] std::io::Error),

    /// Removing an artifact failed for a reason other than absence
    #[error("Failed to remove artifact: {0}")]
    Remove(#[source] std::io::Error),

    /// Identifier unknown or outside the naming scheme
    #[error("Artifact not found: {0}")]
    NotFound(String),
}

impl StorageError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}
