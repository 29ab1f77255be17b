//! Artifact storage
//!
//! Owns the on-disk locations of uploads and rendered outputs, their naming,
//! and existence checks. The filesystem namespace is the only index.

mod error;
mod local;
mod types;

pub use error::StorageError;
pub use local::ArtifactStore;
pub use types::*;
