//! Storage types
//!
//! The naming scheme is the index: an output's identifier is its upload's
//! identifier plus [`OUTPUT_EXTENSION`], so retrieval needs no manifest.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Extension appended to an upload identifier to name its output
pub const OUTPUT_EXTENSION: &str = ".pdf";

/// Length of an upload identifier (simple-format UUID)
const UPLOAD_ID_LEN: usize = 32;

// ============================================================================
// Identifiers
// ============================================================================

/// Identifier of a stored upload: 32 lowercase hex characters, no extension
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct UploadId(String);

impl UploadId {
    /// Generate a fresh identifier from 122 random bits
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    /// Accept only strings that follow the upload naming scheme
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = raw.len() == UPLOAD_ID_LEN
            && raw.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The output identifier derived from this upload
    pub fn output_id(&self) -> OutputId {
        OutputId(format!("{}{}", self.0, OUTPUT_EXTENSION))
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a rendered output: `<UploadId>.pdf`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct OutputId(String);

impl OutputId {
    /// Validate a client-supplied name against the output naming scheme.
    ///
    /// Anything else (path separators, `..`, temp files, other extensions)
    /// yields `None` before a path is ever built from it.
    pub fn parse(raw: &str) -> Option<Self> {
        let stem = raw.strip_suffix(OUTPUT_EXTENSION)?;
        UploadId::parse(stem).map(|id| id.output_id())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OutputId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Artifacts
// ============================================================================

/// A client-submitted source document persisted for one conversion attempt
#[derive(Debug, Clone)]
pub struct UploadArtifact {
    pub id: UploadId,
    /// User-supplied, untrusted
    pub original_name: String,
    pub size: u64,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    pub path: PathBuf,
}

/// Where the renderer should write the output for an upload
#[derive(Debug, Clone)]
pub struct OutputTarget {
    pub id: OutputId,
    pub path: PathBuf,
}

/// A rendered output owned by the store
#[derive(Debug, Clone)]
pub struct OutputArtifact {
    pub id: OutputId,
    pub path: PathBuf,
    pub size: u64,
}
