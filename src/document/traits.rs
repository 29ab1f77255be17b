//! Document traits
//!
//! Seams between the orchestrator and the format-specific stages.

use std::path::Path;

use async_trait::async_trait;

use super::error::{ExtractionResult, RenderResult};
use super::types::NormalizedDocument;
use crate::storage::{OutputArtifact, OutputTarget};

/// Reads a stored source document into normalized text
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> ExtractionResult<NormalizedDocument>;
}

/// Lays out normalized text and writes a paginated output.
///
/// Resolves only once the sink has confirmed the bytes are on disk. On error
/// nothing is left at `target.path`.
#[async_trait]
pub trait DocumentRenderer: Send + Sync {
    async fn render(
        &self,
        document: NormalizedDocument,
        target: OutputTarget,
    ) -> RenderResult<OutputArtifact>;
}
