//! PDF format implementation
//!
//! Implements `DocumentRenderer`: reflows normalized text onto fixed-size
//! pages with the built-in Helvetica font and writes a PDF file.

pub mod layout;
pub mod metrics;
mod writer;

use async_trait::async_trait;

use crate::document::{DocumentRenderer, NormalizedDocument, RenderError, RenderResult};
use crate::storage::{OutputArtifact, OutputTarget};

pub use layout::{layout, PageLayout, PageSetup, PlacedLine, MAX_PAGES};
pub use writer::{build_pdf, write_pdf};

/// Renders documents to PDF on the blocking pool
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfRenderer {
    setup: PageSetup,
}

impl PdfRenderer {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Lay out, build and durably write one document
pub fn render_to_file(
    document: &NormalizedDocument,
    setup: &PageSetup,
    target: &std::path::Path,
) -> RenderResult<(usize, u64)> {
    let pages = layout(document, setup)?;
    let mut pdf = build_pdf(&pages, setup)?;
    let size = write_pdf(&mut pdf, target)?;
    Ok((pages.len(), size))
}

#[async_trait]
impl DocumentRenderer for PdfRenderer {
    async fn render(
        &self,
        document: NormalizedDocument,
        target: OutputTarget,
    ) -> RenderResult<OutputArtifact> {
        let setup = self.setup;
        let path = target.path.clone();

        let (pages, size) =
            tokio::task::spawn_blocking(move || render_to_file(&document, &setup, &path))
                .await
                .map_err(|e| RenderError::Task(format!("Task join error: {}", e)))??;

        tracing::debug!(output_id = %target.id, pages, size, "PDF written");

        Ok(OutputArtifact {
            id: target.id,
            path: target.path,
            size,
        })
    }
}
