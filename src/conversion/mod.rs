//! Conversion orchestration
//!
//! Sequences store → extractor → renderer for one upload and collapses every
//! internal failure into a single `ConversionError::Failed`.
//!
//! Flow:
//! 1. Reject a missing file (`NoFile`)
//! 2. Persist the upload and capture its metadata
//! 3. Extract, then render to the derived output identifier
//! 4. Delete the upload whatever the outcome (logged, never surfaced)

mod error;

use std::sync::Arc;

use axum::body::Bytes;

use crate::document::{ConversionMetadata, DocumentExtractor, DocumentRenderer};
use crate::formats::{DocxExtractor, PdfRenderer};
use crate::storage::{ArtifactStore, OutputArtifact, UploadArtifact};

pub use error::{ConversionError, PipelineError, PipelineStage};

/// A file received from a client, not yet persisted
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

/// Successful conversion result
#[derive(Debug, Clone)]
pub struct ConversionOutcome {
    pub metadata: ConversionMetadata,
    pub output: OutputArtifact,
}

/// Runs conversions against one artifact store
#[derive(Clone)]
pub struct Converter {
    store: ArtifactStore,
    extractor: Arc<dyn DocumentExtractor>,
    renderer: Arc<dyn DocumentRenderer>,
}

impl Converter {
    /// DOCX in, PDF out
    pub fn new(store: ArtifactStore) -> Self {
        Self::with_stages(store, Arc::new(DocxExtractor::new()), Arc::new(PdfRenderer::new()))
    }

    pub fn with_stages(
        store: ArtifactStore,
        extractor: Arc<dyn DocumentExtractor>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            store,
            extractor,
            renderer,
        }
    }

    pub fn store(&self) -> &ArtifactStore {
        &self.store
    }

    /// Convert one uploaded file. No retries, no partial results.
    pub async fn convert(
        &self,
        file: Option<IncomingFile>,
    ) -> Result<ConversionOutcome, ConversionError> {
        let file = file.ok_or(ConversionError::NoFile)?;

        let upload = self
            .store
            .save_upload(&file.data, &file.file_name, file.content_type.as_deref())
            .await
            .map_err(|e| {
                tracing::error!(file_name = %file.file_name, error = %e, "Failed to store upload");
                ConversionError::Failed(e.into())
            })?;

        tracing::info!(
            upload_id = %upload.id,
            file_name = %upload.original_name,
            size = upload.size,
            "Conversion started"
        );

        let metadata = ConversionMetadata::from_upload(&upload);
        let result = self.run_pipeline(&upload).await;

        if let Err(e) = self.store.delete_upload(&upload.id).await {
            tracing::warn!(upload_id = %upload.id, error = %e, "Failed to delete upload");
        }

        match result {
            Ok(output) => {
                tracing::info!(
                    upload_id = %upload.id,
                    output_id = %output.id,
                    size = output.size,
                    "Conversion complete"
                );
                Ok(ConversionOutcome { metadata, output })
            }
            Err(e) => {
                tracing::error!(
                    upload_id = %upload.id,
                    stage = %e.stage(),
                    error = %e,
                    "Conversion failed"
                );
                Err(ConversionError::Failed(e))
            }
        }
    }

    async fn run_pipeline(&self, upload: &UploadArtifact) -> Result<OutputArtifact, PipelineError> {
        let document = self.extractor.extract(&upload.path).await?;

        tracing::debug!(
            upload_id = %upload.id,
            segments = document.segments.len(),
            "Extraction complete"
        );

        let target = self.store.output_target(&upload.id);
        let output_id = target.id.clone();

        match self.renderer.render(document, target).await {
            Ok(output) => Ok(output),
            Err(e) => {
                if let Err(discard) = self.store.discard_output(&output_id).await {
                    tracing::warn!(output_id = %output_id, error = %discard, "Failed to discard output");
                }
                Err(e.into())
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{NormalizedDocument, RenderError, RenderResult};
    use crate::formats::docx::fixtures;
    use crate::storage::{OutputTarget, UploadId};
    use async_trait::async_trait;
    use tempfile::TempDir;

    async fn converter_in(temp_dir: &TempDir) -> Converter {
        let store = ArtifactStore::new(
            temp_dir.path().join("uploads"),
            temp_dir.path().join("output"),
        );
        store.initialize().await.unwrap();
        Converter::new(store)
    }

    fn docx(name: &str, paragraphs: &[&str]) -> Option<IncomingFile> {
        Some(IncomingFile {
            file_name: name.to_string(),
            content_type: None,
            data: Bytes::from(fixtures::docx_with_paragraphs(paragraphs)),
        })
    }

    fn upload_count(converter: &Converter) -> usize {
        std::fs::read_dir(converter.store().upload_dir()).unwrap().count()
    }

    /// Writes half a file, then fails
    struct TruncatingRenderer;

    #[async_trait]
    impl DocumentRenderer for TruncatingRenderer {
        async fn render(
            &self,
            _document: NormalizedDocument,
            target: OutputTarget,
        ) -> RenderResult<OutputArtifact> {
            std::fs::write(&target.path, b"%PDF-1.5 trunc").unwrap();
            Err(RenderError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "disk full",
            )))
        }
    }

    #[tokio::test]
    async fn test_convert_success() {
        let temp_dir = TempDir::new().unwrap();
        let converter = converter_in(&temp_dir).await;

        let outcome = converter.convert(docx("report.docx", &["Hello", "World"])).await.unwrap();

        assert_eq!(outcome.metadata.original_name, "report.docx");
        assert!(outcome.metadata.size > 0);
        assert!(outcome.output.id.as_str().ends_with(".pdf"));

        let resolved = converter
            .store()
            .resolve_output(outcome.output.id.as_str())
            .await
            .unwrap();
        let bytes = std::fs::read(resolved).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert_eq!(bytes.len() as u64, outcome.output.size);
    }

    #[tokio::test]
    async fn test_upload_deleted_after_success() {
        let temp_dir = TempDir::new().unwrap();
        let converter = converter_in(&temp_dir).await;

        let outcome = converter.convert(docx("a.docx", &["text"])).await.unwrap();

        let stem = outcome.output.id.as_str().trim_end_matches(".pdf");
        let upload_id = UploadId::parse(stem).unwrap();
        assert!(!converter.store().upload_exists(&upload_id).await);
        assert_eq!(upload_count(&converter), 0);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let converter = converter_in(&temp_dir).await;

        let result = converter.convert(None).await;
        assert!(matches!(result, Err(ConversionError::NoFile)));
    }

    #[tokio::test]
    async fn test_corrupt_input_fails_without_output() {
        let temp_dir = TempDir::new().unwrap();
        let converter = converter_in(&temp_dir).await;

        let file = IncomingFile {
            file_name: "broken.docx".to_string(),
            content_type: None,
            data: Bytes::from_static(b"PK\x03\x04 definitely not a real archive"),
        };
        let result = converter.convert(Some(file)).await;

        assert!(matches!(
            result,
            Err(ConversionError::Failed(PipelineError::Extraction(_)))
        ));
        assert_eq!(std::fs::read_dir(converter.store().output_dir()).unwrap().count(), 0);
        assert_eq!(upload_count(&converter), 0);
    }

    #[tokio::test]
    async fn test_empty_input_fails() {
        let temp_dir = TempDir::new().unwrap();
        let converter = converter_in(&temp_dir).await;

        let file = IncomingFile {
            file_name: "empty.docx".to_string(),
            content_type: None,
            data: Bytes::new(),
        };
        let result = converter.convert(Some(file)).await;

        assert!(matches!(result, Err(ConversionError::Failed(_))));
        assert_eq!(upload_count(&converter), 0);
    }

    #[tokio::test]
    async fn test_render_failure_discards_truncated_output() {
        let temp_dir = TempDir::new().unwrap();
        let store = ArtifactStore::new(
            temp_dir.path().join("uploads"),
            temp_dir.path().join("output"),
        );
        store.initialize().await.unwrap();
        let converter = Converter::with_stages(
            store,
            Arc::new(DocxExtractor::new()),
            Arc::new(TruncatingRenderer),
        );

        let result = converter.convert(docx("a.docx", &["text"])).await;

        match result {
            Err(ConversionError::Failed(e)) => assert_eq!(e.stage(), PipelineStage::Render),
            other => panic!("expected render failure, got {other:?}"),
        }
        assert_eq!(std::fs::read_dir(converter.store().output_dir()).unwrap().count(), 0);
        assert_eq!(upload_count(&converter), 0);
    }

    #[tokio::test]
    async fn test_same_name_twice_produces_distinct_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let converter = converter_in(&temp_dir).await;

        let first = converter.convert(docx("same.docx", &["first"])).await.unwrap();
        let second = converter.convert(docx("same.docx", &["second"])).await.unwrap();

        assert_ne!(first.output.id, second.output.id);
        assert!(first.output.path.exists());
        assert!(second.output.path.exists());
    }

    #[tokio::test]
    async fn test_concurrent_conversions() {
        let temp_dir = TempDir::new().unwrap();
        let converter = converter_in(&temp_dir).await;

        let tasks: Vec<_> = (0..8)
            .map(|i| {
                let converter = converter.clone();
                tokio::spawn(async move {
                    let text = format!("document {i}");
                    converter.convert(docx("c.docx", &[text.as_str()])).await
                })
            })
            .collect();

        let mut ids = std::collections::HashSet::new();
        for task in tasks {
            let outcome = task.await.unwrap().unwrap();
            ids.insert(outcome.output.id);
        }

        assert_eq!(ids.len(), 8);
        assert_eq!(upload_count(&converter), 0);
    }
}
