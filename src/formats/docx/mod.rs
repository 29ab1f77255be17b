//! DOCX format implementation
//!
//! Implements `DocumentExtractor` for WordprocessingML packages.

#[cfg(test)]
pub(crate) mod fixtures;
mod parser;

use std::path::Path;

use async_trait::async_trait;

use crate::document::{DocumentExtractor, ExtractionError, ExtractionResult, NormalizedDocument};

pub use parser::{extract_bytes, extract_file, parse_document_xml, MAX_PART_BYTES};

/// Extracts visible text from `.docx` uploads on the blocking pool
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxExtractor;

impl DocxExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentExtractor for DocxExtractor {
    async fn extract(&self, path: &Path) -> ExtractionResult<NormalizedDocument> {
        let path = path.to_path_buf();

        tokio::task::spawn_blocking(move || extract_file(&path))
            .await
            .map_err(|e| ExtractionError::Task(format!("Task join error: {}", e)))?
    }
}
