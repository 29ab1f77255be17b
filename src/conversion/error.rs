//! Conversion error types

use std::fmt;

use thiserror::Error;

use crate::document::{ExtractionError, RenderError};
use crate::storage::StorageError;

/// Pipeline stage a failure originated in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Storage,
    Extraction,
    Render,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Storage => "storage",
            PipelineStage::Extraction => "extraction",
            PipelineStage::Render => "render",
        };
        f.write_str(name)
    }
}

/// Internal cause of a failed conversion. Logged, never shown to clients.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Extraction(#[from] ExtractionError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl PipelineError {
    pub fn stage(&self) -> PipelineStage {
        match self {
            PipelineError::Storage(_) => PipelineStage::Storage,
            PipelineError::Extraction(_) => PipelineStage::Extraction,
            PipelineError::Render(_) => PipelineStage::Render,
        }
    }
}

/// Client-visible conversion outcome categories
#[derive(Debug, Error)]
pub enum ConversionError {
    /// Request carried no file
    #[error("No file uploaded")]
    NoFile,

    /// Any pipeline failure
    #[error("File conversion failed: {0}")]
    Failed(#[from] PipelineError),
}
