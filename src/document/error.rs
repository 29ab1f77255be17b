//! Pipeline stage error types

use thiserror::Error;

/// Source document could not be turned into a NormalizedDocument
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Zero-byte input
    #[error("Document is empty")]
    Empty,

    /// Not a readable ZIP package
    #[error("Invalid document archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Package lacks a part the format requires
    #[error("Missing document part: {0}")]
    MissingPart(String),

    /// Malformed XML in a document part
    #[error("XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Main part ends before its body and paragraphs close
    #[error("Document part is truncated")]
    Truncated,

    /// A part decompresses past the extraction cap
    #[error("Document part {part} exceeds {limit} bytes")]
    TooLarge { part: String, limit: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking task panicked or was cancelled
    #[error("Extraction task failed: {0}")]
    Task(String),
}

/// Layout or output sink failure
#[derive(Debug, Error)]
pub enum RenderError {
    /// Layout would exceed the page cap
    #[error("Document needs more than {max_pages} pages")]
    LayoutLimit { max_pages: usize },

    /// PDF serialization failure
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),

    /// Sink write, flush, sync or rename failure
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Blocking task panicked or was cancelled
    #[error("Render task failed: {0}")]
    Task(String),
}

pub type ExtractionResult<T> = std::result::Result<T, ExtractionError>;

pub type RenderResult<T> = std::result::Result<T, RenderError>;
