//! Format-specific implementations
//!
//! - `docx`: source format, implements `DocumentExtractor`
//! - `pdf`: output format, implements `DocumentRenderer`

pub mod docx;
pub mod pdf;

pub use docx::DocxExtractor;
pub use pdf::PdfRenderer;
