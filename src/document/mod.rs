//! Format-agnostic document abstraction
//!
//! ```text
//!   upload ──► DocumentExtractor ──► NormalizedDocument ──► DocumentRenderer ──► output
//!              (formats::docx)                              (formats::pdf)
//! ```

mod error;
mod traits;
mod types;

pub use error::{ExtractionError, ExtractionResult, RenderError, RenderResult};
pub use traits::{DocumentExtractor, DocumentRenderer};
pub use types::{ConversionMetadata, NormalizedDocument, Segment, SegmentKind};
