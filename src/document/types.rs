//! Document types shared by extraction, rendering and the API

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::storage::UploadArtifact;

// ============================================================================
// Normalized Document
// ============================================================================

/// Kind of block a segment came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Paragraph,
    /// Numbered or bulleted paragraph, `level` 0 being the outermost
    ListItem { level: u8 },
}

/// Visible text of one block-level element.
///
/// `text` may contain `'\n'` (explicit line breaks) and `'\t'`.
/// Segment boundaries are paragraph breaks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub text: String,
}

impl Segment {
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::Paragraph,
            text: text.into(),
        }
    }

    pub fn list_item(level: u8, text: impl Into<String>) -> Self {
        Self {
            kind: SegmentKind::ListItem { level },
            text: text.into(),
        }
    }
}

/// Format-agnostic text extracted from a source document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedDocument {
    pub segments: Vec<Segment>,
}

impl NormalizedDocument {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Plain text with one newline between segments
    pub fn plain_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn char_count(&self) -> usize {
        self.segments.iter().map(|s| s.text.chars().count()).sum()
    }
}

// ============================================================================
// Conversion Metadata
// ============================================================================

/// Metadata returned to the client for one conversion; never persisted
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionMetadata {
    pub original_name: String,
    pub size: u64,
    pub upload_date: DateTime<Utc>,
    #[serde(rename = "type")]
    pub content_type: String,
}

impl ConversionMetadata {
    pub fn from_upload(upload: &UploadArtifact) -> Self {
        Self {
            original_name: upload.original_name.clone(),
            size: upload.size,
            upload_date: upload.created_at,
            content_type: upload.content_type.clone(),
        }
    }
}
