//! WordprocessingML text extraction
//!
//! Walks the main document part in document order and keeps only visible run
//! text. Styles, images, fields and revision marks are dropped.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::result::ZipError;
use zip::ZipArchive;

use crate::document::{ExtractionError, ExtractionResult, NormalizedDocument, Segment};

/// Package relationships part
const PACKAGE_RELS_PART: &str = "_rels/.rels";

/// Main part location when the relationships do not name one
const DEFAULT_MAIN_PART: &str = "word/document.xml";

/// Relationship type suffix of the main document part
const OFFICE_DOCUMENT_REL: &str = "/officeDocument";

/// Maximum decompressed size of a single part: 64MB
pub const MAX_PART_BYTES: u64 = 64 * 1024 * 1024;

/// Deepest list level WordprocessingML defines (`w:ilvl` 0..=8)
const MAX_LIST_LEVEL: u8 = 8;

/// Elements whose whole subtree carries no visible text
const SKIPPED_ELEMENTS: &[&[u8]] = &[b"Fallback", b"del", b"moveFrom", b"instrText"];

/// Extract a `.docx` file from disk
pub fn extract_file(path: &Path) -> ExtractionResult<NormalizedDocument> {
    let file = File::open(path)?;
    if file.metadata()?.len() == 0 {
        return Err(ExtractionError::Empty);
    }
    extract_from_reader(BufReader::new(file))
}

/// Extract a `.docx` held in memory
pub fn extract_bytes(data: &[u8]) -> ExtractionResult<NormalizedDocument> {
    if data.is_empty() {
        return Err(ExtractionError::Empty);
    }
    extract_from_reader(Cursor::new(data))
}

fn extract_from_reader<R: Read + Seek>(reader: R) -> ExtractionResult<NormalizedDocument> {
    let mut archive = ZipArchive::new(reader)?;
    let main_part = main_part_name(&mut archive)?;
    let xml = read_part(&mut archive, &main_part, MAX_PART_BYTES)?;

    let document = parse_document_xml(&xml)?;

    tracing::debug!(
        part = %main_part,
        segments = document.segments.len(),
        chars = document.char_count(),
        "Extracted document text"
    );

    Ok(document)
}

/// Resolve the main document part through the package relationships
fn main_part_name<R: Read + Seek>(archive: &mut ZipArchive<R>) -> ExtractionResult<String> {
    let rels = match read_part(archive, PACKAGE_RELS_PART, MAX_PART_BYTES) {
        Ok(data) => data,
        Err(ExtractionError::MissingPart(_)) => return Ok(DEFAULT_MAIN_PART.to_string()),
        Err(e) => return Err(e),
    };

    let mut reader = Reader::from_reader(rels.as_slice());
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"Relationship" => {
                let rel_type = attribute(&e, b"Type").unwrap_or_default();
                if rel_type.ends_with(OFFICE_DOCUMENT_REL) {
                    if let Some(target) = attribute(&e, b"Target") {
                        return Ok(target.trim_start_matches('/').to_string());
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(DEFAULT_MAIN_PART.to_string())
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
    limit: u64,
) -> ExtractionResult<Vec<u8>> {
    let file = match archive.by_name(name) {
        Ok(file) => file,
        Err(ZipError::FileNotFound) => return Err(ExtractionError::MissingPart(name.to_string())),
        Err(e) => return Err(e.into()),
    };

    let mut data = Vec::new();
    file.take(limit + 1).read_to_end(&mut data)?;

    if data.len() as u64 > limit {
        return Err(ExtractionError::TooLarge {
            part: name.to_string(),
            limit,
        });
    }

    Ok(data)
}

fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == key)
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

/// `w:val` toggles: absent or anything but "0"/"false"/"off" means on
fn toggle_is_on(element: &BytesStart<'_>) -> bool {
    !matches!(
        attribute(element, b"val").as_deref(),
        Some("0") | Some("false") | Some("off")
    )
}

// ============================================================================
// Body walk
// ============================================================================

#[derive(Default)]
struct ParagraphBuilder {
    text: String,
    list_level: Option<u8>,
    /// Text-box paragraphs closed inside this one, emitted after it
    nested: Vec<Segment>,
}

#[derive(Default)]
struct BodyWalker {
    segments: Vec<Segment>,
    /// Open paragraphs; text boxes nest paragraphs inside runs
    paragraphs: Vec<ParagraphBuilder>,
    /// Hidden flag of each open run, innermost last
    runs: Vec<bool>,
    body_opened: bool,
    body_closed: bool,
    in_text: bool,
    in_numbering: bool,
    in_tab_stops: bool,
    /// Depth inside a skipped subtree, 0 when not skipping
    skip_depth: usize,
}

impl BodyWalker {
    fn start(&mut self, e: &BytesStart<'_>) {
        if self.skip_depth > 0 {
            self.skip_depth += 1;
            return;
        }

        let name = e.local_name();
        let name = name.as_ref();
        if SKIPPED_ELEMENTS.contains(&name) {
            self.skip_depth = 1;
            return;
        }

        match name {
            b"body" => self.body_opened = true,
            b"p" => self.paragraphs.push(ParagraphBuilder::default()),
            b"r" => self.runs.push(false),
            b"t" => self.in_text = true,
            b"numPr" => {
                self.in_numbering = true;
                self.mark_list_item();
            }
            b"tabs" => self.in_tab_stops = true,
            _ => {}
        }
    }

    fn empty(&mut self, e: &BytesStart<'_>) {
        if self.skip_depth > 0 {
            return;
        }

        match e.local_name().as_ref() {
            b"body" => {
                self.body_opened = true;
                self.body_closed = true;
            }
            b"tab" if !self.in_tab_stops => self.push_char('\t'),
            b"br" | b"cr" => self.push_char('\n'),
            b"noBreakHyphen" => self.push_char('-'),
            b"vanish" => {
                if let Some(hidden) = self.runs.last_mut() {
                    *hidden = toggle_is_on(e);
                }
            }
            b"ilvl" if self.in_numbering => {
                let level = attribute(e, b"val").and_then(|v| v.parse::<u8>().ok());
                if let (Some(p), Some(level)) = (self.paragraphs.last_mut(), level) {
                    p.list_level = Some(level.min(MAX_LIST_LEVEL));
                }
            }
            // numId 0 removes inherited numbering
            b"numId" if self.in_numbering => {
                if attribute(e, b"val").as_deref() == Some("0") {
                    if let Some(p) = self.paragraphs.last_mut() {
                        p.list_level = None;
                    }
                }
            }
            b"numPr" => self.mark_list_item(),
            _ => {}
        }
    }

    fn end(&mut self, local_name: &[u8]) {
        if self.skip_depth > 0 {
            self.skip_depth -= 1;
            return;
        }

        match local_name {
            b"body" => self.body_closed = true,
            b"p" => self.finish_paragraph(),
            b"r" => {
                self.runs.pop();
            }
            b"t" => self.in_text = false,
            b"numPr" => self.in_numbering = false,
            b"tabs" => self.in_tab_stops = false,
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        if self.skip_depth > 0 || !self.in_text || self.run_hidden() {
            return;
        }
        if let Some(p) = self.paragraphs.last_mut() {
            p.text.push_str(text);
        }
    }

    fn run_hidden(&self) -> bool {
        self.runs.last().copied().unwrap_or(false)
    }

    fn mark_list_item(&mut self) {
        if let Some(p) = self.paragraphs.last_mut() {
            p.list_level.get_or_insert(0);
        }
    }

    fn push_char(&mut self, c: char) {
        if self.run_hidden() {
            return;
        }
        if let Some(p) = self.paragraphs.last_mut() {
            p.text.push(c);
        }
    }

    fn finish_paragraph(&mut self) {
        let Some(paragraph) = self.paragraphs.pop() else {
            return;
        };

        let mut finished = Vec::with_capacity(1 + paragraph.nested.len());
        if !paragraph.text.trim().is_empty() {
            finished.push(match paragraph.list_level {
                Some(level) => Segment::list_item(level, paragraph.text),
                None => Segment::paragraph(paragraph.text),
            });
        }
        finished.extend(paragraph.nested);

        match self.paragraphs.last_mut() {
            Some(outer) => outer.nested.extend(finished),
            None => self.segments.extend(finished),
        }
    }

    /// The part ended cleanly only if the body closed with no open paragraph
    fn finish(self) -> ExtractionResult<Vec<Segment>> {
        if !self.body_opened {
            return Err(ExtractionError::MissingPart("w:body".to_string()));
        }
        if !self.body_closed || !self.paragraphs.is_empty() {
            return Err(ExtractionError::Truncated);
        }
        Ok(self.segments)
    }
}

/// Parse the main document part into segments
pub fn parse_document_xml(xml: &[u8]) -> ExtractionResult<NormalizedDocument> {
    let mut reader = Reader::from_reader(xml);
    let mut buf = Vec::new();
    let mut walker = BodyWalker::default();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => walker.start(&e),
            Event::Empty(e) => walker.empty(&e),
            Event::End(e) => walker.end(e.local_name().as_ref()),
            Event::Text(e) => {
                let text = e.unescape()?;
                walker.text(&text);
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(NormalizedDocument::new(walker.finish()?))
}

// ============================================================================
// Tests
// ============================================================================
