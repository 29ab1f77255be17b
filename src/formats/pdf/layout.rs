//! Text reflow and pagination
//!
//! Greedy word wrap against the printable width, then fixed-advance lines
//! top to bottom, starting a new page when the next line would cross the
//! bottom margin.

use crate::document::{NormalizedDocument, RenderError, RenderResult, SegmentKind};

use super::metrics::{self, ASCENT, DESCENT, GAP};

/// Upper bound on pages for a single document
pub const MAX_PAGES: usize = 5000;

/// Spaces substituted for a tab
const TAB_WIDTH: usize = 4;

/// Marker written before a list item's first line
const BULLET: &str = "\u{2022} ";

/// Indent per list nesting level, in points
const LIST_INDENT: f32 = 18.0;

/// Largest share of the printable width an indent and bullet may take
const MAX_INDENT_SHARE: f32 = 0.5;

/// Page geometry and type settings, in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSetup {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub font_size: f32,
    pub line_gap: f32,
}

impl PageSetup {
    /// ISO A4, 50pt margins, 12pt body text, 5pt line gap
    pub const A4: PageSetup = PageSetup {
        width: 595.28,
        height: 841.89,
        margin: 50.0,
        font_size: 12.0,
        line_gap: 5.0,
    };

    pub fn printable_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn printable_height(&self) -> f32 {
        self.height - 2.0 * self.margin
    }

    /// Distance between consecutive baselines
    pub fn line_advance(&self) -> f32 {
        (ASCENT + DESCENT + GAP) * self.font_size / 1000.0 + self.line_gap
    }

    /// Baseline of the first line on a page
    pub fn first_baseline(&self) -> f32 {
        self.height - self.margin - ASCENT * self.font_size / 1000.0
    }

    pub fn lines_per_page(&self) -> usize {
        let glyph_height = (ASCENT + DESCENT) * self.font_size / 1000.0;
        let spare = self.printable_height() - glyph_height;
        if spare < 0.0 {
            return 1;
        }
        (spare / self.line_advance()).floor() as usize + 1
    }
}

impl Default for PageSetup {
    fn default() -> Self {
        Self::A4
    }
}

/// One line of text at an absolute baseline position
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub x: f32,
    pub y: f32,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageLayout {
    pub lines: Vec<PlacedLine>,
}

/// Lay out a document into pages. An empty document yields one blank page.
pub fn layout(document: &NormalizedDocument, setup: &PageSetup) -> RenderResult<Vec<PageLayout>> {
    let per_page = setup.lines_per_page();
    let mut pages = vec![PageLayout::default()];

    for (indent, text) in flow_lines(document, setup) {
        if pages.last().is_some_and(|p| p.lines.len() >= per_page) {
            if pages.len() >= MAX_PAGES {
                return Err(RenderError::LayoutLimit { max_pages: MAX_PAGES });
            }
            pages.push(PageLayout::default());
        }

        let Some(page) = pages.last_mut() else {
            continue;
        };
        let row = page.lines.len();
        page.lines.push(PlacedLine {
            x: setup.margin + indent,
            y: setup.first_baseline() - row as f32 * setup.line_advance(),
            text,
        });
    }

    Ok(pages)
}

/// Wrapped lines with their left indent, in reading order
fn flow_lines<'a>(
    document: &'a NormalizedDocument,
    setup: &'a PageSetup,
) -> impl Iterator<Item = (f32, String)> + 'a {
    document.segments.iter().flat_map(move |segment| {
        let size = setup.font_size;
        let (indent, prefix) = match segment.kind {
            SegmentKind::Paragraph => (0.0, ""),
            SegmentKind::ListItem { level } => (f32::from(level) * LIST_INDENT, BULLET),
        };
        let hanging = metrics::text_width(prefix, size);
        let indent = indent.min(setup.printable_width() * MAX_INDENT_SHARE - hanging).max(0.0);
        let width = (setup.printable_width() - indent - hanging).max(size);

        let mut lines = Vec::new();
        for (i, hard_line) in segment.text.split('\n').enumerate() {
            let expanded = expand_tabs(hard_line);
            for (j, wrapped) in wrap(&expanded, width, size).into_iter().enumerate() {
                if i == 0 && j == 0 {
                    lines.push((indent, format!("{prefix}{wrapped}")));
                } else {
                    lines.push((indent + hanging, wrapped));
                }
            }
        }
        lines
    })
}

fn expand_tabs(line: &str) -> String {
    line.chars()
        .filter(|c| *c != '\r')
        .flat_map(|c| {
            let (ch, count) = if c == '\t' { (' ', TAB_WIDTH) } else { (c, 1) };
            std::iter::repeat(ch).take(count)
        })
        .collect()
}

/// Greedy wrap on spaces; words wider than a line are split by character.
///
/// Runs of spaces, leading ones included, are kept within a line.
fn wrap(text: &str, max_width: f32, size: f32) -> Vec<String> {
    let space = metrics::char_width(' ', size);
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0;
    // A word has been placed on the current line, so the next needs a space
    let mut line_started = false;

    for word in text.split(' ') {
        let word_width = metrics::text_width(word, size);
        let gap = if line_started { space } else { 0.0 };

        if current_width + gap + word_width <= max_width {
            if line_started {
                current.push(' ');
            }
            current.push_str(word);
            current_width += gap + word_width;
            line_started = true;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        current_width = 0.0;
        line_started = true;

        if word_width <= max_width {
            current.push_str(word);
            current_width = word_width;
            continue;
        }

        for c in word.chars() {
            let w = metrics::char_width(c, size);
            if current_width + w > max_width && !current.is_empty() {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            current.push(c);
            current_width += w;
        }
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }

    lines
}
