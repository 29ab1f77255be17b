//! PDF serialization
//!
//! Turns laid-out pages into a PDF object graph and writes it durably.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use crate::document::{RenderError, RenderResult};

use super::layout::{PageLayout, PageSetup};
use super::metrics;

/// Resource name of the body font
const FONT_RESOURCE: &str = "F1";

/// Suffix of the in-progress file next to the target
const PARTIAL_SUFFIX: &str = ".part";

/// Build the PDF object graph for laid-out pages
pub fn build_pdf(pages: &[PageLayout], setup: &PageSetup) -> RenderResult<Document> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => metrics::FONT_NAME,
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_RESOURCE => font_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for page in pages {
        let content = page_content(page, setup);
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    let pages_dict = dictionary! {
        "Type" => "Pages",
        "Kids" => kids,
        "Count" => page_count,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), setup.width.into(), setup.height.into()],
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages_dict));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Producer" => Object::string_literal(concat!("docx2pdf-server ", env!("CARGO_PKG_VERSION"))),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    Ok(doc)
}

fn page_content(page: &PageLayout, setup: &PageSetup) -> Content {
    let mut operations = Vec::with_capacity(page.lines.len() * 2 + 3);

    if !page.lines.is_empty() {
        operations.push(Operation::new("BT", vec![]));
        operations.push(Operation::new(
            "Tf",
            vec![FONT_RESOURCE.into(), setup.font_size.into()],
        ));
        for line in &page.lines {
            operations.push(Operation::new(
                "Tm",
                vec![1.into(), 0.into(), 0.into(), 1.into(), line.x.into(), line.y.into()],
            ));
            operations.push(Operation::new(
                "Tj",
                vec![Object::String(metrics::encode(&line.text), StringFormat::Literal)],
            ));
        }
        operations.push(Operation::new("ET", vec![]));
    }

    Content { operations }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

/// Write `doc` to `target`, returning the byte size.
///
/// Bytes go to `<target>.part`, are flushed and synced, then renamed into
/// place. On any failure the partial file is removed and `target` untouched.
pub fn write_pdf(doc: &mut Document, target: &Path) -> RenderResult<u64> {
    let partial = partial_path(target);

    let result = write_and_sync(doc, &partial).and_then(|size| {
        std::fs::rename(&partial, target)?;
        Ok(size)
    });

    if result.is_err() {
        let _ = std::fs::remove_file(&partial);
    }

    result
}

fn write_and_sync(doc: &mut Document, path: &Path) -> RenderResult<u64> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    doc.save_to(&mut writer)?;
    writer.flush()?;

    let file = writer
        .into_inner()
        .map_err(|e| RenderError::Io(e.into_error()))?;
    file.sync_all()?;

    Ok(file.metadata()?.len())
}

// ============================================================================
// Tests
// ============================================================================
