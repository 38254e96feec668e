//! PDF document transforms.
//!
//! Documents are never held between requests. Each operation takes bytes,
//! builds a [`lopdf::Document`], changes it, and hands back new bytes.

use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};
use thiserror::Error;

/// Leading bytes of every PDF file.
pub const PDF_SIGNATURE: &[u8] = b"%PDF-";

/// Horizontal position of the first line of text, in points.
pub const TEXT_ANCHOR_X: i64 = 50;
/// Vertical position of the first line of text, in points.
pub const TEXT_ANCHOR_Y: i64 = 750;
pub const FONT_SIZE: i64 = 24;
pub const LINE_HEIGHT: i64 = 28;

/// A4 in points, rounded.
const PAGE_SIZE: (i64, i64) = (595, 842);
const FONT_RESOURCE: &str = "F1";

/// Errors that can occur when building or reading a document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("not a PDF document")]
    MissingSignature,

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error(transparent)]
    Pdf(#[from] lopdf::Error),

    #[error("failed to serialize document: {0}")]
    Serialize(#[from] std::io::Error),
}

/// Build a new single-page document holding `text`.
///
/// # Errors
///
/// Returns `DocumentError` if the page content cannot be encoded or the
/// document cannot be serialized.
pub fn create(text: &str) -> Result<Vec<u8>, DocumentError> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let page_id = add_text_page(&mut doc, pages_id, text)?;

    let pages = dictionary! {
        "Type" => "Pages",
        "Kids" => vec![page_id.into()],
        "Count" => 1,
    };
    doc.objects.insert(pages_id, Object::Dictionary(pages));

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    save(&mut doc)
}

/// Return a copy of `bytes` with one more page holding `text`.
///
/// # Errors
///
/// Returns `DocumentError` if `bytes` is not a PDF, its page tree is
/// malformed, or the result cannot be serialized.
pub fn append_page(bytes: &[u8], text: &str) -> Result<Vec<u8>, DocumentError> {
    let mut doc = load(bytes)?;
    let pages_id = root_pages_id(&doc)?;

    let page_id = add_text_page(&mut doc, pages_id, text)?;

    let pages = doc.get_object_mut(pages_id)?.as_dict_mut()?;
    let count = pages.get(b"Count").and_then(Object::as_i64).unwrap_or(0);
    pages.get_mut(b"Kids")?.as_array_mut()?.push(page_id.into());
    pages.set("Count", count + 1);

    save(&mut doc)
}

/// Extract the text of every page, in page order.
///
/// # Errors
///
/// Returns `DocumentError` if `bytes` is not a PDF or its content streams
/// cannot be decoded.
pub fn extract_text(bytes: &[u8]) -> Result<String, DocumentError> {
    let doc = load(bytes)?;
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();

    if page_numbers.is_empty() {
        return Ok(String::new());
    }

    Ok(doc.extract_text(&page_numbers)?)
}

/// Number of pages in the document.
///
/// # Errors
///
/// Returns `DocumentError` if `bytes` is not a PDF.
pub fn page_count(bytes: &[u8]) -> Result<usize, DocumentError> {
    Ok(load(bytes)?.get_pages().len())
}

/// Check that `bytes` parse as a PDF document.
///
/// # Errors
///
/// Returns `DocumentError` describing why the bytes were rejected.
pub fn validate(bytes: &[u8]) -> Result<(), DocumentError> {
    load(bytes).map(|_| ())
}

fn load(bytes: &[u8]) -> Result<Document, DocumentError> {
    if !bytes.starts_with(PDF_SIGNATURE) {
        return Err(DocumentError::MissingSignature);
    }
    Ok(Document::load_mem(bytes)?)
}

fn save(doc: &mut Document) -> Result<Vec<u8>, DocumentError> {
    let mut buffer = Vec::new();
    doc.save_to(&mut buffer)?;
    Ok(buffer)
}

fn root_pages_id(doc: &Document) -> Result<ObjectId, DocumentError> {
    doc.catalog()?
        .get(b"Pages")
        .and_then(Object::as_reference)
        .map_err(|e| DocumentError::Malformed(format!("catalog has no page tree: {e}")))
}

/// Add a page object under `parent` and return its id.
///
/// The caller links the page into the parent's `Kids`.
fn add_text_page(
    doc: &mut Document,
    parent: ObjectId,
    text: &str,
) -> Result<ObjectId, DocumentError> {
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            FONT_RESOURCE => font_id,
        },
    });

    let content = Content {
        operations: text_operations(text),
    };
    let content_id = doc.add_object(Stream::new(Dictionary::new(), content.encode()?));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => parent,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), PAGE_SIZE.0.into(), PAGE_SIZE.1.into()],
    });

    Ok(page_id)
}

/// One text object per line, stepping down from the anchor.
fn text_operations(text: &str) -> Vec<Operation> {
    let mut operations = Vec::new();
    let mut y = TEXT_ANCHOR_Y;

    for line in text.lines() {
        operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![FONT_RESOURCE.into(), FONT_SIZE.into()]),
            Operation::new("Td", vec![TEXT_ANCHOR_X.into(), y.into()]),
            Operation::new("Tj", vec![Object::string_literal(encode_win_ansi(line))]),
            Operation::new("ET", vec![]),
        ]);
        y -= LINE_HEIGHT;
    }

    operations
}

/// Latin-1 subset of WinAnsi; anything else becomes `?`.
fn encode_win_ansi(line: &str) -> Vec<u8> {
    line.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect()
}
