//! Page extraction from PDF files using lopdf.

use std::fs;
use std::path::Path;

use lopdf::{Document as LopdfDocument, ObjectId};

use crate::error::{Error, Result};

use super::table::{collect_spans, TableDetector};
use super::{PageExtractor, PageRecord};

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const PDF_MAGIC_LEN: usize = 5;
const VERSION_LEN: usize = 3; // e.g., "1.7"

/// Check that data starts with a `%PDF-x.y` header and return the version.
pub fn check_pdf_header(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC_LEN + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version = &data[PDF_MAGIC_LEN..PDF_MAGIC_LEN + VERSION_LEN];
    match version {
        [major, b'.', minor] if major.is_ascii_digit() && minor.is_ascii_digit() => {
            Ok(String::from_utf8_lossy(version).to_string())
        }
        _ => Err(Error::UnsupportedVersion(
            String::from_utf8_lossy(version).to_string(),
        )),
    }
}

/// Extracts page text from a loaded PDF document.
///
/// The document stays loaded for the extractor's lifetime and is released
/// when the extractor (or the document taken out of it) is dropped.
pub struct PdfPageExtractor {
    doc: LopdfDocument,
    pages: Vec<(u32, ObjectId)>,
    detector: TableDetector,
}

impl PdfPageExtractor {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let data = fs::read(path)?;
        Self::from_bytes(&data)
    }

    /// Load a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        check_pdf_header(data)?;

        let doc = LopdfDocument::load_mem(data)?;
        if doc.is_encrypted() {
            log::warn!("Document is encrypted; extracted text may be incomplete");
        }

        // BTreeMap keys are page numbers, so this is source order
        let pages = doc.get_pages().into_iter().collect();
        Ok(Self {
            doc,
            pages,
            detector: TableDetector::new(),
        })
    }

    /// Replace the table detector, e.g. to tune its thresholds.
    pub fn with_table_detector(mut self, detector: TableDetector) -> Self {
        self.detector = detector;
        self
    }

    /// PDF version from the document header.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    /// Borrow the underlying document.
    pub fn document(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Take the underlying document, e.g. to copy pages out of it.
    pub fn into_document(self) -> LopdfDocument {
        self.doc
    }
}

impl PageExtractor for PdfPageExtractor {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn extract_page(&self, index: usize) -> Result<PageRecord> {
        let &(page_number, page_id) = self.pages.get(index).ok_or_else(|| Error::Input {
            page: index,
            reason: format!("document has {} pages", self.pages.len()),
        })?;

        let text = self
            .doc
            .extract_text(&[page_number])
            .map_err(|e| Error::Input {
                page: index,
                reason: e.to_string(),
            })?;
        let mut page = PageRecord::from_text(index, &text);

        // Tables are an addition to the text; losing them is not a page failure
        match collect_spans(&self.doc, page_id) {
            Ok(spans) => page.tables = self.detector.detect(&spans),
            Err(e) => log::debug!("Page {}: no table detection: {}", index, e),
        }

        Ok(page)
    }
}
