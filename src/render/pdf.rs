//! PDF rendering by page extraction from the source document.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use lopdf::Document as LopdfDocument;

use crate::assemble::DocumentSection;
use crate::error::{Error, Result};

use super::{OutputFormat, SectionRenderer};

/// Writes a copy of the source PDF reduced to the section's pages.
pub struct PdfSectionRenderer {
    source: LopdfDocument,
    page_numbers: Vec<u32>,
}

impl PdfSectionRenderer {
    /// Create a renderer over the source document.
    pub fn new(source: LopdfDocument) -> Self {
        let page_numbers = source.get_pages().keys().copied().collect();
        Self {
            source,
            page_numbers,
        }
    }

    /// Number of pages in the source document.
    pub fn page_count(&self) -> usize {
        self.page_numbers.len()
    }

    fn extract(&self, section: &DocumentSection) -> Result<LopdfDocument> {
        let mut keep = HashSet::with_capacity(section.pages.len());
        for &index in &section.pages {
            let number = self.page_numbers.get(index).ok_or_else(|| {
                Error::render(
                    &section.heading,
                    format!(
                        "page {} out of range (document has {} pages)",
                        index,
                        self.page_numbers.len()
                    ),
                )
            })?;
            keep.insert(*number);
        }

        let delete: Vec<u32> = self
            .page_numbers
            .iter()
            .copied()
            .filter(|n| !keep.contains(n))
            .collect();

        let mut doc = self.source.clone();
        doc.delete_pages(&delete);
        doc.prune_objects();
        doc.compress();
        Ok(doc)
    }
}

impl std::fmt::Debug for PdfSectionRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfSectionRenderer")
            .field("pages", &self.page_numbers.len())
            .finish()
    }
}

impl SectionRenderer for PdfSectionRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Pdf
    }

    fn render(&self, section: &DocumentSection, path: &Path) -> Result<()> {
        let mut doc = self.extract(section)?;
        let file = File::create(path).map_err(|e| Error::render(&section.heading, e))?;
        let mut writer = BufWriter::new(file);
        doc.save_to(&mut writer)
            .map_err(|e| Error::render(&section.heading, e))?;
        writer
            .flush()
            .map_err(|e| Error::render(&section.heading, e))
    }
}
