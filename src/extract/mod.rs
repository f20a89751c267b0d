//! Page extraction boundary.
//!
//! The classification engine only sees [`PageRecord`]s. Where they come from
//! is abstracted behind [`PageExtractor`], so the engine never touches a
//! concrete PDF library. [`PdfPageExtractor`] is the lopdf-backed
//! implementation used by the CLI; besides the text of each page it fills
//! [`PageRecord::tables`] from text positions.

mod pdf;
mod table;

pub use pdf::{check_pdf_header, PdfPageExtractor};
pub use table::{collect_spans, TableDetector, TableDetectorConfig, TextSpan};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Tabular content found on a page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageTable {
    /// Rows of cell text
    pub rows: Vec<Vec<String>>,
}

impl PageTable {
    /// Create a table from rows of cells.
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Render each row as `cell | cell | cell`.
    pub fn row_lines(&self) -> impl Iterator<Item = String> + '_ {
        self.rows.iter().map(|row| row.join(" | "))
    }
}

/// Text content of a single source page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// Page index (0-based, source order)
    pub index: usize,

    /// Non-blank text lines; `None` when the page could not be read
    pub lines: Option<Vec<String>>,

    /// Tables extracted from the page
    #[serde(default)]
    pub tables: Vec<PageTable>,
}

impl PageRecord {
    /// Create a page from lines of text. Blank lines are dropped.
    pub fn new<I, S>(index: usize, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let lines = lines
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Self {
            index,
            lines: Some(lines),
            tables: Vec::new(),
        }
    }

    /// Create a page from extracted text, splitting on line breaks.
    pub fn from_text(index: usize, text: &str) -> Self {
        Self::new(index, text.lines())
    }

    /// A page whose text could not be extracted.
    pub fn unreadable(index: usize) -> Self {
        Self {
            index,
            lines: None,
            tables: Vec::new(),
        }
    }

    /// Attach a table to the page.
    pub fn with_table(mut self, table: PageTable) -> Self {
        self.tables.push(table);
        self
    }

    /// Text lines, or an input error when the page is unreadable.
    pub fn text_lines(&self) -> Result<&[String]> {
        self.lines.as_deref().ok_or_else(|| Error::Input {
            page: self.index,
            reason: "page has no extracted text".to_string(),
        })
    }

    /// Whether text was extracted for this page.
    pub fn is_readable(&self) -> bool {
        self.lines.is_some()
    }

    /// Lines followed by table rows, as written into section content.
    pub fn content_lines(&self) -> Vec<String> {
        let mut content: Vec<String> = self.lines.iter().flatten().cloned().collect();
        for table in &self.tables {
            content.extend(table.row_lines().filter(|l| !l.trim().is_empty()));
        }
        content
    }
}

/// Source of page records.
pub trait PageExtractor {
    /// Number of pages in the source.
    fn page_count(&self) -> usize;

    /// Extract a single page by 0-based index.
    fn extract_page(&self, index: usize) -> Result<PageRecord>;

    /// Extract every page in source order.
    ///
    /// A page that fails to extract is logged and returned as
    /// [`PageRecord::unreadable`] so the remaining pages still get processed.
    fn extract_pages(&self) -> Vec<PageRecord> {
        (0..self.page_count())
            .map(|index| match self.extract_page(index) {
                Ok(page) => page,
                Err(e) => {
                    log::warn!("Failed to extract text from page {}: {}", index, e);
                    PageRecord::unreadable(index)
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FlakySource;

    impl PageExtractor for FlakySource {
        fn page_count(&self) -> usize {
            3
        }

        fn extract_page(&self, index: usize) -> Result<PageRecord> {
            if index == 1 {
                Err(Error::Input {
                    page: index,
                    reason: "broken content stream".into(),
                })
            } else {
                Ok(PageRecord::from_text(index, "Packing List\n\nItem 1"))
            }
        }
    }

    #[test]
    fn test_page_from_text_drops_blank_lines() {
        let page = PageRecord::from_text(0, "  Commercial Invoice \n\n   \nTotal: 10\n");
        assert_eq!(
            page.lines,
            Some(vec!["Commercial Invoice".to_string(), "Total: 10".to_string()])
        );
    }

    #[test]
    fn test_empty_text_is_readable() {
        let page = PageRecord::from_text(4, "");
        assert!(page.is_readable());
        assert!(page.text_lines().unwrap().is_empty());
    }

    #[test]
    fn test_unreadable_page_is_input_error() {
        let page = PageRecord::unreadable(7);
        assert!(matches!(page.text_lines(), Err(Error::Input { page: 7, .. })));
    }

    #[test]
    fn test_content_lines_include_tables() {
        let table = PageTable::new(vec![
            vec!["Item".into(), "Qty".into()],
            vec!["Copper scrap".into(), "20".into()],
        ]);
        let page = PageRecord::new(0, ["Packing List"]).with_table(table);
        assert_eq!(
            page.content_lines(),
            vec!["Packing List", "Item | Qty", "Copper scrap | 20"]
        );
    }

    #[test]
    fn test_extract_pages_isolates_failures() {
        let pages = FlakySource.extract_pages();
        assert_eq!(pages.len(), 3);
        assert!(pages[0].is_readable());
        assert!(!pages[1].is_readable());
        assert_eq!(pages[1].index, 1);
        assert!(pages[2].is_readable());
    }
}
