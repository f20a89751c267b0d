//! # docsplit
//!
//! Split multi-document PDF bundles into one file per document type.
//!
//! Shipping paperwork often arrives as a single scanned bundle: a commercial
//! invoice, a packing list, a bill of lading and a handful of certificates,
//! one after another. This library looks at the first lines of every page,
//! decides which catalog document type the page starts, and groups
//! consecutive pages of the same type into sections.
//!
//! Classification runs in two phases. The exact phase compares normalized
//! heading lines against every variant in the [`Catalog`]. Pages it cannot
//! place go through the fuzzy phase, which scores lines by edit-distance
//! similarity. Pages matched by neither end up in a trailing "Others"
//! section.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docsplit::{OutputFormat, Splitter};
//!
//! fn main() -> docsplit::Result<()> {
//!     let report = Splitter::new()
//!         .with_format(OutputFormat::Txt)
//!         .split_file("bundle.pdf", "output")?;
//!
//!     for section in &report.sections {
//!         println!("{}: pages {:?}", section.heading, section.pages);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Classifying extracted text
//!
//! ```
//! use docsplit::{classify_pages, Catalog, PageRecord, SplitOptions};
//!
//! let pages = vec![
//!     PageRecord::new(0, ["COMMERCIAL INVOICE", "No. 4471"]),
//!     PageRecord::new(1, ["Packing List"]),
//! ];
//! let outcome = classify_pages(&pages, &Catalog::default(), SplitOptions::default())?;
//! assert_eq!(outcome.sections[0].heading, "Commercial Invoice");
//! assert_eq!(outcome.sections[1].heading, "Packing List");
//! # Ok::<(), docsplit::Error>(())
//! ```

pub mod assemble;
pub mod catalog;
pub mod error;
pub mod extract;
pub mod matcher;
pub mod options;
pub mod pipeline;
pub mod render;
pub mod report;

// Re-export commonly used types
pub use assemble::{DocumentSection, SectionAssembler, SectionMatchType, OTHERS_HEADING};
pub use catalog::{Catalog, CatalogBuilder, CatalogConfig, DocumentType, DocumentTypeConfig};
pub use error::{Error, Result};
pub use extract::{
    PageExtractor, PageRecord, PageTable, PdfPageExtractor, TableDetector, TableDetectorConfig,
};
pub use matcher::{HeadingMatcher, MatchKind, MatchResult};
pub use options::{ContinuationPolicy, SplitOptions, SplitterConfig};
pub use pipeline::{classify_pages, PageFailure, SplitOutcome, SplitPipeline};
pub use render::{
    render_sections, DocxRenderer, OutputFormat, PdfSectionRenderer, RenderFailure,
    RenderedSection, SectionRenderer, TextRenderer,
};
pub use report::{JsonFormat, SectionSummary, SplitReport};

use std::fs;
use std::path::Path;

use chrono::Utc;

/// Classify the pages of a PDF file with the built-in catalog.
///
/// # Example
///
/// ```no_run
/// use docsplit::classify_file;
///
/// let outcome = classify_file("bundle.pdf").unwrap();
/// for m in &outcome.matches {
///     println!("page {}: {:?}", m.page_index, m.document_type);
/// }
/// ```
pub fn classify_file<P: AsRef<Path>>(path: P) -> Result<SplitOutcome> {
    Splitter::new().classify_file(path)
}

/// Split a PDF file into `<output_root>/<file stem>/` with default settings.
///
/// # Example
///
/// ```no_run
/// use docsplit::{split_file, OutputFormat};
///
/// let report = split_file("bundle.pdf", "output", OutputFormat::Pdf).unwrap();
/// println!("{} sections", report.sections.len());
/// ```
pub fn split_file<P: AsRef<Path>, Q: AsRef<Path>>(
    path: P,
    output_root: Q,
    format: OutputFormat,
) -> Result<SplitReport> {
    Splitter::new().with_format(format).split_file(path, output_root)
}

/// Builder for classifying and splitting PDF documents.
///
/// # Example
///
/// ```no_run
/// use docsplit::{OutputFormat, Splitter};
///
/// let report = Splitter::new()
///     .with_fuzzy_threshold(85)
///     .attach_continuations()
///     .with_format(OutputFormat::Docx)
///     .split_file("bundle.pdf", "output")?;
/// println!("{}", report.to_json(docsplit::JsonFormat::Pretty)?);
/// # Ok::<(), docsplit::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Splitter {
    catalog: Catalog,
    options: SplitOptions,
    format: OutputFormat,
}

impl Splitter {
    /// Create a splitter with the built-in catalog and default options.
    pub fn new() -> Self {
        Self {
            catalog: Catalog::default(),
            options: SplitOptions::default(),
            format: OutputFormat::default(),
        }
    }

    /// Create a splitter from a configuration file's contents.
    pub fn from_config(config: &SplitterConfig) -> Result<Self> {
        let (catalog, options) = config.resolve()?;
        Ok(Self {
            catalog,
            options,
            format: OutputFormat::default(),
        })
    }

    /// Use a custom catalog.
    pub fn with_catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Replace all options.
    pub fn with_options(mut self, options: SplitOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the exact-phase threshold.
    pub fn with_min_confidence(mut self, min_confidence: u8) -> Self {
        self.options = self.options.with_min_confidence(min_confidence);
        self
    }

    /// Set the fuzzy-phase threshold.
    pub fn with_fuzzy_threshold(mut self, fuzzy_threshold: u8) -> Self {
        self.options = self.options.with_fuzzy_threshold(fuzzy_threshold);
        self
    }

    /// Attach unmatched pages to the preceding matched section.
    pub fn attach_continuations(mut self) -> Self {
        self.options = self.options.attach_continuations();
        self
    }

    /// Disable parallel matching.
    pub fn sequential(mut self) -> Self {
        self.options = self.options.sequential();
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// The catalog in use.
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The options in use.
    pub fn options(&self) -> &SplitOptions {
        &self.options
    }

    /// The output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Classify already extracted pages.
    pub fn classify(&self, pages: &[PageRecord]) -> Result<SplitOutcome> {
        SplitPipeline::new(&self.catalog, self.options.clone()).run(pages)
    }

    /// Classify the pages of a PDF file without writing anything.
    pub fn classify_file<P: AsRef<Path>>(&self, path: P) -> Result<SplitOutcome> {
        let extractor = PdfPageExtractor::open(path)?;
        self.classify(&extractor.extract_pages())
    }

    /// Classify a PDF file and write one file per section.
    ///
    /// Sections are written to `<output_root>/<file stem>/`. The directory is
    /// only created once classification has succeeded, so fatal errors leave
    /// no output behind. Section write failures are recorded in the report.
    pub fn split_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        path: P,
        output_root: Q,
    ) -> Result<SplitReport> {
        let path = path.as_ref();
        let started_at = Utc::now();
        log::info!("Splitting {}", path.display());

        let extractor = PdfPageExtractor::open(path)?;
        let pages = extractor.extract_pages();
        let outcome = self.classify(&pages)?;

        let base_name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "document".to_string());
        let output_dir = output_root.as_ref().join(&base_name);
        fs::create_dir_all(&output_dir)?;

        let renderer: Box<dyn SectionRenderer> = match self.format {
            OutputFormat::Pdf => Box::new(PdfSectionRenderer::new(extractor.into_document())),
            OutputFormat::Docx => Box::new(DocxRenderer),
            OutputFormat::Txt => Box::new(TextRenderer),
        };
        let rendered = render_sections(
            &outcome.sections,
            renderer.as_ref(),
            &output_dir,
            &base_name,
        );

        let report = SplitReport::new(
            path.to_path_buf(),
            output_dir,
            self.format,
            &outcome,
            &rendered,
            started_at,
        );
        log::info!(
            "Wrote {} of {} sections ({} pages in Others)",
            report.outputs().count(),
            report.sections.len(),
            report.others_pages.len()
        );
        Ok(report)
    }
}

impl Default for Splitter {
    fn default() -> Self {
        Self::new()
    }
}
