//! Rendering of assembled sections to output files.
//!
//! Every format implements [`SectionRenderer`]. [`render_sections`] drives a
//! renderer over all sections of a run, choosing a unique file name per
//! section and isolating failures so one broken section does not stop the
//! rest.

mod docx;
mod pdf;
mod text;

pub use docx::DocxRenderer;
pub use pdf::PdfSectionRenderer;
pub use text::TextRenderer;

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::assemble::DocumentSection;
use crate::error::{Error, Result};

/// Output file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pages copied from the source PDF
    #[default]
    Pdf,

    /// Word document with the section text
    Docx,

    /// Plain text
    Txt,
}

impl OutputFormat {
    /// File extension without the leading dot.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Pdf => "pdf",
            OutputFormat::Docx => "docx",
            OutputFormat::Txt => "txt",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "pdf" => Ok(OutputFormat::Pdf),
            "docx" | "word" => Ok(OutputFormat::Docx),
            "txt" | "text" => Ok(OutputFormat::Txt),
            other => Err(Error::Config(format!(
                "unknown output format '{}' (expected pdf, docx or txt)",
                other
            ))),
        }
    }
}

/// Writes one section to one file.
///
/// Implement this trait to add an output format.
pub trait SectionRenderer: Send + Sync {
    /// Format produced by this renderer.
    fn format(&self) -> OutputFormat;

    /// Write `section` to `path`.
    ///
    /// Errors should be [`Error::Render`]; [`render_sections`] treats any
    /// error as local to the section.
    fn render(&self, section: &DocumentSection, path: &Path) -> Result<()>;
}

/// Produces unique, filesystem-safe output file names.
#[derive(Debug)]
pub struct OutputNamer {
    base: String,
    extension: &'static str,
    used: HashSet<String>,
    unsafe_chars: Regex,
}

impl OutputNamer {
    /// Create a namer for files named `<base>_<heading>.<extension>`.
    pub fn new(base: impl Into<String>, format: OutputFormat) -> Self {
        Self {
            base: base.into(),
            extension: format.extension(),
            used: HashSet::new(),
            unsafe_chars: Regex::new(r"[^\w\s-]").expect("valid file name pattern"),
        }
    }

    /// Heading with unsafe characters removed and whitespace runs turned
    /// into underscores.
    pub fn sanitize(&self, heading: &str) -> String {
        let cleaned = self.unsafe_chars.replace_all(heading, "");
        let joined = cleaned.split_whitespace().collect::<Vec<_>>().join("_");
        if joined.is_empty() {
            "section".to_string()
        } else {
            joined
        }
    }

    /// Next unused file name for `heading`.
    ///
    /// Repeated headings get `_2`, `_3`, ... suffixes. Names are compared
    /// case-insensitively.
    pub fn file_name(&mut self, heading: &str) -> String {
        let stem = format!("{}_{}", self.base, self.sanitize(heading));
        let mut candidate = format!("{}.{}", stem, self.extension);
        let mut counter = 2;
        while !self.used.insert(candidate.to_lowercase()) {
            candidate = format!("{}_{}.{}", stem, counter, self.extension);
            counter += 1;
        }
        candidate
    }
}

/// Outcome of rendering one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderedSection {
    /// Section heading
    pub heading: String,

    /// Target file
    pub path: PathBuf,

    /// Error description if the file could not be written
    pub error: Option<String>,
}

impl RenderedSection {
    /// Whether the file was written.
    pub fn is_written(&self) -> bool {
        self.error.is_none()
    }
}

/// A section that could not be written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderFailure {
    /// Section heading
    pub heading: String,

    /// Error description
    pub reason: String,
}

/// Render every section into `output_dir`.
///
/// Returns one entry per section, in section order. Failures are logged and
/// recorded; they never stop the remaining sections.
pub fn render_sections(
    sections: &[DocumentSection],
    renderer: &dyn SectionRenderer,
    output_dir: &Path,
    base_name: &str,
) -> Vec<RenderedSection> {
    let mut namer = OutputNamer::new(base_name, renderer.format());

    sections
        .iter()
        .map(|section| {
            let path = output_dir.join(namer.file_name(&section.heading));
            let error = match renderer.render(section, &path) {
                Ok(()) => {
                    log::info!(
                        "Saved '{}' ({} pages) to {}",
                        section.heading,
                        section.page_count(),
                        path.display()
                    );
                    None
                }
                Err(e) => {
                    log::error!("{}", e);
                    Some(e.to_string())
                }
            };
            RenderedSection {
                heading: section.heading.clone(),
                path,
                error,
            }
        })
        .collect()
}
