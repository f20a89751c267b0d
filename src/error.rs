//! Error types for docsplit.

use std::io;
use thiserror::Error;

/// Result type alias for docsplit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while splitting a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The catalog or splitter configuration is invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A single page could not be read or matched.
    #[error("Input error on page {page}: {reason}")]
    Input {
        /// 0-based page index
        page: usize,
        /// What went wrong
        reason: String,
    },

    /// A section could not be written.
    #[error("Failed to render section '{heading}': {reason}")]
    Render {
        /// Heading of the section being written
        heading: String,
        /// What went wrong
        reason: String,
    },

    /// No pages were extracted from the source document.
    #[error("Document has no pages")]
    EmptyDocument,

    /// Two page records share the same index.
    #[error("Duplicate page index {0}")]
    DuplicatePage(usize),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Whether this error aborts the whole run.
    ///
    /// Page-local input errors and section-local render errors are logged
    /// and recorded in the report; everything else stops processing.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Error::Input { .. } | Error::Render { .. })
    }

    pub(crate) fn render(heading: &str, reason: impl ToString) -> Self {
        Error::Render {
            heading: heading.to_string(),
            reason: reason.to_string(),
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
