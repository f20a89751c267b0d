//! Split options and configuration files.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, DocumentTypeConfig};
use crate::error::{Error, Result};
use crate::matcher::{DEFAULT_FUZZY_THRESHOLD, DEFAULT_MIN_CONFIDENCE, DEFAULT_WINDOW_LINES};

/// Options controlling classification and assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOptions {
    /// Minimum confidence for an exact-phase match (0-100)
    pub min_confidence: u8,

    /// Minimum similarity for a fuzzy-phase match (0-100)
    pub fuzzy_threshold: u8,

    /// Leading non-blank lines inspected per page
    pub window_lines: usize,

    /// Where pages without a heading go
    pub continuation: ContinuationPolicy,

    /// Whether to match pages in parallel
    pub parallel: bool,
}

impl SplitOptions {
    /// Create new split options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the exact-phase threshold.
    pub fn with_min_confidence(mut self, min_confidence: u8) -> Self {
        self.min_confidence = min_confidence;
        self
    }

    /// Set the fuzzy-phase threshold.
    pub fn with_fuzzy_threshold(mut self, fuzzy_threshold: u8) -> Self {
        self.fuzzy_threshold = fuzzy_threshold;
        self
    }

    /// Set the number of leading lines inspected per page.
    pub fn with_window_lines(mut self, window_lines: usize) -> Self {
        self.window_lines = window_lines;
        self
    }

    /// Set the continuation policy.
    pub fn with_continuation(mut self, continuation: ContinuationPolicy) -> Self {
        self.continuation = continuation;
        self
    }

    /// Attach unmatched pages to the preceding matched section.
    pub fn attach_continuations(mut self) -> Self {
        self.continuation = ContinuationPolicy::PrecedingSection;
        self
    }

    /// Enable or disable parallel matching.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Disable parallel matching.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Check that thresholds are in range.
    pub fn validate(&self) -> Result<()> {
        if self.min_confidence > 100 {
            return Err(Error::Config(format!(
                "min_confidence must be 0-100, got {}",
                self.min_confidence
            )));
        }
        if self.fuzzy_threshold > 100 {
            return Err(Error::Config(format!(
                "fuzzy_threshold must be 0-100, got {}",
                self.fuzzy_threshold
            )));
        }
        if self.window_lines == 0 {
            return Err(Error::Config("window_lines must be at least 1".into()));
        }
        Ok(())
    }
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            window_lines: DEFAULT_WINDOW_LINES,
            continuation: ContinuationPolicy::Others,
            parallel: true,
        }
    }
}

/// What happens to a page that matched in neither phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuationPolicy {
    /// Collect it into the trailing "Others" section
    #[default]
    Others,
    /// Append it to the open matched section, if there is one
    PrecedingSection,
}

/// On-disk configuration. Every field is optional.
///
/// ```json
/// {
///   "min_confidence": 80,
///   "fuzzy_threshold": 90,
///   "document_types": [
///     {"name": "Certificate of Origin", "variants": ["Origin Certificate"]},
///     {"name": "Form 6", "exact_only": true}
///   ]
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitterConfig {
    /// Exact-phase threshold
    pub min_confidence: Option<u8>,

    /// Fuzzy-phase threshold
    pub fuzzy_threshold: Option<u8>,

    /// Leading lines inspected per page
    pub window_lines: Option<usize>,

    /// Continuation policy
    pub continuation: Option<ContinuationPolicy>,

    /// Parallel matching
    pub parallel: Option<bool>,

    /// Catalog; the built-in catalog is used when absent
    pub document_types: Option<Vec<DocumentTypeConfig>>,
}

impl SplitterConfig {
    /// Parse configuration from JSON.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::Config(format!("invalid config: {}", e)))
    }

    /// Load configuration from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read config {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// Apply the configured values on top of `base`.
    pub fn apply(&self, base: SplitOptions) -> SplitOptions {
        SplitOptions {
            min_confidence: self.min_confidence.unwrap_or(base.min_confidence),
            fuzzy_threshold: self.fuzzy_threshold.unwrap_or(base.fuzzy_threshold),
            window_lines: self.window_lines.unwrap_or(base.window_lines),
            continuation: self.continuation.unwrap_or(base.continuation),
            parallel: self.parallel.unwrap_or(base.parallel),
        }
    }

    /// Build the configured catalog.
    pub fn catalog(&self) -> Result<Catalog> {
        match &self.document_types {
            Some(types) => types
                .iter()
                .cloned()
                .fold(Catalog::builder(), |builder, entry| builder.add(entry))
                .build(),
            None => Ok(Catalog::default()),
        }
    }

    /// Resolve into a validated catalog and options.
    pub fn resolve(&self) -> Result<(Catalog, SplitOptions)> {
        let options = self.apply(SplitOptions::default());
        options.validate()?;
        Ok((self.catalog()?, options))
    }
}
