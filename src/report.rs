//! Run reports.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::assemble::SectionMatchType;
use crate::error::{Error, Result};
use crate::pipeline::{PageFailure, SplitOutcome};
use crate::render::{OutputFormat, RenderFailure, RenderedSection};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Summary of one produced section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSummary {
    /// Section heading
    pub heading: String,

    /// Page indices (0-based)
    pub pages: Vec<usize>,

    /// Section confidence
    pub confidence: u8,

    /// How the pages were matched
    pub match_type: SectionMatchType,

    /// Written file, if rendering succeeded
    pub output: Option<PathBuf>,
}

/// Result of splitting one input file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitReport {
    /// Input file
    pub source: PathBuf,

    /// Directory the sections were written to
    pub output_dir: PathBuf,

    /// Output format
    pub format: OutputFormat,

    /// Number of pages in the input
    pub page_count: usize,

    /// Sections in output order
    pub sections: Vec<SectionSummary>,

    /// Pages collected into "Others"
    pub others_pages: Vec<usize>,

    /// Pages that could not be read
    pub page_failures: Vec<PageFailure>,

    /// Sections that could not be written
    pub render_failures: Vec<RenderFailure>,

    /// When processing started
    pub started_at: DateTime<Utc>,

    /// When processing finished
    pub finished_at: DateTime<Utc>,
}

impl SplitReport {
    /// Build a report from a classification outcome and its rendered files.
    ///
    /// `rendered` must hold one entry per section, in section order.
    pub fn new(
        source: PathBuf,
        output_dir: PathBuf,
        format: OutputFormat,
        outcome: &SplitOutcome,
        rendered: &[RenderedSection],
        started_at: DateTime<Utc>,
    ) -> Self {
        let sections = outcome
            .sections
            .iter()
            .zip(rendered)
            .map(|(section, file)| SectionSummary {
                heading: section.heading.clone(),
                pages: section.pages.clone(),
                confidence: section.confidence,
                match_type: section.match_type,
                output: file.is_written().then(|| file.path.clone()),
            })
            .collect();

        let render_failures = rendered
            .iter()
            .filter_map(|file| {
                file.error.as_ref().map(|reason| RenderFailure {
                    heading: file.heading.clone(),
                    reason: reason.clone(),
                })
            })
            .collect();

        Self {
            source,
            output_dir,
            format,
            page_count: outcome.matches.len(),
            sections,
            others_pages: outcome.others_pages().to_vec(),
            page_failures: outcome.page_failures.clone(),
            render_failures,
            started_at,
            finished_at: Utc::now(),
        }
    }

    /// Whether every page was readable and every section was written.
    pub fn is_clean(&self) -> bool {
        self.page_failures.is_empty() && self.render_failures.is_empty()
    }

    /// Files that were written.
    pub fn outputs(&self) -> impl Iterator<Item = &PathBuf> {
        self.sections.iter().filter_map(|s| s.output.as_ref())
    }

    /// Wall-clock duration of the run.
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }

    /// Serialize the report.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        let result = match format {
            JsonFormat::Pretty => serde_json::to_string_pretty(self),
            JsonFormat::Compact => serde_json::to_string(self),
        };

        result.map_err(|e| Error::Other(format!("JSON serialization error: {}", e)))
    }
}
