//! Heading detection against the catalog.
//!
//! Matching runs in two phases over a small window of each page's leading
//! lines:
//!
//! 1. [`HeadingMatcher::match_exact`] compares normalized lines against the
//!    catalog's variants. A line equal to a variant scores 100; a line that
//!    contains a variant loses [`EXTRA_TOKEN_PENALTY`] points per extra token.
//! 2. [`HeadingMatcher::match_fuzzy`] scores lines by edit-distance
//!    similarity against every variant of every type that is not
//!    exact-only, keeping the single best pair. Lines that already contain a
//!    variant word for word belong to phase 1 and are skipped, so raising
//!    `min_confidence` cannot be undone by the fuzzy phase.
//!
//! Neither phase treats "no match" as an error. The only failure is a page
//! without extracted text, reported as [`Error::Input`](crate::Error::Input).

pub mod similarity;

use std::cmp::Reverse;

use serde::{Deserialize, Serialize};

use crate::catalog::{normalize, Catalog};
use crate::error::Result;
use crate::extract::PageRecord;
use crate::options::SplitOptions;

use similarity::heading_similarity;

/// Default minimum confidence for the exact phase.
pub const DEFAULT_MIN_CONFIDENCE: u8 = 80;

/// Default minimum similarity for the fuzzy phase.
pub const DEFAULT_FUZZY_THRESHOLD: u8 = 90;

/// Default number of leading lines inspected per page.
pub const DEFAULT_WINDOW_LINES: usize = 5;

/// Confidence lost per token on the line outside the matched variant.
pub const EXTRA_TOKEN_PENALTY: usize = 5;

/// How a page was matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Normalized text matched a variant (phase 1)
    Exact,
    /// Similarity above the fuzzy threshold (phase 2)
    Fuzzy,
    /// No match
    None,
}

/// Outcome of matching one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    /// Page index (0-based)
    pub page_index: usize,

    /// Canonical name of the matched type
    pub document_type: Option<String>,

    /// Confidence score (0-100)
    pub confidence: u8,

    /// How the match was made
    pub kind: MatchKind,

    /// The variant that matched
    pub variant: Option<String>,
}

impl MatchResult {
    /// An unmatched page.
    pub fn none(page_index: usize) -> Self {
        Self {
            page_index,
            document_type: None,
            confidence: 0,
            kind: MatchKind::None,
            variant: None,
        }
    }

    fn matched(
        page_index: usize,
        kind: MatchKind,
        document_type: &str,
        variant: &str,
        confidence: u8,
    ) -> Self {
        Self {
            page_index,
            document_type: Some(document_type.to_string()),
            confidence,
            kind,
            variant: Some(variant.to_string()),
        }
    }

    /// Whether the page matched a document type.
    pub fn is_match(&self) -> bool {
        self.kind != MatchKind::None
    }

    /// Canonical name of the matched type, if any.
    pub fn heading(&self) -> Option<&str> {
        self.document_type.as_deref()
    }
}

/// Confidence for a line that contains a variant plus `extra_tokens` others.
///
/// Strictly decreasing in `extra_tokens` until it reaches zero.
pub fn exact_confidence(extra_tokens: usize) -> u8 {
    100usize.saturating_sub(extra_tokens.saturating_mul(EXTRA_TOKEN_PENALTY)) as u8
}

/// The first `n` non-blank lines of a page.
pub fn heading_window(lines: &[String], n: usize) -> impl Iterator<Item = &String> {
    lines.iter().filter(|l| !l.trim().is_empty()).take(n)
}

/// Matches page headings against a catalog.
#[derive(Debug, Clone, Copy)]
pub struct HeadingMatcher<'a> {
    catalog: &'a Catalog,
    min_confidence: u8,
    fuzzy_threshold: u8,
    window_lines: usize,
}

impl<'a> HeadingMatcher<'a> {
    /// Create a matcher with default thresholds.
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            window_lines: DEFAULT_WINDOW_LINES,
        }
    }

    /// Create a matcher using the thresholds from split options.
    pub fn from_options(catalog: &'a Catalog, options: &SplitOptions) -> Self {
        Self::new(catalog)
            .with_min_confidence(options.min_confidence)
            .with_fuzzy_threshold(options.fuzzy_threshold)
            .with_window_lines(options.window_lines)
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

    /// Set how many leading lines are inspected.
    pub fn with_window_lines(mut self, window_lines: usize) -> Self {
        self.window_lines = window_lines.max(1);
        self
    }

    /// Phase 1: exact match on normalized text.
    ///
    /// The first window line scoring at least `min_confidence` wins.
    pub fn match_exact(&self, page: &PageRecord) -> Result<MatchResult> {
        let lines = page.text_lines()?;

        for line in heading_window(lines, self.window_lines) {
            let Some(hit) = self.catalog.lookup(&normalize(line)) else {
                continue;
            };

            let confidence = if hit.exact {
                100
            } else {
                exact_confidence(hit.extra_tokens)
            };

            if confidence >= self.min_confidence {
                log::debug!(
                    "Page {}: exact match '{}' via '{}' ({})",
                    page.index,
                    hit.document_type.name(),
                    hit.variant,
                    confidence
                );
                return Ok(MatchResult::matched(
                    page.index,
                    MatchKind::Exact,
                    hit.document_type.name(),
                    hit.variant,
                    confidence,
                ));
            }
        }

        Ok(MatchResult::none(page.index))
    }

    /// Phase 2: fuzzy match against types that are not exact-only.
    ///
    /// Only lines that contain no variant verbatim are scored. Equal scores resolve to the earlier-registered type, then the earlier
    /// variant, then the earlier line.
    pub fn match_fuzzy(&self, page: &PageRecord) -> Result<MatchResult> {
        let lines = page.text_lines()?;

        // (Reverse(score), type, variant, line): smallest key wins
        let mut best: Option<((Reverse<u8>, usize, usize, usize), &str, &str)> = None;

        for (line_index, line) in heading_window(lines, self.window_lines).enumerate() {
            let normalized = normalize(line);
            if normalized.is_empty() || self.catalog.lookup(&normalized).is_some() {
                continue;
            }

            for candidate in self.catalog.fuzzy_candidates() {
                let score = heading_similarity(&normalized, candidate.normalized);
                let key = (
                    Reverse(score),
                    candidate.type_index,
                    candidate.variant_index,
                    line_index,
                );
                if best.as_ref().map_or(true, |(k, _, _)| key < *k) {
                    let document_type = candidate.document_type;
                    best = Some((
                        key,
                        document_type.name(),
                        document_type.variants()[candidate.variant_index].as_str(),
                    ));
                }
            }
        }

        match best {
            Some(((Reverse(score), ..), name, variant)) if score >= self.fuzzy_threshold => {
                log::debug!(
                    "Page {}: fuzzy match '{}' via '{}' ({})",
                    page.index,
                    name,
                    variant,
                    score
                );
                Ok(MatchResult::matched(
                    page.index,
                    MatchKind::Fuzzy,
                    name,
                    variant,
                    score,
                ))
            }
            Some(((Reverse(score), ..), name, _)) => {
                log::debug!(
                    "Page {}: best fuzzy candidate '{}' ({}) below threshold {}",
                    page.index,
                    name,
                    score,
                    self.fuzzy_threshold
                );
                Ok(MatchResult::none(page.index))
            }
            None => Ok(MatchResult::none(page.index)),
        }
    }
}
