//! Two-phase classification pipeline.
//!
//! Phase 1 runs the exact matcher over every page. Pages it leaves unmatched
//! are requeued for phase 2, the fuzzy matcher. Both phases write into one
//! result vector indexed by page position, so the merged sequence is always
//! in source order no matter how the phases were scheduled.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assemble::{assemble_sections, DocumentSection};
use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::extract::PageRecord;
use crate::matcher::{HeadingMatcher, MatchKind, MatchResult};
use crate::options::SplitOptions;

/// A page that could not be matched because of an input error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageFailure {
    /// Page index (0-based)
    pub page: usize,

    /// Error description
    pub reason: String,
}

/// Result of classifying a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitOutcome {
    /// Sections in output order, "Others" last
    pub sections: Vec<DocumentSection>,

    /// Final match result per page, in page order
    pub matches: Vec<MatchResult>,

    /// Pages that failed with input errors
    pub page_failures: Vec<PageFailure>,
}

impl SplitOutcome {
    /// The "Others" section, if any page stayed unmatched.
    pub fn others(&self) -> Option<&DocumentSection> {
        self.sections.last().filter(|s| s.is_others())
    }

    /// Pages collected into "Others".
    pub fn others_pages(&self) -> &[usize] {
        self.others().map(|s| s.pages.as_slice()).unwrap_or(&[])
    }

    /// Number of pages matched with the given kind.
    pub fn count(&self, kind: MatchKind) -> usize {
        self.matches.iter().filter(|m| m.kind == kind).count()
    }

    /// Heading and page list of each section.
    pub fn layout(&self) -> Vec<(String, Vec<usize>)> {
        self.sections
            .iter()
            .map(|s| (s.heading.clone(), s.pages.clone()))
            .collect()
    }
}

/// Runs both matching phases and assembles sections.
#[derive(Debug, Clone)]
pub struct SplitPipeline<'a> {
    catalog: &'a Catalog,
    options: SplitOptions,
}

impl<'a> SplitPipeline<'a> {
    /// Create a pipeline.
    pub fn new(catalog: &'a Catalog, options: SplitOptions) -> Self {
        Self { catalog, options }
    }

    /// Classify pages and assemble sections.
    ///
    /// Fails only on invalid options, an empty page list or duplicate page
    /// indices. Pages without text are recorded in
    /// [`SplitOutcome::page_failures`] and end up in "Others".
    pub fn run(&self, pages: &[PageRecord]) -> Result<SplitOutcome> {
        self.options.validate()?;
        if pages.is_empty() {
            return Err(Error::EmptyDocument);
        }

        let mut ordered: Vec<&PageRecord> = pages.iter().collect();
        ordered.sort_by_key(|p| p.index);
        if let Some(pair) = ordered.windows(2).find(|w| w[0].index == w[1].index) {
            return Err(Error::DuplicatePage(pair[0].index));
        }

        let matcher = HeadingMatcher::from_options(self.catalog, &self.options);
        let mut page_failures = Vec::new();

        // Phase 1: exact matching over every page
        let mut results = Vec::with_capacity(ordered.len());
        let mut requeue = Vec::new();
        let phase1 = self.match_pages(&ordered, |page| matcher.match_exact(page));
        for (position, (page, outcome)) in ordered.iter().zip(phase1).enumerate() {
            match outcome {
                Ok(result) => {
                    if !result.is_match() {
                        requeue.push(position);
                    }
                    results.push(result);
                }
                Err(e) => {
                    log::warn!("Page {} left unmatched: {}", page.index, e);
                    page_failures.push(PageFailure {
                        page: page.index,
                        reason: e.to_string(),
                    });
                    results.push(MatchResult::none(page.index));
                }
            }
        }
        log::info!(
            "Exact phase matched {} of {} pages",
            ordered.len() - requeue.len() - page_failures.len(),
            ordered.len()
        );

        // Phase 2: fuzzy matching over the leftovers only
        let leftovers: Vec<&PageRecord> = requeue.iter().map(|&i| ordered[i]).collect();
        let phase2 = self.match_pages(&leftovers, |page| matcher.match_fuzzy(page));
        let mut fuzzy_matches = 0;
        for (&position, outcome) in requeue.iter().zip(phase2) {
            match outcome {
                Ok(result) if result.is_match() => {
                    fuzzy_matches += 1;
                    results[position] = result;
                }
                Ok(_) => {}
                Err(e) => {
                    log::warn!("Page {} left unmatched: {}", ordered[position].index, e);
                    page_failures.push(PageFailure {
                        page: ordered[position].index,
                        reason: e.to_string(),
                    });
                }
            }
        }
        log::info!(
            "Fuzzy phase matched {} of {} remaining pages",
            fuzzy_matches,
            requeue.len()
        );

        let sections = assemble_sections(&results, &ordered, self.options.continuation);
        page_failures.sort_by_key(|f| f.page);

        Ok(SplitOutcome {
            sections,
            matches: results,
            page_failures,
        })
    }

    fn match_pages<F>(&self, pages: &[&PageRecord], f: F) -> Vec<Result<MatchResult>>
    where
        F: Fn(&PageRecord) -> Result<MatchResult> + Sync + Send,
    {
        if self.options.parallel {
            pages.par_iter().map(|&page| f(page)).collect()
        } else {
            pages.iter().map(|&page| f(page)).collect()
        }
    }
}

/// Classify pages with the given catalog and options.
pub fn classify_pages(
    pages: &[PageRecord],
    catalog: &Catalog,
    options: SplitOptions,
) -> Result<SplitOutcome> {
    SplitPipeline::new(catalog, options).run(pages)
}
