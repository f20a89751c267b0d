//! Section assembly from per-page match results.
//!
//! [`SectionAssembler`] walks pages in ascending index order. A page whose
//! heading equals the open section's heading is appended to it; any other
//! heading closes the open section and starts a new one. Unmatched pages form
//! pending runs which, once assembly finishes, are gathered into a single
//! trailing "Others" section.

use serde::{Deserialize, Serialize};

use crate::extract::PageRecord;
use crate::matcher::{MatchKind, MatchResult};
use crate::options::ContinuationPolicy;

/// Heading of the catch-all section for unmatched pages.
pub const OTHERS_HEADING: &str = "Others";

/// How the pages of a section were matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionMatchType {
    /// Every page matched exactly
    Exact,
    /// Every page matched fuzzily
    Fuzzy,
    /// Both exact and fuzzy pages
    Mixed,
    /// Unmatched pages ("Others")
    None,
}

/// A group of pages sharing a detected heading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSection {
    /// Canonical document type name, or "Others"
    pub heading: String,

    /// Page indices, strictly increasing
    pub pages: Vec<usize>,

    /// Page lines and table rows, in page order
    pub content: Vec<String>,

    /// Lowest confidence among the matched pages (0 for "Others")
    pub confidence: u8,

    /// How the pages were matched
    pub match_type: SectionMatchType,
}

impl DocumentSection {
    /// Whether this is the catch-all section.
    pub fn is_others(&self) -> bool {
        self.match_type == SectionMatchType::None && self.heading == OTHERS_HEADING
    }

    /// First page index.
    pub fn start_page(&self) -> Option<usize> {
        self.pages.first().copied()
    }

    /// Last page index.
    pub fn end_page(&self) -> Option<usize> {
        self.pages.last().copied()
    }

    /// Number of pages in the section.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Content joined with newlines.
    pub fn text(&self) -> String {
        self.content.join("\n")
    }
}

#[derive(Debug)]
struct OpenSection {
    heading: Option<String>,
    pages: Vec<usize>,
    content: Vec<String>,
    confidence: u8,
    has_exact: bool,
    has_fuzzy: bool,
}

impl OpenSection {
    fn new(heading: Option<String>) -> Self {
        Self {
            heading,
            pages: Vec::new(),
            content: Vec::new(),
            confidence: 100,
            has_exact: false,
            has_fuzzy: false,
        }
    }

    fn append(&mut self, result: &MatchResult, page: &PageRecord) {
        match result.kind {
            MatchKind::Exact => self.has_exact = true,
            MatchKind::Fuzzy => self.has_fuzzy = true,
            MatchKind::None => {}
        }
        if result.is_match() {
            self.confidence = self.confidence.min(result.confidence);
        }
        self.pages.push(page.index);
        self.content.extend(page.content_lines());
    }

    fn match_type(&self) -> SectionMatchType {
        match (self.has_exact, self.has_fuzzy) {
            (true, true) => SectionMatchType::Mixed,
            (true, false) => SectionMatchType::Exact,
            (false, true) => SectionMatchType::Fuzzy,
            (false, false) => SectionMatchType::None,
        }
    }
}

#[derive(Debug)]
enum AssemblerState {
    NoOpenSection,
    SectionOpen(OpenSection),
}

enum Transition {
    Append,
    Continue,
    Open,
}

/// Incremental section builder.
#[derive(Debug)]
pub struct SectionAssembler {
    state: AssemblerState,
    continuation: ContinuationPolicy,
    sections: Vec<DocumentSection>,
    others: OpenSection,
    last_page: Option<usize>,
}

impl SectionAssembler {
    /// Create an assembler.
    pub fn new(continuation: ContinuationPolicy) -> Self {
        Self {
            state: AssemblerState::NoOpenSection,
            continuation,
            sections: Vec::new(),
            others: OpenSection::new(None),
            last_page: None,
        }
    }

    /// Feed the final match result for the next page.
    ///
    /// Pages must arrive in strictly ascending index order.
    pub fn push(&mut self, result: &MatchResult, page: &PageRecord) {
        debug_assert_eq!(result.page_index, page.index);
        debug_assert!(self.last_page.map_or(true, |last| page.index > last));
        self.last_page = Some(page.index);

        let heading = result.heading();
        let transition = match &self.state {
            AssemblerState::SectionOpen(open) if open.heading.as_deref() == heading => {
                Transition::Append
            }
            AssemblerState::SectionOpen(open)
                if heading.is_none()
                    && open.heading.is_some()
                    && self.continuation == ContinuationPolicy::PrecedingSection =>
            {
                Transition::Continue
            }
            _ => Transition::Open,
        };

        match transition {
            Transition::Append | Transition::Continue => {
                if let AssemblerState::SectionOpen(open) = &mut self.state {
                    open.append(result, page);
                }
            }
            Transition::Open => {
                self.close();
                let mut open = OpenSection::new(heading.map(str::to_string));
                open.append(result, page);
                self.state = AssemblerState::SectionOpen(open);
            }
        }
    }

    fn close(&mut self) {
        let state = std::mem::replace(&mut self.state, AssemblerState::NoOpenSection);
        let AssemblerState::SectionOpen(open) = state else {
            return;
        };

        match open.heading {
            Some(ref heading) => {
                let match_type = open.match_type();
                self.sections.push(DocumentSection {
                    heading: heading.clone(),
                    pages: open.pages,
                    content: open.content,
                    confidence: open.confidence,
                    match_type,
                });
            }
            None => {
                self.others.pages.extend(open.pages);
                self.others.content.extend(open.content);
            }
        }
    }

    /// Close the open section and append "Others" if any page is unmatched.
    pub fn finish(mut self) -> Vec<DocumentSection> {
        self.close();
        if !self.others.pages.is_empty() {
            self.sections.push(DocumentSection {
                heading: OTHERS_HEADING.to_string(),
                pages: self.others.pages,
                content: self.others.content,
                confidence: 0,
                match_type: SectionMatchType::None,
            });
        }
        self.sections
    }
}

/// Assemble sections from results and pages that are both in ascending page
/// order and of equal length.
pub fn assemble_sections(
    results: &[MatchResult],
    pages: &[&PageRecord],
    continuation: ContinuationPolicy,
) -> Vec<DocumentSection> {
    let mut assembler = SectionAssembler::new(continuation);
    for (result, page) in results.iter().zip(pages) {
        assembler.push(result, page);
    }
    assembler.finish()
}
