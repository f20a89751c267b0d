//! Property-based tests for the classification pipeline
//!
//! Documents are generated from a pool of catalog headings (some with typos)
//! and filler lines that never resemble a heading.

use std::collections::BTreeSet;

use docsplit::{classify_pages, Catalog, MatchKind, PageRecord, SplitOptions};
use proptest::prelude::*;

const HEADINGS: &[&str] = &[
    "COMMERCIAL INVOICE",
    "Comercial Invoice",
    "Packing List",
    "Packing Lst",
    "Bill of Lading",
    "Original Bill of Lading No 7781",
    "Insurance Polcy",
    "ORIGIN CERTIFICATE",
    "Chemical Analysis Report",
    "Form 6",
    "Form 9",
    "Form 6X",
    "Transboundary Movement Document",
];

const FILLER: &[&str] = &[
    "Quantity 20 MT",
    "Lorem ipsum dolor",
    "Signature",
    "Page 2 of 3",
    "Gross weight 21,400 kg",
];

/// Generate one page: an optional heading followed by filler lines
fn page_lines_strategy() -> impl Strategy<Value = Vec<&'static str>> {
    (
        prop::option::of(prop::sample::select(HEADINGS)),
        prop::collection::vec(prop::sample::select(FILLER), 0..4),
    )
        .prop_map(|(heading, filler)| heading.into_iter().chain(filler).collect())
}

/// Generate a document of 1 to 24 pages
fn document_strategy() -> impl Strategy<Value = Vec<PageRecord>> {
    prop::collection::vec(page_lines_strategy(), 1..25).prop_map(|pages| {
        pages
            .into_iter()
            .enumerate()
            .map(|(index, lines)| PageRecord::new(index, lines))
            .collect()
    })
}

/// Generate a document with filler lines only
fn filler_document_strategy() -> impl Strategy<Value = Vec<PageRecord>> {
    prop::collection::vec(prop::collection::vec(prop::sample::select(FILLER), 0..4), 1..25)
        .prop_map(|pages| {
            pages
                .into_iter()
                .enumerate()
                .map(|(index, lines)| PageRecord::new(index, lines))
                .collect()
        })
}

#[cfg(test)]
mod proptest_tests {
    use super::*;

    proptest! {
        #[test]
        fn test_every_page_lands_in_exactly_one_section(pages in document_strategy()) {
            let outcome = classify_pages(&pages, &Catalog::default(), SplitOptions::default()).unwrap();

            let mut seen = Vec::new();
            for section in &outcome.sections {
                seen.extend(section.pages.iter().copied());
            }
            seen.sort_unstable();
            let expected: Vec<usize> = (0..pages.len()).collect();
            prop_assert_eq!(seen, expected);
        }

        #[test]
        fn test_section_pages_strictly_increasing(pages in document_strategy()) {
            let outcome = classify_pages(&pages, &Catalog::default(), SplitOptions::default()).unwrap();

            for section in &outcome.sections {
                prop_assert!(!section.pages.is_empty());
                prop_assert!(section.pages.windows(2).all(|w| w[0] < w[1]));
            }
        }

        #[test]
        fn test_others_is_last_and_unique(pages in document_strategy()) {
            let outcome = classify_pages(&pages, &Catalog::default(), SplitOptions::default()).unwrap();

            let others: Vec<usize> = outcome
                .sections
                .iter()
                .enumerate()
                .filter(|(_, s)| s.is_others())
                .map(|(i, _)| i)
                .collect();
            prop_assert!(others.len() <= 1);
            if let Some(&position) = others.first() {
                prop_assert_eq!(position, outcome.sections.len() - 1);
            }
        }

        #[test]
        fn test_parallel_and_sequential_agree(pages in document_strategy()) {
            let catalog = Catalog::default();
            let parallel = classify_pages(&pages, &catalog, SplitOptions::default()).unwrap();
            let sequential = classify_pages(&pages, &catalog, SplitOptions::new().sequential()).unwrap();

            prop_assert_eq!(&parallel.matches, &sequential.matches);
            prop_assert_eq!(&parallel.sections, &sequential.sections);
        }

        #[test]
        fn test_repeated_runs_agree(pages in document_strategy()) {
            let catalog = Catalog::default();
            let first = classify_pages(&pages, &catalog, SplitOptions::default()).unwrap();
            let second = classify_pages(&pages, &catalog, SplitOptions::default()).unwrap();
            prop_assert_eq!(first.layout(), second.layout());
        }

        #[test]
        fn test_raising_fuzzy_threshold_never_adds_matches(
            pages in document_strategy(),
            low in 50u8..=100,
            delta in 0u8..=50,
        ) {
            let high = low.saturating_add(delta).min(100);
            let catalog = Catalog::default();
            let loose = classify_pages(&pages, &catalog, SplitOptions::new().with_fuzzy_threshold(low)).unwrap();
            let strict = classify_pages(&pages, &catalog, SplitOptions::new().with_fuzzy_threshold(high)).unwrap();

            prop_assert!(strict.count(MatchKind::Fuzzy) <= loose.count(MatchKind::Fuzzy));

            let loose_fuzzy: BTreeSet<usize> = loose
                .matches
                .iter()
                .filter(|m| m.kind == MatchKind::Fuzzy)
                .map(|m| m.page_index)
                .collect();
            for m in strict.matches.iter().filter(|m| m.kind == MatchKind::Fuzzy) {
                prop_assert!(loose_fuzzy.contains(&m.page_index));
            }
        }

        #[test]
        fn test_raising_min_confidence_never_adds_matches(
            pages in document_strategy(),
            low in 0u8..=100,
            delta in 0u8..=100,
        ) {
            let high = low.saturating_add(delta).min(100);
            let catalog = Catalog::default();
            let loose = classify_pages(&pages, &catalog, SplitOptions::new().with_min_confidence(low)).unwrap();
            let strict = classify_pages(&pages, &catalog, SplitOptions::new().with_min_confidence(high)).unwrap();

            for (l, s) in loose.matches.iter().zip(&strict.matches) {
                if s.is_match() {
                    prop_assert!(l.is_match());
                }
                if s.kind == MatchKind::Exact {
                    prop_assert_eq!(l.kind, MatchKind::Exact);
                }
            }
        }

        #[test]
        fn test_exact_only_types_never_fuzzy(pages in document_strategy()) {
            let outcome = classify_pages(&pages, &Catalog::default(), SplitOptions::default()).unwrap();

            for (page, m) in pages.iter().zip(&outcome.matches) {
                let first_line = page.lines.as_ref().and_then(|l| l.first()).map(String::as_str);
                match first_line {
                    Some("Form 6") | Some("Form 9") => {
                        prop_assert_eq!(m.kind, MatchKind::Exact);
                        prop_assert_eq!(m.document_type.as_deref(), first_line);
                    }
                    _ => {}
                }
                if m.kind == MatchKind::Fuzzy {
                    let heading = m.document_type.as_deref();
                    prop_assert!(heading != Some("Form 6") && heading != Some("Form 9"));
                }
            }
        }

        #[test]
        fn test_no_headings_means_single_others_section(pages in filler_document_strategy()) {
            let outcome = classify_pages(&pages, &Catalog::default(), SplitOptions::default()).unwrap();

            prop_assert_eq!(outcome.sections.len(), 1);
            prop_assert!(outcome.sections[0].is_others());
            prop_assert_eq!(outcome.sections[0].pages.len(), pages.len());
        }
    }
}
