//! Integration tests for classification and section assembly.

use docsplit::{
    classify_pages, Catalog, ContinuationPolicy, Error, MatchKind, PageRecord, SectionMatchType,
    SplitOptions, SplitterConfig,
};

fn layout(pages: &[PageRecord], options: SplitOptions) -> Vec<(String, Vec<usize>)> {
    classify_pages(pages, &Catalog::default(), options)
        .unwrap()
        .layout()
}

fn section(heading: &str, pages: &[usize]) -> (String, Vec<usize>) {
    (heading.to_string(), pages.to_vec())
}

#[test]
fn test_invoice_bundle_with_stray_page() {
    let pages = vec![
        PageRecord::new(0, ["COMMERCIAL INVOICE", "Invoice No. 4471", "Seller: ACME Metals"]),
        PageRecord::new(1, ["Commercial Invoice", "Continued from page 1"]),
        PageRecord::new(2, ["Lorem ipsum dolor sit amet", "Quantity 20 MT"]),
        PageRecord::new(3, ["Packing List", "Gross weight 21,400 kg"]),
    ];

    assert_eq!(
        layout(&pages, SplitOptions::default()),
        vec![
            section("Commercial Invoice", &[0, 1]),
            section("Packing List", &[3]),
            section("Others", &[2]),
        ]
    );
}

#[test]
fn test_alias_matches_in_exact_phase() {
    let pages = vec![PageRecord::new(0, ["ORIGIN CERTIFICATE", "Exporter: ACME"])];
    let outcome = classify_pages(&pages, &Catalog::default(), SplitOptions::default()).unwrap();

    let m = &outcome.matches[0];
    assert_eq!(m.kind, MatchKind::Exact);
    assert_eq!(m.document_type.as_deref(), Some("Certificate of Origin"));
    assert_eq!(m.confidence, 100);
    assert_eq!(outcome.sections[0].match_type, SectionMatchType::Exact);
}

#[test]
fn test_typo_matches_in_fuzzy_phase() {
    let pages = vec![
        PageRecord::new(0, ["Comercial Invoice"]),
        PageRecord::new(1, ["Insurance Polcy"]),
    ];
    let outcome = classify_pages(&pages, &Catalog::default(), SplitOptions::default()).unwrap();

    assert!(outcome.matches.iter().all(|m| m.kind == MatchKind::Fuzzy));
    assert_eq!(
        outcome.layout(),
        vec![
            section("Commercial Invoice", &[0]),
            section("Insurance Policy", &[1]),
        ]
    );
    assert_eq!(outcome.sections[0].confidence, 94);
    assert_eq!(outcome.sections[1].match_type, SectionMatchType::Fuzzy);
}

#[test]
fn test_fuzzy_threshold_can_reject_typos() {
    let pages = vec![PageRecord::new(0, ["Comercial Invoice"])];
    let options = SplitOptions::new().with_fuzzy_threshold(99);
    assert_eq!(layout(&pages, options), vec![section("Others", &[0])]);
}

#[test]
fn test_exact_only_types_are_never_fuzzy_matched() {
    let pages = vec![
        PageRecord::new(0, ["Form 6"]),
        PageRecord::new(1, ["FORM 9."]),
        PageRecord::new(2, ["Form 6X"]),
        PageRecord::new(3, ["Frm 9"]),
    ];
    let outcome = classify_pages(&pages, &Catalog::default(), SplitOptions::default()).unwrap();

    assert_eq!(outcome.matches[0].document_type.as_deref(), Some("Form 6"));
    assert_eq!(outcome.matches[0].kind, MatchKind::Exact);
    assert_eq!(outcome.matches[1].document_type.as_deref(), Some("Form 9"));
    assert_eq!(outcome.matches[2].kind, MatchKind::None);
    assert_eq!(outcome.matches[3].kind, MatchKind::None);
    assert_eq!(outcome.others_pages(), &[2, 3]);
}

#[test]
fn test_heading_outside_window_is_ignored() {
    let pages = vec![PageRecord::new(
        0,
        ["Ref 1", "Ref 2", "Ref 3", "Ref 4", "Ref 5", "Bill of Lading"],
    )];
    assert_eq!(
        layout(&pages, SplitOptions::default()),
        vec![section("Others", &[0])]
    );
    assert_eq!(
        layout(&pages, SplitOptions::new().with_window_lines(6)),
        vec![section("Bill of Lading", &[0])]
    );
}

#[test]
fn test_line_with_extra_tokens_loses_confidence() {
    let pages = vec![PageRecord::new(0, ["Original Bill of Lading No 7781"])];
    let outcome = classify_pages(&pages, &Catalog::default(), SplitOptions::default()).unwrap();

    // "original" "no" "7781" around the variant
    assert_eq!(outcome.matches[0].confidence, 85);
    assert_eq!(outcome.matches[0].kind, MatchKind::Exact);

    let strict = SplitOptions::new().with_min_confidence(90);
    let outcome = classify_pages(&pages, &Catalog::default(), strict).unwrap();
    assert_eq!(outcome.matches[0].kind, MatchKind::None);
    assert_eq!(outcome.layout(), vec![section("Others", &[0])]);
}

#[test]
fn test_strict_min_confidence_sends_noisy_headings_to_others() {
    let pages = vec![
        PageRecord::new(0, ["Commercial Invoice No"]),
        PageRecord::new(
            1,
            ["Please find attached the commercial invoice for the goods shipped"],
        ),
        PageRecord::new(2, ["Packing List"]),
    ];

    let outcome = classify_pages(&pages, &Catalog::default(), SplitOptions::default()).unwrap();
    assert_eq!(outcome.matches[0].kind, MatchKind::Exact);
    assert_eq!(outcome.matches[0].confidence, 95);
    assert_eq!(outcome.matches[1].kind, MatchKind::None);

    let strict = SplitOptions::new().with_min_confidence(100);
    let outcome = classify_pages(&pages, &Catalog::default(), strict).unwrap();
    assert_eq!(outcome.matches[0].kind, MatchKind::None);
    assert_eq!(outcome.matches[1].kind, MatchKind::None);
    assert_eq!(
        outcome.layout(),
        vec![section("Packing List", &[2]), section("Others", &[0, 1])]
    );
}

#[test]
fn test_more_extra_tokens_never_raise_confidence() {
    let lines = [
        "Commercial Invoice",
        "Commercial Invoice No",
        "Commercial Invoice No 4471",
        "Comercial Invoice",
        "Comercial Invoice No 4471 dated",
        "Original Commercial Invoice No 4471 dated 12 March",
    ];
    let pages: Vec<PageRecord> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| PageRecord::new(i, [*line]))
        .collect();

    for min_confidence in [0, 80, 100] {
        let options = SplitOptions::new()
            .with_min_confidence(min_confidence)
            .with_fuzzy_threshold(0);
        let outcome = classify_pages(&pages, &Catalog::default(), options).unwrap();
        let confidence: Vec<u8> = outcome.matches.iter().map(|m| m.confidence).collect();

        assert!(confidence[0] >= confidence[1]);
        assert!(confidence[1] >= confidence[2]);
        assert!(confidence[3] >= confidence[4]);
        assert!(confidence.iter().skip(1).all(|&c| c < 100), "{:?}", confidence);
    }
}

#[test]
fn test_continuation_pages_attach_when_enabled() {
    let pages = vec![
        PageRecord::new(0, ["Bill of Exchange"]),
        PageRecord::new(1, ["Terms and conditions"]),
        PageRecord::new(2, ["Packing List"]),
    ];

    assert_eq!(
        layout(&pages, SplitOptions::default()),
        vec![
            section("Bill of Exchange", &[0]),
            section("Packing List", &[2]),
            section("Others", &[1]),
        ]
    );
    assert_eq!(
        layout(
            &pages,
            SplitOptions::new().with_continuation(ContinuationPolicy::PrecedingSection)
        ),
        vec![
            section("Bill of Exchange", &[0, 1]),
            section("Packing List", &[2]),
        ]
    );
}

#[test]
fn test_unreadable_page_is_isolated() {
    let pages = vec![
        PageRecord::new(0, ["Packing List"]),
        PageRecord::unreadable(1),
        PageRecord::new(2, ["Packing List"]),
    ];
    let outcome = classify_pages(&pages, &Catalog::default(), SplitOptions::default()).unwrap();

    assert_eq!(outcome.page_failures.len(), 1);
    assert_eq!(outcome.page_failures[0].page, 1);
    assert_eq!(
        outcome.layout(),
        vec![
            section("Packing List", &[0]),
            section("Packing List", &[2]),
            section("Others", &[1]),
        ]
    );
}

#[test]
fn test_blank_page_goes_to_others() {
    let pages = vec![PageRecord::from_text(0, "   \n\n")];
    let outcome = classify_pages(&pages, &Catalog::default(), SplitOptions::default()).unwrap();
    assert!(outcome.page_failures.is_empty());
    assert_eq!(outcome.others_pages(), &[0]);
}

#[test]
fn test_empty_document_is_fatal() {
    let result = classify_pages(&[], &Catalog::default(), SplitOptions::default());
    let err = result.unwrap_err();
    assert!(matches!(err, Error::EmptyDocument));
    assert!(err.is_fatal());
}

#[test]
fn test_custom_catalog_from_config() {
    let config = SplitterConfig::from_json_str(
        r#"{
            "fuzzy_threshold": 85,
            "document_types": [
                {"name": "Delivery Note", "variants": ["Delivery Slip"]},
                {"name": "Weight Certificate"}
            ]
        }"#,
    )
    .unwrap();
    let (catalog, options) = config.resolve().unwrap();

    let pages = vec![
        PageRecord::new(0, ["DELIVERY SLIP"]),
        PageRecord::new(1, ["Weight Certficate"]),
        PageRecord::new(2, ["Commercial Invoice"]),
    ];
    let outcome = classify_pages(&pages, &catalog, options).unwrap();
    assert_eq!(
        outcome.layout(),
        vec![
            section("Delivery Note", &[0]),
            section("Weight Certificate", &[1]),
            section("Others", &[2]),
        ]
    );
}
