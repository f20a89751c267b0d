//! Integration tests for section rendering.

use std::fs;
use std::path::Path;

use docsplit::{
    render_sections, DocumentSection, DocxRenderer, Error, OutputFormat, Result,
    SectionMatchType, SectionRenderer, TextRenderer,
};
use tempfile::tempdir;

/// Renderer that fails for one heading and writes the heading otherwise.
struct FailingRenderer {
    fail_on: &'static str,
}

impl SectionRenderer for FailingRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Txt
    }

    fn render(&self, section: &DocumentSection, path: &Path) -> Result<()> {
        if section.heading == self.fail_on {
            return Err(Error::Render {
                heading: section.heading.clone(),
                reason: "simulated failure".into(),
            });
        }
        fs::write(path, &section.heading)?;
        Ok(())
    }
}

fn section(heading: &str, pages: &[usize], content: &[&str]) -> DocumentSection {
    DocumentSection {
        heading: heading.to_string(),
        pages: pages.to_vec(),
        content: content.iter().map(|s| s.to_string()).collect(),
        confidence: 100,
        match_type: SectionMatchType::Exact,
    }
}

fn others(pages: &[usize]) -> DocumentSection {
    DocumentSection {
        heading: "Others".to_string(),
        pages: pages.to_vec(),
        content: vec!["stray page".to_string()],
        confidence: 0,
        match_type: SectionMatchType::None,
    }
}

#[test]
fn test_render_failure_does_not_stop_other_sections() {
    let dir = tempdir().unwrap();
    let sections = vec![
        section("Commercial Invoice", &[0], &["Commercial Invoice"]),
        section("Packing List", &[1], &["Packing List"]),
        others(&[2]),
    ];

    let rendered = render_sections(
        &sections,
        &FailingRenderer {
            fail_on: "Packing List",
        },
        dir.path(),
        "bundle",
    );

    assert_eq!(rendered.len(), 3);
    assert!(rendered[0].is_written());
    assert!(!rendered[1].is_written());
    assert!(rendered[1]
        .error
        .as_deref()
        .unwrap()
        .contains("simulated failure"));
    assert!(rendered[2].is_written());

    assert!(dir.path().join("bundle_Commercial_Invoice.txt").exists());
    assert!(!dir.path().join("bundle_Packing_List.txt").exists());
    assert!(dir.path().join("bundle_Others.txt").exists());
}

#[test]
fn test_repeated_headings_get_numbered_files() {
    let dir = tempdir().unwrap();
    let sections = vec![
        section("Bill of Lading", &[0], &["Bill of Lading", "B/L 1"]),
        others(&[1]),
        section("Bill of Lading", &[2], &["Bill of Lading", "B/L 2"]),
    ];

    let rendered = render_sections(&sections, &TextRenderer, dir.path(), "shipment");
    let names: Vec<String> = rendered
        .iter()
        .map(|r| r.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();

    assert_eq!(
        names,
        vec![
            "shipment_Bill_of_Lading.txt",
            "shipment_Others.txt",
            "shipment_Bill_of_Lading_2.txt",
        ]
    );

    let second = fs::read_to_string(dir.path().join("shipment_Bill_of_Lading_2.txt")).unwrap();
    assert_eq!(second, "Bill of Lading\n\nBill of Lading\nB/L 2\n");
}

#[test]
fn test_text_renderer_writes_heading_then_content() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.txt");
    let section = section(
        "Packing List",
        &[3, 4],
        &["Packing List", "Item | Qty", "Copper scrap | 20"],
    );

    TextRenderer.render(&section, &path).unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Packing List");
    assert_eq!(lines[1], "");
    assert_eq!(&lines[2..], &["Packing List", "Item | Qty", "Copper scrap | 20"]);
}

#[test]
fn test_docx_renderer_writes_zip_package() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.docx");
    let section = section("Insurance Policy", &[0], &["Insurance Policy", "Policy No. 99"]);

    DocxRenderer.render(&section, &path).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert!(bytes.len() > 4);
    assert_eq!(&bytes[..2], b"PK");
}

#[test]
fn test_unwritable_target_is_render_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing").join("out.txt");
    let section = section("Packing List", &[0], &["Packing List"]);

    let err = TextRenderer.render(&section, &path).unwrap_err();
    assert!(matches!(err, Error::Render { ref heading, .. } if heading == "Packing List"));
    assert!(!err.is_fatal());
}
