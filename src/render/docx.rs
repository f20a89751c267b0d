//! Word document rendering.

use std::fs::File;
use std::path::Path;

use docx_rs::{Docx, Paragraph, Run};

use crate::assemble::DocumentSection;
use crate::error::{Error, Result};

use super::{OutputFormat, SectionRenderer};

/// Heading size in half-points.
const HEADING_SIZE: usize = 32;

/// Writes a bold heading paragraph followed by one paragraph per content line.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxRenderer;

impl DocxRenderer {
    fn build(section: &DocumentSection) -> Docx {
        let heading = Paragraph::new().add_run(
            Run::new()
                .add_text(section.heading.as_str())
                .bold()
                .size(HEADING_SIZE),
        );

        section
            .content
            .iter()
            .fold(Docx::new().add_paragraph(heading), |docx, line| {
                docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(line.as_str())))
            })
    }
}

impl SectionRenderer for DocxRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Docx
    }

    fn render(&self, section: &DocumentSection, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|e| Error::render(&section.heading, e))?;
        Self::build(section)
            .build()
            .pack(file)
            .map_err(|e| Error::render(&section.heading, e))
    }
}
