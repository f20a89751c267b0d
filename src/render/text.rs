//! Plain text rendering.

use std::fs;
use std::path::Path;

use crate::assemble::DocumentSection;
use crate::error::{Error, Result};

use super::{OutputFormat, SectionRenderer};

/// Writes the heading, a blank line, then one content line per line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer;

impl TextRenderer {
    /// Text written for a section.
    pub fn to_text(section: &DocumentSection) -> String {
        let mut output = String::with_capacity(section.heading.len() + 2);
        output.push_str(&section.heading);
        output.push_str("\n\n");
        for line in &section.content {
            output.push_str(line);
            output.push('\n');
        }
        output
    }
}

impl SectionRenderer for TextRenderer {
    fn format(&self) -> OutputFormat {
        OutputFormat::Txt
    }

    fn render(&self, section: &DocumentSection, path: &Path) -> Result<()> {
        fs::write(path, Self::to_text(section)).map_err(|e| Error::render(&section.heading, e))
    }
}
