//! Table detection from text positions.
//!
//! Tables are found without looking at ruling lines: text spans are grouped
//! into rows by their baseline, column edges are taken from left edges that
//! line up across rows, and runs of consecutive aligned rows become a
//! [`PageTable`].

use std::collections::{BTreeMap, HashMap, HashSet};

use lopdf::content::Content;
use lopdf::{Document as LopdfDocument, Encoding, Object, ObjectId};

use crate::error::Result;

use super::PageTable;

/// Width of the buckets left edges are snapped to, in points.
const EDGE_BUCKET: f32 = 5.0;

/// A run of text drawn at one position.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSpan {
    /// Left edge (user space)
    pub x: f32,
    /// Baseline (user space, grows upwards)
    pub y: f32,
    /// Font size from the last `Tf`
    pub font_size: f32,
    /// Decoded text
    pub text: String,
}

/// Collect positioned text spans from a page's content stream.
///
/// Only the text matrix is tracked (`BT`, `Td`, `TD`, `Tm`, `T*`, `TL`).
/// Consecutive show operators without a move in between extend the
/// previous span.
pub fn collect_spans(doc: &LopdfDocument, page_id: ObjectId) -> Result<Vec<TextSpan>> {
    let encodings: BTreeMap<Vec<u8>, Encoding> = doc
        .get_page_fonts(page_id)?
        .into_iter()
        .map(|(name, font)| font.get_font_encoding(doc).map(|e| (name, e)))
        .collect::<std::result::Result<_, _>>()?;
    let content = Content::decode(&doc.get_page_content(page_id)?)?;

    let mut spans: Vec<TextSpan> = Vec::new();
    let mut encoding = None;
    let mut font_size = 12.0;
    let mut leading = 0.0;
    let (mut line_x, mut line_y) = (0.0f32, 0.0f32);
    let mut moved = true;

    for op in &content.operations {
        let number = |i: usize| op.operands.get(i).and_then(|o| o.as_float().ok());
        match op.operator.as_str() {
            "BT" => {
                line_x = 0.0;
                line_y = 0.0;
                moved = true;
            }
            "Tf" => {
                encoding = op
                    .operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .and_then(|name| encodings.get(name));
                font_size = number(1).unwrap_or(font_size);
            }
            "TL" => leading = number(0).unwrap_or(leading),
            "Td" | "TD" => {
                let (tx, ty) = (number(0).unwrap_or(0.0), number(1).unwrap_or(0.0));
                if op.operator == "TD" {
                    leading = -ty;
                }
                line_x += tx;
                line_y += ty;
                moved = true;
            }
            "Tm" => {
                line_x = number(4).unwrap_or(0.0);
                line_y = number(5).unwrap_or(0.0);
                moved = true;
            }
            "T*" => {
                line_y -= leading;
                moved = true;
            }
            "Tj" | "TJ" | "'" | "\"" => {
                if op.operator != "Tj" && op.operator != "TJ" {
                    line_y -= leading;
                    moved = true;
                }
                let Some(encoding) = encoding else {
                    continue;
                };
                let mut text = String::new();
                decode_operands(encoding, &op.operands, &mut text);
                if text.trim().is_empty() {
                    continue;
                }
                match spans.last_mut() {
                    Some(last) if !moved => last.text.push_str(&text),
                    _ => spans.push(TextSpan {
                        x: line_x,
                        y: line_y,
                        font_size,
                        text,
                    }),
                }
                moved = false;
            }
            _ => {}
        }
    }

    Ok(spans)
}

fn decode_operands(encoding: &Encoding, operands: &[Object], text: &mut String) {
    for operand in operands {
        match operand {
            Object::String(bytes, _) => {
                if let Ok(decoded) = LopdfDocument::decode_text(encoding, bytes) {
                    text.push_str(&decoded);
                }
            }
            Object::Array(items) => decode_operands(encoding, items, text),
            Object::Integer(i) if *i < -100 => text.push(' '),
            _ => {}
        }
    }
}

/// Table detector configuration.
#[derive(Debug, Clone)]
pub struct TableDetectorConfig {
    /// Minimum number of rows to consider as table
    pub min_rows: usize,
    /// Minimum number of columns to consider as table
    pub min_columns: usize,
    /// Maximum number of columns (above this, likely word-level splitting)
    pub max_columns: usize,
    /// Y tolerance for grouping spans into rows (fraction of font size)
    pub y_tolerance_factor: f32,
    /// Minimum column alignment ratio (0.0-1.0)
    pub min_alignment_ratio: f32,
    /// Minimum gap between columns (points)
    pub min_column_gap: f32,
}

impl Default for TableDetectorConfig {
    fn default() -> Self {
        Self {
            min_rows: 2,
            min_columns: 2,
            max_columns: 8,
            y_tolerance_factor: 0.4,
            min_alignment_ratio: 0.5,
            min_column_gap: 15.0,
        }
    }
}

/// Detects tables in a page's text spans.
#[derive(Debug, Clone, Default)]
pub struct TableDetector {
    config: TableDetectorConfig,
}

struct SpanRow<'a> {
    y: f32,
    spans: Vec<&'a TextSpan>,
}

impl TableDetector {
    /// Create a detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom configuration.
    pub fn with_config(config: TableDetectorConfig) -> Self {
        Self { config }
    }

    /// Detect tables in reading order.
    pub fn detect(&self, spans: &[TextSpan]) -> Vec<PageTable> {
        if spans.len() < self.config.min_rows * self.config.min_columns {
            return Vec::new();
        }

        let rows = self.group_into_rows(spans);
        let columns = self.detect_columns(&rows);
        if columns.len() < self.config.min_columns {
            log::debug!("TableDetector: {} column edges, no table", columns.len());
            return Vec::new();
        }

        let mut tables = Vec::new();
        for (start, end) in self.find_table_regions(&rows, &columns) {
            let region = &rows[start..=end];
            let region_columns = self.detect_columns(region);
            if region_columns.len() < self.config.min_columns
                || region_columns.len() > self.config.max_columns
            {
                log::debug!(
                    "TableDetector: skipping region with {} columns",
                    region_columns.len()
                );
                continue;
            }
            tables.push(Self::build_table(region, &region_columns));
        }

        log::debug!("TableDetector: found {} tables", tables.len());
        tables
    }

    /// Group spans into rows, top of the page first.
    fn group_into_rows<'a>(&self, spans: &'a [TextSpan]) -> Vec<SpanRow<'a>> {
        let mut sorted: Vec<&TextSpan> = spans.iter().collect();
        sorted.sort_by(|a, b| b.y.total_cmp(&a.y).then(a.x.total_cmp(&b.x)));

        let mut rows: Vec<SpanRow<'a>> = Vec::new();
        for span in sorted {
            let tolerance = span.font_size * self.config.y_tolerance_factor;
            match rows.last_mut() {
                Some(row) if (row.y - span.y).abs() <= tolerance => row.spans.push(span),
                _ => rows.push(SpanRow {
                    y: span.y,
                    spans: vec![span],
                }),
            }
        }

        for row in &mut rows {
            row.spans.sort_by(|a, b| a.x.total_cmp(&b.x));
        }
        rows
    }

    /// Left edges shared by enough multi-span rows, merged by minimum gap.
    fn detect_columns(&self, rows: &[SpanRow<'_>]) -> Vec<f32> {
        let multi_span_rows: Vec<&SpanRow<'_>> =
            rows.iter().filter(|r| r.spans.len() >= 2).collect();
        if multi_span_rows.len() < self.config.min_rows {
            return Vec::new();
        }

        let mut edge_counts: HashMap<i32, usize> = HashMap::new();
        for row in &multi_span_rows {
            let buckets: HashSet<i32> = row
                .spans
                .iter()
                .map(|s| (s.x / EDGE_BUCKET).round() as i32)
                .collect();
            for bucket in buckets {
                *edge_counts.entry(bucket).or_insert(0) += 1;
            }
        }

        let min_occurrences = ((multi_span_rows.len() as f32 * self.config.min_alignment_ratio)
            as usize)
            .max(2);
        let mut edges: Vec<f32> = edge_counts
            .into_iter()
            .filter(|(_, count)| *count >= min_occurrences)
            .map(|(bucket, _)| bucket as f32 * EDGE_BUCKET)
            .collect();
        edges.sort_by(f32::total_cmp);

        let mut merged: Vec<f32> = Vec::new();
        for edge in edges {
            match merged.last() {
                Some(&last) if edge - last < self.config.min_column_gap => {}
                _ => merged.push(edge),
            }
        }
        merged
    }

    /// Runs of consecutive rows with at least two spans on column edges.
    fn find_table_regions(&self, rows: &[SpanRow<'_>], columns: &[f32]) -> Vec<(usize, usize)> {
        let mut regions = Vec::new();
        let mut start: Option<usize> = None;

        for (i, row) in rows.iter().enumerate() {
            if self.is_table_row(row, columns) {
                start.get_or_insert(i);
                continue;
            }
            if let Some(s) = start.take() {
                if i - s >= self.config.min_rows {
                    regions.push((s, i - 1));
                }
            }
        }
        if let Some(s) = start {
            if rows.len() - s >= self.config.min_rows {
                regions.push((s, rows.len() - 1));
            }
        }
        regions
    }

    fn is_table_row(&self, row: &SpanRow<'_>, columns: &[f32]) -> bool {
        if row.spans.len() < 2 {
            return false;
        }
        let aligned = row
            .spans
            .iter()
            .filter(|s| columns.iter().any(|c| (s.x - c).abs() <= EDGE_BUCKET))
            .count();
        aligned as f32 / row.spans.len() as f32 >= self.config.min_alignment_ratio
    }

    /// Assign every span to the last column edge at or left of it.
    fn build_table(rows: &[SpanRow<'_>], columns: &[f32]) -> PageTable {
        let table_rows = rows
            .iter()
            .map(|row| {
                let mut cells = vec![String::new(); columns.len()];
                for span in &row.spans {
                    let column = columns
                        .iter()
                        .rposition(|&c| span.x >= c - EDGE_BUCKET)
                        .unwrap_or(0);
                    let cell = &mut cells[column];
                    if !cell.is_empty() {
                        cell.push(' ');
                    }
                    cell.push_str(span.text.trim());
                }
                cells
            })
            .collect();
        PageTable::new(table_rows)
    }
}
