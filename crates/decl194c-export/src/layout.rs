use decl194c_core::{BlockKind, Declaration, TextBlock};
use decl194c_core::render::SIGNATURE_ROWS;

use crate::errors::ExportResult;
use crate::geometry::PageGeometry;
use crate::metrics::text_width_mm;

// Vertical spacing in millimetres between blocks.
const TO_ADVANCE_MM: f32 = 8.0;
const SALUTATION_GAP_MM: f32 = 10.0;
const TITLE_ADVANCE_MM: f32 = 15.0;
const OPENING_GAP_MM: f32 = 8.0;
const POINT_GAP_MM: f32 = 5.0;
const BEFORE_HEADING_GAP_MM: f32 = 10.0;
const HEADING_ADVANCE_MM: f32 = 10.0;
const VERIFICATION_GAP_MM: f32 = 15.0;
const PLACE_DATE_ADVANCE_MM: f32 = 30.0;
const SEAL_ADVANCE_MM: f32 = 15.0;
const ROUNDING_MM: f32 = 0.01;

// Horizontal offsets measured from the right margin.
const DATE_COLUMN_MM: f32 = 50.0;
const SIGNATURE_COLUMN_MM: f32 = 60.0;
const SEAL_COLUMN_MM: f32 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Regular,
    Bold,
}

/// One line of text at a fixed position. `y_mm` is the baseline measured
/// from the top edge of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub x_mm: f32,
    pub y_mm: f32,
    pub size_pt: f32,
    pub style: FontStyle,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub lines: Vec<PlacedLine>,
}

struct Cursor<'g> {
    geometry: &'g PageGeometry,
    pages: Vec<Page>,
    y_mm: f32,
}

impl<'g> Cursor<'g> {
    fn new(geometry: &'g PageGeometry) -> Self {
        Self {
            geometry,
            pages: vec![Page::default()],
            y_mm: geometry.margin_mm,
        }
    }

    fn ensure_room(&mut self) {
        if self.y_mm > self.geometry.bottom_limit_mm() {
            self.break_page();
        }
    }

    /// Start a new page unless `height_mm` still fits below the cursor.
    /// Rows are placed by repeated addition, so the check leaves a small
    /// allowance for rounding.
    fn keep_together(&mut self, height_mm: f32) {
        let at_top = self.y_mm <= self.geometry.margin_mm;
        if !at_top && self.y_mm + height_mm + ROUNDING_MM > self.geometry.bottom_limit_mm() {
            self.break_page();
        }
    }

    fn break_page(&mut self) {
        self.pages.push(Page::default());
        self.y_mm = self.geometry.margin_mm;
        tracing::debug!(event = "page_break", page = self.pages.len());
    }

    fn place(&mut self, x_mm: f32, size_pt: f32, style: FontStyle, text: impl Into<String>) {
        self.ensure_room();
        let line = PlacedLine {
            x_mm,
            y_mm: self.y_mm,
            size_pt,
            style,
            text: text.into(),
        };
        if let Some(page) = self.pages.last_mut() {
            page.lines.push(line);
        }
    }

    fn advance(&mut self, mm: f32) {
        self.y_mm += mm;
    }

    fn wrapped(&mut self, x_mm: f32, width_mm: f32, size_pt: f32, text: &str) {
        for line in wrap_text(text, width_mm, size_pt) {
            self.place(x_mm, size_pt, FontStyle::Regular, line);
            self.advance(self.geometry.line_height_mm);
        }
    }
}

/// Place every block of `declaration` onto A4-style pages.
pub fn lay_out(declaration: &Declaration, geometry: &PageGeometry) -> ExportResult<Vec<Page>> {
    geometry.validate()?;

    let mut cursor = Cursor::new(geometry);
    let left = geometry.margin_mm;
    let width = geometry.content_width_mm();
    let body = geometry.body_size_pt;

    for (idx, block) in declaration.blocks.iter().enumerate() {
        let next = declaration.blocks.get(idx + 1).map(|b| b.kind);
        match block.kind {
            BlockKind::Salutation => {
                let mut lines = block.lines.iter();
                if let Some(first) = lines.next() {
                    cursor.place(left, geometry.salutation_size_pt, FontStyle::Regular, first);
                    cursor.advance(TO_ADVANCE_MM);
                }
                for line in lines {
                    cursor.wrapped(left, width, body, line);
                }
                cursor.advance(SALUTATION_GAP_MM);
            }
            BlockKind::Title => {
                for line in &block.lines {
                    let text_width = text_width_mm(line, geometry.title_size_pt);
                    let x = ((geometry.width_mm - text_width) / 2.0).max(left);
                    cursor.place(x, geometry.title_size_pt, FontStyle::Bold, line);
                    cursor.advance(TITLE_ADVANCE_MM);
                }
            }
            BlockKind::Paragraph => {
                for line in &block.lines {
                    cursor.wrapped(left, width, body, line);
                }
                if next == Some(BlockKind::PlaceDate) {
                    cursor.advance(VERIFICATION_GAP_MM);
                } else {
                    cursor.advance(OPENING_GAP_MM);
                }
            }
            BlockKind::Point => {
                for line in &block.lines {
                    cursor.wrapped(left, width - geometry.point_inset_mm, body, line);
                }
                cursor.advance(POINT_GAP_MM);
                if next == Some(BlockKind::Heading) {
                    cursor.advance(BEFORE_HEADING_GAP_MM);
                }
            }
            BlockKind::Heading => {
                for line in &block.lines {
                    cursor.place(left, body, FontStyle::Bold, line);
                    cursor.advance(HEADING_ADVANCE_MM);
                }
            }
            BlockKind::PlaceDate => lay_out_place_date(&mut cursor, block),
            BlockKind::Signature => lay_out_signature(&mut cursor, block),
        }
    }

    Ok(cursor.pages)
}

// Place on the left, date in a right-hand column on the same row.
fn lay_out_place_date(cursor: &mut Cursor<'_>, block: &TextBlock) {
    let geometry = cursor.geometry;
    let body = geometry.body_size_pt;
    let date_x = geometry.width_mm - geometry.margin_mm - DATE_COLUMN_MM;
    let place_width = date_x - geometry.margin_mm - 5.0;

    let place_lines = block
        .lines
        .first()
        .map(|line| wrap_text(line, place_width, body))
        .unwrap_or_default();

    if let Some(date) = block.lines.get(1) {
        cursor.place(date_x, body, FontStyle::Regular, date.as_str());
    }
    for (row, line) in place_lines.into_iter().enumerate() {
        if row > 0 {
            cursor.advance(geometry.line_height_mm);
        }
        cursor.place(geometry.margin_mm, body, FontStyle::Regular, line);
    }
    cursor.advance(PLACE_DATE_ADVANCE_MM);
}

// The signature block is never split across pages. A line past the fixed
// signature rows is the seal line, set lower in its own column.
fn lay_out_signature(cursor: &mut Cursor<'_>, block: &TextBlock) {
    let geometry = cursor.geometry;
    let body = geometry.body_size_pt;
    let right = geometry.width_mm - geometry.margin_mm;

    let mut rows = 0usize;
    let mut extra_mm = 0.0;
    for (idx, line) in block.lines.iter().enumerate() {
        let (_, column) = signature_column(idx, right);
        rows += wrap_text(line, column, body).len();
        if idx == SIGNATURE_ROWS {
            extra_mm += SEAL_ADVANCE_MM - geometry.line_height_mm;
        }
    }
    let height = rows.saturating_sub(1) as f32 * geometry.line_height_mm + extra_mm;
    cursor.keep_together(height);

    for (idx, line) in block.lines.iter().enumerate() {
        if idx == SIGNATURE_ROWS {
            cursor.advance(SEAL_ADVANCE_MM - geometry.line_height_mm);
        }
        let (x, column) = signature_column(idx, right);
        cursor.wrapped(x, column, body, line);
    }
}

fn signature_column(idx: usize, right_mm: f32) -> (f32, f32) {
    if idx >= SIGNATURE_ROWS {
        (right_mm - SEAL_COLUMN_MM, SEAL_COLUMN_MM)
    } else {
        (right_mm - SIGNATURE_COLUMN_MM, SIGNATURE_COLUMN_MM)
    }
}

/// Greedy word wrap of `text` to `width_mm` at `size_pt`.
///
/// Embedded newlines start a new line. Words wider than the line are split
/// between characters. Empty input yields one empty line.
pub fn wrap_text(text: &str, width_mm: f32, size_pt: f32) -> Vec<String> {
    let mut out = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if text_width_mm(&candidate, size_pt) <= width_mm {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
            }
            if text_width_mm(word, size_pt) <= width_mm {
                current = word.to_string();
            } else {
                let mut pieces = split_long_word(word, width_mm, size_pt);
                current = pieces.pop().unwrap_or_default();
                out.extend(pieces);
            }
        }
        out.push(current);
    }
    out
}

fn split_long_word(word: &str, width_mm: f32, size_pt: f32) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in word.chars() {
        current.push(ch);
        if text_width_mm(&current, size_pt) > width_mm && current.chars().count() > 1 {
            current.pop();
            pieces.push(std::mem::take(&mut current));
            current.push(ch);
        }
    }
    pieces.push(current);
    pieces
}
