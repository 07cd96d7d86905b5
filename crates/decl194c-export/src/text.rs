use std::io::Write;

use decl194c_core::Declaration;

use crate::errors::ExportResult;
use crate::geometry::PageGeometry;
use crate::layout::{Page, lay_out};
use crate::{CountingWriter, ExportFormat, Exporter};

/// Characters across the content width of a text page.
pub const TEXT_COLUMNS: usize = 80;

/// Plain UTF-8 rendition of the page layout. Pages are separated by a form
/// feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextExporter;

impl Exporter for TextExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Text
    }

    fn export(
        &self,
        declaration: &Declaration,
        geometry: &PageGeometry,
        out: &mut dyn Write,
    ) -> ExportResult<u64> {
        let pages = lay_out(declaration, geometry)?;
        let mut writer = CountingWriter::new(out);
        for (idx, page) in pages.iter().enumerate() {
            if idx > 0 {
                writer.write_all(b"\x0c\n")?;
            }
            for row in page_rows(page, geometry) {
                writeln!(writer, "{}", row.trim_end())?;
            }
        }
        writer.flush()?;
        Ok(writer.bytes_written())
    }
}

fn page_rows(page: &Page, geometry: &PageGeometry) -> Vec<String> {
    let mm_per_col = geometry.content_width_mm() / TEXT_COLUMNS as f32;
    let mut rows: Vec<String> = Vec::new();
    let mut last_y: Option<f32> = None;

    let mut lines: Vec<_> = page.lines.iter().collect();
    lines.sort_by(|a, b| a.y_mm.total_cmp(&b.y_mm).then(a.x_mm.total_cmp(&b.x_mm)));

    for line in lines {
        let same_row = last_y.is_some_and(|y| (y - line.y_mm).abs() < 0.01);
        if !same_row {
            if let Some(y) = last_y {
                let gap = ((line.y_mm - y) / geometry.line_height_mm).round() as usize;
                for _ in 1..gap {
                    rows.push(String::new());
                }
            }
            rows.push(String::new());
            last_y = Some(line.y_mm);
        }

        let column = ((line.x_mm - geometry.margin_mm) / mm_per_col).round().max(0.0) as usize;
        if let Some(row) = rows.last_mut() {
            let used = row.chars().count();
            if used < column {
                row.push_str(&" ".repeat(column - used));
            } else if used > 0 {
                row.push(' ');
            }
            row.push_str(&line.text);
        }
    }

    rows
}
