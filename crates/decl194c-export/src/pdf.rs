use std::fmt::Write as _;
use std::io::Write;

use decl194c_core::Declaration;

use crate::errors::ExportResult;
use crate::geometry::PageGeometry;
use crate::layout::{FontStyle, Page, lay_out};
use crate::{CountingWriter, ExportFormat, Exporter};

const MM_TO_PT: f32 = 72.0 / 25.4;

// Fixed object numbers; page objects follow in pairs (page, content).
const CATALOG_ID: usize = 1;
const PAGES_ID: usize = 2;
const FONT_REGULAR_ID: usize = 3;
const FONT_BOLD_ID: usize = 4;
const INFO_ID: usize = 5;
const FIRST_PAGE_ID: usize = 6;

/// Writes a single PDF 1.4 file using the base-14 Helvetica fonts, so no
/// font data is embedded.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExporter;

impl Exporter for PdfExporter {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn export(
        &self,
        declaration: &Declaration,
        geometry: &PageGeometry,
        out: &mut dyn Write,
    ) -> ExportResult<u64> {
        let pages = lay_out(declaration, geometry)?;
        let bytes = write_pdf(&pages, geometry, out)?;
        tracing::debug!(event = "pdf_written", pages = pages.len(), bytes = bytes);
        Ok(bytes)
    }
}

fn write_pdf(pages: &[Page], geometry: &PageGeometry, out: &mut dyn Write) -> ExportResult<u64> {
    let mut writer = CountingWriter::new(out);
    let object_count = FIRST_PAGE_ID - 1 + pages.len() * 2;
    let mut offsets = vec![0u64; object_count + 1];

    writer.write_all(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")?;

    let kids = (0..pages.len())
        .map(|idx| format!("{} 0 R", page_id(idx)))
        .collect::<Vec<_>>()
        .join(" ");

    write_object(
        &mut writer,
        &mut offsets,
        CATALOG_ID,
        &format!("<< /Type /Catalog /Pages {PAGES_ID} 0 R >>"),
    )?;
    write_object(
        &mut writer,
        &mut offsets,
        PAGES_ID,
        &format!("<< /Type /Pages /Kids [{kids}] /Count {} >>", pages.len()),
    )?;
    write_object(
        &mut writer,
        &mut offsets,
        FONT_REGULAR_ID,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>",
    )?;
    write_object(
        &mut writer,
        &mut offsets,
        FONT_BOLD_ID,
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>",
    )?;
    write_object(
        &mut writer,
        &mut offsets,
        INFO_ID,
        &format!(
            "<< /Title {} /Producer {} >>",
            pdf_string("Section 194C(6) Declaration"),
            pdf_string(concat!("decl194c ", env!("CARGO_PKG_VERSION")))
        ),
    )?;

    let media_box = format!(
        "[0 0 {:.2} {:.2}]",
        geometry.width_mm * MM_TO_PT,
        geometry.height_mm * MM_TO_PT
    );

    for (idx, page) in pages.iter().enumerate() {
        let content = content_stream(page, geometry);
        write_object(
            &mut writer,
            &mut offsets,
            page_id(idx),
            &format!(
                "<< /Type /Page /Parent {PAGES_ID} 0 R /MediaBox {media_box} /Resources << /Font << /F1 {FONT_REGULAR_ID} 0 R /F2 {FONT_BOLD_ID} 0 R >> >> /Contents {} 0 R >>",
                page_id(idx) + 1
            ),
        )?;
        write_object(
            &mut writer,
            &mut offsets,
            page_id(idx) + 1,
            &format!(
                "<< /Length {} >>\nstream\n{content}endstream",
                content.len()
            ),
        )?;
    }

    let xref_offset = writer.bytes_written();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", object_count + 1);
    for offset in offsets.iter().skip(1) {
        let _ = writeln!(xref, "{offset:010} 00000 n ");
    }
    writer.write_all(xref.as_bytes())?;
    write!(
        writer,
        "trailer\n<< /Size {} /Root {CATALOG_ID} 0 R /Info {INFO_ID} 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        object_count + 1
    )?;
    writer.flush()?;

    Ok(writer.bytes_written())
}

fn page_id(idx: usize) -> usize {
    FIRST_PAGE_ID + idx * 2
}

fn write_object(
    writer: &mut CountingWriter<'_>,
    offsets: &mut [u64],
    id: usize,
    body: &str,
) -> ExportResult<()> {
    offsets[id] = writer.bytes_written();
    write!(writer, "{id} 0 obj\n{body}\nendobj\n")?;
    Ok(())
}

fn content_stream(page: &Page, geometry: &PageGeometry) -> String {
    let mut stream = String::new();
    for line in &page.lines {
        let font = match line.style {
            FontStyle::Regular => "F1",
            FontStyle::Bold => "F2",
        };
        let x = line.x_mm * MM_TO_PT;
        let y = (geometry.height_mm - line.y_mm) * MM_TO_PT;
        let _ = writeln!(
            stream,
            "BT /{font} {:.1} Tf 1 0 0 1 {x:.2} {y:.2} Tm {} Tj ET",
            line.size_pt,
            pdf_string(&line.text)
        );
    }
    stream
}

/// Literal string in WinAnsi encoding. Latin-1 characters are written as
/// octal escapes; anything outside that range becomes `?`.
fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            ' '..='~' => out.push(ch),
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(out, "\\{:03o}", ch as u32);
            }
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}
