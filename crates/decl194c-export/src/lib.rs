//! Document export for rendered declarations.
//!
//! The renderer in `decl194c-core` decides what the declaration says; this
//! crate decides where each line lands on an A4 page and serializes the
//! result.
//!
//! # Architecture
//!
//! - `geometry`: fixed page size, margins and font sizes
//! - `metrics`: Helvetica advance widths used for wrapping
//! - `layout`: word wrap and pagination into placed lines
//! - `pdf`: minimal PDF 1.4 writer
//! - `text`: plain text writer over the same layout

mod errors;
mod geometry;
mod layout;
mod metrics;
mod pdf;
mod text;

pub use errors::{ExportError, ExportResult};
pub use geometry::PageGeometry;
pub use layout::{FontStyle, Page, PlacedLine, lay_out, wrap_text};
pub use metrics::text_width_mm;
pub use pdf::PdfExporter;
pub use text::TextExporter;

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use decl194c_core::Declaration;
use serde::{Deserialize, Serialize};

/// File name stem of every exported artifact.
pub const ARTIFACT_STEM: &str = "Section_194C_Declaration";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Pdf,
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Pdf => "pdf",
            ExportFormat::Text => "txt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Pdf => f.write_str("pdf"),
            ExportFormat::Text => f.write_str("text"),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "pdf" => Ok(ExportFormat::Pdf),
            "text" | "txt" => Ok(ExportFormat::Text),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Writes a rendered declaration as one document.
pub trait Exporter {
    fn format(&self) -> ExportFormat;

    fn extension(&self) -> &'static str {
        self.format().extension()
    }

    /// Lay out and serialize `declaration`, returning the bytes written.
    fn export(
        &self,
        declaration: &Declaration,
        geometry: &PageGeometry,
        out: &mut dyn Write,
    ) -> ExportResult<u64>;
}

pub fn exporter_for(format: ExportFormat) -> Box<dyn Exporter> {
    match format {
        ExportFormat::Pdf => Box::new(PdfExporter),
        ExportFormat::Text => Box::new(TextExporter),
    }
}

/// Deterministic artifact name, e.g. `Section_194C_Declaration.pdf`.
pub fn artifact_file_name(format: ExportFormat) -> String {
    format!("{ARTIFACT_STEM}.{}", format.extension())
}

/// Export into an in-memory buffer.
pub fn export_to_vec(
    format: ExportFormat,
    declaration: &Declaration,
    geometry: &PageGeometry,
) -> ExportResult<Vec<u8>> {
    let mut buffer = Vec::new();
    exporter_for(format).export(declaration, geometry, &mut buffer)?;
    Ok(buffer)
}

pub(crate) struct CountingWriter<'a> {
    inner: &'a mut dyn Write,
    bytes: u64,
}

impl<'a> CountingWriter<'a> {
    pub(crate) fn new(inner: &'a mut dyn Write) -> Self {
        Self { inner, bytes: 0 }
    }

    pub(crate) fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl Write for CountingWriter<'_> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_names_are_fixed() {
        assert_eq!(
            artifact_file_name(ExportFormat::Pdf),
            "Section_194C_Declaration.pdf"
        );
        assert_eq!(
            artifact_file_name(ExportFormat::Text),
            "Section_194C_Declaration.txt"
        );
    }

    #[test]
    fn exporters_report_their_extension() {
        assert_eq!(exporter_for(ExportFormat::Pdf).extension(), "pdf");
        assert_eq!(exporter_for(ExportFormat::Text).extension(), "txt");
    }

    #[test]
    fn parses_format_names() {
        assert_eq!("PDF".parse::<ExportFormat>().ok(), Some(ExportFormat::Pdf));
        assert_eq!("txt".parse::<ExportFormat>().ok(), Some(ExportFormat::Text));
        assert!("docx".parse::<ExportFormat>().is_err());
    }
}
