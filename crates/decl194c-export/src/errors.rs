use thiserror::Error;

/// Errors emitted while laying out or writing a document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid page geometry: {0}")]
    Geometry(String),
    #[error("unsupported export format: {0}")]
    UnsupportedFormat(String),
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;
