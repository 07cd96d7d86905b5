use thiserror::Error;

/// Core error type shared across the declaration crates.
///
/// Field validation failures are never reported through this type; they are
/// collected in a [`crate::ValidationResult`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Capacity text is not one of the accepted values.
    #[error("invalid capacity: {0} (expected Proprietor, Partner or Director)")]
    InvalidCapacity(String),
    /// Field key does not name a declaration field.
    #[error("unknown field: {0}")]
    UnknownField(String),
}

/// Convenience alias for results returned by the declaration crates.
pub type Result<T> = std::result::Result<T, Error>;
