//! Core contracts for Section 194C(6) declarations.
//!
//! This crate defines the declaration record, the field validator and the
//! renderer that produces the fixed declaration text shared by the preview
//! and export surfaces.

pub mod dates;
pub mod error;
pub mod record;
pub mod render;
pub mod validation;

pub use dates::{
    display_to_iso, financial_year_for, format_display, iso_to_display, normalize_date_input,
};
pub use error::{Error, Result};
pub use record::{Capacity, DeclarationRecord, Field};
pub use render::{
    BlockKind, Declaration, RenderOptions, TextBlock, firm_prefix, render_declaration,
};
pub use validation::{ValidationResult, is_valid_pan, validate_declaration};
