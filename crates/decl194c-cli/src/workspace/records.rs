use std::path::Path;

use chrono::NaiveDate;
use decl194c_core::{DeclarationRecord, Field, normalize_date_input};

use super::{WorkspaceError, WorkspaceResult};

/// Starting record for a command: the file at `path` when given, otherwise
/// a fresh record dated `today`.
pub fn load_record(path: Option<&Path>, today: NaiveDate) -> WorkspaceResult<DeclarationRecord> {
    let Some(path) = path else {
        return Ok(DeclarationRecord::with_defaults(today));
    };

    let content = std::fs::read_to_string(path)?;
    let record: DeclarationRecord = toml::from_str(&content)?;
    tracing::debug!(event = "record_loaded", path = %path.display());
    Ok(record)
}

/// Split a `KEY=VALUE` override. A literal `\n` in the value becomes a line
/// break, for multi-line addresses.
pub fn parse_override(raw: &str) -> WorkspaceResult<(Field, String)> {
    let (key, value) = raw.split_once('=').ok_or_else(|| {
        WorkspaceError::Invalid(format!("field override must be KEY=VALUE: {raw}"))
    })?;
    let field: Field = key.parse()?;
    let mut value = value.replace("\\n", "\n");
    if field == Field::DeclarationDate {
        if let Some(normalized) = normalize_date_input(&value) {
            value = normalized;
        }
    }
    Ok((field, value))
}

/// Apply overrides in order through the record reducer.
pub fn apply_overrides(
    record: DeclarationRecord,
    overrides: &[String],
) -> WorkspaceResult<DeclarationRecord> {
    let mut current = record;
    for raw in overrides {
        let (field, value) = parse_override(raw)?;
        current = current.with_field(field, &value)?;
    }
    Ok(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use decl194c_core::Capacity;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 2, 1).expect("date")
    }

    #[test]
    fn without_file_uses_session_defaults() {
        let record = load_record(None, today()).expect("defaults");
        assert_eq!(record.financial_year, "2024-2025");
        assert_eq!(record.declaration_date, "01/02/2025");
    }

    #[test]
    fn loads_record_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("record.toml");
        std::fs::write(&path, "place = \"Nagpur\"\ndeclarant_capacity = \"Proprietor\"\n")
            .expect("write");

        let record = load_record(Some(&path), today()).expect("load");
        assert_eq!(record.place, "Nagpur");
        assert_eq!(record.declarant_capacity, Some(Capacity::Proprietor));
        assert!(record.financial_year.is_empty());
    }

    #[test]
    fn overrides_apply_in_order() {
        let record = apply_overrides(
            DeclarationRecord::default(),
            &[
                "place=Pune".to_string(),
                "place=Nagpur".to_string(),
                "contractor_pan=abcpk1234q".to_string(),
                "payer_company_address=12 MG Road\\nPune".to_string(),
                "declaration_date=2024-06-15".to_string(),
            ],
        )
        .expect("apply");

        assert_eq!(record.place, "Nagpur");
        assert_eq!(record.contractor_pan, "ABCPK1234Q");
        assert_eq!(record.payer_company_address, "12 MG Road\nPune");
        assert_eq!(record.declaration_date, "15/06/2024");
    }

    #[test]
    fn malformed_overrides_are_rejected() {
        assert!(matches!(
            parse_override("place"),
            Err(WorkspaceError::Invalid(_))
        ));
        assert!(matches!(
            parse_override("pan=ABCDE1234F"),
            Err(WorkspaceError::Core(_))
        ));
    }
}
