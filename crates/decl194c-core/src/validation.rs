use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::record::{DeclarationRecord, Field};

static PAN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("PAN pattern compiles")
});

/// Field-level validation errors, in form order.
///
/// An empty result means the record may be exported or printed.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationResult {
    errors: BTreeMap<Field, String>,
}

impl ValidationResult {
    /// Returns true when no field failed.
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.errors.iter().map(|(field, msg)| (*field, msg.as_str()))
    }

    /// Copy of this result with one field's error dropped.
    pub fn without(&self, field: Field) -> Self {
        let mut errors = self.errors.clone();
        errors.remove(&field);
        Self { errors }
    }

    /// Errors keyed by the stable field key, for JSON output.
    pub fn to_keyed_map(&self) -> BTreeMap<&'static str, String> {
        self.errors
            .iter()
            .map(|(field, msg)| (field.key(), msg.clone()))
            .collect()
    }

    fn push(&mut self, field: Field, message: &str) {
        self.errors.insert(field, message.to_string());
    }
}

/// True when the uppercased value is five letters, four digits, one letter.
pub fn is_valid_pan(value: &str) -> bool {
    PAN_PATTERN.is_match(&value.to_uppercase())
}

/// Validate every field of a declaration.
///
/// All rules run on every call; the financial year and date are accepted as
/// they are.
pub fn validate_declaration(record: &DeclarationRecord) -> ValidationResult {
    let mut result = ValidationResult::default();

    require(
        &mut result,
        Field::PayerCompanyName,
        &record.payer_company_name,
        "Company name is required",
    );
    require(
        &mut result,
        Field::PayerCompanyAddress,
        &record.payer_company_address,
        "Company address is required",
    );
    require(
        &mut result,
        Field::DeclarantName,
        &record.declarant_name,
        "Declarant name is required",
    );
    if record.declarant_capacity.is_none() {
        result.push(Field::DeclarantCapacity, "Capacity selection is required");
    }
    require(
        &mut result,
        Field::ContractorFirmName,
        &record.contractor_firm_name,
        "Firm/Company name is required",
    );
    require(
        &mut result,
        Field::ContractorFirmAddress,
        &record.contractor_firm_address,
        "Firm/Company address is required",
    );

    if record.contractor_pan.trim().is_empty() {
        result.push(Field::ContractorPan, "PAN number is required");
    } else if !is_valid_pan(&record.contractor_pan) {
        result.push(Field::ContractorPan, "Invalid PAN format (e.g., ABCDE1234F)");
    }

    require(&mut result, Field::Place, &record.place, "Place is required");

    result
}

fn require(result: &mut ValidationResult, field: Field, value: &str, message: &str) {
    if value.trim().is_empty() {
        result.push(field, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pan_check_ignores_case() {
        assert!(is_valid_pan("ABCDE1234F"));
        assert!(is_valid_pan("abcde1234f"));
        assert!(!is_valid_pan("ABCD1234F"));
        assert!(!is_valid_pan("ABCDE123F"));
        assert!(!is_valid_pan(" ABCDE1234F"));
    }

    #[test]
    fn empty_record_reports_every_required_field() {
        let result = validate_declaration(&DeclarationRecord::default());
        let fields: Vec<Field> = result.iter().map(|(field, _)| field).collect();
        let expected: Vec<Field> = Field::ALL.into_iter().filter(Field::is_required).collect();
        assert_eq!(fields, expected);
        assert_eq!(result.get(Field::ContractorPan), Some("PAN number is required"));
    }

    #[test]
    fn keyed_map_uses_record_keys() {
        let result = validate_declaration(&DeclarationRecord::default());
        let keyed = result.to_keyed_map();
        assert_eq!(
            keyed.get("place").map(String::as_str),
            Some("Place is required")
        );
        assert!(!keyed.contains_key("financial_year"));
    }

    #[test]
    fn without_drops_only_the_named_field() {
        let result = validate_declaration(&DeclarationRecord::default());
        let trimmed = result.without(Field::Place);
        assert_eq!(trimmed.len(), result.len() - 1);
        assert_eq!(trimmed.get(Field::Place), None);
        assert!(trimmed.get(Field::ContractorPan).is_some());
    }
}
