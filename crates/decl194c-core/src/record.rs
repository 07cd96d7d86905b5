use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::dates::{financial_year_for, format_display};
use crate::error::Error;

/// Capacity in which the declarant signs for the contractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Capacity {
    Proprietor,
    Partner,
    Director,
}

impl Capacity {
    pub const ALL: [Capacity; 3] = [Capacity::Proprietor, Capacity::Partner, Capacity::Director];

    pub fn as_str(&self) -> &'static str {
        match self {
            Capacity::Proprietor => "Proprietor",
            Capacity::Partner => "Partner",
            Capacity::Director => "Director",
        }
    }

    /// Parse a capacity name, ignoring case and surrounding whitespace.
    pub fn parse(value: &str) -> crate::Result<Self> {
        let trimmed = value.trim();
        Capacity::ALL
            .into_iter()
            .find(|capacity| capacity.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::InvalidCapacity(value.to_string()))
    }

    /// Next capacity in selection order, wrapping through the unset state.
    pub fn cycle(current: Option<Capacity>, forward: bool) -> Option<Capacity> {
        let order = [
            None,
            Some(Capacity::Proprietor),
            Some(Capacity::Partner),
            Some(Capacity::Director),
        ];
        let idx = order.iter().position(|c| *c == current).unwrap_or(0);
        let next = if forward {
            (idx + 1) % order.len()
        } else {
            (idx + order.len() - 1) % order.len()
        };
        order[next]
    }
}

impl fmt::Display for Capacity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields of a declaration, in form order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    PayerCompanyName,
    PayerCompanyAddress,
    DeclarantName,
    DeclarantCapacity,
    ContractorFirmName,
    ContractorFirmAddress,
    ContractorPan,
    FinancialYear,
    Place,
    DeclarationDate,
}

impl Field {
    pub const ALL: [Field; 10] = [
        Field::PayerCompanyName,
        Field::PayerCompanyAddress,
        Field::DeclarantName,
        Field::DeclarantCapacity,
        Field::ContractorFirmName,
        Field::ContractorFirmAddress,
        Field::ContractorPan,
        Field::FinancialYear,
        Field::Place,
        Field::DeclarationDate,
    ];

    /// Stable key used in record files and validation output.
    pub fn key(&self) -> &'static str {
        match self {
            Field::PayerCompanyName => "payer_company_name",
            Field::PayerCompanyAddress => "payer_company_address",
            Field::DeclarantName => "declarant_name",
            Field::DeclarantCapacity => "declarant_capacity",
            Field::ContractorFirmName => "contractor_firm_name",
            Field::ContractorFirmAddress => "contractor_firm_address",
            Field::ContractorPan => "contractor_pan",
            Field::FinancialYear => "financial_year",
            Field::Place => "place",
            Field::DeclarationDate => "declaration_date",
        }
    }

    /// Form label shown next to the input.
    pub fn label(&self) -> &'static str {
        match self {
            Field::PayerCompanyName => "Company Name",
            Field::PayerCompanyAddress => "Company Address",
            Field::DeclarantName => "Name of Declarant (Vehicle Owner)",
            Field::DeclarantCapacity => "Capacity",
            Field::ContractorFirmName => "Name of Firm / Company",
            Field::ContractorFirmAddress => "Address of Firm / Company",
            Field::ContractorPan => "PAN of Contractor",
            Field::FinancialYear => "Financial Year",
            Field::Place => "Place (City)",
            Field::DeclarationDate => "Date",
        }
    }

    /// Input hint shown while the field is empty.
    pub fn hint(&self) -> &'static str {
        match self {
            Field::PayerCompanyName => "Enter payer company name",
            Field::PayerCompanyAddress => "Enter complete address of payer company",
            Field::DeclarantName => "Enter full name of declarant",
            Field::DeclarantCapacity => "Select capacity",
            Field::ContractorFirmName => "Enter name of contracting firm/company",
            Field::ContractorFirmAddress => "Enter registered address of firm/company",
            Field::ContractorPan => "ABCDE1234F",
            Field::FinancialYear => "YYYY-YYYY",
            Field::Place => "Enter city name",
            Field::DeclarationDate => "DD/MM/YYYY",
        }
    }

    pub fn is_required(&self) -> bool {
        !matches!(self, Field::FinancialYear | Field::DeclarationDate)
    }

    pub fn is_multiline(&self) -> bool {
        matches!(self, Field::PayerCompanyAddress | Field::ContractorFirmAddress)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Field {
    type Err = Error;

    fn from_str(value: &str) -> crate::Result<Self> {
        let wanted = value.trim().replace('-', "_").to_lowercase();
        Field::ALL
            .into_iter()
            .find(|field| field.key() == wanted)
            .ok_or_else(|| Error::UnknownField(value.to_string()))
    }
}

/// The declaration being filled in.
///
/// Every field defaults to empty so partially filled record files load. The
/// capacity is `None` until one is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct DeclarationRecord {
    pub payer_company_name: String,
    pub payer_company_address: String,
    pub declarant_name: String,
    /// One of `Proprietor`, `Partner`, `Director`, or empty when unset.
    #[serde(
        serialize_with = "serialize_capacity",
        deserialize_with = "deserialize_capacity"
    )]
    #[schemars(with = "String")]
    pub declarant_capacity: Option<Capacity>,
    pub contractor_firm_name: String,
    pub contractor_firm_address: String,
    pub contractor_pan: String,
    /// Financial year as `YYYY-YYYY`.
    pub financial_year: String,
    pub place: String,
    /// Declaration date as `dd/mm/yyyy`.
    pub declaration_date: String,
}

impl DeclarationRecord {
    /// Fresh record for a new session: current financial year and date, every
    /// other field empty.
    pub fn with_defaults(today: NaiveDate) -> Self {
        Self {
            financial_year: financial_year_for(today),
            declaration_date: format_display(today),
            ..Self::default()
        }
    }

    /// Current text of a field. An unset capacity reads as empty.
    pub fn value(&self, field: Field) -> String {
        match field {
            Field::PayerCompanyName => self.payer_company_name.clone(),
            Field::PayerCompanyAddress => self.payer_company_address.clone(),
            Field::DeclarantName => self.declarant_name.clone(),
            Field::DeclarantCapacity => self
                .declarant_capacity
                .map(|c| c.as_str().to_string())
                .unwrap_or_default(),
            Field::ContractorFirmName => self.contractor_firm_name.clone(),
            Field::ContractorFirmAddress => self.contractor_firm_address.clone(),
            Field::ContractorPan => self.contractor_pan.clone(),
            Field::FinancialYear => self.financial_year.clone(),
            Field::Place => self.place.clone(),
            Field::DeclarationDate => self.declaration_date.clone(),
        }
    }

    /// Return a new record with one field replaced.
    ///
    /// PAN input is uppercased on entry and an empty capacity unsets it.
    /// Every other value is stored verbatim; callers holding a date in
    /// another format convert it with [`crate::dates::normalize_date_input`]
    /// first.
    pub fn with_field(&self, field: Field, value: &str) -> crate::Result<Self> {
        let mut next = self.clone();
        match field {
            Field::PayerCompanyName => next.payer_company_name = value.to_string(),
            Field::PayerCompanyAddress => next.payer_company_address = value.to_string(),
            Field::DeclarantName => next.declarant_name = value.to_string(),
            Field::DeclarantCapacity => {
                next.declarant_capacity = if value.trim().is_empty() {
                    None
                } else {
                    Some(Capacity::parse(value)?)
                };
            }
            Field::ContractorFirmName => next.contractor_firm_name = value.to_string(),
            Field::ContractorFirmAddress => next.contractor_firm_address = value.to_string(),
            Field::ContractorPan => next.contractor_pan = value.to_uppercase(),
            Field::FinancialYear => next.financial_year = value.to_string(),
            Field::Place => next.place = value.to_string(),
            Field::DeclarationDate => next.declaration_date = value.to_string(),
        }
        Ok(next)
    }

    /// Return a new record with only the capacity replaced.
    pub fn with_capacity(&self, capacity: Option<Capacity>) -> Self {
        Self {
            declarant_capacity: capacity,
            ..self.clone()
        }
    }
}

fn serialize_capacity<S>(
    value: &Option<Capacity>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(value.map(|c| c.as_str()).unwrap_or(""))
}

fn deserialize_capacity<'de, D>(deserializer: D) -> Result<Option<Capacity>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?.unwrap_or_default();
    if raw.trim().is_empty() {
        return Ok(None);
    }
    Capacity::parse(&raw)
        .map(Some)
        .map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_seed_year_and_date_only() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).expect("date");
        let record = DeclarationRecord::with_defaults(today);
        assert_eq!(record.financial_year, "2024-2025");
        assert_eq!(record.declaration_date, "15/06/2024");
        assert!(record.payer_company_name.is_empty());
        assert_eq!(record.declarant_capacity, None);
    }

    #[test]
    fn with_field_leaves_original_untouched() {
        let record = DeclarationRecord::default();
        let next = record
            .with_field(Field::DeclarantName, "Ramesh Kumar")
            .expect("update");
        assert_eq!(next.declarant_name, "Ramesh Kumar");
        assert!(record.declarant_name.is_empty());
    }

    #[test]
    fn pan_is_uppercased_on_entry() {
        let record = DeclarationRecord::default()
            .with_field(Field::ContractorPan, "abcpk1234q")
            .expect("update");
        assert_eq!(record.contractor_pan, "ABCPK1234Q");
    }

    #[test]
    fn capacity_parses_case_insensitively_and_unsets_on_empty() {
        let record = DeclarationRecord::default()
            .with_field(Field::DeclarantCapacity, "partner")
            .expect("update");
        assert_eq!(record.declarant_capacity, Some(Capacity::Partner));

        let cleared = record
            .with_field(Field::DeclarantCapacity, "  ")
            .expect("update");
        assert_eq!(cleared.declarant_capacity, None);

        let err = record
            .with_field(Field::DeclarantCapacity, "Manager")
            .expect_err("unknown capacity");
        assert_eq!(err, Error::InvalidCapacity("Manager".to_string()));
    }

    #[test]
    fn dates_are_stored_verbatim() {
        let record = DeclarationRecord::default()
            .with_field(Field::DeclarationDate, "15/06/2")
            .expect("update");
        assert_eq!(record.declaration_date, "15/06/2");
    }

    #[test]
    fn field_keys_round_trip_through_from_str() {
        for field in Field::ALL {
            assert_eq!(field.key().parse::<Field>(), Ok(field));
        }
        assert_eq!("contractor-pan".parse::<Field>(), Ok(Field::ContractorPan));
        assert!("pan".parse::<Field>().is_err());
    }

    #[test]
    fn capacity_cycle_passes_through_unset() {
        assert_eq!(Capacity::cycle(None, true), Some(Capacity::Proprietor));
        assert_eq!(Capacity::cycle(Some(Capacity::Director), true), None);
        assert_eq!(Capacity::cycle(None, false), Some(Capacity::Director));
    }
}
