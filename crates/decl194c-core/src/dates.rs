//! Date adapter between the canonical `dd/mm/yyyy` text stored in a record
//! and the ISO `yyyy-mm-dd` form used by date pickers and command lines.

use chrono::{Datelike, NaiveDate};

const DISPLAY_FORMAT: &str = "%d/%m/%Y";
const ISO_FORMAT: &str = "%Y-%m-%d";

/// Financial year containing `date`. Financial years start on 1 April.
pub fn financial_year_for(date: NaiveDate) -> String {
    let year = date.year();
    if date.month() >= 4 {
        format!("{}-{}", year, year + 1)
    } else {
        format!("{}-{}", year - 1, year)
    }
}

pub fn format_display(date: NaiveDate) -> String {
    date.format(DISPLAY_FORMAT).to_string()
}

pub fn iso_to_display(value: &str) -> Option<String> {
    NaiveDate::parse_from_str(value.trim(), ISO_FORMAT)
        .ok()
        .map(format_display)
}

pub fn display_to_iso(value: &str) -> Option<String> {
    NaiveDate::parse_from_str(value.trim(), DISPLAY_FORMAT)
        .ok()
        .map(|date| date.format(ISO_FORMAT).to_string())
}

/// Accept either form and return the display form, zero padded.
pub fn normalize_date_input(value: &str) -> Option<String> {
    let trimmed = value.trim();
    NaiveDate::parse_from_str(trimmed, DISPLAY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, ISO_FORMAT))
        .ok()
        .map(format_display)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn financial_year_turns_over_in_april() {
        assert_eq!(financial_year_for(date(2024, 3, 31)), "2023-2024");
        assert_eq!(financial_year_for(date(2024, 4, 1)), "2024-2025");
        assert_eq!(financial_year_for(date(2025, 1, 10)), "2024-2025");
    }

    #[test]
    fn converts_between_iso_and_display() {
        assert_eq!(iso_to_display("2024-06-15").as_deref(), Some("15/06/2024"));
        assert_eq!(display_to_iso("15/06/2024").as_deref(), Some("2024-06-15"));
        assert_eq!(iso_to_display("15/06/2024"), None);
        assert_eq!(display_to_iso("2024-13-01"), None);
    }

    #[test]
    fn normalizes_either_form() {
        assert_eq!(normalize_date_input("5/6/2024").as_deref(), Some("05/06/2024"));
        assert_eq!(normalize_date_input(" 2024-06-05 ").as_deref(), Some("05/06/2024"));
        assert_eq!(normalize_date_input(""), None);
    }
}
