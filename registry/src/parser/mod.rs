//! Columnar parser for the published IBAN registry.
//!
//! The registry document is column-major: every line starts with a header
//! label followed by one tab-separated cell per country record. This module
//! scans the lines, keeps the eight labels the structure schema needs,
//! converts their cells into typed columns and finally transposes the
//! columns into one [`RawRecord`] per country.
//!
//! Lines with any other label are explanatory rows and are skipped.
//!
//! The primary entry point is [`parse_records`]; [`ColumnarDocument`]
//! exposes the intermediate columns and line diagnostics.
//!
//! # Example
//!
//! ```
//! use iban_registry_core::Range;
//! use iban_registry_parser::parser::parse_records;
//!
//! let raw = [
//!     "IBAN prefix country code (ISO 3166)\tAD\tFR",
//!     "Country code includes other countries/territories\tN/A\tMC",
//!     "BBAN structure\t4!n4!n12!c\t5!n5!n11!c2!n",
//!     "BBAN length\t20\t23",
//!     "Bank identifier position within the BBAN\t1-4\t1-5",
//!     "Branch identifier position within the BBAN\t5-8\t6-10",
//!     "IBAN structure\tAD2!n4!n4!n12!c\tFR2!n5!n5!n11!c2!n",
//!     "IBAN length\t24\t27",
//! ]
//! .join("\r\n");
//!
//! let records = parse_records(&raw).unwrap();
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[1].country, "FR");
//! assert_eq!(records[1].other_countries, vec!["MC"]);
//! assert_eq!(records[1].bank_code_position, Some(Range::new(0, 5)));
//! ```

mod fields;
mod normalize;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use iban_registry_core::{Range, RawRecord};

use crate::error::ParseError;

pub use fields::{all_country_codes, first_country_code, parse_int, parse_range};
pub use normalize::{split_header, split_lines};

/// A header label the structure schema consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryField {
    Country,
    OtherCountries,
    BbanSpec,
    BbanLength,
    BankCodePosition,
    BranchCodePosition,
    IbanSpec,
    IbanLength,
}

impl RegistryField {
    /// All recognized fields, in document order.
    pub const ALL: [RegistryField; 8] = [
        RegistryField::Country,
        RegistryField::OtherCountries,
        RegistryField::BbanSpec,
        RegistryField::BbanLength,
        RegistryField::BankCodePosition,
        RegistryField::BranchCodePosition,
        RegistryField::IbanSpec,
        RegistryField::IbanLength,
    ];

    /// Header label as published in the registry document.
    pub fn label(self) -> &'static str {
        match self {
            Self::Country => "IBAN prefix country code (ISO 3166)",
            Self::OtherCountries => "Country code includes other countries/territories",
            Self::BbanSpec => "BBAN structure",
            Self::BbanLength => "BBAN length",
            Self::BankCodePosition => "Bank identifier position within the BBAN",
            Self::BranchCodePosition => "Branch identifier position within the BBAN",
            Self::IbanSpec => "IBAN structure",
            Self::IbanLength => "IBAN length",
        }
    }

    /// Record field name the column populates.
    pub fn key(self) -> &'static str {
        match self {
            Self::Country => "country",
            Self::OtherCountries => "other_countries",
            Self::BbanSpec => "bban_spec",
            Self::BbanLength => "bban_length",
            Self::BankCodePosition => "bank_code_position",
            Self::BranchCodePosition => "branch_code_position",
            Self::IbanSpec => "iban_spec",
            Self::IbanLength => "iban_length",
        }
    }

    /// Resolves a header label by exact match.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|field| field.label() == label)
    }

    fn parse_column(self, cells: &[&str]) -> Result<Column, ParseError> {
        let column = match self {
            Self::Country => Column::Countries(
                cells
                    .iter()
                    .enumerate()
                    .map(|(index, cell)| {
                        first_country_code(cell)
                            .map(ToOwned::to_owned)
                            .ok_or_else(|| ParseError::MissingCountryCode {
                                index,
                                cell: cell.to_string(),
                            })
                    })
                    .collect::<Result<_, _>>()?,
            ),
            Self::OtherCountries => {
                Column::CountryLists(cells.iter().map(|cell| all_country_codes(cell)).collect())
            }
            Self::BbanSpec | Self::IbanSpec => {
                Column::Texts(cells.iter().map(|cell| cell.to_string()).collect())
            }
            Self::BbanLength | Self::IbanLength => Column::Lengths(
                cells
                    .iter()
                    .enumerate()
                    .map(|(index, cell)| {
                        parse_int(cell).ok_or_else(|| ParseError::MissingLength {
                            field: self.key(),
                            index,
                            cell: cell.to_string(),
                        })
                    })
                    .collect::<Result<_, _>>()?,
            ),
            Self::BankCodePosition | Self::BranchCodePosition => {
                Column::Ranges(cells.iter().map(|cell| parse_range(cell)).collect())
            }
        };
        Ok(column)
    }
}

/// Typed cells of one recognized header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Column {
    Countries(Vec<String>),
    CountryLists(Vec<Vec<String>>),
    Texts(Vec<String>),
    Lengths(Vec<usize>),
    Ranges(Vec<Option<Range>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Self::Countries(cells) => cells.len(),
            Self::CountryLists(cells) => cells.len(),
            Self::Texts(cells) => cells.len(),
            Self::Lengths(cells) => cells.len(),
            Self::Ranges(cells) => cells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Line accounting for a single parse run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseDiagnostics {
    pub total_lines: usize,
    pub recognized_lines: usize,
    /// Distinct unrecognized header labels, in first-seen order.
    pub ignored_headers: Vec<String>,
    /// Recognized labels that appeared more than once.
    pub repeated_headers: Vec<String>,
}

/// Recognized columns of a registry document, before transposition.
#[derive(Debug, Clone, Default)]
pub struct ColumnarDocument {
    columns: HashMap<RegistryField, Column>,
    diagnostics: ParseDiagnostics,
}

impl ColumnarDocument {
    /// Scans `raw` and converts every recognized line into a typed column.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::MissingCountryCode`] or
    /// [`ParseError::MissingLength`] when a cell of a strict column cannot
    /// be converted.
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let mut document = Self::default();

        for line in split_lines(raw) {
            document.diagnostics.total_lines += 1;
            let (label, cells) = split_header(line);

            let Some(field) = RegistryField::from_label(label) else {
                let label = label.trim();
                if !label.is_empty()
                    && !document.diagnostics.ignored_headers.iter().any(|l| l == label)
                {
                    document.diagnostics.ignored_headers.push(label.to_string());
                }
                continue;
            };

            let column = field.parse_column(&cells)?;
            document.diagnostics.recognized_lines += 1;
            debug!(field = field.key(), cells = column.len(), "parsed registry column");

            if document.columns.insert(field, column).is_some() {
                warn!(label = field.label(), "header repeated, keeping the later line");
                document
                    .diagnostics
                    .repeated_headers
                    .push(field.label().to_string());
            }
        }

        Ok(document)
    }

    pub fn column(&self, field: RegistryField) -> Option<&Column> {
        self.columns.get(&field)
    }

    pub fn diagnostics(&self) -> &ParseDiagnostics {
        &self.diagnostics
    }

    /// Number of records, checking that all recognized columns agree.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::ColumnLengthMismatch`] naming the first column
    /// (in document order) whose cell count differs from the first present
    /// column.
    pub fn record_count(&self) -> Result<usize, ParseError> {
        let mut reference: Option<(RegistryField, usize)> = None;

        for field in RegistryField::ALL {
            let Some(column) = self.columns.get(&field) else {
                continue;
            };
            match reference {
                None => reference = Some((field, column.len())),
                Some((ref_field, expected)) if column.len() != expected => {
                    return Err(ParseError::ColumnLengthMismatch {
                        field: field.label(),
                        reference: ref_field.label(),
                        expected,
                        found: column.len(),
                    });
                }
                Some(_) => {}
            }
        }

        Ok(reference.map_or(0, |(_, count)| count))
    }

    /// Transposes the columns into one record per country.
    ///
    /// A document without any recognized line yields no records.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::ColumnLengthMismatch`] when columns disagree on
    /// the record count, and [`ParseError::MissingColumn`] when a column
    /// every record needs is absent.
    pub fn into_records(mut self) -> Result<Vec<RawRecord>, ParseError> {
        let count = self.record_count()?;
        if self.columns.is_empty() {
            return Ok(Vec::new());
        }

        let countries = match self.take(RegistryField::Country)? {
            Column::Countries(cells) => cells,
            _ => unreachable!("country column is always parsed as countries"),
        };
        let other_countries = match self.columns.remove(&RegistryField::OtherCountries) {
            Some(Column::CountryLists(cells)) => cells,
            _ => vec![Vec::new(); count],
        };
        let bban_specs = self.take_texts(RegistryField::BbanSpec)?;
        let iban_specs = self.take_texts(RegistryField::IbanSpec)?;
        let bban_lengths = self.take_lengths(RegistryField::BbanLength)?;
        let iban_lengths = self.take_lengths(RegistryField::IbanLength)?;
        let bank_positions = self.take_ranges(RegistryField::BankCodePosition, count);
        let branch_positions = self.take_ranges(RegistryField::BranchCodePosition, count);

        let records = countries
            .into_iter()
            .zip(other_countries)
            .zip(bban_specs.into_iter().zip(iban_specs))
            .zip(bban_lengths.into_iter().zip(iban_lengths))
            .zip(bank_positions.into_iter().zip(branch_positions))
            .map(
                |(
                    (((country, other_countries), (bban_spec, iban_spec)), (bban_length, iban_length)),
                    (bank_code_position, branch_code_position),
                )| RawRecord {
                    country,
                    other_countries,
                    bban_spec,
                    iban_spec,
                    bban_length,
                    iban_length,
                    bank_code_position,
                    branch_code_position,
                },
            )
            .collect();

        Ok(records)
    }

    fn take(&mut self, field: RegistryField) -> Result<Column, ParseError> {
        self.columns
            .remove(&field)
            .ok_or(ParseError::MissingColumn(field.label()))
    }

    fn take_texts(&mut self, field: RegistryField) -> Result<Vec<String>, ParseError> {
        match self.take(field)? {
            Column::Texts(cells) => Ok(cells),
            _ => unreachable!("spec columns are always parsed as texts"),
        }
    }

    fn take_lengths(&mut self, field: RegistryField) -> Result<Vec<usize>, ParseError> {
        match self.take(field)? {
            Column::Lengths(cells) => Ok(cells),
            _ => unreachable!("length columns are always parsed as lengths"),
        }
    }

    fn take_ranges(&mut self, field: RegistryField, count: usize) -> Vec<Option<Range>> {
        match self.columns.remove(&field) {
            Some(Column::Ranges(cells)) => cells,
            _ => vec![None; count],
        }
    }
}

/// Parses a registry document into one [`RawRecord`] per country column.
///
/// # Errors
///
/// See [`ColumnarDocument::parse`] and [`ColumnarDocument::into_records`].
pub fn parse_records(raw: &str) -> Result<Vec<RawRecord>, ParseError> {
    ColumnarDocument::parse(raw)?.into_records()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(lines: &[&str]) -> String {
        lines.join("\r\n")
    }

    fn two_country_lines() -> Vec<&'static str> {
        vec![
            "Name of country\tAndorra\tFrance",
            "IBAN prefix country code (ISO 3166)\tAD\tFR",
            "Country code includes other countries/territories\tN/A\tFrench Guyana (GF), Monaco (MC)",
            "BBAN structure\t4!n4!n12!c\t5!n5!n11!c2!n",
            "BBAN length\t20\t23",
            "Bank identifier position within the BBAN\t1-4\t1-5",
            "Branch identifier position within the BBAN\t5-8\tN/A",
            "IBAN structure\tAD2!n4!n4!n12!c\tFR2!n5!n5!n11!c2!n",
            "IBAN length\t24\t27",
        ]
    }

    #[test]
    fn test_from_label_exact_match() {
        assert_eq!(RegistryField::from_label("BBAN length"), Some(RegistryField::BbanLength));
        assert_eq!(RegistryField::from_label("BBAN length "), Some(RegistryField::BbanLength));
        assert_eq!(RegistryField::from_label("BBAN Length"), None);
        assert_eq!(RegistryField::from_label("BBAN length example"), None);
    }

    #[test]
    fn test_parse_records_two_countries() {
        let records = parse_records(&document(&two_country_lines())).unwrap();
        assert_eq!(records.len(), 2);

        let andorra = &records[0];
        assert_eq!(andorra.country, "AD");
        assert!(andorra.other_countries.is_empty());
        assert_eq!(andorra.bban_spec, "4!n4!n12!c");
        assert_eq!(andorra.bban_length, 20);
        assert_eq!(andorra.iban_length, 24);
        assert_eq!(andorra.branch_code_position, Some(Range::new(4, 8)));

        let france = &records[1];
        assert_eq!(france.other_countries, vec!["GF", "MC"]);
        assert_eq!(france.bank_code_position, Some(Range::new(0, 5)));
        assert_eq!(france.branch_code_position, None);
    }

    #[test]
    fn test_bank_positions_column() {
        let raw = document(&[
            "Bank identifier position within the BBAN\t5-9\t1-4",
            "BBAN length\t23\t20",
        ]);
        let doc = ColumnarDocument::parse(&raw).unwrap();
        assert_eq!(
            doc.column(RegistryField::BankCodePosition),
            Some(&Column::Ranges(vec![Some(Range::new(4, 9)), Some(Range::new(0, 4))]))
        );
        assert_eq!(doc.column(RegistryField::BbanLength), Some(&Column::Lengths(vec![23, 20])));
        assert_eq!(doc.record_count().unwrap(), 2);
    }

    #[test]
    fn test_unrecognized_header_changes_nothing() {
        let base = parse_records(&document(&two_country_lines())).unwrap();

        let mut lines = two_country_lines();
        lines.insert(3, "Comments\tfoo\tbar");
        let raw = document(&lines);
        let with_comments = parse_records(&raw).unwrap();

        assert_eq!(base, with_comments);
        let doc = ColumnarDocument::parse(&raw).unwrap();
        assert_eq!(doc.diagnostics().ignored_headers, vec!["Name of country", "Comments"]);
        assert_eq!(doc.diagnostics().recognized_lines, 8);
    }

    #[test]
    fn test_column_length_mismatch_is_fatal() {
        let mut lines = two_country_lines();
        lines[4] = "BBAN length\t20";
        let err = parse_records(&document(&lines)).unwrap_err();
        assert!(matches!(
            err,
            ParseError::ColumnLengthMismatch {
                field: "BBAN length",
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_length_is_fatal() {
        let mut lines = two_country_lines();
        lines[8] = "IBAN length\t24\tunknown";
        let err = parse_records(&document(&lines)).unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingLength {
                field: "iban_length",
                index: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_country_code_is_fatal() {
        let mut lines = two_country_lines();
        lines[1] = "IBAN prefix country code (ISO 3166)\tAD\tfr";
        let err = parse_records(&document(&lines)).unwrap_err();
        assert!(matches!(err, ParseError::MissingCountryCode { index: 1, .. }));
    }

    #[test]
    fn test_missing_required_column() {
        let lines: Vec<&str> = two_country_lines()
            .into_iter()
            .filter(|line| !line.starts_with("IBAN structure"))
            .collect();
        let err = parse_records(&document(&lines)).unwrap_err();
        assert!(matches!(err, ParseError::MissingColumn("IBAN structure")));
    }

    #[test]
    fn test_optional_columns_default() {
        let lines: Vec<&str> = two_country_lines()
            .into_iter()
            .filter(|line| !line.starts_with("Country code includes") && !line.starts_with("Branch"))
            .collect();
        let records = parse_records(&document(&lines)).unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.other_countries.is_empty()));
        assert!(records.iter().all(|r| r.branch_code_position.is_none()));
    }

    #[test]
    fn test_repeated_header_keeps_later_line() {
        let mut lines = two_country_lines();
        lines.push("BBAN length\t21\t24");
        let raw = document(&lines);
        let records = parse_records(&raw).unwrap();
        assert_eq!(records[0].bban_length, 21);

        let doc = ColumnarDocument::parse(&raw).unwrap();
        assert_eq!(doc.diagnostics().repeated_headers, vec!["BBAN length"]);
    }

    #[test]
    fn test_no_recognized_lines_yields_no_records() {
        let records = parse_records("Comments\tfoo\tbar\r\n\r\n").unwrap();
        assert!(records.is_empty());
    }
}
