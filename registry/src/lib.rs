//! IBAN registry parser.
//!
//! Converts the published IBAN registry text export into an
//! [`IbanRegistry`] keyed by ISO 3166 country code, and normalizes the
//! national bank-code CSV exports into [`BankRecord`](iban_registry_core::BankRecord)
//! lists.
//!
//! The registry pipeline runs in three steps:
//!
//! 1. [`parser`] reads the column-major text into one raw record per
//!    country column.
//! 2. [`derive_positions`] turns the bank and branch ranges of a record
//!    into a complete position schema.
//! 3. [`expand_record`] fans each record out to every country it covers.
//!
//! # Example
//!
//! ```
//! use iban_registry_parser::parse_registry_text;
//!
//! let raw = [
//!     "IBAN prefix country code (ISO 3166)\tAD",
//!     "Country code includes other countries/territories\tN/A",
//!     "BBAN structure\t4!n4!n12!c",
//!     "BBAN length\t20",
//!     "Bank identifier position within the BBAN\t1-4",
//!     "Branch identifier position within the BBAN\t5-8",
//!     "IBAN structure\tAD2!n4!n4!n12!c",
//!     "IBAN length\t24",
//! ]
//! .join("\n");
//!
//! let registry = parse_registry_text(&raw).unwrap();
//! let andorra = registry.get("AD").unwrap();
//! assert_eq!(andorra.positions.account_code.start, 8);
//! ```

pub mod banks;
pub mod error;
pub mod output;
pub mod parser;
pub mod report;

mod expand;
mod positions;

use tracing::{info, warn};

use iban_registry_core::IbanRegistry;

pub use error::ParseError;
pub use expand::{build_registry, expand_into, expand_record, structure_for};
pub use output::{OutputFormat, format_bank_records, format_registry, format_report};
pub use positions::derive_positions;
pub use report::ParseReport;

use parser::ColumnarDocument;

/// Result of a registry conversion together with its report.
#[derive(Debug, Clone)]
pub struct RegistryRun {
    pub registry: IbanRegistry,
    pub report: ParseReport,
}

/// Parses the registry text export into a country-keyed registry.
///
/// # Errors
///
/// Returns a [`ParseError`] when a strict column cannot be converted, when
/// the recognized columns disagree on the number of records, or when a
/// required column is missing.
pub fn parse_registry_text(raw: &str) -> Result<IbanRegistry, ParseError> {
    let records = parser::parse_records(raw)?;
    let registry = build_registry(&records);
    info!(
        records = records.len(),
        countries = registry.len(),
        "parsed IBAN registry"
    );
    Ok(registry)
}

/// Parses the registry text export and reports on the conversion.
///
/// The report carries line accounting, the countries that later records
/// overwrote, and the structural issues of the derived registry. Issues
/// are reported, not raised.
///
/// # Errors
///
/// Same as [`parse_registry_text`].
pub fn parse_registry_text_with_report(raw: &str) -> Result<RegistryRun, ParseError> {
    let document = ColumnarDocument::parse(raw)?;
    let diagnostics = document.diagnostics().clone();
    let records = document.into_records()?;

    let mut registry = IbanRegistry::new();
    let mut overwritten = Vec::new();
    for record in &records {
        for code in expand_into(&mut registry, record) {
            if !overwritten.contains(&code) {
                overwritten.push(code);
            }
        }
    }

    let report = ParseReport::new(&diagnostics, records.len(), &registry, overwritten);
    if !report.is_clean() {
        warn!(
            issues = report.validation_issues.len(),
            "registry has structural issues"
        );
    }
    info!(
        records = report.record_count,
        countries = report.country_count,
        ignored = report.ignored_headers.len(),
        "parsed IBAN registry"
    );

    Ok(RegistryRun { registry, report })
}
