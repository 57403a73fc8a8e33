//! National bank-code registry normalizers.
//!
//! Central banks publish their bank-code directories as CSV exports whose
//! column layout differs per country. Each supported registry implements
//! [`BankRegistrySource`], mapping one CSV row onto a [`BankRecord`];
//! [`normalize_bank_registry`] drives the shared reading loop.
//!
//! The input is already-decoded text; fetching and character-set
//! conversion happen outside this crate.
//!
//! # Example
//!
//! ```
//! use iban_registry_parser::banks::{normalize_bank_registry, source_for_country};
//!
//! let csv = "Kod banky;Nazov banky;BIC\n200;Vseobecna uverova banka;subaskbx\n";
//! let source = source_for_country("SK").unwrap();
//! let banks = normalize_bank_registry(source.as_ref(), csv).unwrap();
//!
//! assert_eq!(banks[0].bank_code, "0200");
//! assert_eq!(banks[0].bic, "SUBASKBX");
//! ```

mod slovakia;
mod slovenia;

use csv::{ReaderBuilder, StringRecord};
use tracing::{debug, info};

use iban_registry_core::BankRecord;

use crate::error::ParseError;

pub use slovakia::SlovakiaRegistry;
pub use slovenia::SloveniaRegistry;

/// Country codes with a bank registry normalizer.
pub const SUPPORTED_BANK_REGISTRIES: &[&str] = &["SI", "SK"];

/// Column layout of one national bank-code CSV export.
pub trait BankRegistrySource: Send + Sync {
    /// ISO 3166 code stamped on every record.
    fn country_code(&self) -> &'static str;

    /// Field delimiter of the export.
    fn delimiter(&self) -> u8 {
        b';'
    }

    /// Maps one data row to a bank record.
    fn record_from_row(&self, row: &StringRecord) -> BankRecord;
}

/// Returns the normalizer for `country`, case-insensitively.
pub fn source_for_country(country: &str) -> Option<Box<dyn BankRegistrySource>> {
    match country.to_ascii_uppercase().as_str() {
        "SI" => Some(Box::new(SloveniaRegistry)),
        "SK" => Some(Box::new(SlovakiaRegistry)),
        _ => None,
    }
}

/// Reads a bank-code CSV export into normalized records.
///
/// The first row is the header. Rows whose cells are all blank are
/// dropped; rows shorter than the layout expects read missing cells as
/// empty strings.
///
/// # Errors
///
/// Returns [`ParseError::Csv`] when the text is not valid CSV.
pub fn normalize_bank_registry(
    source: &dyn BankRegistrySource,
    csv_text: &str,
) -> Result<Vec<BankRecord>, ParseError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(source.delimiter())
        .flexible(true)
        .from_reader(csv_text.as_bytes());

    let mut records = Vec::new();
    for (index, row) in reader.records().enumerate() {
        let row = row?;
        if row.iter().all(|cell| cell.trim().is_empty()) {
            debug!(row = index + 2, "skipping blank bank registry row");
            continue;
        }
        records.push(source.record_from_row(&row));
    }

    info!(
        country = source.country_code(),
        count = records.len(),
        "fetched bank records"
    );
    Ok(records)
}

/// Trimmed cell at `index`, or an empty string when the row is short.
pub(crate) fn cell(row: &StringRecord, index: usize) -> String {
    row.get(index).map(str::trim).unwrap_or_default().to_string()
}
