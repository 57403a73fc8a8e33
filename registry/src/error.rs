//! Error types for registry parsing.

use thiserror::Error;

/// Fatal input-format errors raised while parsing a registry document or a
/// bank-code CSV export.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A length cell contains no digit run.
    #[error("no length figure in {field:?} cell {index}: {cell:?}")]
    MissingLength {
        field: &'static str,
        index: usize,
        cell: String,
    },

    /// A primary country cell contains no two-letter code.
    #[error("no country code in cell {index}: {cell:?}")]
    MissingCountryCode { index: usize, cell: String },

    /// Recognized columns disagree on the number of records.
    #[error("column {field:?} has {found} cells but {reference:?} has {expected}")]
    ColumnLengthMismatch {
        field: &'static str,
        reference: &'static str,
        expected: usize,
        found: usize,
    },

    /// A column every record needs never appeared in the document.
    #[error("required column missing: {0:?}")]
    MissingColumn(&'static str),

    /// No bank registry normalizer exists for the requested country.
    #[error("unsupported bank registry: {0}")]
    UnsupportedRegistry(String),

    /// Malformed CSV input.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
