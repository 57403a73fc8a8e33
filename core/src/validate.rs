//! Structural validation of registry entries.
//!
//! Checks the consistency rules a generated or hand-edited registry is
//! expected to satisfy: IBAN/BBAN length agreement, in-bounds segments,
//! non-overlapping bank and branch codes, and well-formed country codes
//! and BICs. Validation reports problems; it never rewrites data.
//!
//! # Examples
//!
//! ```
//! use iban_registry_core::*;
//!
//! let mut entry = IbanStructure {
//!     bban_spec: "8!n10!n".into(),
//!     iban_spec: "DE2!n8!n10!n".into(),
//!     bban_length: 18,
//!     iban_length: 22,
//!     positions: PositionSchema {
//!         account_code: Range::new(8, 18),
//!         bank_code: Range::new(0, 8),
//!         branch_code: Range::at(8),
//!     },
//! };
//! assert!(validate_structure("DE", &entry).is_empty());
//!
//! // IBAN length must be BBAN length + 4
//! entry.iban_length = 21;
//! assert!(!validate_structure("DE", &entry).is_empty());
//! ```

use thiserror::Error;

use crate::{
    BIC_LENGTH, BankRecord, IbanRegistry, IbanStructure, Range, SHORT_BIC_LENGTH, is_valid_bic,
};

/// Length of the country code plus check digits prefix of every IBAN.
pub const IBAN_PREFIX_LENGTH: usize = 4;

/// Registry validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Country code is not two uppercase ASCII letters.
    #[error("invalid country code: {0:?}")]
    InvalidCountryCode(String),
    #[error("{country}: IBAN length {iban_length} does not equal BBAN length {bban_length} + 4")]
    LengthMismatch {
        country: String,
        bban_length: usize,
        iban_length: usize,
    },
    #[error("{country}: {segment} range {range} is inverted")]
    InvertedRange {
        country: String,
        segment: &'static str,
        range: Range,
    },
    #[error("{country}: {segment} range {range} exceeds BBAN length {bban_length}")]
    OutOfBounds {
        country: String,
        segment: &'static str,
        range: Range,
        bban_length: usize,
    },
    #[error("{country}: account code range {range} does not end at BBAN length {bban_length}")]
    AccountNotTerminal {
        country: String,
        range: Range,
        bban_length: usize,
    },
    #[error("{country}: bank code {bank} overlaps branch code {branch}")]
    SegmentOverlap {
        country: String,
        bank: Range,
        branch: Range,
    },
    #[error("{country}: gap between bank code {bank} and branch code {branch}")]
    SegmentGap {
        country: String,
        bank: Range,
        branch: Range,
    },
    /// BIC is neither 8 nor 11 characters long.
    #[error("{country}/{bank_code}: invalid BIC length: {bic:?}")]
    InvalidBicLength {
        country: String,
        bank_code: String,
        bic: String,
    },
    /// BIC has a valid length but malformed institution, country,
    /// location or branch code.
    #[error("{country}/{bank_code}: malformed BIC: {bic:?}")]
    InvalidBic {
        country: String,
        bank_code: String,
        bic: String,
    },
    #[error("{country}: empty bank code for {name:?}")]
    EmptyBankCode { country: String, name: String },
}

/// Returns `true` for two uppercase ASCII letters.
pub fn is_country_code(code: &str) -> bool {
    code.len() == 2 && code.bytes().all(|b| b.is_ascii_uppercase())
}

/// Validates every entry of a registry.
pub fn validate_registry(registry: &IbanRegistry) -> Vec<ValidationError> {
    registry
        .iter()
        .flat_map(|(country, entry)| validate_structure(country, entry))
        .collect()
}

/// Validates one country's IBAN structure.
///
/// Every problem of the entry is reported, not just the first one.
pub fn validate_structure(country: &str, entry: &IbanStructure) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !is_country_code(country) {
        errors.push(ValidationError::InvalidCountryCode(country.to_string()));
    }

    if entry.bban_length.checked_add(IBAN_PREFIX_LENGTH) != Some(entry.iban_length) {
        errors.push(ValidationError::LengthMismatch {
            country: country.to_string(),
            bban_length: entry.bban_length,
            iban_length: entry.iban_length,
        });
    }

    let positions = &entry.positions;
    let segments = [
        ("bank code", positions.bank_code),
        ("branch code", positions.branch_code),
        ("account code", positions.account_code),
    ];
    for (segment, range) in segments {
        if range.start > range.end {
            errors.push(ValidationError::InvertedRange {
                country: country.to_string(),
                segment,
                range,
            });
        } else if range.end > entry.bban_length {
            errors.push(ValidationError::OutOfBounds {
                country: country.to_string(),
                segment,
                range,
                bban_length: entry.bban_length,
            });
        }
    }

    if positions.account_code.end != entry.bban_length {
        errors.push(ValidationError::AccountNotTerminal {
            country: country.to_string(),
            range: positions.account_code,
            bban_length: entry.bban_length,
        });
    }

    let (bank, branch) = (positions.bank_code, positions.branch_code);
    if bank.overlaps(&branch) {
        errors.push(ValidationError::SegmentOverlap {
            country: country.to_string(),
            bank,
            branch,
        });
    } else if !branch.is_empty() && branch.start > bank.end {
        errors.push(ValidationError::SegmentGap {
            country: country.to_string(),
            bank,
            branch,
        });
    }

    errors
}

/// Validates one bank-code registry record.
pub fn validate_bank_record(record: &BankRecord) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if !is_country_code(&record.country_code) {
        errors.push(ValidationError::InvalidCountryCode(record.country_code.clone()));
    }

    if record.bank_code.trim().is_empty() {
        errors.push(ValidationError::EmptyBankCode {
            country: record.country_code.clone(),
            name: record.name.clone(),
        });
    }

    // Some registries publish banks without a BIC.
    let bic = &record.bic;
    if bic.is_empty() {
        return errors;
    }
    if bic.len() != SHORT_BIC_LENGTH && bic.len() != BIC_LENGTH {
        errors.push(ValidationError::InvalidBicLength {
            country: record.country_code.clone(),
            bank_code: record.bank_code.clone(),
            bic: bic.clone(),
        });
    } else if !is_valid_bic(bic) {
        errors.push(ValidationError::InvalidBic {
            country: record.country_code.clone(),
            bank_code: record.bank_code.clone(),
            bic: bic.clone(),
        });
    }

    errors
}

#[cfg(test)]
mod tests {
    use crate::PositionSchema;

    use super::*;

    fn structure(bank: Range, branch: Range, bban_length: usize) -> IbanStructure {
        IbanStructure {
            bban_spec: String::new(),
            iban_spec: String::new(),
            bban_length,
            iban_length: bban_length + 4,
            positions: PositionSchema {
                account_code: Range::new(bank.end.max(branch.end), bban_length),
                bank_code: bank,
                branch_code: branch,
            },
        }
    }

    #[test]
    fn test_validate_structure_accepts_contiguous_segments() {
        let entry = structure(Range::new(0, 4), Range::new(4, 10), 18);
        assert!(validate_structure("GB", &entry).is_empty());
    }

    #[test]
    fn test_validate_structure_rejects_lowercase_country() {
        let entry = structure(Range::new(0, 4), Range::at(4), 18);
        assert_eq!(
            validate_structure("gb", &entry),
            vec![ValidationError::InvalidCountryCode("gb".to_string())]
        );
    }

    #[test]
    fn test_validate_structure_reports_overlap() {
        let entry = structure(Range::new(0, 5), Range::new(3, 8), 20);
        let errors = validate_structure("XX", &entry);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::SegmentOverlap { .. })));
    }

    #[test]
    fn test_validate_structure_reports_gap_before_branch() {
        let entry = structure(Range::new(0, 4), Range::new(6, 8), 20);
        let errors = validate_structure("XX", &entry);
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::SegmentGap { .. })));
    }

    #[test]
    fn test_validate_structure_reports_out_of_bounds() {
        let mut entry = structure(Range::new(0, 4), Range::at(4), 10);
        entry.positions.bank_code = Range::new(0, 12);
        let errors = validate_structure("XX", &entry);
        assert!(errors.iter().any(|e| matches!(
            e,
            ValidationError::OutOfBounds {
                segment: "bank code",
                ..
            }
        )));
    }

    #[test]
    fn test_validate_bank_record_bic_length() {
        let ok = BankRecord::new("SK", "0200", "SUBASKBX", "Vseobecna uverova banka");
        assert!(validate_bank_record(&ok).is_empty());

        let no_bic = BankRecord::new("SK", "0720", "", "Narodna banka Slovenska");
        assert!(validate_bank_record(&no_bic).is_empty());

        let bad = BankRecord::new("SK", "0900", "GIBASKB", "Slovenska sporitelna");
        assert_eq!(
            validate_bank_record(&bad),
            vec![ValidationError::InvalidBicLength {
                country: "SK".to_string(),
                bank_code: "0900".to_string(),
                bic: "GIBASKB".to_string(),
            }]
        );
    }

    #[test]
    fn test_validate_bank_record_bic_structure() {
        let branch = BankRecord::new("SI", "02000", "LJBASI2X123", "NLB d.d.");
        assert!(validate_bank_record(&branch).is_empty());

        let lowercase = BankRecord::new("SI", "03100", "skbasi2x", "SKB banka d.d.");
        let digit_country = BankRecord::new("SK", "8360", "BREX5KBX", "mBank S.A.");
        for record in [lowercase, digit_country] {
            assert_eq!(
                validate_bank_record(&record),
                vec![ValidationError::InvalidBic {
                    country: record.country_code.clone(),
                    bank_code: record.bank_code.clone(),
                    bic: record.bic.clone(),
                }]
            );
        }
    }

    #[test]
    fn test_validate_structure_huge_bban_length() {
        let mut entry = structure(Range::new(0, 4), Range::at(4), 18);
        entry.bban_length = usize::MAX;
        entry.iban_length = 22;
        let errors = validate_structure("XX", &entry);
        assert!(errors.contains(&ValidationError::LengthMismatch {
            country: "XX".to_string(),
            bban_length: usize::MAX,
            iban_length: 22,
        }));

        entry.iban_length = usize::MAX;
        assert!(validate_structure("XX", &entry)
            .iter()
            .any(|e| matches!(e, ValidationError::LengthMismatch { .. })));
    }
}
