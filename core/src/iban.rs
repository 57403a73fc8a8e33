//! IBAN checking and construction.
//!
//! An IBAN is the two-letter country code, two check digits and the
//! country's BBAN. The check digits are the ISO 7064 mod-97-10 checksum of
//! the BBAN followed by the country code, with letters counted as `A = 10`
//! through `Z = 35`. A valid IBAN has a well-formed prefix, a registered
//! country, the length registered for that country and matching check
//! digits.
//!
//! # Examples
//!
//! ```
//! use iban_registry_core::*;
//!
//! assert_eq!(iban_checksum("DE", "370400440532013000").unwrap(), "DE89");
//! assert!(is_valid_iban_checksum("DE89370400440532013000"));
//! assert_eq!(
//!     build_iban("gb", "WEST 1234 5698 7654 32"),
//!     Err(IbanError::InvalidCountryCode("gb".into()))
//! );
//! assert_eq!(build_iban("GB", "west 1234 5698 7654 32").unwrap(), "GB82WEST12345698765432");
//! ```

use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::{IBAN_PREFIX_LENGTH, IbanRegistry, IbanStructure, Range, is_country_code};

/// Shortest IBAN any country may register.
pub const MIN_IBAN_LENGTH: usize = 5;
/// Longest IBAN any country may register.
pub const MAX_IBAN_LENGTH: usize = 34;

// SAFETY: These regexes are compile-time constants and are validated by tests.
static IBAN_PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z]{2}[0-9]{2}").expect("static regex must compile"));
static NON_IBAN_CHARS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9A-Z]").expect("static regex must compile"));

/// IBAN checking and construction errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IbanError {
    /// Input does not start with two letters and two digits.
    #[error("IBAN must start with a country code and two check digits: {0:?}")]
    InvalidStructure(String),
    #[error("invalid country code: {0:?}")]
    InvalidCountryCode(String),
    #[error("{0}: no IBAN structure registered")]
    UnknownCountry(String),
    #[error("{country}: IBAN has {length} characters, expected {expected}")]
    InvalidLength {
        country: String,
        length: usize,
        expected: usize,
    },
    #[error("{country}: check digits {found} do not match {expected}")]
    InvalidChecksum {
        country: String,
        found: String,
        expected: String,
    },
    /// Only ASCII digits and uppercase letters enter the checksum.
    #[error("invalid character {0:?}")]
    InvalidCharacter(char),
    #[error("{country}: {segment} {value:?} must have {expected} characters")]
    InvalidSegmentLength {
        country: String,
        segment: &'static str,
        value: String,
        expected: usize,
    },
    #[error("{country}: {segment} range {range} lies outside the BBAN")]
    SegmentOutOfBounds {
        country: String,
        segment: &'static str,
        range: Range,
    },
    #[error("{country}: registered BBAN length {length} exceeds the longest IBAN")]
    UnsupportedBbanLength { country: String, length: usize },
}

/// Removes every character that cannot appear in an electronic-format
/// IBAN, such as the spaces of the print format.
///
/// Letters are not uppercased; lowercase letters are dropped.
pub fn normalize_iban(input: &str) -> String {
    NON_IBAN_CHARS_RE.replace_all(input, "").into_owned()
}

/// Returns `true` if `iban` starts with two uppercase letters and two digits.
pub fn is_valid_iban_structure(iban: &str) -> bool {
    IBAN_PREFIX_RE.is_match(iban)
}

/// Returns `true` if `iban` has the length registered in `structure`.
pub fn is_valid_iban_length(iban: &str, structure: &IbanStructure) -> bool {
    (MIN_IBAN_LENGTH..=MAX_IBAN_LENGTH).contains(&iban.len()) && iban.len() == structure.iban_length
}

/// Computes the IBAN prefix (country code and check digits) for a BBAN.
///
/// # Errors
///
/// Fails on a malformed country code or a BBAN character other than an
/// ASCII digit or uppercase letter.
pub fn iban_checksum(country: &str, bban: &str) -> Result<String, IbanError> {
    if !is_country_code(country) {
        return Err(IbanError::InvalidCountryCode(country.to_string()));
    }
    let remainder = mod97(bban.chars().chain(country.chars()).chain("00".chars()))?;
    Ok(format!("{country}{:02}", 98 - remainder))
}

/// Returns `true` if the check digits of `iban` match its BBAN.
pub fn is_valid_iban_checksum(iban: &str) -> bool {
    if !is_valid_iban_structure(iban) {
        return false;
    }
    let (prefix, bban) = iban.split_at(IBAN_PREFIX_LENGTH);
    iban_checksum(&prefix[..2], bban).is_ok_and(|expected| expected == prefix)
}

/// Checks an IBAN against the registry and returns its electronic format.
///
/// Separators are removed first. The prefix, the country, the registered
/// length and the check digits are checked in that order and the first
/// failure is returned.
pub fn validate_iban(input: &str, registry: &IbanRegistry) -> Result<String, IbanError> {
    let iban = normalize_iban(input);
    if !is_valid_iban_structure(&iban) {
        return Err(IbanError::InvalidStructure(input.to_string()));
    }

    let (prefix, bban) = iban.split_at(IBAN_PREFIX_LENGTH);
    let country = &prefix[..2];
    let structure = registry
        .get(country)
        .ok_or_else(|| IbanError::UnknownCountry(country.to_string()))?;

    if !is_valid_iban_length(&iban, structure) {
        return Err(IbanError::InvalidLength {
            country: country.to_string(),
            length: iban.len(),
            expected: structure.iban_length,
        });
    }

    let expected = iban_checksum(country, bban)?;
    if expected != prefix {
        return Err(IbanError::InvalidChecksum {
            country: country.to_string(),
            found: prefix[2..].to_string(),
            expected: expected[2..].to_string(),
        });
    }

    Ok(iban)
}

/// Builds an IBAN from a country code and a BBAN.
///
/// Characters other than ASCII letters and digits are removed from the
/// BBAN and letters are uppercased. The BBAN length is not checked; pass
/// the result to [`validate_iban`] for that.
pub fn build_iban(country: &str, bban: &str) -> Result<String, IbanError> {
    let bban: String = bban
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let prefix = iban_checksum(country, &bban)?;
    Ok(prefix + &bban)
}

/// Builds an IBAN from domestic bank, branch and account codes.
///
/// Each code must fill its registered range exactly. BBAN characters no
/// range covers are set to `0`. Codes may not contain separators.
///
/// ```
/// use iban_registry_core::*;
///
/// let gb = IbanStructure {
///     bban_spec: "4!a6!n8!n".into(),
///     iban_spec: "GB2!n4!a6!n8!n".into(),
///     bban_length: 18,
///     iban_length: 22,
///     positions: PositionSchema {
///         account_code: Range::new(10, 18),
///         bank_code: Range::new(0, 4),
///         branch_code: Range::new(4, 10),
///     },
/// };
///
/// let iban = build_iban_from_parts("GB", &gb, "WEST", "123456", "98765432").unwrap();
/// assert_eq!(iban, "GB82WEST12345698765432");
/// ```
pub fn build_iban_from_parts(
    country: &str,
    structure: &IbanStructure,
    bank_code: &str,
    branch_code: &str,
    account_code: &str,
) -> Result<String, IbanError> {
    if structure.bban_length > MAX_IBAN_LENGTH - IBAN_PREFIX_LENGTH {
        return Err(IbanError::UnsupportedBbanLength {
            country: country.to_string(),
            length: structure.bban_length,
        });
    }

    let positions = &structure.positions;
    let segments = [
        ("bank code", positions.bank_code, bank_code),
        ("branch code", positions.branch_code, branch_code),
        ("account code", positions.account_code, account_code),
    ];

    let mut bban = vec![b'0'; structure.bban_length];
    for (segment, range, value) in segments {
        if let Some(c) = value.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(IbanError::InvalidCharacter(c));
        }
        if value.len() != range.len() {
            return Err(IbanError::InvalidSegmentLength {
                country: country.to_string(),
                segment,
                value: value.to_string(),
                expected: range.len(),
            });
        }
        let target = bban
            .get_mut(range.start..range.end)
            .ok_or_else(|| IbanError::SegmentOutOfBounds {
                country: country.to_string(),
                segment,
                range,
            })?;
        target.copy_from_slice(value.as_bytes());
    }

    let bban: String = bban.into_iter().map(char::from).collect();
    build_iban(country, &bban)
}

/// Folds IBAN characters into their mod-97 remainder, one digit at a time.
fn mod97(mut chars: impl Iterator<Item = char>) -> Result<u32, IbanError> {
    chars.try_fold(0, |remainder, c| {
        if !(c.is_ascii_digit() || c.is_ascii_uppercase()) {
            return Err(IbanError::InvalidCharacter(c));
        }
        let value = c.to_digit(36).ok_or(IbanError::InvalidCharacter(c))?;
        let shift = if value < 10 { 10 } else { 100 };
        Ok((remainder * shift + value) % 97)
    })
}

#[cfg(test)]
mod tests {
    use crate::PositionSchema;

    use super::*;

    fn structure(bban_length: usize, bank: Range, branch: Range) -> IbanStructure {
        IbanStructure {
            bban_spec: String::new(),
            iban_spec: String::new(),
            bban_length,
            iban_length: bban_length + IBAN_PREFIX_LENGTH,
            positions: PositionSchema {
                account_code: Range::new(bank.end.max(branch.end), bban_length),
                bank_code: bank,
                branch_code: branch,
            },
        }
    }

    fn registry() -> IbanRegistry {
        [
            ("DE".to_string(), structure(18, Range::new(0, 8), Range::at(8))),
            ("FR".to_string(), structure(23, Range::new(0, 5), Range::new(5, 10))),
            ("NL".to_string(), structure(14, Range::new(0, 4), Range::at(4))),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_iban_checksum() {
        assert_eq!(iban_checksum("DE", "370400440532013000").unwrap(), "DE89");
        assert_eq!(iban_checksum("FR", "20041010050500013M02606").unwrap(), "FR14");
        assert_eq!(iban_checksum("SI", "263300012039086").unwrap(), "SI56");
    }

    #[test]
    fn test_iban_checksum_pads_single_digit() {
        assert_eq!(iban_checksum("NL", "ABNA0123456789").unwrap(), "NL02");
    }

    #[test]
    fn test_iban_checksum_rejects_lowercase() {
        assert_eq!(
            iban_checksum("NL", "abna0123456789"),
            Err(IbanError::InvalidCharacter('a'))
        );
        assert_eq!(
            iban_checksum("nl", "ABNA0123456789"),
            Err(IbanError::InvalidCountryCode("nl".to_string()))
        );
    }

    #[test]
    fn test_iban_structure_prefix() {
        assert!(is_valid_iban_structure("DE89370400440532013000"));
        assert!(is_valid_iban_structure("DE89"));
        assert!(!is_valid_iban_structure("D189370400440532013000"));
        assert!(!is_valid_iban_structure("DEX9370400440532013000"));
        assert!(!is_valid_iban_structure("de89370400440532013000"));
    }

    #[test]
    fn test_iban_length_bounds() {
        let mut entry = structure(18, Range::new(0, 8), Range::at(8));
        assert!(is_valid_iban_length("DE89370400440532013000", &entry));
        assert!(!is_valid_iban_length("DE8937040044053201300", &entry));

        entry.iban_length = 4;
        assert!(!is_valid_iban_length("DE89", &entry));
    }

    #[test]
    fn test_checksum_verification() {
        assert!(is_valid_iban_checksum("FR1420041010050500013M02606"));
        assert!(!is_valid_iban_checksum("FR1520041010050500013M02606"));
        assert!(!is_valid_iban_checksum("FR14"));
        assert!(!is_valid_iban_checksum("FR14 2004"));
    }

    #[test]
    fn test_validate_iban_print_format() {
        let iban = validate_iban("DE89 3704 0044 0532 0130 00", &registry()).unwrap();
        assert_eq!(iban, "DE89370400440532013000");
    }

    #[test]
    fn test_validate_iban_reports_first_failure() {
        let registry = registry();

        assert_eq!(
            validate_iban("89DE370400440532013000", &registry),
            Err(IbanError::InvalidStructure("89DE370400440532013000".to_string()))
        );
        assert_eq!(
            validate_iban("GB82WEST12345698765432", &registry),
            Err(IbanError::UnknownCountry("GB".to_string()))
        );
        assert_eq!(
            validate_iban("DE8937040044053201300", &registry),
            Err(IbanError::InvalidLength {
                country: "DE".to_string(),
                length: 21,
                expected: 22,
            })
        );
        assert_eq!(
            validate_iban("DE88370400440532013000", &registry),
            Err(IbanError::InvalidChecksum {
                country: "DE".to_string(),
                found: "88".to_string(),
                expected: "89".to_string(),
            })
        );
    }

    #[test]
    fn test_build_iban_normalizes_bban() {
        assert_eq!(build_iban("NL", "abna-0123-4567-89").unwrap(), "NL02ABNA0123456789");
    }

    #[test]
    fn test_build_iban_from_parts() {
        let registry = registry();
        let fr = registry.get("FR").unwrap();
        let iban = build_iban_from_parts("FR", fr, "20041", "01005", "0500013M02606").unwrap();
        assert_eq!(iban, "FR1420041010050500013M02606");
        assert_eq!(validate_iban(&iban, &registry).unwrap(), iban);

        let de = registry.get("DE").unwrap();
        let iban = build_iban_from_parts("DE", de, "37040044", "", "0532013000").unwrap();
        assert_eq!(iban, "DE89370400440532013000");
    }

    #[test]
    fn test_build_iban_from_parts_checks_segments() {
        let registry = registry();
        let fr = registry.get("FR").unwrap();

        assert_eq!(
            build_iban_from_parts("FR", fr, "2004", "01005", "0500013M02606"),
            Err(IbanError::InvalidSegmentLength {
                country: "FR".to_string(),
                segment: "bank code",
                value: "2004".to_string(),
                expected: 5,
            })
        );
        assert_eq!(
            build_iban_from_parts("FR", fr, "20041", "01 05", "0500013M02606"),
            Err(IbanError::InvalidCharacter(' '))
        );
    }

    #[test]
    fn test_build_iban_from_parts_rejects_broken_structure() {
        let mut entry = structure(10, Range::new(0, 4), Range::at(4));
        entry.positions.bank_code = Range::new(8, 12);
        assert_eq!(
            build_iban_from_parts("XX", &entry, "ABCD", "", "123456"),
            Err(IbanError::SegmentOutOfBounds {
                country: "XX".to_string(),
                segment: "bank code",
                range: Range::new(8, 12),
            })
        );

        entry.bban_length = usize::MAX;
        assert!(matches!(
            build_iban_from_parts("XX", &entry, "ABCD", "", "123456"),
            Err(IbanError::UnsupportedBbanLength { .. })
        ));
    }
}
