//! Registry type definitions.
//!
//! This module defines the data model shared by the parser, the loader and
//! the CLI. The types are designed for serialization with [`serde`] and
//! match the JSON artifacts consumed downstream field for field.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Zero-based, half-open character range `[start, end)` within a BBAN.
///
/// Serialized as a two-element JSON array (`[4, 8]`). An *absent* range is
/// never encoded as a special value of this type; callers use
/// `Option<Range>` for that.
///
/// # Examples
///
/// ```
/// use iban_registry_core::Range;
///
/// let bank = Range::new(0, 4);
/// assert_eq!(bank.len(), 4);
/// assert_eq!(bank.slice("30004000031234567890"), Some("3000"));
///
/// let anchor = Range::at(bank.end);
/// assert!(anchor.is_empty());
/// assert_eq!(anchor, Range::new(4, 4));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "(usize, usize)", into = "(usize, usize)")]
pub struct Range {
    /// First character position (inclusive).
    pub start: usize,
    /// Last character position (exclusive).
    pub end: usize,
}

impl Range {
    /// Zero-width range at offset 0.
    pub const EMPTY: Range = Range { start: 0, end: 0 };

    /// Creates a range from its bounds.
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Creates a zero-width range anchored at `offset`.
    pub const fn at(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Number of characters covered; zero for inverted ranges.
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Returns `true` when the range covers no characters.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `true` when both ranges share at least one character.
    ///
    /// Zero-width ranges never overlap anything.
    pub fn overlaps(&self, other: &Range) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// Returns the substring of `bban` covered by this range, if in bounds.
    pub fn slice<'a>(&self, bban: &'a str) -> Option<&'a str> {
        bban.get(self.start..self.end)
    }
}

impl From<(usize, usize)> for Range {
    fn from((start, end): (usize, usize)) -> Self {
        Self { start, end }
    }
}

impl From<Range> for (usize, usize) {
    fn from(range: Range) -> Self {
        (range.start, range.end)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// One column of the published IBAN registry, keyed by field.
///
/// Built once per record of the source document and never mutated
/// afterwards. Position fields are `None` when the source cell carries no
/// `from-to` pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Primary ISO 3166 country code.
    pub country: String,
    /// Further countries/territories governed by the same structure.
    pub other_countries: Vec<String>,
    /// BBAN structure grammar (e.g. `4!n4!n12!c`).
    pub bban_spec: String,
    /// IBAN structure grammar (e.g. `AD2!n4!n4!n12!c`).
    pub iban_spec: String,
    pub bban_length: usize,
    pub iban_length: usize,
    pub bank_code_position: Option<Range>,
    pub branch_code_position: Option<Range>,
}

impl RawRecord {
    /// Returns the primary country followed by every covered country.
    ///
    /// # Examples
    ///
    /// ```
    /// use iban_registry_core::RawRecord;
    ///
    /// let record = RawRecord {
    ///     country: "FR".into(),
    ///     other_countries: vec!["MC".into(), "GP".into()],
    ///     bban_spec: "5!n5!n11!c2!n".into(),
    ///     iban_spec: "FR2!n5!n5!n11!c2!n".into(),
    ///     bban_length: 23,
    ///     iban_length: 27,
    ///     bank_code_position: None,
    ///     branch_code_position: None,
    /// };
    /// let codes: Vec<&str> = record.country_codes().collect();
    /// assert_eq!(codes, vec!["FR", "MC", "GP"]);
    /// ```
    pub fn country_codes(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.country.as_str()).chain(self.other_countries.iter().map(String::as_str))
    }
}

/// Derived substring ranges locating each BBAN segment.
///
/// Field order matches the generated JSON artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionSchema {
    pub account_code: Range,
    pub bank_code: Range,
    pub branch_code: Range,
}

/// Segments of a concrete BBAN, split with a [`PositionSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BbanParts<'a> {
    pub bank_code: &'a str,
    pub branch_code: &'a str,
    pub account_code: &'a str,
}

/// Structural description of one country's IBAN.
///
/// Missing fields deserialize to their defaults, so hand-written override
/// files may carry only the fields they change.
///
/// # Examples
///
/// ```
/// use iban_registry_core::{IbanStructure, PositionSchema, Range};
///
/// let andorra = IbanStructure {
///     bban_spec: "4!n4!n12!c".into(),
///     iban_spec: "AD2!n4!n4!n12!c".into(),
///     bban_length: 20,
///     iban_length: 24,
///     positions: PositionSchema {
///         account_code: Range::new(8, 20),
///         bank_code: Range::new(0, 4),
///         branch_code: Range::new(4, 8),
///     },
/// };
///
/// let parts = andorra.split_bban("00012030200359100100").unwrap();
/// assert_eq!(parts.bank_code, "0001");
/// assert_eq!(parts.branch_code, "2030");
/// assert_eq!(parts.account_code, "200359100100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IbanStructure {
    pub bban_spec: String,
    pub iban_spec: String,
    pub bban_length: usize,
    pub iban_length: usize,
    pub positions: PositionSchema,
}

impl IbanStructure {
    /// Splits `bban` into bank, branch and account segments.
    ///
    /// Returns `None` when `bban` does not have the registered length or a
    /// range falls outside it.
    pub fn split_bban<'a>(&self, bban: &'a str) -> Option<BbanParts<'a>> {
        if bban.len() != self.bban_length {
            return None;
        }
        Some(BbanParts {
            bank_code: self.positions.bank_code.slice(bban)?,
            branch_code: self.positions.branch_code.slice(bban)?,
            account_code: self.positions.account_code.slice(bban)?,
        })
    }
}

/// Country code → [`IbanStructure`] mapping.
///
/// Keys are kept sorted so serialization is deterministic. Serialized as a
/// plain JSON object.
///
/// # Examples
///
/// ```
/// use iban_registry_core::{IbanRegistry, IbanStructure};
///
/// let mut registry = IbanRegistry::new();
/// registry.insert("MC", IbanStructure::default());
/// registry.insert("FR", IbanStructure::default());
///
/// let countries: Vec<&str> = registry.countries().collect();
/// assert_eq!(countries, vec!["FR", "MC"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IbanRegistry {
    entries: BTreeMap<String, IbanStructure>,
}

impl IbanRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry` under `country`, returning the entry it replaced.
    pub fn insert(&mut self, country: impl Into<String>, entry: IbanStructure) -> Option<IbanStructure> {
        self.entries.insert(country.into(), entry)
    }

    pub fn get(&self, country: &str) -> Option<&IbanStructure> {
        self.entries.get(country)
    }

    pub fn get_mut(&mut self, country: &str) -> Option<&mut IbanStructure> {
        self.entries.get_mut(country)
    }

    pub fn contains(&self, country: &str) -> bool {
        self.entries.contains_key(country)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over country codes in sorted order.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over `(country, entry)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &IbanStructure)> {
        self.entries.iter().map(|(code, entry)| (code.as_str(), entry))
    }
}

impl FromIterator<(String, IbanStructure)> for IbanRegistry {
    fn from_iter<I: IntoIterator<Item = (String, IbanStructure)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for IbanRegistry {
    type Item = (String, IbanStructure);
    type IntoIter = std::collections::btree_map::IntoIter<String, IbanStructure>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

/// One bank of a national bank-code registry.
///
/// # Examples
///
/// ```
/// use iban_registry_core::BankRecord;
///
/// let bank = BankRecord::new("SI", "01000", "BSLJSI2XXXX", "Banka Slovenije");
/// assert!(bank.primary);
/// assert_eq!(bank.short_name, "Banka Slovenije");
///
/// let json = serde_json::to_value(&bank).unwrap();
/// assert!(json.get("address").is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankRecord {
    pub country_code: String,
    pub primary: bool,
    pub bic: String,
    pub bank_code: String,
    pub name: String,
    pub short_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checksum_algo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl BankRecord {
    /// Creates a primary bank record whose short name equals its name.
    pub fn new(
        country_code: impl Into<String>,
        bank_code: impl Into<String>,
        bic: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            country_code: country_code.into(),
            primary: true,
            bic: bic.into(),
            bank_code: bank_code.into(),
            short_name: name.clone(),
            name,
            checksum_algo: None,
            address: None,
        }
    }

    /// Marks this record as a secondary entry for its bank code.
    pub fn secondary(mut self) -> Self {
        self.primary = false;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_serializes_as_pair() {
        let json = serde_json::to_string(&Range::new(4, 9)).unwrap();
        assert_eq!(json, "[4,9]");

        let parsed: Range = serde_json::from_str("[0, 5]").unwrap();
        assert_eq!(parsed, Range::new(0, 5));
    }

    #[test]
    fn test_range_overlap_ignores_zero_width() {
        let bank = Range::new(0, 5);
        assert!(bank.overlaps(&Range::new(4, 9)));
        assert!(!bank.overlaps(&Range::new(5, 9)));
        assert!(!bank.overlaps(&Range::at(2)));
    }

    #[test]
    fn test_structure_json_field_names() {
        let entry = IbanStructure {
            bban_spec: "4!n4!n12!c".into(),
            iban_spec: "AD2!n4!n4!n12!c".into(),
            bban_length: 20,
            iban_length: 24,
            positions: PositionSchema {
                account_code: Range::new(8, 20),
                bank_code: Range::new(0, 4),
                branch_code: Range::new(4, 8),
            },
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["bban_spec"], "4!n4!n12!c");
        assert_eq!(value["iban_length"], 24);
        assert_eq!(value["positions"]["account_code"], serde_json::json!([8, 20]));
        assert_eq!(value["positions"]["branch_code"], serde_json::json!([4, 8]));
    }

    #[test]
    fn test_structure_tolerates_missing_fields() {
        let entry: IbanStructure = serde_json::from_str(r#"{"bban_length": 18}"#).unwrap();
        assert_eq!(entry.bban_length, 18);
        assert!(entry.bban_spec.is_empty());
        assert_eq!(entry.positions, PositionSchema::default());
    }

    #[test]
    fn test_split_bban_rejects_wrong_length() {
        let entry = IbanStructure {
            bban_length: 8,
            positions: PositionSchema {
                account_code: Range::new(4, 8),
                bank_code: Range::new(0, 4),
                branch_code: Range::at(4),
            },
            ..IbanStructure::default()
        };

        assert!(entry.split_bban("1234567").is_none());
        let parts = entry.split_bban("12345678").unwrap();
        assert_eq!(parts.bank_code, "1234");
        assert_eq!(parts.branch_code, "");
        assert_eq!(parts.account_code, "5678");
    }

    #[test]
    fn test_registry_from_iter_keeps_last_value() {
        let registry: IbanRegistry = vec![
            ("DE".to_string(), IbanStructure::default()),
            (
                "DE".to_string(),
                IbanStructure {
                    bban_length: 18,
                    ..IbanStructure::default()
                },
            ),
        ]
        .into_iter()
        .collect();

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("DE").unwrap().bban_length, 18);
    }
}
