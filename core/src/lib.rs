//! Core registry types, validation and override merging.
//!
//! This crate defines the data model for normalized IBAN structure and
//! bank-code registries:
//!
//! - [`Range`]: a zero-based, half-open character range within a BBAN.
//! - [`RawRecord`]: one record of the published IBAN registry, before
//!   derivation.
//! - [`PositionSchema`]: bank, branch and account code ranges.
//! - [`IbanStructure`]: one country's IBAN layout, as stored in the
//!   generated JSON artifact.
//! - [`IbanRegistry`]: country code → [`IbanStructure`] mapping.
//! - [`BankRecord`]: one bank of a national bank-code registry.
//!
//! Validation ([`validate_structure`], [`validate_registry`],
//! [`validate_bank_record`]) reports inconsistent lengths and segments.
//!
//! Override merging ([`apply_overrides`]) patches a generated registry with
//! hand-maintained corrections.
//!
//! IBANs are checked with [`validate_iban`] and built with [`build_iban`]
//! or [`build_iban_from_parts`]; [`is_valid_bic`] checks BIC structure.
//!
//! # Example
//!
//! ```
//! use iban_registry_core::*;
//!
//! let mut registry = IbanRegistry::new();
//! registry.insert("NL", IbanStructure {
//!     bban_spec: "4!a10!n".into(),
//!     iban_spec: "NL2!n4!a10!n".into(),
//!     bban_length: 14,
//!     iban_length: 18,
//!     positions: PositionSchema {
//!         account_code: Range::new(4, 14),
//!         bank_code: Range::new(0, 4),
//!         branch_code: Range::at(4),
//!     },
//! });
//!
//! assert!(registry.contains("NL"));
//! assert!(validate_registry(&registry).is_empty());
//! ```

mod bic;
mod iban;
mod merge;
mod types;
mod validate;

pub use bic::{BIC_LENGTH, PRIMARY_OFFICE, SHORT_BIC_LENGTH, bic_country, expand_bic, is_valid_bic};
pub use iban::{
    IbanError, MAX_IBAN_LENGTH, MIN_IBAN_LENGTH, build_iban, build_iban_from_parts, iban_checksum,
    is_valid_iban_checksum, is_valid_iban_length, is_valid_iban_structure, normalize_iban,
    validate_iban,
};
pub use merge::{IbanStructureOverride, OverrideOutcome, OverrideSet, apply_overrides};
pub use types::*;
pub use validate::{
    IBAN_PREFIX_LENGTH, ValidationError, is_country_code, validate_bank_record, validate_registry,
    validate_structure,
};
