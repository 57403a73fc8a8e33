//! Hand-maintained corrections layered over a generated registry.
//!
//! The published registry occasionally carries errors or omits
//! territories. An override file maps country codes to partial
//! [`IbanStructureOverride`] values; [`apply_overrides`] folds them into a
//! generated [`IbanRegistry`].
//!
//! # Example
//!
//! ```
//! use iban_registry_core::*;
//!
//! let mut registry = IbanRegistry::new();
//! registry.insert("DE", IbanStructure {
//!     bban_spec: "8!n10!n".into(),
//!     bban_length: 18,
//!     iban_length: 22,
//!     ..IbanStructure::default()
//! });
//!
//! let mut overrides = OverrideSet::new();
//! overrides.insert("DE".into(), IbanStructureOverride {
//!     iban_spec: "DE2!n8!n10!n".into(),
//!     ..IbanStructureOverride::default()
//! });
//!
//! let outcome = apply_overrides(&mut registry, &overrides);
//! assert_eq!(outcome.overridden, vec!["DE".to_string()]);
//! assert_eq!(registry.get("DE").unwrap().iban_spec, "DE2!n8!n10!n");
//! assert_eq!(registry.get("DE").unwrap().bban_spec, "8!n10!n");
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{IbanRegistry, IbanStructure, PositionSchema};

/// Partial IBAN structure read from an override file.
///
/// Empty strings and zero lengths mean "keep the generated value". The
/// three position ranges are replaced together, and only when at least one
/// of them has a non-zero end.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IbanStructureOverride {
    pub bban_spec: String,
    pub iban_spec: String,
    pub bban_length: usize,
    pub iban_length: usize,
    pub positions: PositionSchema,
}

impl IbanStructureOverride {
    fn has_positions(&self) -> bool {
        let p = &self.positions;
        p.account_code.end > 0 || p.bank_code.end > 0 || p.branch_code.end > 0
    }

    /// Applies this override to `entry` in place.
    pub fn apply_to(&self, entry: &mut IbanStructure) {
        if !self.bban_spec.is_empty() {
            entry.bban_spec = self.bban_spec.clone();
        }
        if !self.iban_spec.is_empty() {
            entry.iban_spec = self.iban_spec.clone();
        }
        if self.bban_length > 0 {
            entry.bban_length = self.bban_length;
        }
        if self.iban_length > 0 {
            entry.iban_length = self.iban_length;
        }
        if self.has_positions() {
            entry.positions = self.positions;
        }
    }

    /// Converts an override for a country absent from the registry into a
    /// full entry.
    pub fn into_structure(self) -> IbanStructure {
        IbanStructure {
            bban_spec: self.bban_spec,
            iban_spec: self.iban_spec,
            bban_length: self.bban_length,
            iban_length: self.iban_length,
            positions: self.positions,
        }
    }
}

/// Country code → override, as stored in the override file.
pub type OverrideSet = BTreeMap<String, IbanStructureOverride>;

/// Which countries an override pass touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideOutcome {
    /// Existing entries that were modified.
    pub overridden: Vec<String>,
    /// Countries added by the override file.
    pub added: Vec<String>,
}

/// Applies `overrides` to `registry`.
///
/// Existing entries are patched field by field; unknown countries are
/// inserted as new entries.
pub fn apply_overrides(registry: &mut IbanRegistry, overrides: &OverrideSet) -> OverrideOutcome {
    let mut outcome = OverrideOutcome::default();

    for (country, patch) in overrides {
        match registry.get_mut(country) {
            Some(entry) => {
                patch.apply_to(entry);
                outcome.overridden.push(country.clone());
            }
            None => {
                registry.insert(country.clone(), patch.clone().into_structure());
                outcome.added.push(country.clone());
            }
        }
    }

    outcome
}
