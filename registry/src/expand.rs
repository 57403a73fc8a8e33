//! Country fan-out from parsed records to registry entries.

use tracing::debug;

use iban_registry_core::{IbanRegistry, IbanStructure, RawRecord};

use crate::positions::derive_positions;

/// Builds the structural entry shared by every country of `record`.
pub fn structure_for(record: &RawRecord) -> IbanStructure {
    IbanStructure {
        bban_spec: record.bban_spec.clone(),
        iban_spec: record.iban_spec.clone(),
        bban_length: record.bban_length,
        iban_length: record.iban_length,
        positions: derive_positions(
            record.bank_code_position,
            record.branch_code_position,
            record.bban_length,
        ),
    }
}

/// Produces one `(country, entry)` pair per country the record covers.
///
/// Each pair owns its own copy of the structure.
///
/// # Examples
///
/// ```
/// use iban_registry_core::RawRecord;
/// use iban_registry_parser::expand_record;
///
/// let record = RawRecord {
///     country: "FR".into(),
///     other_countries: vec!["MC".into()],
///     bban_spec: "5!n5!n11!c2!n".into(),
///     iban_spec: "FR2!n5!n5!n11!c2!n".into(),
///     bban_length: 23,
///     iban_length: 27,
///     bank_code_position: None,
///     branch_code_position: None,
/// };
///
/// let entries = expand_record(&record);
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[0].0, "FR");
/// assert_eq!(entries[1].0, "MC");
/// assert_eq!(entries[0].1, entries[1].1);
/// ```
pub fn expand_record(record: &RawRecord) -> Vec<(String, IbanStructure)> {
    let structure = structure_for(record);
    record
        .country_codes()
        .map(|code| (code.to_string(), structure.clone()))
        .collect()
}

/// Inserts every entry of `record` into `registry`.
///
/// Returns the country codes whose earlier entry was replaced.
pub fn expand_into(registry: &mut IbanRegistry, record: &RawRecord) -> Vec<String> {
    let mut replaced = Vec::new();
    for (code, entry) in expand_record(record) {
        if registry.insert(code.clone(), entry).is_some() {
            debug!(country = %code, source = %record.country, "country entry replaced by later record");
            replaced.push(code);
        }
    }
    replaced
}

/// Builds the registry from records in parse order; later records win.
pub fn build_registry(records: &[RawRecord]) -> IbanRegistry {
    let mut registry = IbanRegistry::new();
    for record in records {
        expand_into(&mut registry, record);
    }
    registry
}
