//! Loading of the generated registry artifacts.
//!
//! [`IbanStructureStore`] reads the generated IBAN structure artifact and
//! layers the hand-written override file over it. [`BankDirectory`] reads
//! every normalized bank list in a directory and indexes the records for
//! BIC and bank-code lookups.
//!
//! ```no_run
//! use iban_registry_db::{BankDirectory, IbanStructureStore, RegistryConfig};
//!
//! let config = RegistryConfig::from_env();
//! let store = IbanStructureStore::load(&config).unwrap();
//! if let Some(entry) = store.get("DE") {
//!     println!("DE BBAN has {} characters", entry.bban_length);
//! }
//!
//! let banks = BankDirectory::from_dir(&config.bank_registry_dir).unwrap();
//! for bank in banks.get_by_bic("BSLJSI2X") {
//!     println!("{} {}", bank.bank_code, bank.name);
//! }
//! ```

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use iban_registry_core::{
    BIC_LENGTH, BankRecord, IbanError, IbanRegistry, IbanStructure, OverrideOutcome, OverrideSet,
    PRIMARY_OFFICE, SHORT_BIC_LENGTH, ValidationError, apply_overrides, build_iban_from_parts,
    validate_iban, validate_registry,
};

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let file = std::fs::File::open(path)?;
    let reader = std::io::BufReader::new(file);
    Ok(serde_json::from_reader(reader)?)
}

/// Country-keyed IBAN structures with overrides applied.
#[derive(Debug, Clone)]
pub struct IbanStructureStore {
    registry: IbanRegistry,
    overrides: OverrideOutcome,
    source: PathBuf,
}

impl IbanStructureStore {
    /// Loads the generated artifact named by `config` and applies its
    /// override file when present.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::MissingFile`] when the generated artifact
    /// does not exist, and [`RegistryError::JsonError`] when it or the
    /// override file is malformed.
    pub fn load(config: &RegistryConfig) -> Result<Self> {
        let generated = config.generated_path();
        if !generated.is_file() {
            return Err(RegistryError::MissingFile(generated));
        }

        debug!(path = %generated.display(), "loading generated IBAN registry");
        let mut registry: IbanRegistry = read_json(&generated)?;

        let override_path = config.override_path();
        let overrides = if override_path.is_file() {
            let set: OverrideSet = read_json(&override_path)?;
            let outcome = apply_overrides(&mut registry, &set);
            debug!(
                overridden = outcome.overridden.len(),
                added = outcome.added.len(),
                "applied registry overrides"
            );
            outcome
        } else {
            warn!(path = %override_path.display(), "override file not found, using generated registry as is");
            OverrideOutcome::default()
        };

        info!(countries = registry.len(), "loaded IBAN registry");
        Ok(Self {
            registry,
            overrides,
            source: generated,
        })
    }

    /// Wraps an in-memory registry.
    pub fn from_registry(registry: IbanRegistry) -> Self {
        Self {
            registry,
            overrides: OverrideOutcome::default(),
            source: PathBuf::new(),
        }
    }

    pub fn get(&self, country: &str) -> Option<&IbanStructure> {
        self.registry.get(country)
    }

    pub fn contains(&self, country: &str) -> bool {
        self.registry.contains(country)
    }

    /// Country codes in sorted order.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.registry.countries()
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn registry(&self) -> &IbanRegistry {
        &self.registry
    }

    /// Countries the override file modified or added.
    pub fn overrides(&self) -> &OverrideOutcome {
        &self.overrides
    }

    /// Path of the generated artifact this store was read from.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Structural problems of the loaded entries.
    pub fn validate(&self) -> Vec<ValidationError> {
        validate_registry(&self.registry)
    }

    /// Checks an IBAN against the loaded structures and returns its
    /// electronic format.
    pub fn validate_iban(&self, iban: &str) -> std::result::Result<String, IbanError> {
        validate_iban(iban, &self.registry)
    }

    /// Builds an IBAN for `country` from domestic codes placed at the
    /// country's registered positions.
    pub fn build_iban(
        &self,
        country: &str,
        bank_code: &str,
        branch_code: &str,
        account_code: &str,
    ) -> std::result::Result<String, IbanError> {
        let structure = self
            .get(country)
            .ok_or_else(|| IbanError::UnknownCountry(country.to_string()))?;
        build_iban_from_parts(country, structure, bank_code, branch_code, account_code)
    }
}

/// Normalized bank records indexed for lookup.
///
/// # Examples
///
/// ```
/// use iban_registry_core::BankRecord;
/// use iban_registry_db::BankDirectory;
///
/// let directory = BankDirectory::from_records(vec![
///     BankRecord::new("SI", "01000", "BSLJSI2X", "Banka Slovenije"),
/// ]);
///
/// assert_eq!(directory.get_by_bic("BSLJSI2XXXX").len(), 1);
/// assert_eq!(directory.get_by_bic("bsljsi2x").len(), 1);
/// assert_eq!(directory.get_by_country_bank_code("SI", "01000")[0].name, "Banka Slovenije");
/// assert!(directory.has_bank_list("SI"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct BankDirectory {
    records: Vec<BankRecord>,
    by_bic: HashMap<String, Vec<usize>>,
    by_short_bic: HashMap<String, Vec<usize>>,
    by_code: HashMap<String, Vec<usize>>,
    countries: BTreeSet<String>,
}

impl BankDirectory {
    /// Reads every `*.json` bank list in `path`.
    ///
    /// Files are read in name order. A file that is not a JSON array of
    /// bank records is logged and skipped.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::IoError`] if the directory cannot be read.
    pub fn from_dir(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut files = Vec::new();
        for entry in std::fs::read_dir(path)? {
            let file_path = entry?.path();
            let is_json = file_path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("json"));
            if is_json && file_path.is_file() {
                files.push(file_path);
            }
        }
        files.sort();

        let mut directory = Self::default();
        for file_path in files {
            match read_json::<Vec<BankRecord>>(&file_path) {
                Ok(records) => {
                    debug!(path = %file_path.display(), count = records.len(), "loaded bank list");
                    directory.extend(records);
                }
                Err(err) => {
                    warn!(path = %file_path.display(), error = %err, "skipping unreadable bank list");
                }
            }
        }

        info!(
            banks = directory.len(),
            countries = directory.countries.len(),
            "loaded bank directory"
        );
        Ok(directory)
    }

    pub fn from_records(records: impl IntoIterator<Item = BankRecord>) -> Self {
        let mut directory = Self::default();
        directory.extend(records);
        directory
    }

    /// Adds `record` to the directory and its indexes.
    pub fn insert(&mut self, record: BankRecord) {
        let index = self.records.len();

        let bic = normalize_bic(&record.bic);
        let full_bic = match bic.len() {
            SHORT_BIC_LENGTH => Some(format!("{bic}{PRIMARY_OFFICE}")),
            BIC_LENGTH => Some(bic),
            _ => None,
        };
        if let Some(full_bic) = full_bic {
            if let Some(short_bic) = full_bic.get(..SHORT_BIC_LENGTH) {
                self.by_short_bic
                    .entry(short_bic.to_string())
                    .or_default()
                    .push(index);
            }
            self.by_bic.entry(full_bic).or_default().push(index);
        }

        self.by_code
            .entry(code_key(&record.country_code, &record.bank_code))
            .or_default()
            .push(index);
        self.countries.insert(record.country_code.clone());
        self.records.push(record);
    }

    /// Records registered under `bic`.
    ///
    /// An 8-character BIC matches every branch of the institution; an
    /// 11-character BIC matches that branch only, with `XXX` standing for
    /// the primary office. Any other length matches nothing.
    pub fn get_by_bic(&self, bic: &str) -> Vec<&BankRecord> {
        let bic = normalize_bic(bic);
        let index = match bic.len() {
            SHORT_BIC_LENGTH => &self.by_short_bic,
            BIC_LENGTH => &self.by_bic,
            _ => return Vec::new(),
        };
        self.resolve(index.get(&bic))
    }

    /// Records for a domestic bank code.
    pub fn get_by_country_bank_code(&self, country: &str, bank_code: &str) -> Vec<&BankRecord> {
        self.resolve(self.by_code.get(&code_key(country, bank_code)))
    }

    /// Returns `true` if any bank of `country` is known.
    pub fn has_bank_list(&self, country: &str) -> bool {
        self.countries.contains(country)
    }

    /// Countries with at least one bank, in sorted order.
    pub fn countries(&self) -> impl Iterator<Item = &str> {
        self.countries.iter().map(String::as_str)
    }

    pub fn records(&self) -> &[BankRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn resolve(&self, indexes: Option<&Vec<usize>>) -> Vec<&BankRecord> {
        indexes
            .map(|indexes| indexes.iter().map(|&i| &self.records[i]).collect())
            .unwrap_or_default()
    }
}

impl Extend<BankRecord> for BankDirectory {
    fn extend<I: IntoIterator<Item = BankRecord>>(&mut self, iter: I) {
        for record in iter {
            self.insert(record);
        }
    }
}

fn normalize_bic(bic: &str) -> String {
    bic.chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

fn code_key(country: &str, bank_code: &str) -> String {
    format!("{country}:{bank_code}")
}
