//! Registry location configuration.
//!
//! Controls where the generated IBAN structure artifact, its hand-written
//! override file and the normalized bank directories live.
//!
//! # Example YAML
//!
//! ```yaml
//! iban_registry_dir: registry/iban_registry/
//! bank_registry_dir: registry/bank_registry/
//! generated_file: generated.json
//! override_file: overwrite.json
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Environment variable overriding [`RegistryConfig::iban_registry_dir`].
pub const IBAN_REGISTRY_ENV: &str = "IBAN_REGISTRY";
/// Environment variable overriding [`RegistryConfig::bank_registry_dir`].
pub const BANK_REGISTRY_ENV: &str = "IBAN_BANK_REGISTRY";

/// Locations of the registry artifacts.
///
/// Every field has a default, so a YAML file only needs the keys it changes.
///
/// # Examples
///
/// ```
/// use iban_registry_db::RegistryConfig;
///
/// let config = RegistryConfig::default();
/// assert!(config.generated_path().ends_with("generated.json"));
/// assert!(config.override_path().ends_with("overwrite.json"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Directory holding the generated structure artifact and overrides.
    pub iban_registry_dir: PathBuf,
    /// Directory of per-country bank list JSON files.
    pub bank_registry_dir: PathBuf,
    /// File name of the generated structure artifact.
    pub generated_file: String,
    /// File name of the hand-maintained override file.
    pub override_file: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            iban_registry_dir: PathBuf::from("registry/iban_registry/"),
            bank_registry_dir: PathBuf::from("registry/bank_registry/"),
            generated_file: "generated.json".into(),
            override_file: "overwrite.json".into(),
        }
    }
}

impl RegistryConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::RegistryError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::RegistryError::IoError) if the file cannot
    /// be written, or [`YamlError`](crate::RegistryError::YamlError) if
    /// serialization fails.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Default configuration with environment overrides applied.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Applies `IBAN_REGISTRY` and `IBAN_BANK_REGISTRY` when they are set.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies directory overrides from `lookup`, keyed by environment
    /// variable name. Empty values are ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::path::Path;
    /// use iban_registry_db::RegistryConfig;
    ///
    /// let config = RegistryConfig::default().with_overrides_from(|key| {
    ///     (key == "IBAN_REGISTRY").then(|| "/srv/iban".to_string())
    /// });
    /// assert_eq!(config.iban_registry_dir, Path::new("/srv/iban"));
    /// assert_eq!(config.bank_registry_dir, Path::new("registry/bank_registry/"));
    /// ```
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(dir) = lookup(IBAN_REGISTRY_ENV).filter(|v| !v.is_empty()) {
            self.iban_registry_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup(BANK_REGISTRY_ENV).filter(|v| !v.is_empty()) {
            self.bank_registry_dir = PathBuf::from(dir);
        }
        self
    }

    /// Full path of the generated structure artifact.
    pub fn generated_path(&self) -> PathBuf {
        self.iban_registry_dir.join(&self.generated_file)
    }

    /// Full path of the override file.
    pub fn override_path(&self) -> PathBuf {
        self.iban_registry_dir.join(&self.override_file)
    }
}
