//! Loading of generated IBAN registries and bank directories.
//!
//! This crate reads the artifacts the parser produces: the country-keyed
//! IBAN structure file with its hand-written overrides, and the per-country
//! bank lists. Locations come from a [`RegistryConfig`], which honours the
//! `IBAN_REGISTRY` and `IBAN_BANK_REGISTRY` environment variables.
//!
//! # Quick start
//!
//! ```no_run
//! use iban_registry_db::{BankDirectory, IbanStructureStore, RegistryConfig};
//!
//! let config = RegistryConfig::from_env();
//! let store = IbanStructureStore::load(&config).unwrap();
//! println!("{} countries", store.len());
//!
//! let banks = BankDirectory::from_dir(&config.bank_registry_dir).unwrap();
//! println!("SI bank list: {}", banks.has_bank_list("SI"));
//! ```

mod config;
mod error;
mod loader;

pub use config::{BANK_REGISTRY_ENV, IBAN_REGISTRY_ENV, RegistryConfig};
pub use error::{RegistryError, Result};
pub use loader::{BankDirectory, IbanStructureStore};
