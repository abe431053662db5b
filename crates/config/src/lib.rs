//! Openshelf configuration
//!
//! One TOML file, one section per concern: `[database]`, `[storage]`,
//! `[catalog]`. Sections implement [`ConfigSection`] so the root config can
//! validate and merge them without knowing each one; a new concern becomes a
//! new section plus a field on [`Config`].
//!
//! Files are written atomically and backed up before overwrites, and a
//! missing or partial file fills in from defaults.
//!
//! ```rust
//! use openshelf_config::{Config, ConfigManager};
//!
//! let manager = ConfigManager::new().expect("no config directory");
//! let config = manager.load_or_default();
//! println!("database at {}", config.database.path);
//! ```

mod error;
mod manager;
mod persistence;
mod validation;

// Sections
mod catalog;
mod database;
mod storage;

pub use catalog::CatalogSettings;
pub use database::DatabaseSettings;
pub use error::{ConfigError, ConfigResult, ValidationError};
pub use manager::ConfigManager;
pub use storage::StorageSettings;
pub use validation::ConfigSection;

use serde::{Deserialize, Serialize};

/// Format version written into the file; newer files load with a warning
pub const CONFIG_VERSION: u32 = 1;

/// The whole configuration, one field per section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub version: u32,
    pub database: DatabaseSettings,
    pub storage: StorageSettings,
    pub catalog: CatalogSettings,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks every section, collecting all errors rather than the first
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        let sections = [
            self.database.validate(),
            self.storage.validate(),
            self.catalog.validate(),
        ];
        for result in sections {
            if let Err(mut section_errors) = result {
                errors.append(&mut section_errors);
            }
        }

        validation::finish(errors)
    }

    /// Overwrites every section with values from `other`
    pub fn merge(&mut self, other: Config) {
        self.database.merge(other.database);
        self.storage.merge(other.storage);
        self.catalog.merge(other.catalog);
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            database: DatabaseSettings::default(),
            storage: StorageSettings::default(),
            catalog: CatalogSettings::default(),
        }
    }
}
