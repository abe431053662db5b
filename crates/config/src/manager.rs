//! Config lifecycle entry point
//!
//! `ConfigManager` decides where the config file lives and wraps load/save
//! with the convenience operations a host application wants at startup:
//! load-or-default, first-run initialization, and environment overrides for
//! containerized deployments.

use crate::persistence::ConfigFile;
use crate::{Config, ConfigError, ConfigResult};
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = "config.toml";

pub struct ConfigManager {
    config_dir: PathBuf,
    file: ConfigFile,
}

impl ConfigManager {
    /// Uses the platform config directory (`~/.config/openshelf/` on Linux,
    /// the XDG equivalents elsewhere)
    pub fn new() -> ConfigResult<Self> {
        let dirs = ProjectDirs::from("", "", "openshelf").ok_or_else(|| {
            ConfigError::NoConfigDir("platform reports no user config directory".to_string())
        })?;
        Ok(Self::with_directory(dirs.config_dir().to_path_buf()))
    }

    /// Keeps the config file under an explicit directory instead
    pub fn with_directory(config_dir: PathBuf) -> Self {
        let file = ConfigFile::at(config_dir.join(CONFIG_FILE_NAME));
        Self { config_dir, file }
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_path(&self) -> &Path {
        self.file.path()
    }

    /// Loads the config; missing file means defaults, corrupt file is an error
    pub fn load(&self) -> ConfigResult<Config> {
        self.file.load()
    }

    /// Loads the config, never failing
    ///
    /// For callers that must come up with something usable; the error is
    /// logged and the defaults stand in.
    pub fn load_or_default(&self) -> Config {
        self.load().unwrap_or_else(|e| {
            log::warn!("Could not load config ({}), using defaults", e);
            Config::default()
        })
    }

    /// Validates and saves the config atomically
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        self.file.save(config)
    }

    /// Loads, applies `apply`, and saves the result
    pub fn update<F>(&self, apply: F) -> ConfigResult<()>
    where
        F: FnOnce(&mut Config),
    {
        let mut config = self.load()?;
        apply(&mut config);
        self.save(&config)
    }

    /// Writes a default config file on first run
    ///
    /// Returns whether a file was created; an existing file is left alone.
    pub fn initialize(&self) -> ConfigResult<bool> {
        if self.config_path().exists() {
            return Ok(false);
        }
        self.save(&Config::default())?;
        Ok(true)
    }

    /// Overwrites the config file with defaults
    pub fn reset(&self) -> ConfigResult<()> {
        self.save(&Config::default())
    }

    /// Loads the config and applies `OPENSHELF_*` environment overrides
    ///
    /// Recognized variables: `OPENSHELF_DATABASE_PATH`,
    /// `OPENSHELF_STORAGE_CONTENT_ROOT`, `OPENSHELF_CATALOG_SEED_ON_STARTUP`.
    /// Overrides win over the file; the merged result is validated and
    /// problems are logged, not fatal.
    pub fn load_with_env_overrides(&self) -> ConfigResult<Config> {
        let mut config = self.load()?;
        apply_env_overrides(&mut config);

        if let Err(errors) = config.validate() {
            log::warn!("Config invalid after env overrides: {:?}", errors);
        }

        Ok(config)
    }
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(path) = std::env::var("OPENSHELF_DATABASE_PATH") {
        config.database.path = path;
    }
    if let Ok(root) = std::env::var("OPENSHELF_STORAGE_CONTENT_ROOT") {
        config.storage.content_root = root;
    }
    if let Ok(raw) = std::env::var("OPENSHELF_CATALOG_SEED_ON_STARTUP") {
        match raw.parse() {
            Ok(seed) => config.catalog.seed_on_startup = seed,
            Err(_) => log::warn!(
                "Ignoring OPENSHELF_CATALOG_SEED_ON_STARTUP={:?}: not a bool",
                raw
            ),
        }
    }
}
