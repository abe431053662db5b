//! Reading and writing the on-disk TOML file
//!
//! Saves go through a tempfile in the target directory followed by an atomic
//! rename, so a crash mid-write can never leave a half-written config behind.
//! The previous file is copied to `config.toml.backup` before every overwrite.

use crate::{Config, ConfigError, ConfigResult, CONFIG_VERSION};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// A config file at a known path
pub struct ConfigFile {
    path: PathBuf,
}

impl ConfigFile {
    pub fn at(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads and parses the file
    ///
    /// A missing file is not an error; it means nothing has been saved yet
    /// and the defaults apply. An existing file that is blank or unparsable
    /// is reported rather than silently replaced, so a user can recover
    /// whatever is left of it.
    pub fn load(&self) -> ConfigResult<Config> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No config file at {}, using defaults", self.path.display());
                return Ok(Config::default());
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: self.path.clone(),
                    source: e,
                })
            }
        };

        if contents.trim().is_empty() {
            // A zero-byte file is a truncated write, not a deliberate
            // "all defaults" marker
            return Err(ConfigError::Read {
                path: self.path.clone(),
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, "config file is empty"),
            });
        }

        let config: Config = toml::from_str(&contents).map_err(|e| ConfigError::Parse {
            path: self.path.clone(),
            source: e,
        })?;

        if config.version > CONFIG_VERSION {
            log::warn!(
                "Config file version {} is newer than supported version {}; unknown settings are ignored",
                config.version,
                CONFIG_VERSION
            );
        }

        // Bad values are reported but the file is returned as written, so
        // the user can fix it in place instead of losing it
        if let Err(errors) = config.validate() {
            log::warn!("Config has invalid values: {}", join_errors(&errors));
        }

        Ok(config)
    }

    /// Validates and writes the config
    ///
    /// Refuses to persist a config that fails validation; a file full of
    /// rejected values would just fail again on the next load.
    pub fn save(&self, config: &Config) -> ConfigResult<()> {
        if let Err(errors) = config.validate() {
            return Err(ConfigError::Invalid(join_errors(&errors)));
        }

        let dir = self
            .path
            .parent()
            .ok_or_else(|| ConfigError::NoConfigDir("config path has no parent".to_string()))?;
        if !dir.exists() {
            fs::create_dir_all(dir).map_err(|e| ConfigError::CreateDir {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        if self.path.exists() {
            let backup = self.path.with_extension("toml.backup");
            fs::copy(&self.path, &backup).map_err(ConfigError::Backup)?;
        }

        let rendered = toml::to_string_pretty(config)?;
        self.replace_atomically(dir, &rendered)?;

        log::info!("Config saved to {}", self.path.display());
        Ok(())
    }

    // The tempfile must live in the target directory: rename is only atomic
    // within one filesystem
    fn replace_atomically(&self, dir: &Path, rendered: &str) -> ConfigResult<()> {
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(rendered.as_bytes())?;
        staged.flush()?;

        staged.persist(&self.path).map_err(|e| ConfigError::Write {
            path: self.path.clone(),
            source: e.error,
        })?;

        Ok(())
    }
}

fn join_errors(errors: &[crate::ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("; ")
}
