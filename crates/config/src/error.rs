//! Config error types

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Failure while loading, saving, or checking the config file
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write config file {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file exists but does not parse as TOML
    #[error("cannot parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// One or more settings failed validation; the message lists them
    #[error("invalid config: {0}")]
    Invalid(String),

    #[error("cannot create config directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The platform gave us nowhere to keep a config file
    #[error("no config directory available: {0}")]
    NoConfigDir(String),

    /// Copying the old file aside before an overwrite failed
    #[error("cannot back up config file: {0}")]
    Backup(std::io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single rejected setting, tagged with its dotted field path
/// (e.g. "storage.covers_dir")
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    /// The rejected value, when quoting it helps
    pub value: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            value: None,
        }
    }

    pub fn with_value(
        field: impl Into<String>,
        message: impl Into<String>,
        value: impl ToString,
    ) -> Self {
        Self {
            value: Some(value.to_string()),
            ..Self::new(field, message)
        }
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)?;
        if let Some(ref value) = self.value {
            write!(f, " (value: {})", value)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}
