//! Database configuration section

use crate::validation::{self, ConfigSection, ValidationError};
use serde::{Deserialize, Serialize};

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite database file path (relative paths resolve against the working directory)
    pub path: String,

    /// Maximum number of pooled connections
    pub max_connections: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "openshelf.db".to_string(),
            max_connections: 10,
        }
    }
}

impl ConfigSection for DatabaseSettings {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        validation::check_present(&mut errors, &self.path, "database.path");
        validation::check_range(&mut errors, self.max_connections, 1, 64, "database.max_connections");
        validation::finish(errors)
    }

    fn merge(&mut self, other: Self) {
        self.path = other.path;
        self.max_connections = other.max_connections;
    }
}
