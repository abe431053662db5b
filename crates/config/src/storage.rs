//! File storage configuration section

use crate::validation::{self, ConfigSection, ValidationError};
use serde::{Deserialize, Serialize};

/// Blob storage settings
///
/// `covers_dir` and `books_dir` are folders under `content_root`; uploaded
/// files never land anywhere else.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    /// Root directory for all stored files
    pub content_root: String,

    /// Folder for uploaded cover images, relative to the root
    pub covers_dir: String,

    /// Folder for uploaded book files, relative to the root
    pub books_dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            content_root: "wwwroot".to_string(),
            covers_dir: "images/covers".to_string(),
            books_dir: "books".to_string(),
        }
    }
}

impl ConfigSection for StorageSettings {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        validation::check_present(&mut errors, &self.content_root, "storage.content_root");
        validation::check_present(&mut errors, &self.covers_dir, "storage.covers_dir");
        validation::check_relative(&mut errors, &self.covers_dir, "storage.covers_dir");
        validation::check_present(&mut errors, &self.books_dir, "storage.books_dir");
        validation::check_relative(&mut errors, &self.books_dir, "storage.books_dir");
        validation::finish(errors)
    }

    fn merge(&mut self, other: Self) {
        self.content_root = other.content_root;
        self.covers_dir = other.covers_dir;
        self.books_dir = other.books_dir;
    }
}
