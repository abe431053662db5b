//! Catalog behavior configuration section

use crate::validation::{self, ConfigSection, ValidationError};
use serde::{Deserialize, Serialize};

/// Catalog presentation and startup settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CatalogSettings {
    /// Populate an empty database with starter categories and books
    pub seed_on_startup: bool,

    /// Maximum number of search box title suggestions
    pub suggestion_limit: u32,

    /// Books shown per category shelf on the home page
    pub home_books_per_category: u32,

    /// Maximum number of the user's own recent books shown on the home page
    pub history_limit: u32,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            seed_on_startup: true,
            suggestion_limit: 8,
            home_books_per_category: 10,
            history_limit: 15,
        }
    }
}

impl ConfigSection for CatalogSettings {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();
        validation::check_range(&mut errors, self.suggestion_limit, 1, 100, "catalog.suggestion_limit");
        validation::check_range(
            &mut errors,
            self.home_books_per_category,
            1,
            100,
            "catalog.home_books_per_category",
        );
        validation::check_range(&mut errors, self.history_limit, 1, 100, "catalog.history_limit");
        validation::finish(errors)
    }

    fn merge(&mut self, other: Self) {
        self.seed_on_startup = other.seed_on_startup;
        self.suggestion_limit = other.suggestion_limit;
        self.home_books_per_category = other.home_books_per_category;
        self.history_limit = other.history_limit;
    }
}
