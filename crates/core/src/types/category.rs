//! Category domain model

use crate::types::{ValidationErrors, Validator};
use serde::{Deserialize, Serialize};

/// Maximum length for a category name
pub const NAME_MAX_LEN: usize = 100;

/// Unique identifier for a category, assigned by the store on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(i64);

impl CategoryId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for CategoryId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A browsing category; books and categories form a many-to-many relation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// Position on the home page, ascending
    pub display_order: i64,
}

impl Validator for Category {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.name.trim().is_empty() {
            errors.add("name", "must not be empty");
        }
        if self.name.len() > NAME_MAX_LEN {
            errors.add(
                "name",
                format!("must be at most {} characters", NAME_MAX_LEN),
            );
        }

        errors.into_result()
    }
}
