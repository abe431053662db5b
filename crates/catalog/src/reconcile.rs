//! Category selection reconciliation
//!
//! Computes the link changes that bring a book's stored category
//! associations in line with a submitted selection. Pure set arithmetic,
//! independent of the database; appliers pass `to_add` through the store's
//! existing-id filter, so selections referencing unknown categories never
//! produce links.

use openshelf_core::CategoryId;
use std::collections::HashSet;

/// The minimal link changes between a stored and a requested selection
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryDiff {
    pub to_add: Vec<CategoryId>,
    pub to_remove: Vec<CategoryId>,
}

impl CategoryDiff {
    /// Diffs `current` against `requested`
    ///
    /// `None` and an empty selection both mean "no categories": every
    /// existing link is removed. Duplicate ids in either input collapse.
    pub fn between(current: &[CategoryId], requested: Option<&[CategoryId]>) -> Self {
        let current_set: HashSet<CategoryId> = current.iter().copied().collect();
        let requested_set: HashSet<CategoryId> =
            requested.unwrap_or_default().iter().copied().collect();

        let mut to_add: Vec<CategoryId> =
            requested_set.difference(&current_set).copied().collect();
        let mut to_remove: Vec<CategoryId> =
            current_set.difference(&requested_set).copied().collect();

        // Deterministic application order regardless of hash iteration
        to_add.sort();
        to_remove.sort();

        Self { to_add, to_remove }
    }

    /// True when the stored links already match the request
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}
