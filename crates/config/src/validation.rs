//! Per-section validation
//!
//! Sections implement [`ConfigSection`] and report problems as field-tagged
//! errors. The check helpers push into a shared error list so a section can
//! report every bad value at once instead of stopping at the first.

pub use crate::error::ValidationError;
use std::path::{Component, Path};

/// A named block of the config file that knows how to check and merge itself
pub trait ConfigSection: Default {
    /// Checks every field, returning all problems found
    fn validate(&self) -> Result<(), Vec<ValidationError>>;

    /// Overwrites this section with values from `other` (override chains:
    /// defaults < file < environment)
    fn merge(&mut self, other: Self);
}

/// Records an error unless `value` lies within `min..=max`
pub fn check_range<T>(errors: &mut Vec<ValidationError>, value: T, min: T, max: T, field: &str)
where
    T: PartialOrd + std::fmt::Display + Copy,
{
    if value < min || value > max {
        errors.push(ValidationError::with_value(
            field,
            format!("must be between {} and {}", min, max),
            value,
        ));
    }
}

/// Records an error when `value` is empty or whitespace
pub fn check_present(errors: &mut Vec<ValidationError>, value: &str, field: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::new(field, "must not be empty"));
    }
}

/// Records an error when `value` is an absolute path or climbs out of its
/// parent with `..` (folder settings must stay under the storage root)
pub fn check_relative(errors: &mut Vec<ValidationError>, value: &str, field: &str) {
    let path = Path::new(value);
    let escapes = path.is_absolute()
        || path
            .components()
            .any(|c| matches!(c, Component::ParentDir));

    if escapes {
        errors.push(ValidationError::with_value(
            field,
            "must be a relative path without ..",
            value,
        ));
    }
}

/// Converts an accumulated error list into a validation result
pub fn finish(errors: Vec<ValidationError>) -> Result<(), Vec<ValidationError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
