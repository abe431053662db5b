//! Catalog service errors
//!
//! Outcomes are classified by what the caller should do about them: fix the
//! submission, re-fetch and retry, or give up. The storage/persistence split
//! records which layer failed, which is what decides whether an attempt's
//! uploaded files need cleaning up.

use openshelf_core::{AppError, ValidationErrors};
use thiserror::Error;

/// Errors surfaced by catalog operations
#[derive(Error, Debug)]
pub enum CatalogError {
    /// The submission was rejected before it caused any side effect
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The book, or the stored file behind it, does not exist
    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    /// The caller is neither the owner nor an administrator
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// A concurrent writer saved the same book first
    #[error("{entity} was modified concurrently: {identifier}")]
    Conflict { entity: String, identifier: String },

    /// An uploaded or stored file could not be written or read
    #[error("Storage failure: {0}")]
    Storage(#[source] AppError),

    /// A database read or write failed
    #[error("Persistence failure: {0}")]
    Persistence(#[source] AppError),
}

impl CatalogError {
    /// Helper to create a not-found error for an entity
    pub fn not_found(entity: impl Into<String>, identifier: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            identifier: identifier.to_string(),
        }
    }

    /// Helper to create a forbidden error with a reason
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::Forbidden(reason.into())
    }

    /// Classifies an error coming out of the database layer
    ///
    /// Missing rows and lost optimistic-concurrency races become their
    /// caller-facing kinds; everything else stays a persistence failure.
    pub fn from_persistence(err: AppError) -> Self {
        match err {
            AppError::RecordNotFound { entity, identifier } => {
                Self::NotFound { entity, identifier }
            }
            AppError::StaleRecord { entity, identifier } => Self::Conflict { entity, identifier },
            other => Self::Persistence(other),
        }
    }

    /// Returns true if this error reports a missing book or file
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns true if this error reports a lost concurrent edit
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// Returns true if the submission itself was rejected
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns a user-friendly error message suitable for display in the UI
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(errors) => errors.to_string(),
            Self::NotFound { .. } => "The requested book was not found.".to_string(),
            Self::Forbidden(_) => "You are not allowed to modify this book.".to_string(),
            Self::Conflict { .. } => {
                "This book was changed by someone else. Please reload and try again.".to_string()
            }
            Self::Storage(_) => "The uploaded file could not be stored. Please try again.".to_string(),
            Self::Persistence(_) => "The change could not be saved. Please try again.".to_string(),
        }
    }
}

impl From<ValidationErrors> for CatalogError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Convenience result alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;
