//! Error types for Openshelf
//!
//! `AppError` covers the failure modes of the storage and persistence layers.
//! The catalog crate wraps it into a service-level error that distinguishes
//! user-facing outcomes (validation, not-found, forbidden, conflict) from
//! infrastructure failures.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Shared error type for the persistence and storage layers
#[derive(Error, Debug)]
pub enum AppError {
    // ===== Persistence =====
    #[error("Database error: {message}")]
    DatabaseError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Migration {version} failed: {reason}")]
    MigrationFailed { version: String, reason: String },

    /// The row does not exist (or no longer exists)
    #[error("{entity} {identifier} not found")]
    RecordNotFound { entity: String, identifier: String },

    /// A concurrent writer got there first; the caller's version is stale
    #[error("{entity} {identifier} was modified concurrently")]
    StaleRecord { entity: String, identifier: String },

    /// The row came back in a shape the domain forbids
    #[error("Corrupt {entity} record: {details}")]
    CorruptRecord { entity: String, details: String },

    // ===== Blob storage =====
    #[error("Storage error: {message}")]
    StorageError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("I/O error: {message}")]
    IoError {
        message: String,
        #[source]
        source: io::Error,
    },

    // ===== Caller input =====
    #[error("Invalid argument {argument}: {reason}")]
    InvalidArgument { argument: String, reason: String },
}

impl AppError {
    /// Wraps a query failure with context
    pub fn database<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::DatabaseError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Wraps a blob-store failure with context
    pub fn storage<E: std::error::Error + Send + Sync + 'static>(
        message: impl Into<String>,
        source: E,
    ) -> Self {
        Self::StorageError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn not_found(entity: impl Into<String>, identifier: impl ToString) -> Self {
        Self::RecordNotFound {
            entity: entity.into(),
            identifier: identifier.to_string(),
        }
    }

    /// Whether the error means a missing record or file
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RecordNotFound { .. } | Self::FileNotFound { .. }
        )
    }

    /// Whether the error means a lost optimistic-concurrency race
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::StaleRecord { .. })
    }

    /// A message safe to show to end users; never quotes internals
    pub fn user_message(&self) -> String {
        match self {
            Self::DatabaseError { .. } => {
                "The catalog is temporarily unavailable. Please try again.".to_string()
            }
            Self::MigrationFailed { .. } => {
                "The catalog database could not be updated.".to_string()
            }
            Self::RecordNotFound { .. } => "The requested item was not found.".to_string(),
            Self::StaleRecord { .. } => {
                "This item was changed by someone else. Please reload and try again.".to_string()
            }
            Self::CorruptRecord { .. } => {
                "This item's stored data is damaged and cannot be loaded.".to_string()
            }
            Self::StorageError { .. } | Self::IoError { .. } => {
                "A file operation failed. Please try again.".to_string()
            }
            Self::FileNotFound { .. } => {
                "The file was not found. It may have been moved or deleted.".to_string()
            }
            Self::InvalidArgument { .. } => "Invalid input provided.".to_string(),
        }
    }
}

/// Result alias used throughout the workspace
pub type Result<T> = std::result::Result<T, AppError>;

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::FileNotFound {
                path: PathBuf::from("unknown"),
            },
            _ => Self::IoError {
                message: err.to_string(),
                source: err,
            },
        }
    }
}
