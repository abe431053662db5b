//! Openshelf Catalog Management
//!
//! High-level orchestration layer that coordinates core, database, and blob
//! storage. Provides the book lifecycle (create, edit, delete), access to
//! stored source files, and the read models the catalog pages render.

pub mod authorize;
pub mod error;
pub mod reconcile;
pub mod service;
pub mod source;

pub use authorize::Requester;
pub use error::{CatalogError, Result as CatalogResult};
pub use reconcile::CategoryDiff;
pub use service::{BookForm, BookUploads, CatalogService, CreateFormData, EditFormData, HomePage};
pub use source::{resolve_create, resolve_edit, NewSource, SourceChange};
