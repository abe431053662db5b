//! Book domain model

use crate::types::{BookSource, Category, UserId, ValidationErrors, Validator};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum length for a book title
pub const TITLE_MAX_LEN: usize = 200;
/// Maximum length for a book description
pub const DESCRIPTION_MAX_LEN: usize = 500;
/// Maximum length for an author name
pub const AUTHOR_MAX_LEN: usize = 200;
/// Maximum length for a stored cover path
pub const COVER_PATH_MAX_LEN: usize = 255;

/// Unique identifier for a book, assigned by the store on insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookId(i64);

impl BookId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl From<i64> for BookId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A book as loaded from the store, categories included
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub published_date: NaiveDate,
    pub owner_user_id: Option<UserId>,
    pub is_public: bool,
    pub cover_path: Option<String>,
    pub source: BookSource,
    pub categories: Vec<Category>,
    /// Optimistic-concurrency token, incremented on every update
    pub row_version: i64,
}

impl Book {
    /// Download filename for a file-based source
    ///
    /// Falls back to a generated name when the original upload filename was
    /// not preserved. URL sources have nothing to download.
    pub fn source_download_name(&self) -> Option<String> {
        match &self.source {
            BookSource::Epub { file_name, .. } => Some(
                file_name
                    .clone()
                    .unwrap_or_else(|| format!("book_{}.epub", self.id)),
            ),
            BookSource::Pdf { file_name, .. } => Some(
                file_name
                    .clone()
                    .unwrap_or_else(|| format!("book_{}.pdf", self.id)),
            ),
            BookSource::Url(_) => None,
        }
    }

    /// Root-relative paths of every blob this book owns
    pub fn owned_blob_paths(&self) -> Vec<String> {
        let mut paths = Vec::new();
        if let Some(cover) = &self.cover_path {
            paths.push(cover.clone());
        }
        if let Some(file) = self.source.file_path() {
            paths.push(file.to_string());
        }
        paths
    }
}

impl Validator for Book {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_book_fields(
            &self.title,
            self.description.as_deref(),
            self.author.as_deref(),
            self.cover_path.as_deref(),
            &mut errors,
        );
        if let Err(source_errors) = self.source.validate() {
            for error in source_errors {
                errors.push(error);
            }
        }
        errors.into_result()
    }
}

/// A book about to be inserted; the store assigns the id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBook {
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub published_date: NaiveDate,
    pub owner_user_id: Option<UserId>,
    pub is_public: bool,
    pub cover_path: Option<String>,
    pub source: BookSource,
}

impl NewBook {
    /// Creates a new book with required fields, public by default
    pub fn new(title: impl Into<String>, published_date: NaiveDate, source: BookSource) -> Self {
        Self {
            title: title.into(),
            description: None,
            author: None,
            published_date,
            owner_user_id: None,
            is_public: true,
            cover_path: None,
            source,
        }
    }
}

impl Validator for NewBook {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_book_fields(
            &self.title,
            self.description.as_deref(),
            self.author.as_deref(),
            self.cover_path.as_deref(),
            &mut errors,
        );
        if let Err(source_errors) = self.source.validate() {
            for error in source_errors {
                errors.push(error);
            }
        }
        errors.into_result()
    }
}

fn validate_book_fields(
    title: &str,
    description: Option<&str>,
    author: Option<&str>,
    cover_path: Option<&str>,
    errors: &mut ValidationErrors,
) {
    if title.trim().is_empty() {
        errors.add("title", "must not be empty");
    }
    if title.len() > TITLE_MAX_LEN {
        errors.add(
            "title",
            format!("must be at most {} characters", TITLE_MAX_LEN),
        );
    }
    if let Some(description) = description {
        if description.len() > DESCRIPTION_MAX_LEN {
            errors.add(
                "description",
                format!("must be at most {} characters", DESCRIPTION_MAX_LEN),
            );
        }
    }
    if let Some(author) = author {
        if author.len() > AUTHOR_MAX_LEN {
            errors.add(
                "author",
                format!("must be at most {} characters", AUTHOR_MAX_LEN),
            );
        }
    }
    if let Some(cover_path) = cover_path {
        if cover_path.len() > COVER_PATH_MAX_LEN {
            errors.add_general(format!(
                "cover path must be at most {} characters",
                COVER_PATH_MAX_LEN
            ));
        }
    }
}
