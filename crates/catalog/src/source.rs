//! Book source resolution
//!
//! A submission can carry up to three candidate sources: an EPUB upload, a
//! PDF upload, and a URL field. These are mutually exclusive on the stored
//! book, so the resolver decides which single candidate the submission
//! means, or rejects it. Creates require exactly one; edits allow zero,
//! which keeps the existing source untouched.

use crate::error::{CatalogError, Result};
use openshelf_core::{BookSource, UploadedFile, ValidationError, Validator};

/// A single new source selected from a submission
#[derive(Debug, Clone, PartialEq)]
pub enum NewSource {
    /// Store the uploaded file and give the book an EPUB source
    Epub(UploadedFile),
    /// Store the uploaded file and give the book a PDF source
    Pdf(UploadedFile),
    /// Give the book an external URL source
    Url(String),
}

/// What an edit submission asks to happen to the book's source
#[derive(Debug, Clone, PartialEq)]
pub enum SourceChange {
    /// Swap the existing source for a new one
    Replace(NewSource),
    /// Keep whatever source the book already has
    Unchanged,
}

impl SourceChange {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }
}

const NO_SOURCE_MESSAGE: &str =
    "Either an EPUB or PDF file must be uploaded, or a book URL must be provided.";
const MULTIPLE_SOURCES_MESSAGE: &str =
    "Provide a single source: an EPUB file, a PDF file, or a book URL.";

/// Resolves the source for a new book: exactly one candidate must be present
///
/// Zero-byte uploads and blank URL fields count as absent, so an untouched
/// file input on the form does not register as a candidate.
pub fn resolve_create(
    epub: Option<UploadedFile>,
    pdf: Option<UploadedFile>,
    url: Option<&str>,
) -> Result<NewSource> {
    let epub = epub.filter(|file| !file.is_empty());
    let pdf = pdf.filter(|file| !file.is_empty());
    let url = url.map(str::trim).filter(|u| !u.is_empty());

    match (epub, pdf, url) {
        (None, None, None) => Err(general_error(NO_SOURCE_MESSAGE)),
        (Some(file), None, None) => Ok(NewSource::Epub(file)),
        (None, Some(file), None) => Ok(NewSource::Pdf(file)),
        (None, None, Some(url)) => validated_url(url),
        _ => Err(general_error(MULTIPLE_SOURCES_MESSAGE)),
    }
}

/// Resolves the source change for an edit: at most one new candidate
///
/// A URL equal to the one already stored is a resubmitted form field, not a
/// new source, so it never conflicts with a simultaneous file upload. With
/// no new candidate at all the result is [`SourceChange::Unchanged`].
pub fn resolve_edit(
    epub: Option<UploadedFile>,
    pdf: Option<UploadedFile>,
    url: Option<&str>,
    existing_url: Option<&str>,
) -> Result<SourceChange> {
    let epub = epub.filter(|file| !file.is_empty());
    let pdf = pdf.filter(|file| !file.is_empty());
    let url = url.map(str::trim).filter(|u| !u.is_empty());

    let url = match (url, existing_url) {
        (Some(submitted), Some(existing)) if submitted == existing.trim() => None,
        (url, _) => url,
    };

    match (epub, pdf, url) {
        (None, None, None) => Ok(SourceChange::Unchanged),
        (Some(file), None, None) => Ok(SourceChange::Replace(NewSource::Epub(file))),
        (None, Some(file), None) => Ok(SourceChange::Replace(NewSource::Pdf(file))),
        (None, None, Some(url)) => validated_url(url).map(SourceChange::Replace),
        _ => Err(general_error(MULTIPLE_SOURCES_MESSAGE)),
    }
}

/// Runs the submitted URL through the domain rules before accepting it
fn validated_url(url: &str) -> Result<NewSource> {
    let candidate = BookSource::Url(url.to_string());
    candidate.validate()?;
    Ok(NewSource::Url(url.to_string()))
}

fn general_error(message: &str) -> CatalogError {
    CatalogError::Validation(ValidationError::general(message).into())
}
