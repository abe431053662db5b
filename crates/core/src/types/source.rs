//! Book source models
//!
//! A persisted book carries exactly one source: an uploaded EPUB file, an
//! uploaded PDF file, or an external URL. The storage layer keeps these as
//! three nullable column groups; `BookSource` is the typed view that makes
//! the mutual exclusivity impossible to violate in code.

use crate::error::AppError;
use crate::types::{ValidationErrors, Validator};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Maximum length for a stored root-relative file path
pub const FILE_PATH_MAX_LEN: usize = 255;
/// Maximum length for a preserved original filename
pub const FILE_NAME_MAX_LEN: usize = 100;
/// Maximum length for an external book URL
pub const URL_MAX_LEN: usize = 2048;

/// The kind of source backing a book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceKind {
    Epub,
    Pdf,
    Url,
}

impl SourceKind {
    /// Extension enforced on stored files of this kind, if file-based
    pub fn enforced_extension(&self) -> Option<&'static str> {
        match self {
            Self::Epub => Some("epub"),
            Self::Pdf => Some("pdf"),
            Self::Url => None,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Epub => write!(f, "EPUB file"),
            Self::Pdf => write!(f, "PDF file"),
            Self::Url => write!(f, "external URL"),
        }
    }
}

/// The single source of a persisted book
///
/// File-based variants store the root-relative blob path plus the original
/// upload filename when one was preserved (used as the download name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookSource {
    Epub {
        path: String,
        file_name: Option<String>,
    },
    Pdf {
        path: String,
        file_name: Option<String>,
    },
    Url(String),
}

/// The three nullable column groups as they exist in the books table
///
/// The mapping in both directions goes through this struct so that the
/// exactly-one-source invariant is checked in a single place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceColumns {
    pub epub_file_path: Option<String>,
    pub epub_file_name: Option<String>,
    pub pdf_file_path: Option<String>,
    pub pdf_file_name: Option<String>,
    pub external_url: Option<String>,
}

impl BookSource {
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::Epub { .. } => SourceKind::Epub,
            Self::Pdf { .. } => SourceKind::Pdf,
            Self::Url(_) => SourceKind::Url,
        }
    }

    pub fn is_file_based(&self) -> bool {
        !matches!(self, Self::Url(_))
    }

    /// Blob path of a file-based source
    pub fn file_path(&self) -> Option<&str> {
        match self {
            Self::Epub { path, .. } | Self::Pdf { path, .. } => Some(path),
            Self::Url(_) => None,
        }
    }

    /// External URL of a URL source
    pub fn url(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url),
            _ => None,
        }
    }

    /// Expands this source into the column representation
    pub fn to_columns(&self) -> SourceColumns {
        let mut columns = SourceColumns::default();
        match self {
            Self::Epub { path, file_name } => {
                columns.epub_file_path = Some(path.clone());
                columns.epub_file_name = file_name.clone();
            }
            Self::Pdf { path, file_name } => {
                columns.pdf_file_path = Some(path.clone());
                columns.pdf_file_name = file_name.clone();
            }
            Self::Url(url) => {
                columns.external_url = Some(url.clone());
            }
        }
        columns
    }

    /// Builds a source from the column representation
    ///
    /// Rows with zero or multiple populated source groups violate the
    /// exactly-one-source invariant and are reported as corrupt rather than
    /// silently picking one.
    pub fn from_columns(columns: SourceColumns) -> Result<Self, AppError> {
        let populated = [
            columns.epub_file_path.is_some(),
            columns.pdf_file_path.is_some(),
            columns.external_url.is_some(),
        ]
        .iter()
        .filter(|p| **p)
        .count();

        match populated {
            0 => Err(AppError::CorruptRecord {
                entity: "Book".to_string(),
                details: "no source columns populated".to_string(),
            }),
            1 => {
                if let Some(path) = columns.epub_file_path {
                    Ok(Self::Epub {
                        path,
                        file_name: columns.epub_file_name,
                    })
                } else if let Some(path) = columns.pdf_file_path {
                    Ok(Self::Pdf {
                        path,
                        file_name: columns.pdf_file_name,
                    })
                } else {
                    // populated == 1 guarantees the URL is present here
                    Ok(Self::Url(columns.external_url.unwrap_or_default()))
                }
            }
            _ => Err(AppError::CorruptRecord {
                entity: "Book".to_string(),
                details: "multiple source columns populated".to_string(),
            }),
        }
    }
}

impl Validator for BookSource {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        match self {
            Self::Epub { path, file_name } | Self::Pdf { path, file_name } => {
                if path.trim().is_empty() {
                    errors.add_general("source file path must not be empty");
                }
                if path.len() > FILE_PATH_MAX_LEN {
                    errors.add_general(format!(
                        "source file path must be at most {} characters",
                        FILE_PATH_MAX_LEN
                    ));
                }
                if let Some(name) = file_name {
                    if name.len() > FILE_NAME_MAX_LEN {
                        errors.add_general(format!(
                            "source file name must be at most {} characters",
                            FILE_NAME_MAX_LEN
                        ));
                    }
                }
            }
            Self::Url(url) => {
                if url.len() > URL_MAX_LEN {
                    errors.add(
                        "book_url",
                        format!("must be at most {} characters", URL_MAX_LEN),
                    );
                }
                if !is_valid_book_url(url) {
                    errors.add("book_url", "must be a valid http or https URL");
                }
            }
        }

        errors.into_result()
    }
}

/// Returns true if the string parses as an absolute http or https URL
pub fn is_valid_book_url(candidate: &str) -> bool {
    match Url::parse(candidate.trim()) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

/// An in-memory uploaded file as handed over by the HTTP layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    /// An upload with no bytes counts as absent
    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    /// Extension of the original filename, lowercased, without the dot
    pub fn extension(&self) -> Option<String> {
        std::path::Path::new(&self.file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_enforced_extension() {
        assert_eq!(SourceKind::Epub.enforced_extension(), Some("epub"));
        assert_eq!(SourceKind::Pdf.enforced_extension(), Some("pdf"));
        assert_eq!(SourceKind::Url.enforced_extension(), None);
    }

    #[test]
    fn test_source_accessors() {
        let epub = BookSource::Epub {
            path: "books/a.epub".to_string(),
            file_name: Some("dune.epub".to_string()),
        };
        assert_eq!(epub.kind(), SourceKind::Epub);
        assert!(epub.is_file_based());
        assert_eq!(epub.file_path(), Some("books/a.epub"));
        assert_eq!(epub.url(), None);

        let url = BookSource::Url("https://example.com/book".to_string());
        assert!(!url.is_file_based());
        assert_eq!(url.file_path(), None);
        assert_eq!(url.url(), Some("https://example.com/book"));
    }

    #[test]
    fn test_columns_round_trip_epub() {
        let source = BookSource::Epub {
            path: "books/a.epub".to_string(),
            file_name: Some("dune.epub".to_string()),
        };
        let columns = source.to_columns();
        assert_eq!(columns.epub_file_path.as_deref(), Some("books/a.epub"));
        assert!(columns.pdf_file_path.is_none());
        assert!(columns.external_url.is_none());

        let restored = BookSource::from_columns(columns).unwrap();
        assert_eq!(restored, source);
    }

    #[test]
    fn test_columns_round_trip_url() {
        let source = BookSource::Url("https://example.com/b".to_string());
        let restored = BookSource::from_columns(source.to_columns()).unwrap();
        assert_eq!(restored, source);
    }

    #[test]
    fn test_from_columns_rejects_empty() {
        let err = BookSource::from_columns(SourceColumns::default()).unwrap_err();
        assert!(matches!(err, AppError::CorruptRecord { .. }));
    }

    #[test]
    fn test_from_columns_rejects_multiple() {
        let columns = SourceColumns {
            epub_file_path: Some("books/a.epub".to_string()),
            external_url: Some("https://example.com".to_string()),
            ..Default::default()
        };
        let err = BookSource::from_columns(columns).unwrap_err();
        assert!(matches!(err, AppError::CorruptRecord { .. }));
    }

    #[test]
    fn test_orphan_file_name_without_path_is_empty() {
        // A stray file_name with no path does not count as a populated group
        let columns = SourceColumns {
            epub_file_name: Some("dune.epub".to_string()),
            ..Default::default()
        };
        let err = BookSource::from_columns(columns).unwrap_err();
        assert!(matches!(err, AppError::CorruptRecord { .. }));
    }

    #[test]
    fn test_url_validation() {
        assert!(is_valid_book_url("https://example.com/book.epub"));
        assert!(is_valid_book_url("http://example.com"));
        assert!(is_valid_book_url("  https://example.com  "));
        assert!(!is_valid_book_url("ftp://example.com/book"));
        assert!(!is_valid_book_url("example.com/book"));
        assert!(!is_valid_book_url("not a url"));
        assert!(!is_valid_book_url(""));
    }

    #[test]
    fn test_url_source_validation() {
        let good = BookSource::Url("https://example.com/b".to_string());
        assert!(good.is_valid());

        let bad = BookSource::Url("javascript:alert(1)".to_string());
        let errors = bad.validate().unwrap_err();
        assert!(errors.iter().any(|e| e.field.as_deref() == Some("book_url")));
    }

    #[test]
    fn test_url_length_limit() {
        let long = format!("https://example.com/{}", "a".repeat(URL_MAX_LEN));
        let source = BookSource::Url(long);
        assert!(!source.is_valid());
    }

    #[test]
    fn test_file_source_validation() {
        let good = BookSource::Pdf {
            path: "books/b.pdf".to_string(),
            file_name: Some("report.pdf".to_string()),
        };
        assert!(good.is_valid());

        let empty_path = BookSource::Epub {
            path: "  ".to_string(),
            file_name: None,
        };
        assert!(!empty_path.is_valid());

        let long_name = BookSource::Epub {
            path: "books/a.epub".to_string(),
            file_name: Some("n".repeat(FILE_NAME_MAX_LEN + 1)),
        };
        assert!(!long_name.is_valid());
    }

    #[test]
    fn test_uploaded_file_extension() {
        let upload = UploadedFile::new("Cover Art.JPG", vec![1, 2, 3]);
        assert_eq!(upload.extension().as_deref(), Some("jpg"));
        assert_eq!(upload.len(), 3);
        assert!(!upload.is_empty());

        let no_ext = UploadedFile::new("README", vec![1]);
        assert_eq!(no_ext.extension(), None);
    }

    #[test]
    fn test_empty_upload() {
        let upload = UploadedFile::new("book.epub", Vec::new());
        assert!(upload.is_empty());
        assert_eq!(upload.len(), 0);
    }
}
