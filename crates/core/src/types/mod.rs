//! Domain types for Openshelf
//!
//! This module contains all domain models organized by responsibility:
//! - `book`: Book aggregate and its identifier
//! - `category`: Browsing categories
//! - `source`: The exactly-one book source and uploaded files
//! - `user`: External user identity
//! - `common`: Shared validation machinery

mod book;
mod category;
mod common;
mod source;
mod user;

// Re-export all public types
pub use book::{
    Book, BookId, NewBook, AUTHOR_MAX_LEN, COVER_PATH_MAX_LEN, DESCRIPTION_MAX_LEN, TITLE_MAX_LEN,
};
pub use category::{Category, CategoryId, NAME_MAX_LEN};
pub use common::{ValidationError, ValidationErrors, Validator};
pub use source::{
    is_valid_book_url, BookSource, SourceColumns, SourceKind, UploadedFile, FILE_NAME_MAX_LEN,
    FILE_PATH_MAX_LEN, URL_MAX_LEN,
};
pub use user::{User, UserId};
