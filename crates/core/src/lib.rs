pub mod error;
pub mod types;

// Re-export commonly used types
pub use error::{AppError, Result};
pub use types::{
    Book, BookId, BookSource, Category, CategoryId, NewBook, SourceKind, UploadedFile, User,
    UserId, ValidationError, ValidationErrors, Validator,
};
