//! Book lifecycle orchestration
//!
//! [`CatalogService`] is the single entry point for creating, editing, and
//! deleting books, and for the read models the catalog pages render. It owns
//! the ordering rules that keep rows and stored files consistent: a
//! replacement file is written before the row that references it, and no
//! previously referenced file is deleted until the covering database write
//! has committed. A crash mid-operation can therefore orphan a fresh upload,
//! but never leave a row pointing at a deleted file.

use crate::authorize::Requester;
use crate::error::{CatalogError, Result};
use crate::reconcile::CategoryDiff;
use crate::source::{resolve_create, resolve_edit, NewSource, SourceChange};
use chrono::NaiveDate;
use log::info;
use openshelf_blobstore::BlobStore;
use openshelf_config::{CatalogSettings, Config, StorageSettings};
use openshelf_core::types::{AUTHOR_MAX_LEN, DESCRIPTION_MAX_LEN, TITLE_MAX_LEN};
use openshelf_core::{
    Book, BookId, BookSource, Category, CategoryId, NewBook, SourceKind, UploadedFile, UserId,
    ValidationErrors, Validator,
};
use openshelf_database::catalog::{self, BookSummary, CategorySection, TitleSuggestion};
use openshelf_database::connection::{connect, DatabaseConfig};
use openshelf_database::queries;
use openshelf_database::seed::seed_if_empty;
use openshelf_database::{run_migrations, DbPool};
use serde::{Deserialize, Serialize};

const MODIFY_FORBIDDEN: &str = "Only the owner or an administrator may modify this book";

/// Scalar book fields from a create or edit submission
///
/// `category_ids` is the complete requested selection; `None` and an empty
/// list both mean no categories. `book_url` is the source URL field, weighed
/// against the file uploads by the source resolver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookForm {
    pub title: String,
    pub description: Option<String>,
    pub author: Option<String>,
    pub published_date: NaiveDate,
    pub is_public: bool,
    pub book_url: Option<String>,
    pub category_ids: Option<Vec<CategoryId>>,
}

impl BookForm {
    pub fn new(title: impl Into<String>, published_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: None,
            author: None,
            published_date,
            is_public: true,
            book_url: None,
            category_ids: None,
        }
    }
}

impl Validator for BookForm {
    fn validate(&self) -> std::result::Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if self.title.trim().is_empty() {
            errors.add("title", "must not be empty");
        }
        if self.title.len() > TITLE_MAX_LEN {
            errors.add(
                "title",
                format!("must be at most {} characters", TITLE_MAX_LEN),
            );
        }
        if let Some(description) = &self.description {
            if description.len() > DESCRIPTION_MAX_LEN {
                errors.add(
                    "description",
                    format!("must be at most {} characters", DESCRIPTION_MAX_LEN),
                );
            }
        }
        if let Some(author) = &self.author {
            if author.len() > AUTHOR_MAX_LEN {
                errors.add(
                    "author",
                    format!("must be at most {} characters", AUTHOR_MAX_LEN),
                );
            }
        }

        errors.into_result()
    }
}

/// File parts of a create or edit submission
#[derive(Debug, Default)]
pub struct BookUploads {
    pub cover: Option<UploadedFile>,
    pub epub: Option<UploadedFile>,
    pub pdf: Option<UploadedFile>,
}

impl BookUploads {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn epub(file: UploadedFile) -> Self {
        Self {
            epub: Some(file),
            ..Self::default()
        }
    }

    pub fn pdf(file: UploadedFile) -> Self {
        Self {
            pdf: Some(file),
            ..Self::default()
        }
    }

    pub fn with_cover(mut self, file: UploadedFile) -> Self {
        self.cover = Some(file);
        self
    }
}

/// Data the create form needs
#[derive(Debug, Clone)]
pub struct CreateFormData {
    pub categories: Vec<Category>,
}

/// Data the edit form needs, including the current source for display
#[derive(Debug, Clone)]
pub struct EditFormData {
    pub book: Book,
    pub selected_category_ids: Vec<CategoryId>,
    pub categories: Vec<Category>,
}

/// Everything the home page renders
#[derive(Debug, Clone)]
pub struct HomePage {
    pub sections: Vec<CategorySection>,
    pub filterable_categories: Vec<Category>,
    /// The requester's newest additions; empty for anonymous visitors
    pub recent_books: Vec<BookSummary>,
}

/// High-level catalog management
pub struct CatalogService {
    pool: DbPool,
    blobs: BlobStore,
    covers_dir: String,
    books_dir: String,
    limits: CatalogSettings,
}

impl CatalogService {
    /// Connects to the configured database, migrates it, seeds starter data
    /// when enabled, and wires the blob store
    pub async fn new(config: &Config) -> Result<Self> {
        info!(
            "Initializing catalog with database: {}",
            config.database.path
        );

        let db_config = DatabaseConfig::new(&config.database.path)
            .with_max_connections(config.database.max_connections);
        let pool = connect(db_config).await.map_err(CatalogError::Persistence)?;

        run_migrations(&pool)
            .await
            .map_err(CatalogError::Persistence)?;

        if config.catalog.seed_on_startup {
            let seeded = seed_if_empty(&pool)
                .await
                .map_err(CatalogError::Persistence)?;
            if seeded {
                info!("Seeded empty catalog with starter categories and books");
            }
        }

        let blobs = BlobStore::new(&config.storage.content_root);
        Ok(Self::from_parts(
            pool,
            blobs,
            &config.storage,
            config.catalog.clone(),
        ))
    }

    /// Builds a service from already initialized parts
    pub fn from_parts(
        pool: DbPool,
        blobs: BlobStore,
        storage: &StorageSettings,
        limits: CatalogSettings,
    ) -> Self {
        Self {
            pool,
            blobs,
            covers_dir: storage.covers_dir.clone(),
            books_dir: storage.books_dir.clone(),
            limits,
        }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    pub fn blobs(&self) -> &BlobStore {
        &self.blobs
    }

    // ===== Lifecycle =====

    /// Creates a book owned by the requester
    ///
    /// Field validation and source resolution run before any file is
    /// written. If anything fails after that, files stored for this attempt
    /// are removed again and no row remains.
    pub async fn create_book(
        &self,
        requester: &Requester,
        form: BookForm,
        uploads: BookUploads,
    ) -> Result<BookId> {
        let owner = requester
            .user_id
            .clone()
            .ok_or_else(|| CatalogError::forbidden("Sign in to add books"))?;

        form.validate()?;
        let new_source = resolve_create(uploads.epub, uploads.pdf, form.book_url.as_deref())?;

        let mut attempt: Vec<String> = Vec::new();
        let result = self
            .create_inner(owner, form, uploads.cover, new_source, &mut attempt)
            .await;

        match result {
            Ok(id) => {
                info!("Created book {}", id);
                Ok(id)
            }
            Err(err) => {
                self.discard(&attempt).await;
                Err(err)
            }
        }
    }

    async fn create_inner(
        &self,
        owner: UserId,
        form: BookForm,
        cover: Option<UploadedFile>,
        new_source: NewSource,
        attempt: &mut Vec<String>,
    ) -> Result<BookId> {
        let selection = CategoryDiff::between(&[], form.category_ids.as_deref());

        let cover_path = match cover.filter(|file| !file.is_empty()) {
            Some(upload) => Some(self.store_cover(&upload, attempt).await?),
            None => None,
        };

        let source = self.store_source(new_source, attempt).await?;

        let book = NewBook {
            title: form.title,
            description: form.description,
            author: form.author,
            published_date: form.published_date,
            owner_user_id: Some(owner),
            is_public: form.is_public,
            cover_path,
            source,
        };
        book.validate()?;

        queries::insert_book(&self.pool, &book, &selection.to_add)
            .await
            .map_err(CatalogError::from_persistence)
    }

    /// Applies a full edit to a book
    ///
    /// Replacement files are stored before the row update; the files they
    /// displace are deleted only after the update commits. On any failure,
    /// files stored for this attempt are removed and every file the book
    /// already referenced stays untouched.
    pub async fn edit_book(
        &self,
        id: BookId,
        requester: &Requester,
        form: BookForm,
        uploads: BookUploads,
    ) -> Result<()> {
        let mut book = queries::get_book(&self.pool, id)
            .await
            .map_err(CatalogError::from_persistence)?;

        if !requester.can_modify(book.owner_user_id.as_ref()) {
            return Err(CatalogError::forbidden(MODIFY_FORBIDDEN));
        }

        form.validate()?;
        let change = resolve_edit(
            uploads.epub,
            uploads.pdf,
            form.book_url.as_deref(),
            book.source.url(),
        )?;

        let mut attempt: Vec<String> = Vec::new();
        let mut displaced: Vec<String> = Vec::new();

        let result = self
            .edit_inner(
                &mut book,
                form,
                uploads.cover,
                change,
                &mut attempt,
                &mut displaced,
            )
            .await;

        match result {
            Ok(()) => {
                // Committed; the displaced files are unreferenced now
                self.discard(&displaced).await;
                info!("Updated book {}", id);
                Ok(())
            }
            Err(err) => {
                self.discard(&attempt).await;
                Err(err)
            }
        }
    }

    async fn edit_inner(
        &self,
        book: &mut Book,
        form: BookForm,
        cover: Option<UploadedFile>,
        change: SourceChange,
        attempt: &mut Vec<String>,
        displaced: &mut Vec<String>,
    ) -> Result<()> {
        let current: Vec<CategoryId> = book.categories.iter().map(|c| c.id).collect();
        let selection = CategoryDiff::between(&current, form.category_ids.as_deref());

        book.title = form.title;
        book.description = form.description;
        book.author = form.author;
        book.published_date = form.published_date;
        book.is_public = form.is_public;

        if let Some(upload) = cover.filter(|file| !file.is_empty()) {
            let path = self.store_cover(&upload, attempt).await?;
            if let Some(old) = book.cover_path.replace(path) {
                displaced.push(old);
            }
        }

        if let SourceChange::Replace(new_source) = change {
            let source = self.store_source(new_source, attempt).await?;
            if let Some(old) = book.source.file_path() {
                displaced.push(old.to_string());
            }
            book.source = source;
        }

        book.validate()?;

        queries::update_book(&self.pool, book, &selection.to_add, &selection.to_remove)
            .await
            .map_err(CatalogError::from_persistence)
    }

    /// Deletes a book and its stored files
    ///
    /// The row goes first; file removal afterwards is best effort, so a
    /// failed unlink can orphan a blob but never resurrect the book.
    pub async fn delete_book(&self, id: BookId, requester: &Requester) -> Result<()> {
        let book = queries::get_book(&self.pool, id)
            .await
            .map_err(CatalogError::from_persistence)?;

        if !requester.can_modify(book.owner_user_id.as_ref()) {
            return Err(CatalogError::forbidden(MODIFY_FORBIDDEN));
        }

        // Capture paths before the row disappears
        let doomed = book.owned_blob_paths();

        let removed = queries::delete_book(&self.pool, id)
            .await
            .map_err(CatalogError::from_persistence)?;
        if !removed {
            return Err(CatalogError::not_found("Book", id));
        }

        self.discard(&doomed).await;
        info!("Deleted book {} and {} stored file(s)", id, doomed.len());
        Ok(())
    }

    /// Saves an uploaded cover image, remembering it as part of this attempt
    async fn store_cover(
        &self,
        upload: &UploadedFile,
        attempt: &mut Vec<String>,
    ) -> Result<String> {
        let path = self
            .blobs
            .save_upload(upload, &self.covers_dir, None)
            .await
            .map_err(CatalogError::Storage)?;
        attempt.push(path.clone());
        Ok(path)
    }

    /// Saves the file behind a new source, if it has one, and returns the
    /// source value to persist
    async fn store_source(
        &self,
        new_source: NewSource,
        attempt: &mut Vec<String>,
    ) -> Result<BookSource> {
        match new_source {
            NewSource::Epub(file) => {
                let path = self
                    .blobs
                    .save_upload(&file, &self.books_dir, SourceKind::Epub.enforced_extension())
                    .await
                    .map_err(CatalogError::Storage)?;
                attempt.push(path.clone());
                Ok(BookSource::Epub {
                    path,
                    file_name: Some(file.file_name),
                })
            }
            NewSource::Pdf(file) => {
                let path = self
                    .blobs
                    .save_upload(&file, &self.books_dir, SourceKind::Pdf.enforced_extension())
                    .await
                    .map_err(CatalogError::Storage)?;
                attempt.push(path.clone());
                Ok(BookSource::Pdf {
                    path,
                    file_name: Some(file.file_name),
                })
            }
            NewSource::Url(url) => Ok(BookSource::Url(url)),
        }
    }

    /// Best-effort removal of stored files; the store logs failures
    async fn discard(&self, paths: &[String]) {
        for path in paths {
            self.blobs.delete(path).await;
        }
    }

    // ===== Source file access =====

    /// Returns the stored EPUB with its download filename
    pub async fn epub_blob(&self, id: BookId) -> Result<(Vec<u8>, String)> {
        self.source_blob(id, SourceKind::Epub).await
    }

    /// Returns the stored PDF with its download filename
    pub async fn pdf_blob(&self, id: BookId) -> Result<(Vec<u8>, String)> {
        self.source_blob(id, SourceKind::Pdf).await
    }

    async fn source_blob(&self, id: BookId, kind: SourceKind) -> Result<(Vec<u8>, String)> {
        let book = queries::get_book(&self.pool, id)
            .await
            .map_err(CatalogError::from_persistence)?;

        if book.source.kind() != kind {
            return Err(CatalogError::not_found(kind.to_string(), id));
        }
        let path = match book.source.file_path() {
            Some(path) => path.to_string(),
            None => return Err(CatalogError::not_found(kind.to_string(), id)),
        };
        let download_name = match book.source_download_name() {
            Some(name) => name,
            None => return Err(CatalogError::not_found(kind.to_string(), id)),
        };

        let bytes = self.blobs.read(&path).await.map_err(|err| {
            if err.is_not_found() {
                CatalogError::not_found(kind.to_string(), id)
            } else {
                CatalogError::Storage(err)
            }
        })?;

        Ok((bytes, download_name))
    }

    // ===== Form support =====

    /// Data for rendering the create form
    pub async fn create_form_data(&self) -> Result<CreateFormData> {
        let categories = queries::list_categories(&self.pool)
            .await
            .map_err(CatalogError::from_persistence)?;
        Ok(CreateFormData { categories })
    }

    /// Data for rendering the edit form of an existing book
    pub async fn edit_form_data(&self, id: BookId, requester: &Requester) -> Result<EditFormData> {
        let book = queries::get_book(&self.pool, id)
            .await
            .map_err(CatalogError::from_persistence)?;

        if !requester.can_modify(book.owner_user_id.as_ref()) {
            return Err(CatalogError::forbidden(MODIFY_FORBIDDEN));
        }

        let selected_category_ids = book.categories.iter().map(|c| c.id).collect();
        let categories = queries::list_categories(&self.pool)
            .await
            .map_err(CatalogError::from_persistence)?;

        Ok(EditFormData {
            book,
            selected_category_ids,
            categories,
        })
    }

    // ===== Catalog pages =====

    /// All public books, ordered by title
    pub async fn list_catalog(&self) -> Result<Vec<BookSummary>> {
        catalog::list_public_books(&self.pool)
            .await
            .map_err(CatalogError::from_persistence)
    }

    /// Public books whose titles contain `term`
    pub async fn search(&self, term: &str) -> Result<Vec<BookSummary>> {
        catalog::search_books(&self.pool, term)
            .await
            .map_err(CatalogError::from_persistence)
    }

    /// Title completions for the search box
    pub async fn suggest(&self, prefix: &str) -> Result<Vec<TitleSuggestion>> {
        catalog::suggest_titles(&self.pool, prefix, i64::from(self.limits.suggestion_limit))
            .await
            .map_err(CatalogError::from_persistence)
    }

    /// The home page: category shelves, the filter list, and the
    /// requester's own newest additions
    pub async fn home_page(
        &self,
        requester: &Requester,
        selected_categories: Option<&[CategoryId]>,
    ) -> Result<HomePage> {
        let sections = catalog::home_sections(
            &self.pool,
            selected_categories,
            i64::from(self.limits.home_books_per_category),
        )
        .await
        .map_err(CatalogError::from_persistence)?;

        let filterable_categories = catalog::list_filterable_categories(&self.pool)
            .await
            .map_err(CatalogError::from_persistence)?;

        let recent_books = match &requester.user_id {
            Some(user) => catalog::list_books_by_owner_recent(
                &self.pool,
                user,
                i64::from(self.limits.history_limit),
            )
            .await
            .map_err(CatalogError::from_persistence)?,
            None => Vec::new(),
        };

        Ok(HomePage {
            sections,
            filterable_categories,
            recent_books,
        })
    }

    /// The signed-in requester's books, newest publication first
    pub async fn my_books(&self, requester: &Requester) -> Result<Vec<BookSummary>> {
        let user = requester
            .user_id
            .as_ref()
            .ok_or_else(|| CatalogError::forbidden("Sign in to see your books"))?;
        catalog::list_books_by_owner(&self.pool, user)
            .await
            .map_err(CatalogError::from_persistence)
    }

    /// Full details for one book
    pub async fn book_details(&self, id: BookId) -> Result<Book> {
        queries::get_book(&self.pool, id)
            .await
            .map_err(CatalogError::from_persistence)
    }
}
