//! Integration tests for downloads, form data, and the browsing facade

use chrono::NaiveDate;
use openshelf_blobstore::BlobStore;
use openshelf_catalog::{BookForm, BookUploads, CatalogError, CatalogService, Requester};
use openshelf_config::{CatalogSettings, Config, StorageSettings};
use openshelf_core::{BookSource, CategoryId, NewBook, UploadedFile, User, UserId};
use openshelf_database::{
    connection::{connect, DatabaseConfig},
    migrations::run_migrations,
    queries,
};
use tempfile::{NamedTempFile, TempDir};

type Result<T> = std::result::Result<T, CatalogError>;

async fn setup() -> (CatalogService, NamedTempFile, TempDir) {
    let db_file = NamedTempFile::new().expect("Failed to create temp database file");
    let blob_root = TempDir::new().expect("Failed to create temp blob root");

    let db_path = db_file.path().to_str().expect("temp path should be UTF-8");
    let pool = connect(DatabaseConfig::new(db_path))
        .await
        .expect("Failed to connect to database");
    run_migrations(&pool).await.expect("Failed to run migrations");

    let blobs = BlobStore::new(blob_root.path());
    let service = CatalogService::from_parts(
        pool,
        blobs,
        &StorageSettings::default(),
        CatalogSettings::default(),
    );

    (service, db_file, blob_root)
}

async fn register(service: &CatalogService, id: &str) {
    let user = User {
        id: UserId::new(id),
        display_name: None,
    };
    queries::upsert_user(service.pool(), &user)
        .await
        .expect("Failed to upsert user");
}

fn owner() -> Requester {
    Requester::user("owner-1")
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn form(title: &str) -> BookForm {
    BookForm::new(title, date(2020, 1, 1))
}

fn url_form(title: &str, url: &str) -> BookForm {
    let mut form = form(title);
    form.book_url = Some(url.to_string());
    form
}

fn epub_file() -> UploadedFile {
    UploadedFile::new("My Novel.epub", b"EPUB_BYTES".to_vec())
}

fn pdf_file() -> UploadedFile {
    UploadedFile::new("My Novel.pdf", b"PDF_BYTES".to_vec())
}

// ===== Downloads =====

#[tokio::test]
async fn test_epub_download_returns_bytes_and_name() -> Result<()> {
    let (service, _db, _root) = setup().await;
    register(&service, "owner-1").await;

    let id = service
        .create_book(&owner(), form("Dracula"), BookUploads::epub(epub_file()))
        .await?;

    let (bytes, name) = service.epub_blob(id).await?;
    assert_eq!(bytes, b"EPUB_BYTES");
    assert_eq!(name, "My Novel.epub");

    Ok(())
}

#[tokio::test]
async fn test_pdf_download_returns_bytes_and_name() -> Result<()> {
    let (service, _db, _root) = setup().await;
    register(&service, "owner-1").await;

    let id = service
        .create_book(&owner(), form("Dracula"), BookUploads::pdf(pdf_file()))
        .await?;

    let (bytes, name) = service.pdf_blob(id).await?;
    assert_eq!(bytes, b"PDF_BYTES");
    assert_eq!(name, "My Novel.pdf");

    Ok(())
}

#[tokio::test]
async fn test_download_of_wrong_kind_is_not_found() -> Result<()> {
    let (service, _db, _root) = setup().await;
    register(&service, "owner-1").await;

    let epub_id = service
        .create_book(&owner(), form("Dracula"), BookUploads::epub(epub_file()))
        .await?;
    let url_id = service
        .create_book(
            &owner(),
            url_form("Carmilla", "https://example.com/carmilla"),
            BookUploads::none(),
        )
        .await?;

    match service.pdf_blob(epub_id).await {
        Err(err) if err.is_not_found() => {}
        other => panic!("Expected NotFound error, got {:?}", other),
    }
    match service.epub_blob(url_id).await {
        Err(err) if err.is_not_found() => {}
        other => panic!("Expected NotFound error, got {:?}", other),
    }

    Ok(())
}

#[tokio::test]
async fn test_download_with_missing_blob_is_not_found() -> Result<()> {
    let (service, _db, _root) = setup().await;
    register(&service, "owner-1").await;

    let id = service
        .create_book(&owner(), form("Dracula"), BookUploads::epub(epub_file()))
        .await?;

    let book = service.book_details(id).await?;
    let path = book.source.file_path().expect("file-based source");
    std::fs::remove_file(service.blobs().absolute_path(path))
        .expect("Failed to remove blob from disk");

    match service.epub_blob(id).await {
        Err(err) if err.is_not_found() => Ok(()),
        other => panic!("Expected NotFound error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_download_name_falls_back_when_not_preserved() -> Result<()> {
    let (service, _db, _root) = setup().await;

    // Rows written before filenames were recorded have no download name
    let path = service
        .blobs()
        .save(b"EPUB_BYTES", "books", Some("epub"))
        .await
        .expect("Failed to save blob");
    let book = NewBook::new(
        "Dracula",
        date(1897, 5, 26),
        BookSource::Epub {
            path,
            file_name: None,
        },
    );
    let id = queries::insert_book(service.pool(), &book, &[])
        .await
        .expect("Failed to insert book");

    let (_, name) = service.epub_blob(id).await?;
    assert_eq!(name, format!("book_{}.epub", id));

    Ok(())
}

// ===== Form data =====

#[tokio::test]
async fn test_create_form_lists_all_categories() -> Result<()> {
    let (service, _db, _root) = setup().await;

    queries::insert_category(service.pool(), "Horror", 2)
        .await
        .expect("Failed to insert category");
    queries::insert_category(service.pool(), "Fiction", 1)
        .await
        .expect("Failed to insert category");

    let data = service.create_form_data().await?;
    let names: Vec<&str> = data.categories.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Fiction", "Horror"]);

    Ok(())
}

#[tokio::test]
async fn test_edit_form_returns_book_and_selection() -> Result<()> {
    let (service, _db, _root) = setup().await;
    register(&service, "owner-1").await;

    let fiction = queries::insert_category(service.pool(), "Fiction", 1)
        .await
        .expect("Failed to insert category");
    let horror = queries::insert_category(service.pool(), "Horror", 2)
        .await
        .expect("Failed to insert category");

    let mut submission = form("Dracula");
    submission.category_ids = Some(vec![horror]);
    let id = service
        .create_book(&owner(), submission, BookUploads::epub(epub_file()))
        .await?;

    let data = service.edit_form_data(id, &owner()).await?;
    assert_eq!(data.book.title, "Dracula");
    assert_eq!(data.selected_category_ids, vec![horror]);
    assert_eq!(data.categories.len(), 2);
    assert!(data.categories.iter().any(|c| c.id == fiction));

    Ok(())
}

#[tokio::test]
async fn test_edit_form_forbidden_for_non_owner() -> Result<()> {
    let (service, _db, _root) = setup().await;
    register(&service, "owner-1").await;

    let id = service
        .create_book(&owner(), form("Dracula"), BookUploads::epub(epub_file()))
        .await?;

    match service.edit_form_data(id, &Requester::user("intruder")).await {
        Err(CatalogError::Forbidden(_)) => Ok(()),
        other => panic!("Expected Forbidden error, got {:?}", other),
    }
}

// ===== Browsing =====

#[tokio::test]
async fn test_catalog_lists_only_public_books_by_title() -> Result<()> {
    let (service, _db, _root) = setup().await;
    register(&service, "owner-1").await;

    service
        .create_book(
            &owner(),
            url_form("Varney the Vampire", "https://example.com/varney"),
            BookUploads::none(),
        )
        .await?;
    service
        .create_book(
            &owner(),
            url_form("Carmilla", "https://example.com/carmilla"),
            BookUploads::none(),
        )
        .await?;

    let mut hidden = url_form("Secret Draft", "https://example.com/draft");
    hidden.is_public = false;
    service
        .create_book(&owner(), hidden, BookUploads::none())
        .await?;

    let titles: Vec<String> = service
        .list_catalog()
        .await?
        .into_iter()
        .map(|b| b.title)
        .collect();
    assert_eq!(titles, vec!["Carmilla", "Varney the Vampire"]);

    Ok(())
}

#[tokio::test]
async fn test_search_matches_title_substring() -> Result<()> {
    let (service, _db, _root) = setup().await;
    register(&service, "owner-1").await;

    service
        .create_book(
            &owner(),
            url_form("Dracula", "https://example.com/dracula"),
            BookUploads::none(),
        )
        .await?;
    service
        .create_book(
            &owner(),
            url_form("Carmilla", "https://example.com/carmilla"),
            BookUploads::none(),
        )
        .await?;

    let hits = service.search("racu").await?;
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Dracula");

    assert!(service.search("  ").await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_suggestions_are_capped_at_configured_limit() -> Result<()> {
    let (service, _db, _root) = setup().await;
    register(&service, "owner-1").await;

    for n in 1..=10 {
        service
            .create_book(
                &owner(),
                url_form(
                    &format!("Saga {:02}", n),
                    &format!("https://example.com/saga-{}", n),
                ),
                BookUploads::none(),
            )
            .await?;
    }

    let suggestions = service.suggest("Saga").await?;
    assert_eq!(suggestions.len(), 8);
    assert_eq!(suggestions[0].title, "Saga 01");
    assert_eq!(suggestions[7].title, "Saga 08");

    Ok(())
}

#[tokio::test]
async fn test_home_page_sections_skip_empty_categories() -> Result<()> {
    let (service, _db, _root) = setup().await;
    register(&service, "owner-1").await;

    let fiction = queries::insert_category(service.pool(), "Fiction", 1)
        .await
        .expect("Failed to insert category");
    let horror = queries::insert_category(service.pool(), "Horror", 2)
        .await
        .expect("Failed to insert category");

    let mut public = url_form("Dracula", "https://example.com/dracula");
    public.category_ids = Some(vec![fiction]);
    service
        .create_book(&owner(), public, BookUploads::none())
        .await?;

    // Horror holds only a private book, so it renders no shelf
    let mut private = url_form("Secret Draft", "https://example.com/draft");
    private.is_public = false;
    private.category_ids = Some(vec![horror]);
    service
        .create_book(&owner(), private, BookUploads::none())
        .await?;

    let page = service.home_page(&Requester::anonymous(), None).await?;
    assert_eq!(page.sections.len(), 1);
    assert_eq!(page.sections[0].category.name, "Fiction");
    assert_eq!(page.sections[0].books.len(), 1);

    let filter_names: Vec<&str> = page
        .filterable_categories
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(filter_names, vec!["Fiction"]);
    assert!(page.recent_books.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_home_page_honors_category_filter() -> Result<()> {
    let (service, _db, _root) = setup().await;
    register(&service, "owner-1").await;

    let fiction = queries::insert_category(service.pool(), "Fiction", 1)
        .await
        .expect("Failed to insert category");
    let horror = queries::insert_category(service.pool(), "Horror", 2)
        .await
        .expect("Failed to insert category");

    let mut first = url_form("Dracula", "https://example.com/dracula");
    first.category_ids = Some(vec![fiction, horror]);
    service
        .create_book(&owner(), first, BookUploads::none())
        .await?;

    let mut second = url_form("Carmilla", "https://example.com/carmilla");
    second.category_ids = Some(vec![fiction]);
    service
        .create_book(&owner(), second, BookUploads::none())
        .await?;

    let selected: Vec<CategoryId> = vec![horror];
    let page = service
        .home_page(&Requester::anonymous(), Some(&selected))
        .await?;
    assert_eq!(page.sections.len(), 1);
    assert_eq!(page.sections[0].category.name, "Horror");
    assert_eq!(page.sections[0].books[0].title, "Dracula");

    Ok(())
}

#[tokio::test]
async fn test_home_page_recent_books_for_signed_in_user() -> Result<()> {
    let (service, _db, _root) = setup().await;
    register(&service, "owner-1").await;
    register(&service, "other").await;

    service
        .create_book(
            &owner(),
            url_form("Dracula", "https://example.com/dracula"),
            BookUploads::none(),
        )
        .await?;
    service
        .create_book(
            &owner(),
            url_form("Carmilla", "https://example.com/carmilla"),
            BookUploads::none(),
        )
        .await?;
    service
        .create_book(
            &Requester::user("other"),
            url_form("Frankenstein", "https://example.com/frankenstein"),
            BookUploads::none(),
        )
        .await?;

    let page = service.home_page(&owner(), None).await?;
    let titles: Vec<String> = page.recent_books.into_iter().map(|b| b.title).collect();
    // Newest addition first, other users' books absent
    assert_eq!(titles, vec!["Carmilla", "Dracula"]);

    Ok(())
}

#[tokio::test]
async fn test_my_books_requires_sign_in() -> Result<()> {
    let (service, _db, _root) = setup().await;
    register(&service, "owner-1").await;

    let mut private = url_form("Secret Draft", "https://example.com/draft");
    private.is_public = false;
    service
        .create_book(&owner(), private, BookUploads::none())
        .await?;

    match service.my_books(&Requester::anonymous()).await {
        Err(CatalogError::Forbidden(_)) => {}
        other => panic!("Expected Forbidden error, got {:?}", other),
    }

    // The owner view includes private books
    let mine = service.my_books(&owner()).await?;
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].title, "Secret Draft");

    Ok(())
}

// ===== Startup =====

#[tokio::test]
async fn test_service_startup_migrates_and_seeds() -> Result<()> {
    let db_file = NamedTempFile::new().expect("Failed to create temp database file");
    let blob_root = TempDir::new().expect("Failed to create temp blob root");

    let mut config = Config::new();
    config.database.path = db_file
        .path()
        .to_str()
        .expect("temp path should be UTF-8")
        .to_string();
    config.storage.content_root = blob_root
        .path()
        .to_str()
        .expect("temp path should be UTF-8")
        .to_string();

    let service = CatalogService::new(&config).await?;

    let catalog = service.list_catalog().await?;
    assert_eq!(catalog.len(), 9);

    let form_data = service.create_form_data().await?;
    assert_eq!(form_data.categories.len(), 6);

    // Startup against the same database again must not duplicate the seed
    let service = CatalogService::new(&config).await?;
    assert_eq!(service.list_catalog().await?.len(), 9);

    Ok(())
}
