//! Book database operations
//!
//! Writes that touch both the books table and the category join table run in
//! a single transaction. The update path is guarded by `row_version` so a
//! stale writer fails instead of silently overwriting a concurrent edit.

use crate::queries::categories;
use crate::DbPool;
use chrono::NaiveDate;
use openshelf_core::types::SourceColumns;
use openshelf_core::{AppError, Book, BookId, BookSource, Category, CategoryId, NewBook, UserId};

/// Inserts a book together with its category links in one transaction
///
/// Requested category ids that do not exist are silently dropped. Returns
/// the id assigned by the database.
pub async fn insert_book(
    pool: &DbPool,
    book: &NewBook,
    category_ids: &[CategoryId],
) -> Result<BookId, AppError> {
    let columns = book.source.to_columns();

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::database("Failed to begin transaction", e))?;

    let result = sqlx::query(
        r#"
        INSERT INTO books (
            title, description, author, published_date, owner_user_id,
            is_public, cover_path, epub_file_path, epub_file_name,
            pdf_file_path, pdf_file_name, external_url
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&book.title)
    .bind(&book.description)
    .bind(&book.author)
    .bind(book.published_date)
    .bind(book.owner_user_id.as_ref().map(|u| u.as_str()))
    .bind(book.is_public as i64)
    .bind(&book.cover_path)
    .bind(&columns.epub_file_path)
    .bind(&columns.epub_file_name)
    .bind(&columns.pdf_file_path)
    .bind(&columns.pdf_file_name)
    .bind(&columns.external_url)
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::database("Failed to insert book", e))?;

    let id = BookId::new(result.last_insert_rowid());

    let valid = categories::existing_ids(&mut tx, category_ids).await?;
    for category_id in valid {
        categories::link_book(&mut tx, id, category_id).await?;
    }

    tx.commit()
        .await
        .map_err(|e| AppError::database("Failed to commit book insert", e))?;

    Ok(id)
}

/// Gets a book by id, categories included
pub async fn get_book(pool: &DbPool, id: BookId) -> Result<Book, AppError> {
    try_get_book(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Book", id))
}

/// Gets a book by id, or None if no such row exists
pub async fn try_get_book(pool: &DbPool, id: BookId) -> Result<Option<Book>, AppError> {
    let row = sqlx::query(
        r#"
        SELECT id, title, description, author, published_date, owner_user_id,
               is_public, cover_path, epub_file_path, epub_file_name,
               pdf_file_path, pdf_file_name, external_url, row_version
        FROM books WHERE id = ?
        "#,
    )
    .bind(id.value())
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::database("Failed to fetch book", e))?;

    match row {
        Some(row) => {
            let categories = categories::book_categories(pool, id).await?;
            Ok(Some(row_to_book(row, categories)?))
        }
        None => Ok(None),
    }
}

/// Applies a versioned update plus category link changes in one transaction
///
/// The `WHERE row_version = ?` guard makes a stale write affect zero rows;
/// a follow-up existence probe then tells a lost race (`StaleRecord`) apart
/// from a vanished row (`RecordNotFound`). Ownership is never part of an
/// update; `owner_user_id` keeps its inserted value for the life of the row.
pub async fn update_book(
    pool: &DbPool,
    book: &Book,
    add: &[CategoryId],
    remove: &[CategoryId],
) -> Result<(), AppError> {
    let columns = book.source.to_columns();

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::database("Failed to begin transaction", e))?;

    let result = sqlx::query(
        r#"
        UPDATE books SET
            title = ?, description = ?, author = ?, published_date = ?,
            is_public = ?, cover_path = ?, epub_file_path = ?, epub_file_name = ?,
            pdf_file_path = ?, pdf_file_name = ?, external_url = ?,
            row_version = row_version + 1
        WHERE id = ? AND row_version = ?
        "#,
    )
    .bind(&book.title)
    .bind(&book.description)
    .bind(&book.author)
    .bind(book.published_date)
    .bind(book.is_public as i64)
    .bind(&book.cover_path)
    .bind(&columns.epub_file_path)
    .bind(&columns.epub_file_name)
    .bind(&columns.pdf_file_path)
    .bind(&columns.pdf_file_name)
    .bind(&columns.external_url)
    .bind(book.id.value())
    .bind(book.row_version)
    .execute(&mut *tx)
    .await
    .map_err(|e| AppError::database("Failed to update book", e))?;

    if result.rows_affected() == 0 {
        // Dropping the transaction rolls it back
        drop(tx);
        return if book_exists(pool, book.id).await? {
            Err(AppError::StaleRecord {
                entity: "Book".to_string(),
                identifier: book.id.to_string(),
            })
        } else {
            Err(AppError::not_found("Book", book.id))
        };
    }

    for category_id in remove {
        categories::unlink_book(&mut tx, book.id, *category_id).await?;
    }

    let valid = categories::existing_ids(&mut tx, add).await?;
    for category_id in valid {
        categories::link_book(&mut tx, book.id, category_id).await?;
    }

    tx.commit()
        .await
        .map_err(|e| AppError::database("Failed to commit book update", e))?;

    Ok(())
}

/// Deletes a book row; its category join rows cascade away with it
///
/// Returns whether a row was actually removed. Category rows themselves are
/// untouched.
pub async fn delete_book(pool: &DbPool, id: BookId) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM books WHERE id = ?")
        .bind(id.value())
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to delete book", e))?;

    Ok(result.rows_affected() > 0)
}

/// Checks whether a book row exists
pub async fn book_exists(pool: &DbPool, id: BookId) -> Result<bool, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books WHERE id = ?")
        .bind(id.value())
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::database("Failed to check book existence", e))?;

    Ok(count > 0)
}

/// Converts a database row plus its loaded categories to a Book
pub(crate) fn row_to_book(
    row: sqlx::sqlite::SqliteRow,
    categories: Vec<Category>,
) -> Result<Book, AppError> {
    use sqlx::Row;

    let id: i64 = row
        .try_get("id")
        .map_err(|e| AppError::database("Missing book id", e))?;

    let published_date: NaiveDate = row
        .try_get("published_date")
        .map_err(|e| AppError::database("Missing published date", e))?;

    let is_public: i64 = row
        .try_get("is_public")
        .map_err(|e| AppError::database("Missing is_public", e))?;

    let row_version: i64 = row
        .try_get("row_version")
        .map_err(|e| AppError::database("Missing row version", e))?;

    let owner_user_id: Option<String> = row.try_get("owner_user_id").unwrap_or(None);

    let source = BookSource::from_columns(SourceColumns {
        epub_file_path: row.try_get("epub_file_path").unwrap_or(None),
        epub_file_name: row.try_get("epub_file_name").unwrap_or(None),
        pdf_file_path: row.try_get("pdf_file_path").unwrap_or(None),
        pdf_file_name: row.try_get("pdf_file_name").unwrap_or(None),
        external_url: row.try_get("external_url").unwrap_or(None),
    })?;

    Ok(Book {
        id: BookId::new(id),
        title: row
            .try_get("title")
            .map_err(|e| AppError::database("Missing title", e))?,
        description: row.try_get("description").unwrap_or(None),
        author: row.try_get("author").unwrap_or(None),
        published_date,
        owner_user_id: owner_user_id.map(UserId::from),
        is_public: is_public != 0,
        cover_path: row.try_get("cover_path").unwrap_or(None),
        source,
        categories,
        row_version,
    })
}
