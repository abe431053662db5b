//! Category database operations
//!
//! Link maintenance (`link_book`/`unlink_book`/`existing_ids`) takes a bare
//! connection so callers can run it inside their own transaction.

use crate::DbPool;
use openshelf_core::{AppError, BookId, Category, CategoryId};
use std::collections::HashSet;

/// Inserts a category and returns its assigned id
pub async fn insert_category(
    pool: &DbPool,
    name: &str,
    display_order: i64,
) -> Result<CategoryId, AppError> {
    let result = sqlx::query("INSERT INTO categories (name, display_order) VALUES (?, ?)")
        .bind(name)
        .bind(display_order)
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to insert category", e))?;

    Ok(CategoryId::new(result.last_insert_rowid()))
}

/// Gets a category by id
pub async fn get_category(pool: &DbPool, id: CategoryId) -> Result<Category, AppError> {
    let row = sqlx::query("SELECT id, name, display_order FROM categories WHERE id = ?")
        .bind(id.value())
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::database("Failed to fetch category", e))?
        .ok_or_else(|| AppError::not_found("Category", id))?;

    row_to_category(row)
}

/// Lists all categories ordered by name, for form option lists
pub async fn list_categories(pool: &DbPool) -> Result<Vec<Category>, AppError> {
    let rows = sqlx::query("SELECT id, name, display_order FROM categories ORDER BY name")
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database("Failed to list categories", e))?;

    rows.into_iter().map(row_to_category).collect()
}

/// Lists all categories in catalog display order
pub async fn list_categories_by_display_order(pool: &DbPool) -> Result<Vec<Category>, AppError> {
    let rows =
        sqlx::query("SELECT id, name, display_order FROM categories ORDER BY display_order")
            .fetch_all(pool)
            .await
            .map_err(|e| AppError::database("Failed to list categories", e))?;

    rows.into_iter().map(row_to_category).collect()
}

/// Gets the categories linked to a book, ordered by name
pub async fn book_categories(pool: &DbPool, book_id: BookId) -> Result<Vec<Category>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT c.id, c.name, c.display_order
        FROM categories c
        INNER JOIN book_categories bc ON bc.category_id = c.id
        WHERE bc.book_id = ?
        ORDER BY c.name
        "#,
    )
    .bind(book_id.value())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to fetch book categories", e))?;

    rows.into_iter().map(row_to_category).collect()
}

/// Gets just the category ids linked to a book
pub async fn book_category_ids(
    pool: &DbPool,
    book_id: BookId,
) -> Result<Vec<CategoryId>, AppError> {
    let ids: Vec<i64> = sqlx::query_scalar(
        "SELECT category_id FROM book_categories WHERE book_id = ? ORDER BY category_id",
    )
    .bind(book_id.value())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to fetch book category ids", e))?;

    Ok(ids.into_iter().map(CategoryId::new).collect())
}

/// Keeps only the requested ids that exist in the categories table
///
/// Unknown ids are silently dropped, never an error.
pub async fn filter_existing_ids(
    pool: &DbPool,
    requested: &[CategoryId],
) -> Result<Vec<CategoryId>, AppError> {
    let mut conn = pool
        .acquire()
        .await
        .map_err(|e| AppError::database("Failed to acquire connection", e))?;

    existing_ids(&mut conn, requested).await
}

/// Connection-level variant of [`filter_existing_ids`] for use in transactions
pub(crate) async fn existing_ids(
    conn: &mut sqlx::SqliteConnection,
    requested: &[CategoryId],
) -> Result<Vec<CategoryId>, AppError> {
    if requested.is_empty() {
        return Ok(Vec::new());
    }

    let known: Vec<i64> = sqlx::query_scalar("SELECT id FROM categories")
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| AppError::database("Failed to fetch category ids", e))?;

    let known: HashSet<i64> = known.into_iter().collect();

    Ok(requested
        .iter()
        .filter(|id| known.contains(&id.value()))
        .copied()
        .collect())
}

/// Adds a book/category link; linking the same pair twice is a no-op
pub(crate) async fn link_book(
    conn: &mut sqlx::SqliteConnection,
    book_id: BookId,
    category_id: CategoryId,
) -> Result<(), AppError> {
    sqlx::query("INSERT OR IGNORE INTO book_categories (book_id, category_id) VALUES (?, ?)")
        .bind(book_id.value())
        .bind(category_id.value())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database("Failed to link category", e))?;

    Ok(())
}

/// Removes a book/category link
pub(crate) async fn unlink_book(
    conn: &mut sqlx::SqliteConnection,
    book_id: BookId,
    category_id: CategoryId,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM book_categories WHERE book_id = ? AND category_id = ?")
        .bind(book_id.value())
        .bind(category_id.value())
        .execute(&mut *conn)
        .await
        .map_err(|e| AppError::database("Failed to unlink category", e))?;

    Ok(())
}

/// Converts a database row to a Category
pub(crate) fn row_to_category(row: sqlx::sqlite::SqliteRow) -> Result<Category, AppError> {
    use sqlx::Row;

    let id: i64 = row
        .try_get("id")
        .map_err(|e| AppError::database("Missing category id", e))?;

    Ok(Category {
        id: CategoryId::new(id),
        name: row
            .try_get("name")
            .map_err(|e| AppError::database("Missing category name", e))?,
        display_order: row
            .try_get("display_order")
            .map_err(|e| AppError::database("Missing display order", e))?,
    })
}
