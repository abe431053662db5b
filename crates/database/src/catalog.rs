//! Read-only catalog queries
//!
//! Listing, search, and suggestion queries over persisted books. These stay
//! deliberately thin: plain filtered/ordered SQL with no orchestration on
//! top. Only public books are visible to the catalog surface; owner-scoped
//! queries return private books too.

use crate::queries::categories::{list_categories_by_display_order, row_to_category};
use crate::DbPool;
use chrono::NaiveDate;
use openshelf_core::{AppError, BookId, Category, CategoryId, UserId};
use serde::Serialize;
use std::collections::HashSet;

/// A book row as shown in catalog listings, without source or category data
#[derive(Debug, Clone, PartialEq)]
pub struct BookSummary {
    pub id: BookId,
    pub title: String,
    pub author: Option<String>,
    pub cover_path: Option<String>,
    pub published_date: NaiveDate,
    pub is_public: bool,
}

/// A typeahead suggestion, serialized as `{"id": .., "title": ..}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TitleSuggestion {
    pub id: BookId,
    pub title: String,
}

/// One home-page shelf: a category plus its newest public books
#[derive(Debug, Clone)]
pub struct CategorySection {
    pub category: Category,
    pub books: Vec<BookSummary>,
}

/// Lists all public books ordered by title
pub async fn list_public_books(pool: &DbPool) -> Result<Vec<BookSummary>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, author, cover_path, published_date, is_public
        FROM books
        WHERE is_public = 1
        ORDER BY title
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list public books", e))?;

    rows.into_iter().map(row_to_summary).collect()
}

/// Searches public books by title substring, ordered by title
///
/// A blank term returns no results rather than the whole catalog.
pub async fn search_books(pool: &DbPool, term: &str) -> Result<Vec<BookSummary>, AppError> {
    if term.trim().is_empty() {
        return Ok(Vec::new());
    }

    let pattern = format!("%{}%", escape_like(term));
    let rows = sqlx::query(
        r#"
        SELECT id, title, author, cover_path, published_date, is_public
        FROM books
        WHERE is_public = 1 AND title LIKE ? ESCAPE '\'
        ORDER BY title
        "#,
    )
    .bind(pattern)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to search books", e))?;

    rows.into_iter().map(row_to_summary).collect()
}

/// Suggests public book titles matching a prefix, capped at `limit`
pub async fn suggest_titles(
    pool: &DbPool,
    prefix: &str,
    limit: i64,
) -> Result<Vec<TitleSuggestion>, AppError> {
    if prefix.trim().is_empty() {
        return Ok(Vec::new());
    }

    let pattern = format!("{}%", escape_like(prefix));
    let rows = sqlx::query(
        r#"
        SELECT id, title
        FROM books
        WHERE is_public = 1 AND title LIKE ? ESCAPE '\'
        ORDER BY title
        LIMIT ?
        "#,
    )
    .bind(pattern)
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to suggest titles", e))?;

    rows.into_iter()
        .map(|row| {
            use sqlx::Row;
            let id: i64 = row
                .try_get("id")
                .map_err(|e| AppError::database("Missing book id", e))?;
            let title: String = row
                .try_get("title")
                .map_err(|e| AppError::database("Missing title", e))?;
            Ok(TitleSuggestion {
                id: BookId::new(id),
                title,
            })
        })
        .collect()
}

/// Lists a user's newest uploads first, capped at `limit`
///
/// Private books are included; this is an owner-facing view.
pub async fn list_books_by_owner_recent(
    pool: &DbPool,
    owner: &UserId,
    limit: i64,
) -> Result<Vec<BookSummary>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, author, cover_path, published_date, is_public
        FROM books
        WHERE owner_user_id = ?
        ORDER BY id DESC
        LIMIT ?
        "#,
    )
    .bind(owner.as_str())
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list owner books", e))?;

    rows.into_iter().map(row_to_summary).collect()
}

/// Lists all of a user's books, newest publication first
pub async fn list_books_by_owner(
    pool: &DbPool,
    owner: &UserId,
) -> Result<Vec<BookSummary>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT id, title, author, cover_path, published_date, is_public
        FROM books
        WHERE owner_user_id = ?
        ORDER BY published_date DESC
        "#,
    )
    .bind(owner.as_str())
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list owner books", e))?;

    rows.into_iter().map(row_to_summary).collect()
}

/// Lists categories that have at least one public book, ordered by name
///
/// Used for the home-page filter controls; empty categories would make
/// useless filter options.
pub async fn list_filterable_categories(pool: &DbPool) -> Result<Vec<Category>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT DISTINCT c.id, c.name, c.display_order
        FROM categories c
        INNER JOIN book_categories bc ON bc.category_id = c.id
        INNER JOIN books b ON b.id = bc.book_id
        WHERE b.is_public = 1
        ORDER BY c.name
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to list filterable categories", e))?;

    rows.into_iter().map(row_to_category).collect()
}

/// Builds the home-page shelves: categories in display order, each holding
/// its newest public books
///
/// `selected` narrows the shelves to the given category ids; `None` or an
/// empty list means all categories. Shelves with no public books are
/// dropped.
pub async fn home_sections(
    pool: &DbPool,
    selected: Option<&[CategoryId]>,
    books_per_category: i64,
) -> Result<Vec<CategorySection>, AppError> {
    let mut categories = list_categories_by_display_order(pool).await?;

    if let Some(selected) = selected {
        if !selected.is_empty() {
            let wanted: HashSet<CategoryId> = selected.iter().copied().collect();
            categories.retain(|c| wanted.contains(&c.id));
        }
    }

    let mut sections = Vec::new();
    for category in categories {
        let books = newest_public_in_category(pool, category.id, books_per_category).await?;
        if books.is_empty() {
            continue;
        }
        sections.push(CategorySection { category, books });
    }

    Ok(sections)
}

async fn newest_public_in_category(
    pool: &DbPool,
    category_id: CategoryId,
    limit: i64,
) -> Result<Vec<BookSummary>, AppError> {
    let rows = sqlx::query(
        r#"
        SELECT b.id, b.title, b.author, b.cover_path, b.published_date, b.is_public
        FROM books b
        INNER JOIN book_categories bc ON bc.book_id = b.id
        WHERE bc.category_id = ? AND b.is_public = 1
        ORDER BY b.id DESC
        LIMIT ?
        "#,
    )
    .bind(category_id.value())
    .bind(limit)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::database("Failed to fetch category books", e))?;

    rows.into_iter().map(row_to_summary).collect()
}

/// Escapes LIKE wildcards so user input matches literally
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn row_to_summary(row: sqlx::sqlite::SqliteRow) -> Result<BookSummary, AppError> {
    use sqlx::Row;

    let id: i64 = row
        .try_get("id")
        .map_err(|e| AppError::database("Missing book id", e))?;
    let is_public: i64 = row
        .try_get("is_public")
        .map_err(|e| AppError::database("Missing is_public", e))?;

    Ok(BookSummary {
        id: BookId::new(id),
        title: row
            .try_get("title")
            .map_err(|e| AppError::database("Missing title", e))?,
        author: row.try_get("author").unwrap_or(None),
        cover_path: row.try_get("cover_path").unwrap_or(None),
        published_date: row
            .try_get("published_date")
            .map_err(|e| AppError::database("Missing published date", e))?,
        is_public: is_public != 0,
    })
}
