//! User database operations
//!
//! The users table is a minimal mirror of the external identity store, kept
//! so ownership foreign keys are enforceable. Deleting a user nulls the
//! `owner_user_id` of their books instead of deleting the books.

use crate::DbPool;
use openshelf_core::{AppError, User, UserId};

/// Inserts a user, or refreshes the display name of an existing one
pub async fn upsert_user(pool: &DbPool, user: &User) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO users (id, display_name) VALUES (?, ?)
        ON CONFLICT(id) DO UPDATE SET display_name = excluded.display_name
        "#,
    )
    .bind(user.id.as_str())
    .bind(&user.display_name)
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to upsert user", e))?;

    Ok(())
}

/// Gets a user by id
pub async fn get_user(pool: &DbPool, id: &UserId) -> Result<User, AppError> {
    use sqlx::Row;

    let row = sqlx::query("SELECT id, display_name FROM users WHERE id = ?")
        .bind(id.as_str())
        .fetch_optional(pool)
        .await
        .map_err(|e| AppError::database("Failed to fetch user", e))?
        .ok_or_else(|| AppError::not_found("User", id))?;

    let id: String = row
        .try_get("id")
        .map_err(|e| AppError::database("Missing user id", e))?;

    Ok(User {
        id: UserId::from(id),
        display_name: row.try_get("display_name").unwrap_or(None),
    })
}

/// Deletes a user; their books survive with a nulled owner
pub async fn delete_user(pool: &DbPool, id: &UserId) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id.as_str())
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to delete user", e))?;

    Ok(result.rows_affected() > 0)
}
