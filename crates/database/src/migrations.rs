//! Embedded schema migrations
//!
//! Migration SQL ships inside the binary via `include_str!` and applied
//! versions are tracked in `schema_migrations`, so `run_migrations` is safe
//! to call on every startup.

use crate::DbPool;
use openshelf_core::AppError;

const MIGRATION_001: &str = include_str!("../migrations/001_initial_schema.sql");
const MIGRATION_002: &str = include_str!("../migrations/002_pdf_sources.sql");

/// Schema version the code expects
pub const CURRENT_VERSION: i64 = 2;

pub fn current_version() -> i64 {
    CURRENT_VERSION
}

/// Brings the schema up to [`CURRENT_VERSION`], skipping applied steps
pub async fn run_migrations(pool: &DbPool) -> Result<(), AppError> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL DEFAULT (strftime('%s', 'now') * 1000)
        )
        "#,
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::database("Failed to create migrations table", e))?;

    apply_step(pool, 1, MIGRATION_001).await?;
    apply_step(pool, 2, MIGRATION_002).await?;

    Ok(())
}

async fn apply_step(pool: &DbPool, version: i64, sql: &str) -> Result<(), AppError> {
    let already_applied: Option<i64> =
        sqlx::query_scalar("SELECT version FROM schema_migrations WHERE version = ?")
            .bind(version)
            .fetch_optional(pool)
            .await
            .map_err(|e| AppError::database("Failed to check migration status", e))?;
    if already_applied.is_some() {
        return Ok(());
    }

    sqlx::query(sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to run migration {}", version), e))?;

    sqlx::query("INSERT INTO schema_migrations (version) VALUES (?)")
        .bind(version)
        .execute(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to record migration {}", version), e))?;

    Ok(())
}

/// Runs SQLite's integrity check against the whole file
pub async fn verify_integrity(pool: &DbPool) -> Result<(), AppError> {
    let report: String = sqlx::query_scalar("PRAGMA integrity_check")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::database("Failed to check integrity", e))?;

    if report != "ok" {
        return Err(AppError::MigrationFailed {
            version: CURRENT_VERSION.to_string(),
            reason: format!("integrity check failed: {}", report),
        });
    }

    Ok(())
}

/// Asks SQLite to refresh its query-planner statistics
pub async fn optimize(pool: &DbPool) -> Result<(), AppError> {
    sqlx::query("PRAGMA optimize")
        .execute(pool)
        .await
        .map_err(|e| AppError::database("Failed to optimize database", e))?;

    Ok(())
}
