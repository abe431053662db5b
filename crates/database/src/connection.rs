//! SQLite pool setup

use openshelf_core::AppError;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Pool, Sqlite};
use std::path::Path;

/// Database connection pool
pub type DbPool = Pool<Sqlite>;

/// Connection settings, normally taken from the application config
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Path to the SQLite database file
    pub path: String,
    /// Maximum number of pooled connections
    pub max_connections: u32,
    /// Write-Ahead Logging for concurrent readers
    pub enable_wal: bool,
    /// Create the database file on first connect
    pub create_if_missing: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "openshelf.db".to_string(),
            max_connections: 10,
            enable_wal: true,
            create_if_missing: true,
        }
    }
}

impl DatabaseConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }
}

/// Opens a connection pool against the configured database file
///
/// Foreign keys are switched on per connection, not per pool; the
/// owner-set-null and join-row cascade rules depend on it.
pub async fn connect(config: DatabaseConfig) -> Result<DbPool, AppError> {
    let mut options = SqliteConnectOptions::new()
        .filename(&config.path)
        .create_if_missing(config.create_if_missing)
        .foreign_keys(true);

    if config.enable_wal {
        options = options
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect_with(options)
        .await
        .map_err(|e| AppError::database("Failed to connect to database", e))?;

    Ok(pool)
}

/// Opens an in-memory database for tests
///
/// Capped at one connection: each in-memory connection is its own
/// database, so a larger pool would scatter the tables.
#[cfg(test)]
pub async fn create_test_db() -> Result<DbPool, AppError> {
    let options = SqliteConnectOptions::new()
        .filename(":memory:")
        .journal_mode(SqliteJournalMode::Memory)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| AppError::database("Failed to connect to test database", e))
}

/// Closes the pool, waiting for in-flight queries
pub async fn close(pool: DbPool) {
    pool.close().await;
}

/// Whether a database file already exists at `path`
pub fn database_exists(path: impl AsRef<Path>) -> bool {
    path.as_ref().exists()
}
