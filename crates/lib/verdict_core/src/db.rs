//! SQLite connection pool management.
//!
//! Provides pool construction for the server and a migrated in-memory pool
//! for tests.

use std::str::FromStr;
use std::time::Duration;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;
use tracing::info;

/// Maximum time to wait for a pooled connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors that can occur while opening the database.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQL error: {0}")]
    Sql(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

/// Result type for database operations.
pub type Result<T> = std::result::Result<T, DbError>;

/// Open (creating if missing) the database at `url` and apply migrations.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect_with(options)
        .await?;

    info!("running database migrations");
    crate::migrate::migrate(&pool).await?;
    Ok(pool)
}

/// A fresh, migrated, private in-memory database.
///
/// Pinned to a single connection that is never recycled, since every
/// SQLite `:memory:` connection is its own database.
pub async fn in_memory() -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;
    crate::migrate::migrate(&pool).await?;
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn in_memory_pool_has_schema() -> Result<()> {
        let pool = in_memory().await?;
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table'",
        )
        .fetch_all(&pool)
        .await?;
        for expected in ["decisions", "users", "workspace_members", "workspaces"] {
            assert!(tables.iter().any(|t| t == expected), "missing table {expected}");
        }
        Ok(())
    }

    #[tokio::test]
    async fn in_memory_pools_are_isolated() -> Result<()> {
        let a = in_memory().await?;
        let b = in_memory().await?;
        sqlx::query("INSERT INTO users (email, password_hash, created_at) VALUES ('x@example.com', 'h', 0)")
            .execute(&a)
            .await?;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&b)
            .await?;
        assert_eq!(count, 0);
        Ok(())
    }
}
