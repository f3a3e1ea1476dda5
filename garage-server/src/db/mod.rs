//! Database Module
//!
//! Handles SQLite connection pool, migrations and transaction helpers

pub mod repository;

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::db::repository::RepoError;
use crate::utils::{AppError, AppResult};

/// Database service owning a SQLite connection pool
#[derive(Clone)]
pub struct DbService {
    pub pool: SqlitePool,
}

impl DbService {
    /// Open (or create) the database at `url` with WAL mode and apply migrations
    pub async fn new(url: &str) -> Result<Self, AppError> {
        if url.contains(":memory:") {
            return Self::in_memory().await;
        }

        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::database(format!("Invalid database url: {e}")))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true)
            .busy_timeout(std::time::Duration::from_millis(5000))
            .optimize_on_close(true, None);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        tracing::info!("Database connection established (SQLite WAL, busy_timeout=5000ms)");

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    /// Private in-memory database (single connection so every query sees the same data)
    pub async fn in_memory() -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| AppError::database(format!("Invalid database url: {e}")))?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;

        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<(), AppError> {
        sqlx::migrate!("./migrations")
            .run(pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply migrations: {e}")))?;
        tracing::debug!("Database migrations applied");
        Ok(())
    }
}

/// Statement opening every write transaction. The write lock is taken up
/// front, so a competing writer waits on `busy_timeout` instead of failing
/// with SQLITE_BUSY when it upgrades a stale read snapshot.
pub const BEGIN_WRITE: &str = "BEGIN IMMEDIATE";

/// Start a write transaction
pub async fn begin(pool: &SqlitePool) -> AppResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with(BEGIN_WRITE).await.map_err(RepoError::from)?)
}

/// Commit a write transaction
pub async fn commit(tx: Transaction<'static, Sqlite>) -> AppResult<()> {
    tx.commit().await.map_err(RepoError::from)?;
    Ok(())
}

/// Next number of a document sequence (`job`, `invoice`), starting at 1
pub async fn next_sequence(
    conn: &mut sqlx::SqliteConnection,
    name: &str,
) -> AppResult<i64> {
    let value = sqlx::query_scalar::<_, i64>(
        "INSERT INTO doc_sequence (name, value) VALUES (?1, 1) ON CONFLICT(name) DO UPDATE SET value = value + 1 RETURNING value",
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await
    .map_err(RepoError::from)?;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequences_count_independently() {
        let db = DbService::in_memory().await.unwrap();
        let mut conn = db.pool.acquire().await.unwrap();
        assert_eq!(next_sequence(&mut conn, "job").await.unwrap(), 1);
        assert_eq!(next_sequence(&mut conn, "job").await.unwrap(), 2);
        assert_eq!(next_sequence(&mut conn, "invoice").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn file_database_is_created_with_schema() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}/garage.db", dir.path().display());
        let db = DbService::new(&url).await.unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM customer")
            .fetch_one(&db.pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
