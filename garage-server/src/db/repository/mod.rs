//! Repository Module
//!
//! CRUD operations over the SQLite tables. Single-statement lookups accept any
//! executor so they work both on the pool and inside a transaction.

// CRM
pub mod customer;
pub mod inquiry;
pub mod technician;
pub mod vehicle;

// Workshop
pub mod appointment;
pub mod inventory;
pub mod job;

// Billing
pub mod invoice;

// Messaging
pub mod notification;
pub mod template;

// Reporting
pub mod dashboard;

use shared::error::ErrorCode;
use thiserror::Error;

use crate::utils::AppError;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                RepoError::Validation(db.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Database(msg) => {
                tracing::error!(target: "database", error = %msg, "Database error occurred");
                AppError::new(ErrorCode::DatabaseError)
            }
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

#[cfg(test)]
pub(crate) mod testing {
    //! Fixtures shared by repository and service tests

    use shared::models::{Customer, CustomerCreate, VehicleCreate};
    use sqlx::SqlitePool;

    use crate::db::DbService;

    pub async fn test_pool() -> SqlitePool {
        DbService::in_memory().await.unwrap().pool
    }

    /// WAL file database with a multi-connection pool; keep the dir alive
    pub async fn file_pool() -> (tempfile::TempDir, SqlitePool) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite:{}/garage.db", dir.path().display());
        let pool = DbService::new(&url).await.unwrap().pool;
        (dir, pool)
    }

    pub async fn seed_customer(pool: &SqlitePool, phone: &str) -> Customer {
        super::customer::create(
            pool,
            CustomerCreate {
                name: "Ravi Kumar".into(),
                phone: phone.into(),
                email: None,
                address: None,
                notes: None,
                vehicles: vec![VehicleCreate {
                    make: "Hyundai".into(),
                    model: "Creta".into(),
                    plate_number: Some("KA05MN2020".into()),
                    ..Default::default()
                }],
            },
        )
        .await
        .unwrap()
    }
}
