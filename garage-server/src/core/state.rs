use sqlx::SqlitePool;

use crate::core::Config;
use crate::db::DbService;
use crate::utils::AppResult;

/// Handler state, cloned into every request
///
/// | Field | Meaning |
/// |-------|---------|
/// | config | immutable configuration |
/// | pool | SQLite connection pool |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
}

impl ServerState {
    pub fn new(config: Config, pool: SqlitePool) -> Self {
        Self { config, pool }
    }

    /// Open the database (creating the work dir if needed) and apply migrations
    pub async fn initialize(config: &Config) -> AppResult<Self> {
        if config.database_url.starts_with("sqlite:")
            && !config.database_url.contains(":memory:")
        {
            std::fs::create_dir_all(&config.work_dir).map_err(|e| {
                crate::utils::AppError::internal(format!(
                    "Failed to create work dir {}: {e}",
                    config.work_dir
                ))
            })?;
        }
        let db = DbService::new(&config.database_url).await?;
        Ok(Self::new(config.clone(), db.pool))
    }
}
