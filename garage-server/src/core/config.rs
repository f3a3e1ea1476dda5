/// Server configuration
///
/// # Environment variables
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | WORK_DIR | ./data | directory for the database and logs |
/// | DATABASE_URL | sqlite:{WORK_DIR}/garage.db | database location override |
/// | HTTP_PORT | 5000 | HTTP port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | fallback level when RUST_LOG is unset |
/// | LOG_DIR | (unset) | enables daily rolling log files |
/// | REQUEST_TIMEOUT_MS | 30000 | per-request timeout |
/// | LOW_STOCK_DEFAULT | 5 | reorder level for new inventory items |
///
/// ```ignore
/// WORK_DIR=/srv/garage HTTP_PORT=8080 cargo run -p garage-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory (database, logs)
    pub work_dir: String,
    /// SQLite connection URL
    pub database_url: String,
    pub http_port: u16,
    /// development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_dir: Option<String>,
    pub request_timeout_ms: u64,
    /// Reorder level applied when an item is created without one
    pub low_stock_default: f64,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        let work_dir = std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into());
        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| format!("sqlite:{work_dir}/garage.db"));
        Self {
            database_url,
            http_port: std::env::var("HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
            request_timeout_ms: std::env::var("REQUEST_TIMEOUT_MS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(30000),
            low_stock_default: std::env::var("LOW_STOCK_DEFAULT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5.0),
            work_dir,
        }
    }

    /// Configuration backed by an in-memory database, used in tests
    pub fn in_memory() -> Self {
        Self {
            work_dir: ".".into(),
            database_url: "sqlite::memory:".into(),
            http_port: 0,
            environment: "test".into(),
            log_level: "info".into(),
            log_dir: None,
            request_timeout_ms: 30000,
            low_stock_default: 5.0,
        }
    }

    /// Production logs are JSON lines
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_production_switches_log_format() {
        let mut config = Config::in_memory();
        assert!(!config.is_production());
        config.environment = "production".into();
        assert!(config.is_production());
    }
}
