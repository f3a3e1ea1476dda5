//! Logging Infrastructure
//!
//! Console logging filtered by `RUST_LOG`, with optional daily rolling files.
//! Production emits one JSON object per line for log shippers.

use std::path::Path;

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset
fn default_filter(level: &str) -> String {
    format!("garage_server={level},tower_http={level},http_access={level}")
}

/// Initialize the logger
///
/// `RUST_LOG` wins when set; otherwise `garage_server` and `tower_http` log at
/// `log_level` (default `info`). When `log_dir` exists, output goes to
/// `{log_dir}/garage-server.YYYY-MM-DD` instead of stdout. `json` switches
/// the line format to structured JSON.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>, json: bool) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter(level).into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false);

    let file_appender = log_dir.and_then(|dir| {
        let log_path = Path::new(dir);
        if log_path.exists() || std::fs::create_dir_all(log_path).is_ok() {
            log_path
                .to_str()
                .map(|dir_str| tracing_appender::rolling::daily(dir_str, "garage-server"))
        } else {
            None
        }
    });

    match (json, file_appender) {
        (true, Some(appender)) => builder.json().with_writer(appender).init(),
        (true, None) => builder.json().init(),
        (false, Some(appender)) => builder
            .with_target(false)
            .with_ansi(false)
            .with_writer(appender)
            .init(),
        (false, None) => builder.with_target(false).init(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_covers_access_log() {
        let filter = default_filter("debug");
        assert!(filter.contains("garage_server=debug"));
        assert!(filter.contains("http_access=debug"));
    }
}
