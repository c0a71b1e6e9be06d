//! Logging initialization for recipe-wizard.
//!
//! Logs go to stderr unless `logging.to_file` is set, in which case they are
//! written to `{logging.dir}/recipe-wizard-{datetime}.log`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Result of logging initialization
pub struct LoggingHandle {
    /// Flushes buffered file logs when dropped; keep it alive until exit
    pub _guard: Option<WorkerGuard>,

    /// Path to the log file, when logging to a file
    pub log_file_path: Option<PathBuf>,
}

/// Filter directive: `RUST_LOG` wins, then `--debug`, then the configured level
fn filter_directive(config: &Config, debug_override: bool) -> String {
    if let Ok(from_env) = std::env::var("RUST_LOG") {
        return from_env;
    }
    if debug_override {
        "debug".to_string()
    } else {
        config.logging.level.clone()
    }
}

fn log_file_name() -> String {
    let timestamp = chrono::Utc::now().format("%Y%m%dT%H%M%SZ");
    format!("recipe-wizard-{}.log", timestamp)
}

fn log_file_path(logs_dir: &Path, file_name: &str) -> PathBuf {
    logs_dir.join(file_name)
}

/// Install the global subscriber.
///
/// The returned `LoggingHandle` must be kept alive for the duration of the program.
pub fn init_logging(config: &Config, debug_override: bool) -> Result<LoggingHandle> {
    let filter = EnvFilter::new(filter_directive(config, debug_override));

    if config.logging.to_file {
        let logs_dir = config.logs_path();
        std::fs::create_dir_all(&logs_dir)
            .with_context(|| format!("Failed to create log directory {}", logs_dir.display()))?;

        let file_name = log_file_name();
        let path = log_file_path(&logs_dir, &file_name);

        let file_appender = tracing_appender::rolling::never(&logs_dir, &file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(non_blocking),
            )
            .init();

        Ok(LoggingHandle {
            _guard: Some(guard),
            log_file_path: Some(path),
        })
    } else {
        // stdout is reserved for command output
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();

        Ok(LoggingHandle {
            _guard: None,
            log_file_path: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_config(temp_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.logging.dir = temp_dir.path().join("logs").to_string_lossy().to_string();
        config
    }

    #[test]
    fn test_logs_path_under_configured_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let logs_dir = config.logs_path();
        assert!(logs_dir.ends_with("logs"));
        assert!(logs_dir.starts_with(temp_dir.path()));
    }

    #[test]
    fn test_log_file_name_format() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(&temp_dir);

        let path = log_file_path(&config.logs_path(), &log_file_name());
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("recipe-wizard-"));
        assert!(name.ends_with(".log"));
    }

    #[test]
    fn test_debug_flag_overrides_configured_level() {
        // A global subscriber can only be installed once per process, so only
        // the directive selection is exercised here
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let mut config = Config::default();
        config.logging.level = "warn".to_string();
        assert_eq!(filter_directive(&config, false), "warn");
        assert_eq!(filter_directive(&config, true), "debug");
    }
}
