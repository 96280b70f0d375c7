use std::path::{Path, PathBuf};
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_STEM: &str = "fieldworks-backend";

/// Holds the appender guards; dropping it flushes and stops the file writers.
pub struct Logger {
    pub log_dir: PathBuf,
    pub guards: Vec<WorkerGuard>,
}

impl Logger {
    /// Console plus daily-rolling text and JSON files under `LOG_DIR` (default `logs`).
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let log_dir = PathBuf::from(std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string()));
        let guards = Self::setup_logging(&log_dir)?;
        Ok(Logger { log_dir, guards })
    }

    pub fn setup_logging(log_dir: &Path) -> Result<Vec<WorkerGuard>, Box<dyn std::error::Error>> {
        let error_dir = log_dir.join("error");
        std::fs::create_dir_all(&error_dir)?;

        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,fieldworks_backend=debug"));
        let file_log_level = std::env::var("FILE_LOG_LEVEL").unwrap_or_else(|_| "info,fieldworks_backend=debug".to_string());
        let error_file_log_level = std::env::var("ERROR_FILE_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());

        let (general, general_guard) = non_blocking(rolling::daily(log_dir, format!("{}.log", LOG_FILE_STEM)));
        let (errors, error_guard) = non_blocking(rolling::daily(&error_dir, format!("{}-error.log", LOG_FILE_STEM)));
        let (general_json, json_guard) = non_blocking(rolling::daily(log_dir, format!("{}.json", LOG_FILE_STEM)));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(true)
                    .with_filter(console_filter),
            )
            .with(
                fmt::layer()
                    .with_writer(general)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(file_log_level.clone())),
            )
            .with(
                fmt::layer()
                    .with_writer(errors)
                    .with_ansi(false)
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_filter(EnvFilter::new(error_file_log_level)),
            )
            .with(
                // Structured copy for log shippers
                fmt::layer()
                    .json()
                    .with_writer(general_json)
                    .with_ansi(false)
                    .with_target(true)
                    .with_current_span(true)
                    .with_filter(EnvFilter::new(file_log_level)),
            )
            .try_init()?;

        Ok(vec![general_guard, error_guard, json_guard])
    }
}
