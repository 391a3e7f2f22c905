//! File logging for the CLI
//!
//! stdout carries the tree outline or JSON, so diagnostics go to a daily
//! rolling file instead of the terminal.

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable holding the log filter directive
pub const LOG_FILTER_ENV: &str = "TSCOPE_LOG";

/// Environment variable overriding the log directory
pub const LOG_DIR_ENV: &str = "TSCOPE_LOG_DIR";

const LOG_FILE_PREFIX: &str = "tscope.log";
const DEFAULT_FILTER: &str = "target_scope=info,tscope=info,warn";

/// Install the global subscriber and return the directory logs go to.
///
/// Logs land in `<data_local_dir>/target-scope/logs/` unless `TSCOPE_LOG_DIR`
/// is set.
///
/// # Examples
/// ```bash
/// TSCOPE_LOG=debug tscope --connect 127.0.0.1:27042
/// TSCOPE_LOG=tscope_driver=trace TSCOPE_LOG_DIR=/tmp/tscope tscope
/// ```
pub fn init() -> Result<PathBuf> {
    let log_dir = log_directory(std::env::var_os(LOG_DIR_ENV).map(PathBuf::from));
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);

    let env_filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        log_dir = %log_dir.display(),
        "target-scope starting"
    );

    Ok(log_dir)
}

/// Resolve the log directory, preferring an explicit override.
pub fn log_directory(override_dir: Option<PathBuf>) -> PathBuf {
    override_dir.unwrap_or_else(|| {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("target-scope")
            .join("logs")
    })
}
