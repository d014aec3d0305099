//! Logging configuration using tracing

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable controlling the log filter
pub const LOG_ENV_VAR: &str = "SCRMIRROR_LOG";

/// Filter used when `SCRMIRROR_LOG` is unset: info for the workspace crates
/// (`scrmirror_*` and the `screen_mirror` driver), warn for dependencies
pub const DEFAULT_FILTER: &str = "scrmirror=info,screen_mirror=info,warn";

/// Initialize the logging subsystem
///
/// Logs are written to `~/.local/share/screen-mirror/logs/` so that stdout
/// stays reserved for NDJSON output. Log level is controlled by the
/// `SCRMIRROR_LOG` environment variable.
///
/// # Examples
/// ```bash
/// SCRMIRROR_LOG=debug scrmirror session.ndjson
/// SCRMIRROR_LOG=scrmirror_app=trace scrmirror session.ndjson
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, "scrmirror.log");

    let env_filter =
        EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("Screen mirror starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("screen-mirror").join("logs"))
}
