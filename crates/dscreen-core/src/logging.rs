//! Logging configuration using tracing
//!
//! `dscreen` writes NDJSON events to stdout and the `--once` table to
//! stderr, so logs only ever go to a file.

use std::path::PathBuf;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::Result;

/// Environment variable holding an `EnvFilter` directive
pub const LOG_ENV: &str = "DSCREEN_LOG";

/// Filter used when `DSCREEN_LOG` is unset or invalid: registry and runner
/// at info, adb discovery and dependencies at warn
pub const DEFAULT_FILTER: &str = "droid_screen=info,dscreen_app=info,warn";

const LOG_FILE_PREFIX: &str = "dscreen.log";

/// Initialize the logging subsystem
///
/// Logs roll daily under `<data_local_dir>/droid-screen/logs/`. Thread ids
/// are included because registry mutations arrive from the monitor's
/// blocking tasks as well as the runtime.
///
/// # Examples
/// ```bash
/// DSCREEN_LOG=debug cargo run
/// DSCREEN_LOG=dscreen_app=trace cargo run
/// ```
pub fn init() -> Result<()> {
    let log_dir = get_log_directory()?;
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, &log_dir, LOG_FILE_PREFIX);

    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
                .with_timer(fmt::time::ChronoLocal::new(
                    "%Y-%m-%d %H:%M:%S%.3f".to_string(),
                )),
        )
        .init();

    tracing::info!("═══════════════════════════════════════════════════════");
    tracing::info!("droid-screen starting");
    tracing::info!("Log directory: {}", log_dir.display());
    tracing::info!("═══════════════════════════════════════════════════════");

    Ok(())
}

/// Get the log directory path
fn get_log_directory() -> Result<PathBuf> {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Ok(base.join("droid-screen").join("logs"))
}
