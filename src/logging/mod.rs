//! Application logging functionality
//!
//! Installs the tracing subscriber: stderr always, plus a dated log file
//! under ~/.config/siggen/logs/ when requested.

use crate::core::config::ConfigFile;
use anyhow::Context;
use std::fs;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Get the path to the logs directory
pub fn logs_dir() -> PathBuf {
    ConfigFile::config_dir().join("logs")
}

/// Log file name for a given day
pub fn log_file_name(date: chrono::NaiveDate) -> String {
    format!("siggen-{}.log", date.format("%Y-%m-%d"))
}

/// Get the path to the current log file
pub fn current_log_file() -> PathBuf {
    logs_dir().join(log_file_name(chrono::Local::now().date_naive()))
}

/// Initialize the logs directory
pub fn initialize_logs_directory() -> anyhow::Result<()> {
    let logs_dir = logs_dir();
    fs::create_dir_all(&logs_dir)?;
    Ok(())
}

/// Filter used when `RUST_LOG` is not set
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` overrides `verbosity`. With `log_to_file` set, events are also
/// appended to [`current_log_file`] and the returned guard must be held until
/// exit so buffered lines get flushed. If the file cannot be created the
/// problem is reported and logging continues on stderr only.
pub fn init(verbosity: u8, log_to_file: bool) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let (file_layer, guard) = if log_to_file {
        match file_appender() {
            Ok(appender) => {
                let (writer, guard) = tracing_appender::non_blocking(appender);
                eprintln!("Logging to {}", current_log_file().display());
                (
                    Some(fmt::layer().with_ansi(false).with_writer(writer)),
                    Some(guard),
                )
            }
            Err(e) => {
                eprintln!("Failed to open log file: {e:#}");
                (None, None)
            }
        }
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("Failed to install the log subscriber")?;

    Ok(guard)
}

fn file_appender() -> anyhow::Result<RollingFileAppender> {
    initialize_logs_directory().context("Failed to create the logs directory")?;
    let file_name = log_file_name(chrono::Local::now().date_naive());
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(logs_dir())
        .context("Failed to create the log file")
}
