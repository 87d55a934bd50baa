//! Log sink initialisation for the bridge process.
//!
//! Logs go to `{log_dir}/extauth.log`, never to stdout: stdout carries the
//! protocol. When the log file cannot be opened the subscriber falls back to
//! stderr, which the chat server captures.
//!
//! The level is `debug` with `--debug` and `info` otherwise; `RUST_LOG`
//! overrides both.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

/// File name of the log inside the log directory.
pub const LOG_FILE_NAME: &str = "extauth.log";

/// Where log output ended up.
#[derive(Debug)]
pub enum LogSink {
    /// Appending to this file.
    File(PathBuf),
    /// The log file could not be opened; logging to stderr.
    Stderr(io::Error),
}

/// Errors encountered while configuring telemetry.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// Failed to parse the log filter expression.
    #[error("invalid log filter: {0}")]
    Filter(String),
    /// Failed to install the tracing subscriber.
    #[error("failed to install telemetry subscriber: {0}")]
    Subscriber(#[from] SetGlobalDefaultError),
}

/// Install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if `RUST_LOG` holds an invalid filter or a global
/// subscriber is already installed.
pub fn initialise(log_dir: &Path, debug: bool) -> Result<LogSink, TelemetryError> {
    let filter = build_filter(debug)?;

    let (writer, sink) = match open_log_file(log_dir) {
        Ok((file, path)) => (BoxMakeWriter::new(Mutex::new(file)), LogSink::File(path)),
        Err(e) => (BoxMakeWriter::new(io::stderr), LogSink::Stderr(e)),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_thread_ids(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(sink)
}

/// Level filter from `RUST_LOG`, falling back to the `--debug` choice.
fn build_filter(debug: bool) -> Result<EnvFilter, TelemetryError> {
    filter_from(std::env::var(EnvFilter::DEFAULT_ENV).ok(), debug)
}

fn filter_from(directives: Option<String>, debug: bool) -> Result<EnvFilter, TelemetryError> {
    match directives {
        Some(directives) if !directives.trim().is_empty() => {
            EnvFilter::try_new(directives).map_err(|e| TelemetryError::Filter(e.to_string()))
        }
        _ => Ok(EnvFilter::new(default_level(debug))),
    }
}

fn default_level(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Open `{log_dir}/extauth.log` for appending, creating the directory.
pub fn open_log_file(log_dir: &Path) -> io::Result<(File, PathBuf)> {
    fs::create_dir_all(log_dir)?;
    let path = log_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new().create(true).append(true).open(&path)?;
    Ok((file, path))
}
