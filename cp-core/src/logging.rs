//! Logging setup for the CloudPlugs binaries.
//!
//! Library crates only emit `tracing` events; the subscriber is installed
//! once by the binary. Credentials are never recorded in an event.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::CpResult;

/// File name prefix of the daily-rotated log.
pub const LOG_FILE_PREFIX: &str = "cloudplugs.log";

/// Keeps the background log writer alive. Dropping it flushes the file.
pub struct LogGuard {
    _worker: WorkerGuard,
}

/// `RUST_LOG` takes precedence over the configured level; an unparsable
/// level falls back to `info`.
fn build_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber: compact events on stderr plus a daily
/// rotated file in `log_dir`, written as JSON lines when `json_output` is set.
///
/// A subscriber installed earlier (tests, embedding applications) is left in
/// place.
pub fn init_logging(level: &str, log_dir: &Path, json_output: bool) -> CpResult<LogGuard> {
    std::fs::create_dir_all(log_dir)?;

    let (writer, worker) = tracing_appender::non_blocking(rolling::daily(log_dir, LOG_FILE_PREFIX));

    let json_file = json_output.then(|| {
        fmt::layer()
            .json()
            .with_writer(writer.clone())
            .with_file(true)
            .with_line_number(true)
    });
    let text_file = (!json_output).then(|| {
        fmt::layer()
            .with_writer(writer.clone())
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
    });

    let installed = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(json_file)
        .with(text_file)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(level, dir = %log_dir.display(), json_output, "logging initialized");
    }

    Ok(LogGuard { _worker: worker })
}

/// Console-only logging for tests and one-off tools.
pub fn init_console_logging(level: &str) {
    let _ = tracing_subscriber::registry()
        .with(build_filter(level))
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
