//! File logging for optimization runs.
//!
//! Events from this crate go to a single non-blocking log file; stdout stays
//! reserved for the palette document. Debug builds also record the close of
//! each instrumented span with its busy and idle time.

use std::ffi::OsStr;
use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

pub const DEFAULT_LOG_FILE: &str = "cvd-palette.log";

/// Filter directive passing this crate's events at `level` and above.
pub fn crate_directive(level: Level) -> String {
    format!(
        "{}={}",
        env!("CARGO_CRATE_NAME"),
        level.as_str().to_ascii_lowercase()
    )
}

/// Install the global subscriber writing to `log_path` (or [`DEFAULT_LOG_FILE`]).
///
/// The returned guard flushes buffered lines when dropped, so hold it until
/// the program exits.
pub fn init_logging(log_path: Option<&Path>, level: Level) -> WorkerGuard {
    let log_path = log_path.unwrap_or(Path::new(DEFAULT_LOG_FILE));
    let dir = match log_path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let file_name = log_path
        .file_name()
        .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE));

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file_name));

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true);

    #[cfg(debug_assertions)]
    let layer = layer.with_span_events(fmt::format::FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(EnvFilter::new(crate_directive(level)))
        .with(layer)
        .init();

    guard
}
