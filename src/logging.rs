use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable holding the log filter, e.g. `matrix_recall=debug`
pub const LOG_ENV: &str = "MATRIX_RECALL_LOG";
const LOG_FILE_PREFIX: &str = "matrix-recall.log";

/// Install a file-backed subscriber. The terminal belongs to the UI, so
/// nothing is ever logged to stdout or stderr.
///
/// Keep the returned guard alive for the life of the program; dropping it
/// flushes and stops the writer thread.
pub fn init(dir: &Path) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(dir)?;

    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    // a second init (tests, embedding) keeps the first subscriber
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .try_init();

    Ok(guard)
}
