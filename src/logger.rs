use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "teller-totals";

/// Set up the run log: a daily-rotated file appender keeping `max_log_files`
/// rotations, plus console output on stderr. Best-effort: on any failure the
/// run proceeds without the file log, and logging never aborts an import.
///
/// The returned guard flushes the non-blocking writer; hold it for the life
/// of the process.
pub fn init_logging(log_dir: &Path, max_log_files: usize) -> Option<WorkerGuard> {
    if std::fs::create_dir_all(log_dir).is_err() {
        return None;
    }
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix("log")
        .max_log_files(max_log_files)
        .build(log_dir)
        .ok()?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let file_layer = fmt::layer()
        .with_writer(writer)
        .with_target(false)
        .with_ansi(false);
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .ok()?;
    Some(guard)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_writes_rotated_file() {
        let dir = tempfile::tempdir().unwrap();
        let guard = init_logging(dir.path(), 90);
        assert!(guard.is_some());
        tracing::info!("import run started");
        drop(guard); // flush

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert!(
            names.iter().any(|n| n.starts_with(LOG_FILE_PREFIX)),
            "no log file in {names:?}"
        );
    }
}
