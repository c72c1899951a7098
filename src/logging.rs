//! Session logging: tracing events written to a file appender.
//!
//! Stdout carries the session report, so logs only go to a file and only when
//! one is configured.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::LoggingConfig;

/// Overrides the configured level when set, e.g. `starchart_customizer=trace`.
pub const LOG_ENV: &str = "STARCHART_LOG";

/// Install the subscriber if `config` names a log file.
///
/// The returned guard must be held until exit; dropping it flushes the writer.
/// Span enter/close events are recorded in debug builds only.
pub fn init_logging(config: &LoggingConfig) -> Option<WorkerGuard> {
    let path = config.file.as_deref()?;
    let (dir, file_name) = split_path(path)?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        dir, file_name,
    ));

    let level = config.level.as_deref().unwrap_or("info");
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(format!("starchart_customizer={level}")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false);

    #[cfg(debug_assertions)]
    let layer = layer.with_span_events(fmt::format::FmtSpan::ENTER | fmt::format::FmtSpan::CLOSE);

    // A second init in the same process keeps the first subscriber.
    if tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()
        .is_err()
    {
        return None;
    }

    tracing::debug!(path = %path.display(), level, "logging initialized");
    Some(guard)
}

fn split_path(path: &Path) -> Option<(&Path, &std::ffi::OsStr)> {
    let file_name = path.file_name()?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    Some((dir, file_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_file_means_no_subscriber() {
        assert!(init_logging(&LoggingConfig::default()).is_none());
    }

    #[test]
    fn bare_file_name_logs_to_current_dir() {
        let (dir, name) = split_path(Path::new("session.log")).unwrap();
        assert_eq!(dir, Path::new("."));
        assert_eq!(name, "session.log");
        assert!(split_path(Path::new("/")).is_none());
    }
}
