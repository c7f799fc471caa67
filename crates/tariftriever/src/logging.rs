//! Logging setup for the binary

use anyhow::{Context, anyhow};
use std::path::{Path, PathBuf};
use tariftriever_common::{LogFormat, init_tracing};
use tariftriever_config::TelemetryConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

const LOG_FILE_PREFIX: &str = "tariftriever.log";

/// Keeps the non-blocking writers flushing; hold until exit
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

/// Install the global subscriber.
///
/// Without `log_dir` this logs to stderr only. With it, lines also go to a
/// daily rotated file, both through non-blocking writers.
///
/// # Errors
/// Returns an error if the log directory cannot be created
pub fn init(telemetry: &TelemetryConfig, log_dir: Option<&Path>) -> anyhow::Result<LogGuards> {
    let Some(log_dir) = log_dir else {
        init_tracing(telemetry.log_format, &telemetry.tracing_level);
        return Ok(LogGuards {
            _guards: Vec::new(),
        });
    };

    std::fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, LOG_FILE_PREFIX);
    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());
    let writer = file_writer.and(stderr_writer);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&telemetry.tracing_level));

    match telemetry.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(writer)
            .try_init(),
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_ansi(false)
            .with_env_filter(filter)
            .with_writer(writer)
            .try_init(),
    }
    .map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))?;

    Ok(LogGuards {
        _guards: vec![file_guard, stderr_guard],
    })
}

/// Platform log directory used by `serve` when none is configured
pub fn default_log_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        if let Some(home) = dirs::home_dir() {
            return home.join("Library").join("Logs").join("tariftriever");
        }
    }

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    {
        let system_log_dir = Path::new("/var/log/tariftriever");
        if system_log_dir.exists() && is_writable(system_log_dir) {
            return system_log_dir.to_path_buf();
        }
    }

    // Windows resolves to %LOCALAPPDATA%, Linux to ~/.local/share
    dirs::data_local_dir()
        .map(|dir| dir.join("tariftriever").join("logs"))
        .or_else(|| dirs::home_dir().map(|home| home.join(".tariftriever").join("logs")))
        .unwrap_or_else(|| PathBuf::from("logs"))
}

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
fn is_writable(path: &Path) -> bool {
    tempfile::tempfile_in(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_dir_is_namespaced() {
        let dir = default_log_dir();
        assert!(dir.to_string_lossy().contains("tariftriever") || dir == Path::new("logs"));
    }
}
