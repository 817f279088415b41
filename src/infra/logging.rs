use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum InitLoggingError {
    #[error("failed to open log file {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

pub fn log_file_path(state_dir: &Path) -> PathBuf {
    state_dir.join("tswitch.log")
}

/// Sends `tracing` output to `<state_dir>/tswitch.log`. The terminal belongs
/// to the TUI, so nothing is ever written to stderr.
pub fn init_file_logging(state_dir: &Path) -> Result<PathBuf, InitLoggingError> {
    let path = log_file_path(state_dir);
    let open = |path: &Path| -> io::Result<std::fs::File> {
        std::fs::create_dir_all(state_dir)?;
        OpenOptions::new().create(true).append(true).open(path)
    };
    let log_file = open(&path).map_err(|source| InitLoggingError::Open {
        path: path.clone(),
        source,
    })?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(log_file))
        .try_init()
        .map_err(|error| InitLoggingError::Install(error.to_string()))?;
    Ok(path)
}
