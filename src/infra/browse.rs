use crate::domain::normalize_session_name;
use crate::infra::{AppConfig, MuxBackend, MuxError, expand_home};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowseError {
    #[error("no browse directories configured")]
    NoDirectories,

    #[error("failed to create temp file: {0}")]
    TempFile(#[source] io::Error),

    #[error("failed to run directory picker: {0}")]
    Spawn(#[source] io::Error),

    #[error("failed to read selection: {0}")]
    ReadSelection(#[source] io::Error),

    #[error("could not derive session name from {0}")]
    EmptyName(PathBuf),

    #[error("failed to create session: {0}")]
    Create(#[source] MuxError),

    #[error("failed to switch: {0}")]
    Switch(#[source] MuxError),
}

/// Shell pipeline listing candidate directories into fzf, with the pick
/// written to `output`.
pub fn build_browse_script(config: &AppConfig, output: &Path) -> Result<String, BrowseError> {
    if config.browse_dirs.is_empty() {
        return Err(BrowseError::NoDirectories);
    }

    let prune = if config.browse_exclude.is_empty() {
        String::new()
    } else {
        let names = config
            .browse_exclude
            .iter()
            .map(|pattern| format!("-name {}", shell_words::quote(pattern)))
            .collect::<Vec<_>>()
            .join(" -o ");
        format!("\\( {names} \\) -prune -o ")
    };

    let finds = config
        .browse_dirs
        .iter()
        .map(|dir| {
            let root = expand_home(&dir.path);
            format!(
                "find {} -mindepth 1 -maxdepth {} {prune}-type d -print",
                shell_words::quote(&root.to_string_lossy()),
                dir.depth.max(1),
            )
        })
        .collect::<Vec<_>>()
        .join("; ");

    Ok(format!(
        "{{ {finds}; }} 2>/dev/null | fzf --prompt='directory> ' > {}",
        shell_words::quote(&output.to_string_lossy())
    ))
}

/// Runs the picker on the current terminal. `Ok(None)` covers cancel, no
/// match and an empty selection.
pub fn run_browse(config: &AppConfig) -> Result<Option<PathBuf>, BrowseError> {
    let output = tempfile::Builder::new()
        .prefix("tswitch-fzf-")
        .tempfile()
        .map_err(BrowseError::TempFile)?;
    let script = build_browse_script(config, output.path())?;
    tracing::debug!(script = %script, "starting directory picker");

    let status = Command::new("sh")
        .arg("-c")
        .arg(&script)
        .status()
        .map_err(BrowseError::Spawn)?;
    if !status.success() {
        tracing::debug!(status = %status, "directory picker closed without selection");
        return Ok(None);
    }

    let selected = fs::read_to_string(output.path()).map_err(BrowseError::ReadSelection)?;
    Ok(parse_selection(&selected))
}

fn parse_selection(raw: &str) -> Option<PathBuf> {
    let selected = raw.trim();
    if selected.is_empty() {
        None
    } else {
        Some(PathBuf::from(selected))
    }
}

/// Creates the session named after `dir` (started there) unless it exists.
/// Returns the session name.
pub fn ensure_session_for_dir(backend: &dyn MuxBackend, dir: &Path) -> Result<String, BrowseError> {
    let name = normalize_session_name(dir);
    if name.is_empty() {
        return Err(BrowseError::EmptyName(dir.to_path_buf()));
    }

    if !backend.has_session(&name) {
        backend
            .new_session_in_dir(&name, &dir.to_string_lossy())
            .map_err(BrowseError::Create)?;
        tracing::info!(session = %name, dir = %dir.display(), "created session for directory");
    }
    Ok(name)
}

/// Switches to the session named after `dir`, creating it first when needed.
pub fn switch_or_create_session(backend: &dyn MuxBackend, dir: &Path) -> Result<String, BrowseError> {
    let name = ensure_session_for_dir(backend, dir)?;
    backend.switch_to_session(&name).map_err(BrowseError::Switch)?;
    Ok(name)
}
