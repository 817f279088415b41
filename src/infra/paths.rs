use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveStateDirError {
    #[error("could not determine home directory")]
    HomeDirNotFound,
}

/// `$TSWITCH_HOME` when set, otherwise `~/.tswitch`.
pub fn resolve_state_dir() -> Result<PathBuf, ResolveStateDirError> {
    if let Some(dir) = std::env::var_os("TSWITCH_HOME").filter(|value| !value.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    let Some(home) = dirs::home_dir() else {
        return Err(ResolveStateDirError::HomeDirNotFound);
    };
    Ok(home.join(".tswitch"))
}

/// Expands a leading `~/` against the home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}
