use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const APP_CONFIG_FILE: &str = "config.json";

#[derive(Debug, Error)]
pub enum LoadAppConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct BrowseDir {
    pub path: String,
    #[serde(default)]
    pub depth: i32,
}

/// User settings that are read at startup and never written back.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub keys: BTreeMap<String, String>,
    #[serde(default)]
    pub browse_dirs: Vec<BrowseDir>,
    #[serde(default)]
    pub browse_exclude: Vec<String>,
}

/// Candidate locations in lookup order: next to the executable, then the
/// state dir.
pub fn app_config_candidates(state_dir: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(exe_dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        candidates.push(exe_dir.join(APP_CONFIG_FILE));
    }
    candidates.push(state_dir.join(APP_CONFIG_FILE));
    candidates
}

/// First readable config among `candidates`. A missing file moves on to the
/// next candidate; an unreadable or malformed one is reported.
pub fn load_app_config_from(candidates: &[PathBuf]) -> Result<AppConfig, LoadAppConfigError> {
    for path in candidates {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => continue,
            Err(source) => {
                return Err(LoadAppConfigError::Read {
                    path: path.clone(),
                    source,
                });
            }
        };
        let config = serde_json::from_str(&raw).map_err(|source| LoadAppConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        tracing::info!(path = %path.display(), "loaded app config");
        return Ok(config);
    }
    Ok(AppConfig::default())
}

/// Loads the app config, falling back to defaults with a logged warning.
pub fn load_app_config(state_dir: &Path) -> AppConfig {
    match load_app_config_from(&app_config_candidates(state_dir)) {
        Ok(config) => config,
        Err(error) => {
            tracing::warn!(error = %error, "using default app config");
            AppConfig::default()
        }
    }
}
