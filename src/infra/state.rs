use crate::domain::{MarkRegistry, MarkTarget, OrderState, PreviewMode, SavedState, Settings, WindowRef};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

const STATE_FILE_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum LoadStateError {
    #[error("failed to read state: {0}")]
    Read(#[from] io::Error),

    #[error("failed to parse state: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum SaveStateError {
    #[error("failed to encode state: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write state: {0}")]
    Write(#[from] io::Error),
}

/// Where marks, order and settings are written after each change.
pub trait StateStore {
    fn save(&self, state: &SavedState) -> Result<(), SaveStateError>;
}

#[derive(Clone, Debug)]
pub struct FileStateStore {
    dir: PathBuf,
}

impl FileStateStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self) -> PathBuf {
        state_path(&self.dir)
    }

    pub fn load(&self) -> Result<SavedState, LoadStateError> {
        load_state(&self.dir)
    }
}

impl StateStore for FileStateStore {
    fn save(&self, state: &SavedState) -> Result<(), SaveStateError> {
        save_state(&self.dir, state)
    }
}

fn state_path(state_dir: &Path) -> PathBuf {
    state_dir.join("state.json")
}

pub fn load_state(state_dir: &Path) -> Result<SavedState, LoadStateError> {
    let path = state_path(state_dir);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Ok(SavedState::default());
        }
        Err(error) => return Err(error.into()),
    };

    let file: StateFile = serde_json::from_str(&raw)?;
    Ok(file.into_state())
}

pub fn save_state(state_dir: &Path, state: &SavedState) -> Result<(), SaveStateError> {
    fs::create_dir_all(state_dir)?;

    let path = state_path(state_dir);
    let tmp = path.with_extension("json.tmp");
    let text = serde_json::to_string_pretty(&StateFile::from_state(state))?;
    fs::write(&tmp, text)?;
    fs::rename(tmp, path)?;
    tracing::debug!(marks = state.marks.len(), "state saved");
    Ok(())
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct StateFile {
    #[serde(default = "default_version")]
    version: u32,
    #[serde(default)]
    marks: BTreeMap<String, MarkEntry>,
    #[serde(default)]
    session_order: Vec<String>,
    #[serde(default)]
    window_order: BTreeMap<String, Vec<u32>>,
    #[serde(default)]
    settings: SettingsEntry,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
struct MarkEntry {
    session: String,
    window: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct SettingsEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_preview: Option<String>,
}

fn default_version() -> u32 {
    STATE_FILE_VERSION
}

impl StateFile {
    fn from_state(state: &SavedState) -> Self {
        Self {
            version: STATE_FILE_VERSION,
            marks: state
                .marks
                .iter()
                .map(|(key, target)| {
                    (
                        key.clone(),
                        MarkEntry {
                            session: target.session.clone(),
                            window: target.window.to_raw(),
                        },
                    )
                })
                .collect(),
            session_order: state.order.session_order.clone(),
            window_order: state.order.window_order.clone(),
            settings: SettingsEntry {
                default_preview: Some(state.settings.default_preview.label().to_string()),
            },
        }
    }

    fn into_state(self) -> SavedState {
        let marks = MarkRegistry::from_entries(self.marks.into_iter().map(|(key, entry)| {
            (
                key,
                MarkTarget::new(entry.session, WindowRef::from_raw(entry.window)),
            )
        }));
        let default_preview = self
            .settings
            .default_preview
            .as_deref()
            .and_then(PreviewMode::parse)
            .unwrap_or(Settings::default().default_preview);
        SavedState {
            marks,
            order: OrderState {
                session_order: self.session_order,
                window_order: self.window_order,
            },
            settings: Settings { default_preview },
        }
    }
}
