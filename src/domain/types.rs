use time::OffsetDateTime;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionRecord {
    pub name: String,
    pub window_count: u32,
    pub attached: bool,
    pub created: Option<OffsetDateTime>,
    pub last_active: Option<OffsetDateTime>,
    pub width: u16,
    pub height: u16,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WindowRecord {
    pub index: u32,
    pub name: String,
    pub pane_count: u32,
    pub active: bool,
    pub layout: String,
    pub working_dir: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaneRecord {
    pub index: u32,
    pub active: bool,
    pub width: u16,
    pub height: u16,
    pub command: String,
    pub working_dir: String,
}

/// Window half of a session/window target. `Active` lets tmux pick the
/// session's current window.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum WindowRef {
    Active,
    Index(u32),
}

impl WindowRef {
    /// Persisted form: `-1` (or any negative) is the session-level sentinel.
    pub fn from_raw(raw: i64) -> Self {
        match u32::try_from(raw) {
            Ok(index) => Self::Index(index),
            Err(_) => Self::Active,
        }
    }

    pub fn to_raw(self) -> i64 {
        match self {
            Self::Active => -1,
            Self::Index(index) => i64::from(index),
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PreviewMode {
    Metadata,
    Capture,
}

impl PreviewMode {
    pub fn toggle(self) -> Self {
        match self {
            Self::Metadata => Self::Capture,
            Self::Capture => Self::Metadata,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Metadata => "metadata",
            Self::Capture => "capture",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "metadata" => Some(Self::Metadata),
            "capture" => Some(Self::Capture),
            _ => None,
        }
    }
}
