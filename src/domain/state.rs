use crate::domain::{MarkRegistry, OrderState, PreviewMode};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Settings {
    pub default_preview: PreviewMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_preview: PreviewMode::Capture,
        }
    }
}

/// Everything persisted between runs: marks, custom order and settings.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SavedState {
    pub marks: MarkRegistry,
    pub order: OrderState,
    pub settings: Settings,
}
