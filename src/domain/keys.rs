use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Confirm,
    QuickSwap,
    Back,
    StartMark,
    New,
    Rename,
    Kill,
    ReorderUp,
    ReorderDown,
    ReorderLeft,
    ReorderRight,
    BrowseDirs,
    TogglePreview,
    ToggleHelp,
    Filter,
    Quit,
}

impl Action {
    pub const ALL: [Action; 20] = [
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
        Action::Confirm,
        Action::QuickSwap,
        Action::Back,
        Action::StartMark,
        Action::New,
        Action::Rename,
        Action::Kill,
        Action::ReorderUp,
        Action::ReorderDown,
        Action::ReorderLeft,
        Action::ReorderRight,
        Action::BrowseDirs,
        Action::TogglePreview,
        Action::ToggleHelp,
        Action::Filter,
        Action::Quit,
    ];

    pub fn config_name(self) -> &'static str {
        match self {
            Self::MoveUp => "move_up",
            Self::MoveDown => "move_down",
            Self::MoveLeft => "move_left",
            Self::MoveRight => "move_right",
            Self::Confirm => "confirm",
            Self::QuickSwap => "quick_swap",
            Self::Back => "back",
            Self::StartMark => "start_mark",
            Self::New => "new",
            Self::Rename => "rename",
            Self::Kill => "kill",
            Self::ReorderUp => "reorder_up",
            Self::ReorderDown => "reorder_down",
            Self::ReorderLeft => "reorder_left",
            Self::ReorderRight => "reorder_right",
            Self::BrowseDirs => "browse_dirs",
            Self::TogglePreview => "toggle_preview",
            Self::ToggleHelp => "toggle_help",
            Self::Filter => "filter",
            Self::Quit => "quit",
        }
    }

    pub fn from_config_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|action| action.config_name() == name)
    }
}

const DEFAULT_BINDINGS: &[(&str, Action)] = &[
    ("up", Action::MoveUp),
    ("k", Action::MoveUp),
    ("down", Action::MoveDown),
    ("j", Action::MoveDown),
    ("left", Action::MoveLeft),
    ("h", Action::MoveLeft),
    ("right", Action::MoveRight),
    ("l", Action::MoveRight),
    ("K", Action::ReorderUp),
    ("J", Action::ReorderDown),
    ("H", Action::ReorderLeft),
    ("L", Action::ReorderRight),
    ("enter", Action::Confirm),
    ("space", Action::QuickSwap),
    ("esc", Action::Back),
    ("m", Action::StartMark),
    ("f", Action::BrowseDirs),
    ("n", Action::New),
    ("r", Action::Rename),
    ("x", Action::Kill),
    ("tab", Action::TogglePreview),
    ("?", Action::ToggleHelp),
    ("/", Action::Filter),
    ("q", Action::Quit),
];

// Held back from mark assignment without being bound to an action yet.
const EXTRA_RESERVED: &[&str] = &["t"];

/// Resolved key bindings. Built once at startup and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct KeyMap {
    bindings: HashMap<String, Action>,
    reserved: HashSet<String>,
}

impl Default for KeyMap {
    fn default() -> Self {
        let bindings = DEFAULT_BINDINGS
            .iter()
            .map(|(key, action)| ((*key).to_string(), *action))
            .collect::<HashMap<_, _>>();
        let reserved = bindings
            .keys()
            .cloned()
            .chain(EXTRA_RESERVED.iter().map(|key| (*key).to_string()))
            .collect();
        Self { bindings, reserved }
    }
}

impl KeyMap {
    /// Defaults plus `action name -> key` overrides. An override replaces every
    /// default key of that action; unknown action names are skipped.
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Self {
        let mut keymap = Self::default();
        for (action_name, key) in overrides {
            let Some(action) = Action::from_config_name(action_name) else {
                tracing::warn!(action = %action_name, "ignoring key override for unknown action");
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                tracing::warn!(action = %action_name, "ignoring empty key override");
                continue;
            }

            let previous = keymap
                .bindings
                .iter()
                .filter(|(_, bound)| **bound == action)
                .map(|(key, _)| key.clone())
                .collect::<Vec<_>>();
            for old_key in previous {
                keymap.bindings.remove(&old_key);
                keymap.reserved.remove(&old_key);
            }

            keymap.bindings.insert(key.to_string(), action);
            keymap.reserved.insert(key.to_string());
        }
        keymap
    }

    pub fn resolve(&self, token: &str) -> Option<Action> {
        self.bindings.get(token).copied()
    }

    pub fn is_reserved(&self, token: &str) -> bool {
        self.reserved.contains(token)
    }

    /// Keys bound to `action`, sorted for stable help output.
    pub fn keys_for(&self, action: Action) -> Vec<&str> {
        let mut keys = self
            .bindings
            .iter()
            .filter(|(_, bound)| **bound == action)
            .map(|(key, _)| key.as_str())
            .collect::<Vec<_>>();
        keys.sort_by(|a, b| a.len().cmp(&b.len()).then_with(|| a.cmp(b)));
        keys
    }

    pub fn label_for(&self, action: Action) -> String {
        let keys = self.keys_for(action);
        if keys.is_empty() {
            "unbound".to_string()
        } else {
            keys.join("/")
        }
    }
}

/// Canonical token for a key press, as used in bindings and mark keys.
pub fn key_token(key: &KeyEvent) -> Option<String> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    let base = match key.code {
        KeyCode::Char(' ') => "space".to_string(),
        KeyCode::Char(character) => {
            if ctrl {
                return Some(format!("ctrl+{}", character.to_ascii_lowercase()));
            }
            character.to_string()
        }
        KeyCode::Enter => "enter".to_string(),
        KeyCode::Esc => "esc".to_string(),
        KeyCode::Tab => "tab".to_string(),
        KeyCode::BackTab => "shift+tab".to_string(),
        KeyCode::Backspace => "backspace".to_string(),
        KeyCode::Delete => "delete".to_string(),
        KeyCode::Up => "up".to_string(),
        KeyCode::Down => "down".to_string(),
        KeyCode::Left => "left".to_string(),
        KeyCode::Right => "right".to_string(),
        KeyCode::Home => "home".to_string(),
        KeyCode::End => "end".to_string(),
        KeyCode::PageUp => "pgup".to_string(),
        KeyCode::PageDown => "pgdown".to_string(),
        KeyCode::F(number) => format!("f{number}"),
        _ => return None,
    };

    if ctrl {
        return Some(format!("ctrl+{base}"));
    }
    if alt {
        return Some(format!("alt+{base}"));
    }
    Some(base)
}
