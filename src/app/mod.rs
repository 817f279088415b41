mod commands;
mod dialog;
mod grid;
mod line_editor;
mod preview;

use crate::domain::{
    Action, KeyMap, SavedState, SessionRecord, WindowRecord, WindowRef, filter_sessions,
    filter_windows, key_token, merge_subset_order,
};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

pub use commands::*;
pub use dialog::*;
pub use grid::*;
pub use line_editor::LineEditor;
pub use preview::*;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    ResolveStateDir(#[from] crate::infra::ResolveStateDirError),

    #[error("failed to list tmux sessions: {0}")]
    LoadSessions(#[source] crate::infra::MuxError),

    #[error("failed to attach: {0}")]
    Attach(#[source] crate::infra::MuxError),
}

pub const STATUS_TTL: Duration = Duration::from_secs(5);
const PREVIEW_BORDER: u16 = 4;
const GRID_GAP: u16 = 1;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    Sessions,
    Windows,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Mode {
    Normal,
    Filtering,
    Marking,
    Dialog(Dialog),
    Help,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum StatusKind {
    Info,
    Error,
}

#[derive(Clone, Debug)]
pub struct StatusLine {
    pub text: String,
    pub kind: StatusKind,
    pub at: Instant,
}

impl StatusLine {
    pub fn is_expired(&self, now: Instant) -> bool {
        now.duration_since(self.at) >= STATUS_TTL
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SwitchTarget {
    Session(String),
    Window { session: String, index: u32 },
}

/// One backend mutation requested from a dialog.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Mutation {
    CreateSession { name: String },
    RenameSession { from: String, to: String },
    KillSession { name: String },
    CreateWindow { session: String, name: String },
    RenameWindow { session: String, index: u32, to: String },
    KillWindow { session: String, index: u32, name: String },
}

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize(u16, u16),
    CaptureLoaded { seq: u64, content: String },
    BrowseFinished(Result<Option<PathBuf>, String>),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AppCommand {
    None,
    Quit,
    OpenSession { session: String },
    Switch(SwitchTarget),
    Mutate(Mutation),
    PersistState { success: Option<String> },
    BrowseDirs,
    OpenDirectory { dir: PathBuf },
}

/// Sizes of the body panes for one level, in terminal cells.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct BodyLayout {
    pub grid_width: u16,
    pub preview_width: u16,
    pub preview_content_width: u16,
    pub height: u16,
}

/// Session level gives the preview 40% of the width, window level 50%.
pub fn layout_sizes(level: Level, width: u16, height: u16) -> BodyLayout {
    let percent = match level {
        Level::Sessions => 40,
        Level::Windows => 50,
    };
    let scaled = u32::from(width) * percent / 100;
    let preview_width = u16::try_from(scaled)
        .unwrap_or(u16::MAX)
        .max(PREVIEW_BORDER + CARD_CONTENT_WIDTH);
    let grid_width = width
        .saturating_sub(preview_width)
        .saturating_sub(GRID_GAP)
        .max(1);
    BodyLayout {
        grid_width,
        preview_width,
        preview_content_width: preview_width - PREVIEW_BORDER,
        height: height.saturating_sub(2).max(1),
    }
}

#[derive(Clone, Debug)]
pub struct AppModel {
    pub keymap: Arc<KeyMap>,
    pub state: SavedState,
    pub level: Level,
    pub mode: Mode,
    pub sessions: Vec<SessionRecord>,
    pub windows: Vec<WindowRecord>,
    pub window_names: BTreeMap<String, Vec<String>>,
    pub current_session: Option<String>,
    pub filter: LineEditor,
    pub session_grid: GridLayout<SessionRecord>,
    pub window_grid: GridLayout<WindowRecord>,
    pub preview: PreviewCoordinator,
    pub terminal_size: (u16, u16),
    pub status: Option<StatusLine>,
}

impl AppModel {
    pub fn new(keymap: Arc<KeyMap>, state: SavedState) -> Self {
        let preview = PreviewCoordinator::new(state.settings.default_preview);
        let mut model = Self {
            keymap,
            state,
            level: Level::Sessions,
            mode: Mode::Normal,
            sessions: Vec::new(),
            windows: Vec::new(),
            window_names: BTreeMap::new(),
            current_session: None,
            filter: LineEditor::new(),
            session_grid: GridLayout::new(0, 0),
            window_grid: GridLayout::new(0, 0),
            preview,
            terminal_size: (80, 24),
            status: None,
        };
        model.apply_layout();
        model
    }

    pub fn with_terminal_size(mut self, width: u16, height: u16) -> Self {
        self.terminal_size = (width, height);
        self.apply_layout();
        self
    }

    pub fn with_status(mut self, status: Option<String>) -> Self {
        if let Some(text) = status {
            self.set_error(text);
        }
        self
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            kind: StatusKind::Info,
            at: Instant::now(),
        });
    }

    pub fn set_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            kind: StatusKind::Error,
            at: Instant::now(),
        });
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    /// Current status text, or None once it has expired.
    pub fn visible_status(&self, now: Instant) -> Option<&StatusLine> {
        self.status.as_ref().filter(|status| !status.is_expired(now))
    }

    pub fn filter_query(&self) -> &str {
        self.filter.text()
    }

    /// Replaces the session list, applying the saved order and any active
    /// filter. Focus returns to the first card.
    pub fn set_sessions(
        &mut self,
        sessions: Vec<SessionRecord>,
        window_names: Option<BTreeMap<String, Vec<String>>>,
    ) {
        self.sessions = self.state.order.apply_to_sessions(sessions);
        if let Some(window_names) = window_names {
            self.window_names = window_names;
        }
        if self.level == Level::Sessions {
            self.apply_filter();
        } else {
            self.session_grid.set_items(self.sessions.clone());
        }
    }

    pub fn set_windows(&mut self, session: &str, windows: Vec<WindowRecord>) {
        self.windows = self.state.order.apply_to_windows(session, windows);
        self.current_session = Some(session.to_string());
        if self.level == Level::Windows {
            self.apply_filter();
        } else {
            self.window_grid.set_items(self.windows.clone());
        }
    }

    /// Drills into `session` once its windows have been loaded.
    pub fn enter_windows(&mut self, session: &str, windows: Vec<WindowRecord>) {
        self.filter.clear();
        self.mode = Mode::Normal;
        self.level = Level::Windows;
        self.set_windows(session, windows);
        self.apply_layout();
        self.sync_preview();
    }

    fn leave_windows(&mut self) {
        self.filter.clear();
        self.level = Level::Sessions;
        self.apply_layout();
        self.apply_filter();
        if let Some(session) = self.current_session.clone() {
            self.session_grid
                .focus_first_where(|record| record.name == session);
        }
        self.sync_preview();
    }

    /// Rebuilds the active grid from the canonical list and the filter query.
    pub fn apply_filter(&mut self) {
        let query = self.filter.text().to_string();
        match self.level {
            Level::Sessions => {
                let shown = filter_sessions(&self.sessions, &query, &self.window_names);
                self.session_grid.set_items(shown);
            }
            Level::Windows => {
                let shown = filter_windows(&self.windows, &query);
                self.window_grid.set_items(shown);
            }
        }
    }

    pub fn apply_layout(&mut self) {
        let (width, height) = self.terminal_size;
        let layout = layout_sizes(self.level, width, height);
        self.session_grid.set_size(layout.grid_width, layout.height);
        self.window_grid.set_size(layout.grid_width, layout.height);
    }

    /// Points the preview at the focused card. In capture mode this clears the
    /// panel and queues a fetch for the event loop to run.
    pub fn sync_preview(&mut self) {
        let Some((session, window)) = self.focused_target() else {
            self.preview.clear();
            return;
        };

        if self.preview.mode() == crate::domain::PreviewMode::Capture {
            self.preview.request_capture(&session, window);
            return;
        }

        match self.level {
            Level::Sessions => {
                if let Some(record) = self.session_grid.focused() {
                    self.preview.show_session_metadata(record);
                }
            }
            Level::Windows => {
                if let Some(record) = self.window_grid.focused() {
                    self.preview.show_window_metadata(record);
                }
            }
        }
    }

    /// Session and window of the focused card. Sessions target their active
    /// window.
    pub fn focused_target(&self) -> Option<(String, WindowRef)> {
        match self.level {
            Level::Sessions => self
                .session_grid
                .focused()
                .map(|session| (session.name.clone(), WindowRef::Active)),
            Level::Windows => {
                let session = self.current_session.clone()?;
                self.window_grid
                    .focused()
                    .map(|window| (session, WindowRef::Index(window.index)))
            }
        }
    }

    fn move_focus(&mut self, dx: isize, dy: isize) {
        let moved = match self.level {
            Level::Sessions => self.session_grid.move_focus(dx, dy),
            Level::Windows => self.window_grid.move_focus(dx, dy),
        };
        if moved {
            self.sync_preview();
        }
    }
}

pub fn update(model: AppModel, event: AppEvent) -> (AppModel, AppCommand) {
    match event {
        AppEvent::Key(key) => update_on_key(model, key),
        AppEvent::Resize(width, height) => (model.with_terminal_size(width, height), AppCommand::None),
        AppEvent::CaptureLoaded { seq, content } => {
            let mut model = model;
            model.preview.apply_capture(seq, content);
            (model, AppCommand::None)
        }
        AppEvent::BrowseFinished(result) => {
            let mut model = model;
            match result {
                Ok(Some(dir)) => (model, AppCommand::OpenDirectory { dir }),
                Ok(None) => (model, AppCommand::None),
                Err(message) => {
                    model.set_error(message);
                    (model, AppCommand::None)
                }
            }
        }
    }
}

fn update_on_key(model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let mut model = model;

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return (model, AppCommand::Quit);
    }

    match std::mem::replace(&mut model.mode, Mode::Normal) {
        Mode::Dialog(dialog) => update_dialog(model, dialog, key),
        Mode::Filtering => update_filter(model, key),
        Mode::Marking => update_marking(model, key),
        Mode::Help => update_help(model, key),
        Mode::Normal => update_normal(model, key),
    }
}

fn update_dialog(mut model: AppModel, dialog: Dialog, key: KeyEvent) -> (AppModel, AppCommand) {
    match dialog.handle_key(&key) {
        DialogOutcome::Pending(dialog) => {
            model.mode = Mode::Dialog(dialog);
            (model, AppCommand::None)
        }
        DialogOutcome::Cancelled => (model, AppCommand::None),
        DialogOutcome::Invalid(message) => {
            model.set_error(message);
            (model, AppCommand::None)
        }
        DialogOutcome::Submitted(mutation) => (model, AppCommand::Mutate(mutation)),
    }
}

fn update_filter(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    match key.code {
        KeyCode::Esc => {
            model.filter.clear();
            model.apply_filter();
            model.sync_preview();
        }
        KeyCode::Enter => {}
        _ => {
            model.mode = Mode::Filtering;
            let before = model.filter.text().to_string();
            if model.filter.handle_key(&key) && model.filter.text() != before {
                model.apply_filter();
                model.sync_preview();
            }
        }
    }
    (model, AppCommand::None)
}

fn update_marking(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let Some(token) = key_token(&key) else {
        return (model, AppCommand::None);
    };

    if token == "esc" || model.keymap.resolve(&token) == Some(Action::Back) {
        model.clear_status();
        return (model, AppCommand::None);
    }
    if model.keymap.is_reserved(&token) {
        model.set_error(format!("'{token}' is reserved"));
        return (model, AppCommand::None);
    }

    let Some((session, window)) = model.focused_target() else {
        return (model, AppCommand::None);
    };
    model.state.marks.remove_marks_for_target(&session, window);
    model.state.marks.set_mark(&token, &session, window);
    tracing::info!(key = %token, session = %session, window = window.to_raw(), "mark assigned");

    let success = match window {
        WindowRef::Active => format!("Marked {session} -> [{token}]"),
        WindowRef::Index(index) => format!("Marked {session}:{index} -> [{token}]"),
    };
    (
        model,
        AppCommand::PersistState {
            success: Some(success),
        },
    )
}

/// Help is an overlay: back and help close it, every other key dispatches
/// as usual and the overlay stays up unless the key opened another mode.
fn update_help(model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let action = key_token(&key).and_then(|token| model.keymap.resolve(&token));
    if matches!(action, Some(Action::Back) | Some(Action::ToggleHelp)) {
        return (model, AppCommand::None);
    }
    let (mut model, command) = update_normal(model, key);
    if model.mode == Mode::Normal {
        model.mode = Mode::Help;
    }
    (model, command)
}

fn update_normal(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    let Some(token) = key_token(&key) else {
        return (model, AppCommand::None);
    };

    let Some(action) = model.keymap.resolve(&token) else {
        if model.state.marks.has_mark(&token) {
            return jump_to_mark(model, &token);
        }
        return (model, AppCommand::None);
    };

    match action {
        Action::Quit => return (model, AppCommand::Quit),
        Action::Back => return handle_back(model),
        Action::ToggleHelp => model.mode = Mode::Help,
        Action::TogglePreview => {
            model.preview.toggle_mode();
            model.sync_preview();
        }
        Action::StartMark => {
            if model.focused_target().is_some() {
                model.mode = Mode::Marking;
            }
        }
        Action::Filter => {
            model.mode = Mode::Filtering;
            model.filter.clear();
            model.apply_filter();
            model.sync_preview();
        }
        Action::New => open_new_dialog(&mut model),
        Action::Rename => open_rename_dialog(&mut model),
        Action::Kill => open_kill_dialog(&mut model),
        Action::MoveUp => model.move_focus(0, -1),
        Action::MoveDown => model.move_focus(0, 1),
        Action::MoveLeft => model.move_focus(-1, 0),
        Action::MoveRight => model.move_focus(1, 0),
        Action::ReorderUp => return handle_reorder(model, 0, -1),
        Action::ReorderDown => return handle_reorder(model, 0, 1),
        Action::ReorderLeft => return handle_reorder(model, -1, 0),
        Action::ReorderRight => return handle_reorder(model, 1, 0),
        Action::Confirm => return handle_confirm(model),
        Action::QuickSwap => return handle_quick_swap(model),
        Action::BrowseDirs => return (model, AppCommand::BrowseDirs),
    }

    (model, AppCommand::None)
}

fn jump_to_mark(model: AppModel, token: &str) -> (AppModel, AppCommand) {
    let Some(target) = model.state.marks.get_mark(token) else {
        return (model, AppCommand::None);
    };
    let switch = match target.window {
        WindowRef::Active => SwitchTarget::Session(target.session.clone()),
        WindowRef::Index(index) => SwitchTarget::Window {
            session: target.session.clone(),
            index,
        },
    };
    (model, AppCommand::Switch(switch))
}

fn handle_back(mut model: AppModel) -> (AppModel, AppCommand) {
    match model.level {
        Level::Windows => {
            model.leave_windows();
            (model, AppCommand::None)
        }
        Level::Sessions => (model, AppCommand::Quit),
    }
}

fn handle_confirm(model: AppModel) -> (AppModel, AppCommand) {
    match model.level {
        Level::Sessions => {
            let Some(session) = model.session_grid.focused().map(|s| s.name.clone()) else {
                return (model, AppCommand::None);
            };
            (model, AppCommand::OpenSession { session })
        }
        Level::Windows => {
            let Some((session, WindowRef::Index(index))) = model.focused_target() else {
                return (model, AppCommand::None);
            };
            (
                model,
                AppCommand::Switch(SwitchTarget::Window { session, index }),
            )
        }
    }
}

fn handle_quick_swap(model: AppModel) -> (AppModel, AppCommand) {
    if model.level != Level::Sessions {
        return (model, AppCommand::None);
    }
    let Some(session) = model
        .session_grid
        .focused()
        .filter(|session| session.window_count > 0)
        .map(|session| session.name.clone())
    else {
        return (model, AppCommand::None);
    };
    (model, AppCommand::Switch(SwitchTarget::Session(session)))
}

fn handle_reorder(mut model: AppModel, dx: isize, dy: isize) -> (AppModel, AppCommand) {
    match model.level {
        Level::Sessions => {
            if !model.session_grid.move_item(dx, dy) {
                return (model, AppCommand::None);
            }
            model.sessions = merge_subset_order(
                &model.sessions,
                model.session_grid.items(),
                |session| session.name.clone(),
            );
            let order = model
                .sessions
                .iter()
                .map(|session| session.name.clone())
                .collect();
            model.state.order.set_session_order(order);
        }
        Level::Windows => {
            let Some(session) = model.current_session.clone() else {
                return (model, AppCommand::None);
            };
            if !model.window_grid.move_item(dx, dy) {
                return (model, AppCommand::None);
            }
            model.windows = merge_subset_order(&model.windows, model.window_grid.items(), |w| {
                w.index
            });
            let order = model.windows.iter().map(|window| window.index).collect();
            model.state.order.set_window_order(&session, order);
        }
    }
    model.sync_preview();
    (model, AppCommand::PersistState { success: None })
}

fn open_new_dialog(model: &mut AppModel) {
    let dialog = match model.level {
        Level::Sessions => Dialog::new_session(),
        Level::Windows => match &model.current_session {
            Some(session) => Dialog::new_window(session),
            None => return,
        },
    };
    model.mode = Mode::Dialog(dialog);
}

fn open_rename_dialog(model: &mut AppModel) {
    let dialog = match model.level {
        Level::Sessions => match model.session_grid.focused() {
            Some(session) => Dialog::rename_session(&session.name),
            None => return,
        },
        Level::Windows => match (&model.current_session, model.window_grid.focused()) {
            (Some(session), Some(window)) => {
                Dialog::rename_window(session, window.index, &window.name)
            }
            _ => return,
        },
    };
    model.mode = Mode::Dialog(dialog);
}

fn open_kill_dialog(model: &mut AppModel) {
    let dialog = match model.level {
        Level::Sessions => match model.session_grid.focused() {
            Some(session) => Dialog::kill_session(&session.name),
            None => return,
        },
        Level::Windows => match (&model.current_session, model.window_grid.focused()) {
            (Some(session), Some(window)) => {
                Dialog::kill_window(session, window.index, &window.name)
            }
            _ => return,
        },
    };
    model.mode = Mode::Dialog(dialog);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MarkTarget, PreviewMode};

    fn session(name: &str, windows: u32) -> SessionRecord {
        SessionRecord {
            name: name.to_string(),
            window_count: windows,
            attached: false,
            created: None,
            last_active: None,
            width: 80,
            height: 24,
        }
    }

    fn window(index: u32, name: &str) -> WindowRecord {
        WindowRecord {
            index,
            name: name.to_string(),
            pane_count: 1,
            active: index == 0,
            layout: "tiled".to_string(),
            working_dir: String::new(),
        }
    }

    fn model_with(names: &[&str]) -> AppModel {
        let mut state = SavedState::default();
        state.settings.default_preview = PreviewMode::Metadata;
        let mut model =
            AppModel::new(Arc::new(KeyMap::default()), state).with_terminal_size(100, 30);
        model.set_sessions(
            names.iter().map(|name| session(name, 2)).collect(),
            Some(BTreeMap::new()),
        );
        model.sync_preview();
        model
    }

    fn press(model: AppModel, code: KeyCode) -> (AppModel, AppCommand) {
        update(model, AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn press_char(model: AppModel, ch: char) -> (AppModel, AppCommand) {
        let modifiers = if ch.is_ascii_uppercase() {
            KeyModifiers::SHIFT
        } else {
            KeyModifiers::NONE
        };
        update(model, AppEvent::Key(KeyEvent::new(KeyCode::Char(ch), modifiers)))
    }

    fn focused_name(model: &AppModel) -> Option<&str> {
        model.session_grid.focused().map(|s| s.name.as_str())
    }

    #[test]
    fn ctrl_c_quits_from_any_mode() {
        let mut model = model_with(&["a"]);
        model.mode = Mode::Dialog(Dialog::new_session());
        let (_, command) = update(
            model,
            AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
        );
        assert_eq!(command, AppCommand::Quit);
    }

    #[test]
    fn confirm_on_session_requests_window_load() {
        let model = model_with(&["a", "b"]);
        let (model, _) = press_char(model, 'l');
        let (model, command) = press(model, KeyCode::Enter);
        assert_eq!(
            command,
            AppCommand::OpenSession {
                session: "b".to_string()
            }
        );
        assert_eq!(model.level, Level::Sessions);
    }

    #[test]
    fn enter_windows_then_back_returns_to_focused_session() {
        let mut model = model_with(&["a", "b", "c"]);
        model.enter_windows("c", vec![window(0, "vim"), window(1, "logs")]);
        assert_eq!(model.level, Level::Windows);
        assert_eq!(model.window_grid.len(), 2);

        let (model, command) = press(model, KeyCode::Esc);
        assert_eq!(command, AppCommand::None);
        assert_eq!(model.level, Level::Sessions);
        assert_eq!(focused_name(&model), Some("c"));

        let (_, command) = press(model, KeyCode::Esc);
        assert_eq!(command, AppCommand::Quit);
    }

    #[test]
    fn confirm_on_window_switches_to_it() {
        let mut model = model_with(&["a"]);
        model.enter_windows("a", vec![window(0, "vim"), window(3, "logs")]);
        let (model, _) = press(model, KeyCode::Right);
        let (_, command) = press(model, KeyCode::Enter);
        assert_eq!(
            command,
            AppCommand::Switch(SwitchTarget::Window {
                session: "a".to_string(),
                index: 3
            })
        );
    }

    #[test]
    fn quick_swap_needs_windows_and_session_level() {
        let mut model = model_with(&["a"]);
        let (_, command) = press_char(model.clone(), ' ');
        assert_eq!(command, AppCommand::Switch(SwitchTarget::Session("a".to_string())));

        model.set_sessions(vec![session("empty", 0)], None);
        let (_, command) = press_char(model, ' ');
        assert_eq!(command, AppCommand::None);
    }

    #[test]
    fn marking_assigns_key_and_persists() {
        let model = model_with(&["proj"]);
        let (model, _) = press_char(model, 'm');
        assert_eq!(model.mode, Mode::Marking);
        let (model, command) = press_char(model, 'a');
        assert_eq!(model.mode, Mode::Normal);
        assert_eq!(
            command,
            AppCommand::PersistState {
                success: Some("Marked proj -> [a]".to_string())
            }
        );
        assert_eq!(
            model.state.marks.get_mark("a"),
            Some(&MarkTarget::new("proj", WindowRef::Active))
        );
    }

    #[test]
    fn marking_with_reserved_key_is_rejected() {
        let model = model_with(&["proj"]);
        let (model, _) = press_char(model, 'm');
        let (model, command) = press_char(model, 'q');
        assert_eq!(command, AppCommand::None);
        assert_eq!(model.mode, Mode::Normal);
        assert!(model.state.marks.is_empty());
        let status = model.status.expect("status");
        assert_eq!(status.kind, StatusKind::Error);
        assert_eq!(status.text, "'q' is reserved");
    }

    #[test]
    fn marking_escape_cancels_without_assignment() {
        let model = model_with(&["proj"]);
        let (model, _) = press_char(model, 'm');
        let (model, command) = press(model, KeyCode::Esc);
        assert_eq!(command, AppCommand::None);
        assert_eq!(model.mode, Mode::Normal);
        assert!(model.state.marks.is_empty());
    }

    #[test]
    fn unbound_marked_key_jumps() {
        let mut model = model_with(&["proj"]);
        model.state.marks.set_mark("w", "proj", WindowRef::Index(2));
        let (_, command) = press_char(model, 'w');
        assert_eq!(
            command,
            AppCommand::Switch(SwitchTarget::Window {
                session: "proj".to_string(),
                index: 2
            })
        );
    }

    #[test]
    fn session_mark_jumps_to_session() {
        let mut model = model_with(&["proj", "other"]);
        model.state.marks.set_mark("w", "proj", WindowRef::Active);
        let (_, command) = press_char(model, 'w');
        assert_eq!(
            command,
            AppCommand::Switch(SwitchTarget::Session("proj".to_string()))
        );
    }

    #[test]
    fn unbound_unmarked_key_does_nothing() {
        let model = model_with(&["proj"]);
        let (model, command) = press_char(model, 'z');
        assert_eq!(command, AppCommand::None);
        assert_eq!(model.mode, Mode::Normal);
    }

    #[test]
    fn filter_narrows_and_escape_restores() {
        let model = model_with(&["alpha", "beta", "gamma"]);
        let (model, _) = press_char(model, '/');
        assert_eq!(model.mode, Mode::Filtering);
        let (model, _) = press_char(model, 'b');
        let (model, _) = press_char(model, 'e');
        assert_eq!(model.session_grid.len(), 1);
        assert_eq!(focused_name(&model), Some("beta"));

        let (model, _) = press(model, KeyCode::Esc);
        assert_eq!(model.mode, Mode::Normal);
        assert_eq!(model.filter_query(), "");
        assert_eq!(model.session_grid.len(), 3);
    }

    #[test]
    fn filter_enter_keeps_filtered_view() {
        let model = model_with(&["alpha", "beta"]);
        let (model, _) = press_char(model, '/');
        let (model, _) = press_char(model, 'a');
        let (model, _) = press_char(model, 'l');
        let (model, _) = press(model, KeyCode::Enter);
        assert_eq!(model.mode, Mode::Normal);
        assert_eq!(model.filter_query(), "al");
        assert_eq!(model.session_grid.len(), 1);
    }

    #[test]
    fn keys_typed_into_filter_are_not_actions() {
        let model = model_with(&["quartz"]);
        let (model, _) = press_char(model, '/');
        let (model, command) = press_char(model, 'q');
        assert_eq!(command, AppCommand::None);
        assert_eq!(model.filter_query(), "q");
    }

    #[test]
    fn reorder_updates_order_and_persists() {
        let model = model_with(&["a", "b", "c"]);
        let (model, command) = press_char(model, 'L');
        assert_eq!(command, AppCommand::PersistState { success: None });
        assert_eq!(
            model.state.order.session_order,
            vec!["b".to_string(), "a".to_string(), "c".to_string()]
        );
        assert_eq!(focused_name(&model), Some("a"));
    }

    #[test]
    fn reorder_at_grid_edge_is_ignored() {
        let model = model_with(&["a", "b"]);
        let (model, command) = press_char(model, 'H');
        assert_eq!(command, AppCommand::None);
        assert!(model.state.order.session_order.is_empty());
    }

    #[test]
    fn window_reorder_persists_index_order_for_session() {
        let mut model = model_with(&["p", "q"]);
        model.enter_windows("p", vec![window(0, "vim"), window(4, "logs"), window(7, "db")]);
        let (model, command) = press_char(model, 'L');
        assert_eq!(command, AppCommand::PersistState { success: None });
        assert_eq!(model.state.order.window_order.get("p"), Some(&vec![4, 0, 7]));
        assert!(!model.state.order.window_order.contains_key("q"));
        assert!(model.state.order.session_order.is_empty());
    }

    #[test]
    fn reorder_under_filter_merges_into_full_order() {
        let model = model_with(&["ab1", "zz", "ab2"]);
        let (model, _) = press_char(model, '/');
        let (model, _) = press_char(model, 'a');
        let (model, _) = press_char(model, 'b');
        let (model, _) = press(model, KeyCode::Enter);
        assert_eq!(model.session_grid.len(), 2);
        let first = focused_name(&model).map(str::to_string);

        let (model, command) = press_char(model, 'L');
        assert_eq!(command, AppCommand::PersistState { success: None });
        let order = model.state.order.session_order.clone();
        assert_eq!(order.len(), 3);
        assert_eq!(order[1], "zz");
        assert_eq!(order[2], first.unwrap_or_default());
    }

    #[test]
    fn rename_dialog_escape_leaves_everything_untouched() {
        let model = model_with(&["proj"]);
        let (model, _) = press_char(model, 'r');
        assert!(matches!(model.mode, Mode::Dialog(_)));
        let (model, _) = press_char(model, 'x');
        let (model, _) = press_char(model, 'y');
        let (model, command) = press(model, KeyCode::Esc);
        assert_eq!(command, AppCommand::None);
        assert_eq!(model.mode, Mode::Normal);
        assert_eq!(focused_name(&model), Some("proj"));
    }

    #[test]
    fn kill_dialog_submits_mutation() {
        let model = model_with(&["proj"]);
        let (model, _) = press_char(model, 'x');
        let (_, command) = press_char(model, 'y');
        assert_eq!(
            command,
            AppCommand::Mutate(Mutation::KillSession {
                name: "proj".to_string()
            })
        );
    }

    #[test]
    fn empty_new_session_name_shows_error() {
        let model = model_with(&["proj"]);
        let (model, _) = press_char(model, 'n');
        let (model, command) = press(model, KeyCode::Enter);
        assert_eq!(command, AppCommand::None);
        assert_eq!(model.mode, Mode::Normal);
        assert_eq!(
            model.status.map(|status| status.text),
            Some("session name cannot be empty".to_string())
        );
    }

    #[test]
    fn help_overlay_keeps_dispatching_and_closes_on_back() {
        let model = model_with(&["a", "b"]);
        let (model, _) = press_char(model, '?');
        assert_eq!(model.mode, Mode::Help);
        let (model, _) = press_char(model, 'l');
        assert_eq!(focused_name(&model), Some("b"));
        assert_eq!(model.mode, Mode::Help);
        let (model, command) = press(model, KeyCode::Enter);
        assert_eq!(
            command,
            AppCommand::OpenSession {
                session: "b".to_string()
            }
        );
        let (model, command) = press(model, KeyCode::Esc);
        assert_eq!(command, AppCommand::None);
        assert_eq!(model.mode, Mode::Normal);
    }

    #[test]
    fn help_toggles_closed_and_yields_to_filter() {
        let model = model_with(&["a", "b"]);
        let (model, _) = press_char(model, '?');
        let (model, _) = press_char(model, '?');
        assert_eq!(model.mode, Mode::Normal);
        let (model, _) = press_char(model, '?');
        let (model, _) = press_char(model, '/');
        assert_eq!(model.mode, Mode::Filtering);
    }

    #[test]
    fn capture_mode_queues_fetch_on_focus_change() {
        let mut model = model_with(&["a", "b"]);
        let (next, _) = press(model.clone(), KeyCode::Tab);
        model = next;
        assert_eq!(model.preview.mode(), PreviewMode::Capture);
        let first = model.preview.take_pending().expect("fetch on mode switch");
        assert_eq!(first.session, "a");

        let (mut model, _) = press(model, KeyCode::Right);
        let second = model.preview.take_pending().expect("fetch on focus change");
        assert_eq!(second.session, "b");
        assert!(second.seq > first.seq);

        let (model, _) = update(
            model,
            AppEvent::CaptureLoaded {
                seq: first.seq,
                content: "stale".to_string(),
            },
        );
        assert_eq!(model.preview.body(), &PreviewBody::Empty);
    }

    #[test]
    fn layout_gives_preview_larger_share_at_window_level() {
        let sessions = layout_sizes(Level::Sessions, 100, 30);
        let windows = layout_sizes(Level::Windows, 100, 30);
        assert_eq!(sessions.preview_width, 40);
        assert_eq!(windows.preview_width, 50);
        assert_eq!(sessions.grid_width, 59);
        assert_eq!(sessions.height, 28);
        let narrow = layout_sizes(Level::Sessions, 20, 3);
        assert_eq!(narrow.preview_width, PREVIEW_BORDER + CARD_CONTENT_WIDTH);
        assert_eq!(narrow.grid_width, 1);
        assert_eq!(narrow.height, 1);
    }

    #[test]
    fn browse_result_maps_to_directory_open() {
        let model = model_with(&["a"]);
        let (model, command) = update(
            model,
            AppEvent::BrowseFinished(Ok(Some(PathBuf::from("/tmp/x")))),
        );
        assert_eq!(
            command,
            AppCommand::OpenDirectory {
                dir: PathBuf::from("/tmp/x")
            }
        );
        let (model, command) = update(model, AppEvent::BrowseFinished(Err("boom".to_string())));
        assert_eq!(command, AppCommand::None);
        assert_eq!(model.status.map(|s| s.kind), Some(StatusKind::Error));
    }
}
