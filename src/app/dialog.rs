use crate::app::{LineEditor, Mutation};
use crossterm::event::{KeyCode, KeyEvent};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ConfirmChoice {
    Yes,
    #[default]
    No,
}

impl ConfirmChoice {
    pub fn toggle(self) -> Self {
        match self {
            Self::Yes => Self::No,
            Self::No => Self::Yes,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DialogKind {
    Confirm { choice: ConfirmChoice },
    Input { editor: LineEditor },
}

/// What a dialog does once submitted. Targets are captured when the dialog
/// opens, so later focus changes cannot redirect them.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DialogAction {
    NewSession,
    RenameSession { session: String },
    KillSession { session: String },
    NewWindow { session: String },
    RenameWindow { session: String, index: u32 },
    KillWindow { session: String, index: u32, name: String },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
    pub kind: DialogKind,
    pub action: DialogAction,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DialogOutcome {
    Pending(Dialog),
    Cancelled,
    Invalid(String),
    Submitted(Mutation),
}

impl Dialog {
    pub fn new_session() -> Self {
        Self::input("New Session", "Session name:", "", DialogAction::NewSession)
    }

    pub fn rename_session(session: &str) -> Self {
        Self::input(
            "Rename Session",
            "New name:",
            session,
            DialogAction::RenameSession {
                session: session.to_string(),
            },
        )
    }

    pub fn kill_session(session: &str) -> Self {
        Self::confirm(
            "Kill Session",
            format!("Kill session \"{session}\"?"),
            DialogAction::KillSession {
                session: session.to_string(),
            },
        )
    }

    pub fn new_window(session: &str) -> Self {
        Self::input(
            "New Window",
            "Window name:",
            "",
            DialogAction::NewWindow {
                session: session.to_string(),
            },
        )
    }

    pub fn rename_window(session: &str, index: u32, name: &str) -> Self {
        Self::input(
            "Rename Window",
            "New name:",
            name,
            DialogAction::RenameWindow {
                session: session.to_string(),
                index,
            },
        )
    }

    pub fn kill_window(session: &str, index: u32, name: &str) -> Self {
        Self::confirm(
            "Kill Window",
            format!("Kill window \"{name}\"?"),
            DialogAction::KillWindow {
                session: session.to_string(),
                index,
                name: name.to_string(),
            },
        )
    }

    fn input(title: &str, message: &str, initial: &str, action: DialogAction) -> Self {
        Self {
            title: title.to_string(),
            message: message.to_string(),
            kind: DialogKind::Input {
                editor: LineEditor::from_text(initial),
            },
            action,
        }
    }

    fn confirm(title: &str, message: String, action: DialogAction) -> Self {
        Self {
            title: title.to_string(),
            message,
            kind: DialogKind::Confirm {
                choice: ConfirmChoice::default(),
            },
            action,
        }
    }

    pub fn handle_key(mut self, key: &KeyEvent) -> DialogOutcome {
        match &mut self.kind {
            DialogKind::Input { editor } => match key.code {
                KeyCode::Esc => DialogOutcome::Cancelled,
                KeyCode::Enter => {
                    let name = editor.text().trim().to_string();
                    self.submit_input(name)
                }
                _ => {
                    editor.handle_key(key);
                    DialogOutcome::Pending(self)
                }
            },
            DialogKind::Confirm { choice } => match key.code {
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => DialogOutcome::Cancelled,
                KeyCode::Char('y') | KeyCode::Char('Y') => self.submit_confirm(ConfirmChoice::Yes),
                KeyCode::Enter => {
                    let choice = *choice;
                    self.submit_confirm(choice)
                }
                KeyCode::Left | KeyCode::Right | KeyCode::Char('h') | KeyCode::Char('l') => {
                    *choice = choice.toggle();
                    DialogOutcome::Pending(self)
                }
                _ => DialogOutcome::Pending(self),
            },
        }
    }

    fn submit_input(self, name: String) -> DialogOutcome {
        if name.is_empty() {
            let what = match self.action {
                DialogAction::NewWindow { .. } | DialogAction::RenameWindow { .. } => "window",
                _ => "session",
            };
            return DialogOutcome::Invalid(format!("{what} name cannot be empty"));
        }

        match self.action {
            DialogAction::NewSession => DialogOutcome::Submitted(Mutation::CreateSession { name }),
            DialogAction::RenameSession { session } => {
                DialogOutcome::Submitted(Mutation::RenameSession {
                    from: session,
                    to: name,
                })
            }
            DialogAction::NewWindow { session } => {
                DialogOutcome::Submitted(Mutation::CreateWindow { session, name })
            }
            DialogAction::RenameWindow { session, index } => {
                DialogOutcome::Submitted(Mutation::RenameWindow {
                    session,
                    index,
                    to: name,
                })
            }
            DialogAction::KillSession { .. } | DialogAction::KillWindow { .. } => {
                DialogOutcome::Cancelled
            }
        }
    }

    fn submit_confirm(self, choice: ConfirmChoice) -> DialogOutcome {
        if choice != ConfirmChoice::Yes {
            return DialogOutcome::Cancelled;
        }
        match self.action {
            DialogAction::KillSession { session } => {
                DialogOutcome::Submitted(Mutation::KillSession { name: session })
            }
            DialogAction::KillWindow {
                session,
                index,
                name,
            } => DialogOutcome::Submitted(Mutation::KillWindow {
                session,
                index,
                name,
            }),
            _ => DialogOutcome::Cancelled,
        }
    }
}
