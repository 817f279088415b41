use crate::app::{AppCommand, AppModel, Level, Mutation, SwitchTarget};
use crate::domain::WindowRef;
use crate::infra::{MuxBackend, MuxError, StateStore, ensure_session_for_dir, switch_or_create_session};

/// What the event loop does after a command ran.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CommandOutcome {
    Continue,
    Exit,
    /// Leave the TUI and attach the terminal to this target (outside tmux).
    Attach { session: String, window: WindowRef },
    Browse,
}

/// Lists sessions (and window names for filtering) into the model.
pub fn load_sessions(model: &mut AppModel, backend: &dyn MuxBackend) -> Result<(), MuxError> {
    let sessions = backend.list_sessions()?;
    let window_names = match backend.list_all_window_names() {
        Ok(names) => Some(names),
        Err(error) => {
            tracing::warn!(error = %error, "failed to list window names for filtering");
            None
        }
    };
    model.set_sessions(sessions, window_names);
    Ok(())
}

fn reload_windows(
    model: &mut AppModel,
    backend: &dyn MuxBackend,
    session: &str,
) -> Result<(), MuxError> {
    let windows = backend.list_windows(session)?;
    model.set_windows(session, windows);
    Ok(())
}

pub fn execute(
    model: &mut AppModel,
    command: AppCommand,
    backend: &dyn MuxBackend,
    store: &dyn StateStore,
) -> CommandOutcome {
    match command {
        AppCommand::None => CommandOutcome::Continue,
        AppCommand::Quit => CommandOutcome::Exit,
        AppCommand::OpenSession { session } => {
            match backend.list_windows(&session) {
                Ok(windows) => model.enter_windows(&session, windows),
                Err(error) => model.set_error(error.to_string()),
            }
            CommandOutcome::Continue
        }
        AppCommand::Switch(target) => switch(model, target, backend),
        AppCommand::Mutate(mutation) => {
            apply_mutation(model, mutation, backend);
            CommandOutcome::Continue
        }
        AppCommand::PersistState { success } => {
            match store.save(&model.state) {
                Ok(()) => {
                    if let Some(text) = success {
                        model.set_status(text);
                    }
                }
                Err(error) => {
                    tracing::error!(error = %error, "failed to persist state");
                    model.set_error(format!("Failed to save: {error}"));
                }
            }
            CommandOutcome::Continue
        }
        AppCommand::BrowseDirs => CommandOutcome::Browse,
        AppCommand::OpenDirectory { dir } => {
            if backend.is_in_tmux() {
                match switch_or_create_session(backend, &dir) {
                    Ok(_) => return CommandOutcome::Exit,
                    Err(error) => model.set_error(error.to_string()),
                }
            } else {
                match ensure_session_for_dir(backend, &dir) {
                    Ok(session) => {
                        return CommandOutcome::Attach {
                            session,
                            window: WindowRef::Active,
                        };
                    }
                    Err(error) => model.set_error(error.to_string()),
                }
            }
            CommandOutcome::Continue
        }
    }
}

fn switch(model: &mut AppModel, target: SwitchTarget, backend: &dyn MuxBackend) -> CommandOutcome {
    let (session, window) = match target {
        SwitchTarget::Session(session) => (session, WindowRef::Active),
        SwitchTarget::Window { session, index } => (session, WindowRef::Index(index)),
    };

    if !backend.is_in_tmux() {
        return CommandOutcome::Attach { session, window };
    }

    let result = match window {
        WindowRef::Active => backend.switch_to_session(&session),
        WindowRef::Index(index) => backend.switch_to_window(&session, index),
    };
    match result {
        Ok(()) => {
            tracing::info!(session = %session, window = window.to_raw(), "switched client");
            CommandOutcome::Exit
        }
        Err(error) => {
            model.set_error(error.to_string());
            CommandOutcome::Continue
        }
    }
}

/// Runs one backend mutation; on success reloads the affected list,
/// reapplies the filter and focuses the touched item.
fn apply_mutation(model: &mut AppModel, mutation: Mutation, backend: &dyn MuxBackend) {
    let (result, status, focus) = match &mutation {
        Mutation::CreateSession { name } => (
            backend.new_session(name),
            format!("Created: {name}"),
            Some(name.clone()),
        ),
        Mutation::RenameSession { from, to } => (
            backend.rename_session(from, to),
            format!("Renamed to: {to}"),
            Some(to.clone()),
        ),
        Mutation::KillSession { name } => {
            (backend.kill_session(name), format!("Killed: {name}"), None)
        }
        Mutation::CreateWindow { session, name } => (
            backend.new_window(session, name),
            format!("Created: {name}"),
            Some(name.clone()),
        ),
        Mutation::RenameWindow { session, index, to } => (
            backend.rename_window(session, *index, to),
            format!("Renamed to: {to}"),
            Some(to.clone()),
        ),
        Mutation::KillWindow {
            session,
            index,
            name,
        } => (
            backend.kill_window(session, *index),
            format!("Killed: {name}"),
            None,
        ),
    };

    if let Err(error) = result {
        model.set_error(error.to_string());
        return;
    }
    tracing::info!(mutation = ?mutation, "tmux mutation applied");
    model.set_status(status);

    let reloaded = match (&mutation, model.level) {
        (
            Mutation::CreateWindow { session, .. }
            | Mutation::RenameWindow { session, .. }
            | Mutation::KillWindow { session, .. },
            Level::Windows,
        ) => reload_windows(model, backend, session),
        _ => load_sessions(model, backend),
    };
    if let Err(error) = reloaded {
        model.set_error(error.to_string());
        return;
    }

    if let Some(name) = focus {
        match model.level {
            Level::Sessions => model.session_grid.focus_first_where(|s| s.name == name),
            Level::Windows => model.window_grid.focus_first_where(|w| w.name == name),
        }
    }
    model.sync_preview();
}
