mod app;
mod cli;
mod domain;
mod infra;
mod ui;

use crate::app::{AppCommand, AppError, AppEvent, AppModel, CaptureRequest, CommandOutcome};
use crate::cli::CliInvocation;
use crate::domain::{KeyMap, SavedState, WindowRef, normalize_capture};
use crate::infra::{
    AppConfig, BrowseError, FileStateStore, capture_active_pane, MuxBackend, StateStore, TmuxClient, init_file_logging,
    load_app_config, resolve_state_dir, run_browse,
};
use crossterm::event::{self, Event, KeyEventKind};
use crossterm::terminal::size as terminal_size;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout, Write};
use std::sync::Arc;
use std::sync::mpsc::{Sender, channel};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
enum MainError {
    #[error(transparent)]
    App(#[from] AppError),

    #[error(transparent)]
    Cli(#[from] crate::cli::CliRunError),
}

#[derive(Debug)]
struct CaptureSignal {
    seq: u64,
    content: String,
}

/// How the interactive loop ended.
#[derive(Debug)]
enum LoopExit {
    Quit,
    Attach { session: String, window: WindowRef },
}

fn main() {
    if let Err(error) = run_main() {
        let mut err = io::stderr().lock();
        let _ = writeln!(err, "{error}");
        std::process::exit(1);
    }
}

fn run_main() -> Result<(), MainError> {
    let args = std::env::args().collect::<Vec<_>>();
    let invocation = match crate::cli::parse_invocation(&args) {
        Ok(invocation) => invocation,
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{error}");
            let _ = writeln!(err);
            print_help();
            std::process::exit(2);
        }
    };

    match invocation {
        CliInvocation::PrintHelp => {
            print_help();
            Ok(())
        }
        CliInvocation::PrintVersion => {
            let mut out = io::stdout().lock();
            let _ = writeln!(out, "{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliInvocation::Tui => Ok(run_tui()?),
        CliInvocation::Command(command) => {
            let state_dir = resolve_state_dir().map_err(AppError::from)?;
            let _ = init_file_logging(&state_dir);
            let config = load_app_config(&state_dir);
            let backend = TmuxClient::from_env();
            crate::cli::run(command, &backend, &config)?;
            Ok(())
        }
    }
}

fn print_help() {
    let text = format!(
        "{name} - navigate tmux sessions and windows as a card grid\n\nUSAGE:\n  {name}            Start the navigator\n  {name} last       Switch to the previously used session\n  {name} browse     Pick a directory with fzf and open it as a session\n  {name} --help | --version\n\nKEYS (defaults):\n  h/j/k/l, arrows   move          H/J/K/L   reorder cards\n  enter             open/switch   space     quick switch\n  m + key           set mark      key       jump to mark\n  n / r / x         new / rename / kill\n  /                 filter        tab       toggle preview\n  f                 browse dirs   ?         help\n  esc               back          q         quit\n\nFILES:\n  ~/.tswitch/state.json    marks, card order and settings (written by {name})\n  ~/.tswitch/config.json   key overrides and browse directories (read only)\n  ~/.tswitch/tswitch.log   log output (level via RUST_LOG)\n\nENV:\n  TSWITCH_HOME   Override the state directory (default: ~/.tswitch)\n",
        name = env!("CARGO_PKG_NAME")
    );
    let mut out = io::stdout().lock();
    let _ = write!(out, "{text}");
}

fn run_tui() -> Result<(), AppError> {
    let state_dir = resolve_state_dir()?;
    let logging_notice = match init_file_logging(&state_dir) {
        Ok(_) => None,
        Err(error) => Some(format!("Logging disabled: {error}")),
    };

    let config = load_app_config(&state_dir);
    let keymap = Arc::new(KeyMap::with_overrides(&config.keys));
    let store = FileStateStore::new(&state_dir);
    let (state, state_notice) = match store.load() {
        Ok(state) => (state, None),
        Err(error) => {
            tracing::warn!(path = %store.path().display(), error = %error, "state reset");
            (
                SavedState::default(),
                Some(format!("State reset (failed to load): {error}")),
            )
        }
    };

    let backend: Arc<dyn MuxBackend> = Arc::new(TmuxClient::from_env());
    let mut model = AppModel::new(keymap, state).with_status(state_notice.or(logging_notice));
    app::load_sessions(&mut model, backend.as_ref()).map_err(AppError::LoadSessions)?;
    tracing::info!(sessions = model.sessions.len(), in_tmux = backend.is_in_tmux(), "starting navigator");

    let mut terminal = setup_terminal()?;
    if let Ok((width, height)) = terminal_size() {
        model = model.with_terminal_size(width, height);
    }
    model.sync_preview();

    let result = run(&mut terminal, &mut model, backend.clone(), &store, &config);
    restore_terminal(&mut terminal)?;

    match result? {
        LoopExit::Quit => Ok(()),
        LoopExit::Attach { session, window } => {
            tracing::info!(session = %session, window = window.to_raw(), "attaching");
            backend
                .attach_session(&session, window)
                .map_err(AppError::Attach)
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<(), AppError> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    model: &mut AppModel,
    backend: Arc<dyn MuxBackend>,
    store: &dyn StateStore,
    config: &AppConfig,
) -> Result<LoopExit, AppError> {
    let (capture_tx, capture_rx) = channel::<CaptureSignal>();

    loop {
        if let Some(request) = model.preview.take_pending() {
            spawn_capture(backend.clone(), request, capture_tx.clone());
        }

        while let Ok(signal) = capture_rx.try_recv() {
            let (next, _command) = app::update(
                model.clone(),
                AppEvent::CaptureLoaded {
                    seq: signal.seq,
                    content: signal.content,
                },
            );
            *model = next;
        }

        terminal.draw(|frame| ui::render(frame, model))?;

        if !event::poll(Duration::from_millis(200))? {
            continue;
        }
        let event = match event::read()? {
            Event::Key(key) if key.kind != KeyEventKind::Release => AppEvent::Key(key),
            Event::Resize(width, height) => AppEvent::Resize(width, height),
            _ => continue,
        };

        let (next, command) = app::update(model.clone(), event);
        *model = next;
        if let Some(exit) = dispatch(terminal, model, command, backend.as_ref(), store, config)? {
            return Ok(exit);
        }
    }
}

/// Runs `command` and any follow-up it produces (a finished browse yields an
/// open-directory command).
fn dispatch(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    model: &mut AppModel,
    command: AppCommand,
    backend: &dyn MuxBackend,
    store: &dyn StateStore,
    config: &AppConfig,
) -> Result<Option<LoopExit>, AppError> {
    let mut command = command;
    loop {
        match app::execute(model, command, backend, store) {
            CommandOutcome::Continue => return Ok(None),
            CommandOutcome::Exit => return Ok(Some(LoopExit::Quit)),
            CommandOutcome::Attach { session, window } => {
                return Ok(Some(LoopExit::Attach { session, window }));
            }
            CommandOutcome::Browse => {
                let result = if config.browse_dirs.is_empty() {
                    Err(BrowseError::NoDirectories.to_string())
                } else {
                    let _guard = SuspendTuiGuard::suspend(terminal)?;
                    run_browse(config).map_err(|error| error.to_string())
                };
                let (next, next_command) =
                    app::update(model.clone(), AppEvent::BrowseFinished(result));
                *model = next;
                command = next_command;
            }
        }
    }
}

fn spawn_capture(backend: Arc<dyn MuxBackend>, request: CaptureRequest, tx: Sender<CaptureSignal>) {
    tracing::debug!(seq = request.seq, session = %request.session, "capture dispatched");
    std::thread::spawn(move || {
        let content = match capture_active_pane(backend.as_ref(), &request.session, request.window) {
            Ok(raw) => normalize_capture(&raw),
            Err(error) => format!("(capture error: {error})"),
        };
        let _ = tx.send(CaptureSignal {
            seq: request.seq,
            content,
        });
    });
}

/// Hands the terminal to a child process (fzf) and takes it back on drop.
struct SuspendTuiGuard<'a> {
    terminal: &'a mut Terminal<CrosstermBackend<Stdout>>,
}

impl<'a> SuspendTuiGuard<'a> {
    fn suspend(terminal: &'a mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<Self> {
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(Self { terminal })
    }
}

impl Drop for SuspendTuiGuard<'_> {
    fn drop(&mut self) {
        let _ = enable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), EnterAlternateScreen);
        let _ = self.terminal.hide_cursor();
        let _ = self.terminal.clear();
    }
}
