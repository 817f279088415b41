use crate::domain::{PaneRecord, SessionRecord, WindowRecord, WindowRef};
use std::collections::BTreeMap;
use std::io;
use std::process::{Command, Stdio};
use thiserror::Error;
use time::OffsetDateTime;

const SESSION_FORMAT: &str = "#{session_name}|#{session_windows}|#{session_attached}|#{session_created}|#{session_activity}|#{session_width}|#{session_height}";
const WINDOW_FORMAT: &str =
    "#{window_index}|#{window_name}|#{window_panes}|#{window_active}|#{window_layout}|#{pane_current_path}";
const PANE_FORMAT: &str = "#{pane_index}|#{pane_active}|#{pane_width}|#{pane_height}|#{pane_current_command}|#{pane_current_path}";

#[derive(Debug, Error)]
pub enum MuxError {
    #[error("tmux {command} failed: {message}")]
    CommandFailed { command: String, message: String },

    #[error("failed to run tmux: {0}")]
    Spawn(#[from] io::Error),
}

/// Runs one tmux invocation. Split out so the client can be driven by a
/// scripted executor in tests.
pub trait CommandExecutor: Send + Sync {
    fn run(&self, args: &[&str]) -> Result<String, MuxError>;

    /// Runs with the caller's terminal attached instead of capturing output.
    fn run_attached(&self, args: &[&str]) -> Result<(), MuxError>;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct TmuxExecutor;

impl CommandExecutor for TmuxExecutor {
    fn run(&self, args: &[&str]) -> Result<String, MuxError> {
        let output = Command::new("tmux")
            .args(args)
            .stdin(Stdio::null())
            .output()?;
        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let message = if stderr.is_empty() {
            String::from_utf8_lossy(&output.stdout).trim().to_string()
        } else {
            stderr
        };
        Err(MuxError::CommandFailed {
            command: args.first().copied().unwrap_or_default().to_string(),
            message,
        })
    }

    fn run_attached(&self, args: &[&str]) -> Result<(), MuxError> {
        let status = Command::new("tmux").args(args).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(MuxError::CommandFailed {
                command: args.first().copied().unwrap_or_default().to_string(),
                message: status.to_string(),
            })
        }
    }
}

/// Query and mutate operations the navigator needs from the multiplexer.
pub trait MuxBackend: Send + Sync {
    fn list_sessions(&self) -> Result<Vec<SessionRecord>, MuxError>;
    fn list_windows(&self, session: &str) -> Result<Vec<WindowRecord>, MuxError>;
    fn list_all_window_names(&self) -> Result<BTreeMap<String, Vec<String>>, MuxError>;
    fn list_panes(&self, session: &str, index: u32) -> Result<Vec<PaneRecord>, MuxError>;
    fn capture_pane(&self, session: &str, window: WindowRef, pane: u32)
    -> Result<String, MuxError>;

    fn switch_to_session(&self, session: &str) -> Result<(), MuxError>;
    fn switch_to_window(&self, session: &str, index: u32) -> Result<(), MuxError>;
    fn switch_to_last(&self) -> Result<(), MuxError>;
    fn attach_session(&self, session: &str, window: WindowRef) -> Result<(), MuxError>;

    fn has_session(&self, session: &str) -> bool;
    fn new_session(&self, name: &str) -> Result<(), MuxError>;
    fn new_session_in_dir(&self, name: &str, dir: &str) -> Result<(), MuxError>;
    fn rename_session(&self, from: &str, to: &str) -> Result<(), MuxError>;
    fn kill_session(&self, name: &str) -> Result<(), MuxError>;

    fn new_window(&self, session: &str, name: &str) -> Result<(), MuxError>;
    fn rename_window(&self, session: &str, index: u32, to: &str) -> Result<(), MuxError>;
    fn kill_window(&self, session: &str, index: u32) -> Result<(), MuxError>;

    fn is_in_tmux(&self) -> bool;
}

/// Captures the active pane of `window`. Window targets look the pane up
/// first since `pane-base-index` may leave no pane 0.
pub fn capture_active_pane(
    backend: &dyn MuxBackend,
    session: &str,
    window: WindowRef,
) -> Result<String, MuxError> {
    let pane = match window {
        WindowRef::Active => 0,
        WindowRef::Index(index) => backend
            .list_panes(session, index)?
            .into_iter()
            .find(|pane| pane.active)
            .map_or(0, |pane| pane.index),
    };
    backend.capture_pane(session, window, pane)
}

pub struct TmuxClient<E: CommandExecutor = TmuxExecutor> {
    executor: E,
    in_tmux: bool,
    current_session: Option<String>,
}

impl TmuxClient<TmuxExecutor> {
    /// Client for the real tmux binary. Inside tmux it remembers which
    /// session it runs in so kills can step out of it first.
    pub fn from_env() -> Self {
        let in_tmux = std::env::var_os("TMUX").is_some_and(|value| !value.is_empty());
        let mut client = Self::with_executor(TmuxExecutor, in_tmux);
        if in_tmux {
            client.current_session = client
                .executor
                .run(&["display-message", "-p", "#{session_name}"])
                .ok()
                .map(|out| out.trim().to_string())
                .filter(|name| !name.is_empty());
        }
        client
    }
}

impl<E: CommandExecutor> TmuxClient<E> {
    pub fn with_executor(executor: E, in_tmux: bool) -> Self {
        Self {
            executor,
            in_tmux,
            current_session: None,
        }
    }

    pub fn with_current_session(mut self, session: Option<String>) -> Self {
        self.current_session = session;
        self
    }

    fn run(&self, args: &[&str]) -> Result<String, MuxError> {
        self.executor.run(args).inspect_err(|error| {
            tracing::warn!(args = ?args, error = %error, "tmux command failed");
        })
    }

    fn step_out_of(&self, session: &str) {
        if self.current_session.as_deref() == Some(session) {
            let _ = self.run(&["switch-client", "-n"]);
        }
    }
}

impl<E: CommandExecutor> MuxBackend for TmuxClient<E> {
    fn list_sessions(&self) -> Result<Vec<SessionRecord>, MuxError> {
        let output = self.run(&["list-sessions", "-F", SESSION_FORMAT])?;
        let mut sessions = split_lines(&output)
            .filter_map(parse_session_line)
            .collect::<Vec<_>>();
        sessions.sort_by(|a, b| b.last_active.cmp(&a.last_active));
        Ok(sessions)
    }

    fn list_windows(&self, session: &str) -> Result<Vec<WindowRecord>, MuxError> {
        let output = self.run(&["list-windows", "-t", session, "-F", WINDOW_FORMAT])?;
        Ok(split_lines(&output).filter_map(parse_window_line).collect())
    }

    fn list_all_window_names(&self) -> Result<BTreeMap<String, Vec<String>>, MuxError> {
        let output = self.run(&["list-windows", "-a", "-F", "#{session_name}|#{window_name}"])?;
        let mut names = BTreeMap::<String, Vec<String>>::new();
        for line in split_lines(&output) {
            if let Some((session, window)) = line.split_once('|') {
                names
                    .entry(session.to_string())
                    .or_default()
                    .push(window.to_string());
            }
        }
        Ok(names)
    }

    fn list_panes(&self, session: &str, index: u32) -> Result<Vec<PaneRecord>, MuxError> {
        let target = format!("{session}:{index}");
        let output = self.run(&["list-panes", "-t", &target, "-F", PANE_FORMAT])?;
        Ok(split_lines(&output).filter_map(parse_pane_line).collect())
    }

    fn capture_pane(
        &self,
        session: &str,
        window: WindowRef,
        pane: u32,
    ) -> Result<String, MuxError> {
        let target = match window {
            WindowRef::Active => session.to_string(),
            WindowRef::Index(index) => format!("{session}:{index}.{pane}"),
        };
        self.run(&["capture-pane", "-t", &target, "-p"])
    }

    fn switch_to_session(&self, session: &str) -> Result<(), MuxError> {
        self.run(&["switch-client", "-t", session]).map(drop)
    }

    fn switch_to_window(&self, session: &str, index: u32) -> Result<(), MuxError> {
        let target = format!("{session}:{index}");
        self.run(&["switch-client", "-t", &target]).map(drop)
    }

    fn switch_to_last(&self) -> Result<(), MuxError> {
        self.run(&["switch-client", "-l"]).map(drop)
    }

    fn attach_session(&self, session: &str, window: WindowRef) -> Result<(), MuxError> {
        let target = match window {
            WindowRef::Active => session.to_string(),
            WindowRef::Index(index) => format!("{session}:{index}"),
        };
        self.executor.run_attached(&["attach-session", "-t", &target])
    }

    fn has_session(&self, session: &str) -> bool {
        let exact = format!("={session}");
        self.executor.run(&["has-session", "-t", &exact]).is_ok()
    }

    fn new_session(&self, name: &str) -> Result<(), MuxError> {
        self.run(&["new-session", "-d", "-s", name]).map(drop)
    }

    fn new_session_in_dir(&self, name: &str, dir: &str) -> Result<(), MuxError> {
        self.run(&["new-session", "-d", "-s", name, "-c", dir])
            .map(drop)
    }

    fn rename_session(&self, from: &str, to: &str) -> Result<(), MuxError> {
        self.run(&["rename-session", "-t", from, to]).map(drop)
    }

    fn kill_session(&self, name: &str) -> Result<(), MuxError> {
        self.step_out_of(name);
        self.run(&["kill-session", "-t", name]).map(drop)
    }

    fn new_window(&self, session: &str, name: &str) -> Result<(), MuxError> {
        let home = dirs::home_dir()
            .map(|home| home.to_string_lossy().into_owned())
            .unwrap_or_else(|| "~".to_string());
        self.run(&["new-window", "-t", session, "-n", name, "-c", &home])
            .map(drop)
    }

    fn rename_window(&self, session: &str, index: u32, to: &str) -> Result<(), MuxError> {
        let target = format!("{session}:{index}");
        self.run(&["rename-window", "-t", &target, to]).map(drop)
    }

    fn kill_window(&self, session: &str, index: u32) -> Result<(), MuxError> {
        self.step_out_of(session);
        let target = format!("{session}:{index}");
        self.run(&["kill-window", "-t", &target]).map(drop)
    }

    fn is_in_tmux(&self) -> bool {
        self.in_tmux
    }
}

fn split_lines(output: &str) -> impl Iterator<Item = &str> {
    output.lines().filter(|line| !line.trim().is_empty())
}

fn parse_session_line(line: &str) -> Option<SessionRecord> {
    let parts = line.split('|').collect::<Vec<_>>();
    if parts.len() < 7 {
        return None;
    }
    Some(SessionRecord {
        name: parts[0].to_string(),
        window_count: parts[1].trim().parse().ok()?,
        attached: parts[2].trim() != "0" && !parts[2].trim().is_empty(),
        created: parse_unix_time(parts[3]),
        last_active: parse_unix_time(parts[4]),
        width: parts[5].trim().parse().unwrap_or(0),
        height: parts[6].trim().parse().unwrap_or(0),
    })
}

fn parse_window_line(line: &str) -> Option<WindowRecord> {
    let parts = line.split('|').collect::<Vec<_>>();
    if parts.len() < 6 {
        return None;
    }
    Some(WindowRecord {
        index: parts[0].trim().parse().ok()?,
        name: parts[1].to_string(),
        pane_count: parts[2].trim().parse().unwrap_or(0),
        active: parts[3].trim() == "1",
        layout: parts[4].to_string(),
        working_dir: parts[5..].join("|"),
    })
}

fn parse_pane_line(line: &str) -> Option<PaneRecord> {
    let parts = line.split('|').collect::<Vec<_>>();
    if parts.len() < 6 {
        return None;
    }
    Some(PaneRecord {
        index: parts[0].trim().parse().ok()?,
        active: parts[1].trim() == "1",
        width: parts[2].trim().parse().unwrap_or(0),
        height: parts[3].trim().parse().unwrap_or(0),
        command: parts[4].to_string(),
        working_dir: parts[5..].join("|"),
    })
}

fn parse_unix_time(raw: &str) -> Option<OffsetDateTime> {
    let seconds = raw.trim().parse::<i64>().ok().filter(|seconds| *seconds > 0)?;
    OffsetDateTime::from_unix_timestamp(seconds).ok()
}
