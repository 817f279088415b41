//! Scripted in-memory backend shared by the state-machine and CLI tests.

use crate::domain::{PaneRecord, SessionRecord, WindowRecord, WindowRef};
use crate::infra::{MuxBackend, MuxError};
use std::collections::BTreeMap;
use std::sync::Mutex;

/// In-memory tmux stand-in that records mutating calls.
#[derive(Default)]
pub(crate) struct FakeBackend {
    pub sessions: Mutex<Vec<SessionRecord>>,
    pub windows: Mutex<BTreeMap<String, Vec<WindowRecord>>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_mutations: bool,
    pub in_tmux: bool,
}

impl FakeBackend {
    pub(crate) fn with_sessions(names: &[&str]) -> Self {
        let sessions = names
            .iter()
            .map(|name| SessionRecord {
                name: name.to_string(),
                window_count: 1,
                attached: false,
                created: None,
                last_active: None,
                width: 80,
                height: 24,
            })
            .collect();
        Self {
            sessions: Mutex::new(sessions),
            in_tmux: true,
            ..Self::default()
        }
    }

    fn record(&self, call: String) -> Result<(), MuxError> {
        self.calls.lock().expect("calls").push(call);
        if self.fail_mutations {
            return Err(MuxError::CommandFailed {
                command: "fake".to_string(),
                message: "refused".to_string(),
            });
        }
        Ok(())
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }
}

pub(crate) fn window(index: u32, name: &str) -> WindowRecord {
    WindowRecord {
        index,
        name: name.to_string(),
        pane_count: 1,
        active: false,
        layout: String::new(),
        working_dir: String::new(),
    }
}

impl MuxBackend for FakeBackend {
    fn list_sessions(&self) -> Result<Vec<SessionRecord>, MuxError> {
        Ok(self.sessions.lock().expect("sessions").clone())
    }

    fn list_windows(&self, session: &str) -> Result<Vec<WindowRecord>, MuxError> {
        self.windows
            .lock()
            .expect("windows")
            .get(session)
            .cloned()
            .ok_or_else(|| MuxError::CommandFailed {
                command: "list-windows".to_string(),
                message: format!("can't find session: {session}"),
            })
    }

    fn list_all_window_names(&self) -> Result<BTreeMap<String, Vec<String>>, MuxError> {
        Ok(self
            .windows
            .lock()
            .expect("windows")
            .iter()
            .map(|(session, windows)| {
                (session.clone(), windows.iter().map(|w| w.name.clone()).collect())
            })
            .collect())
    }

    fn list_panes(&self, _session: &str, _index: u32) -> Result<Vec<PaneRecord>, MuxError> {
        Ok(Vec::new())
    }

    fn capture_pane(&self, session: &str, _window: WindowRef, _pane: u32) -> Result<String, MuxError> {
        Ok(format!("content of {session}"))
    }

    fn switch_to_session(&self, session: &str) -> Result<(), MuxError> {
        self.record(format!("switch {session}"))
    }

    fn switch_to_window(&self, session: &str, index: u32) -> Result<(), MuxError> {
        self.record(format!("switch {session}:{index}"))
    }

    fn switch_to_last(&self) -> Result<(), MuxError> {
        self.record("switch last".to_string())
    }

    fn attach_session(&self, session: &str, _window: WindowRef) -> Result<(), MuxError> {
        self.record(format!("attach {session}"))
    }

    fn has_session(&self, session: &str) -> bool {
        self.sessions
            .lock()
            .expect("sessions")
            .iter()
            .any(|s| s.name == session)
    }

    fn new_session(&self, name: &str) -> Result<(), MuxError> {
        self.record(format!("new-session {name}"))?;
        let mut sessions = self.sessions.lock().expect("sessions");
        sessions.push(SessionRecord {
            name: name.to_string(),
            window_count: 1,
            attached: false,
            created: None,
            last_active: None,
            width: 80,
            height: 24,
        });
        Ok(())
    }

    fn new_session_in_dir(&self, name: &str, dir: &str) -> Result<(), MuxError> {
        self.record(format!("new-session {name} in {dir}"))
    }

    fn rename_session(&self, from: &str, to: &str) -> Result<(), MuxError> {
        self.record(format!("rename-session {from} {to}"))?;
        for session in self.sessions.lock().expect("sessions").iter_mut() {
            if session.name == from {
                session.name = to.to_string();
            }
        }
        Ok(())
    }

    fn kill_session(&self, name: &str) -> Result<(), MuxError> {
        self.record(format!("kill-session {name}"))?;
        self.sessions.lock().expect("sessions").retain(|s| s.name != name);
        Ok(())
    }

    fn new_window(&self, session: &str, name: &str) -> Result<(), MuxError> {
        self.record(format!("new-window {session} {name}"))?;
        let mut windows = self.windows.lock().expect("windows");
        let list = windows.entry(session.to_string()).or_default();
        let next = list.iter().map(|w| w.index + 1).max().unwrap_or(0);
        list.push(window(next, name));
        Ok(())
    }

    fn rename_window(&self, session: &str, index: u32, to: &str) -> Result<(), MuxError> {
        self.record(format!("rename-window {session}:{index} {to}"))
    }

    fn kill_window(&self, session: &str, index: u32) -> Result<(), MuxError> {
        self.record(format!("kill-window {session}:{index}"))?;
        if let Some(list) = self.windows.lock().expect("windows").get_mut(session) {
            list.retain(|w| w.index != index);
        }
        Ok(())
    }

    fn is_in_tmux(&self) -> bool {
        self.in_tmux
    }
}
