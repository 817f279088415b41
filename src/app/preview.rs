use crate::domain::{PreviewMode, SessionRecord, WindowRecord, WindowRef, window_title};
use time::OffsetDateTime;
use time::macros::format_description;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PreviewBody {
    Empty,
    Metadata {
        heading: String,
        fields: Vec<(&'static str, String)>,
    },
    Capture(String),
}

/// Pane capture the event loop should start in the background.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaptureRequest {
    pub seq: u64,
    pub session: String,
    pub window: WindowRef,
}

/// Preview panel state. Capture results are fenced by sequence number: only
/// the answer to the latest request is shown.
#[derive(Clone, Debug)]
pub struct PreviewCoordinator {
    mode: PreviewMode,
    title: &'static str,
    body: PreviewBody,
    latest_seq: u64,
    pending: Option<CaptureRequest>,
}

impl PreviewCoordinator {
    pub fn new(mode: PreviewMode) -> Self {
        Self {
            mode,
            title: "Preview",
            body: PreviewBody::Empty,
            latest_seq: 0,
            pending: None,
        }
    }

    pub fn mode(&self) -> PreviewMode {
        self.mode
    }

    pub fn title(&self) -> &'static str {
        self.title
    }

    pub fn body(&self) -> &PreviewBody {
        &self.body
    }

    pub fn toggle_mode(&mut self) {
        self.mode = self.mode.toggle();
        tracing::debug!(mode = self.mode.label(), "preview mode toggled");
    }

    pub fn clear(&mut self) {
        self.body = PreviewBody::Empty;
        self.pending = None;
    }

    pub fn show_session_metadata(&mut self, session: &SessionRecord) {
        self.title = "Session";
        self.body = PreviewBody::Metadata {
            heading: session.name.clone(),
            fields: vec![
                ("Windows:", session.window_count.to_string()),
                ("Attached:", yes_no(session.attached)),
                ("Created:", format_timestamp(session.created)),
                ("Last Active:", format_timestamp(session.last_active)),
            ],
        };
    }

    pub fn show_window_metadata(&mut self, window: &WindowRecord) {
        self.title = "Window";
        let mut fields = vec![
            ("Panes:", window.pane_count.to_string()),
            ("Active:", yes_no(window.active)),
            ("Layout:", window.layout.clone()),
        ];
        if !window.working_dir.is_empty() {
            fields.push(("Dir:", window.working_dir.clone()));
        }
        self.body = PreviewBody::Metadata {
            heading: window_title(window),
            fields,
        };
    }

    /// Clears the panel and queues a fetch for `session`/`window`,
    /// superseding any request still in flight.
    pub fn request_capture(&mut self, session: &str, window: WindowRef) {
        self.latest_seq += 1;
        self.title = "Capture";
        self.body = PreviewBody::Empty;
        self.pending = Some(CaptureRequest {
            seq: self.latest_seq,
            session: session.to_string(),
            window,
        });
    }

    pub fn take_pending(&mut self) -> Option<CaptureRequest> {
        self.pending.take()
    }

    /// Shows a finished capture. Returns false when the result is stale or
    /// capture mode was left in the meantime.
    pub fn apply_capture(&mut self, seq: u64, content: String) -> bool {
        if seq != self.latest_seq || self.mode != PreviewMode::Capture {
            tracing::debug!(seq, latest = self.latest_seq, "dropping stale capture");
            return false;
        }
        self.body = PreviewBody::Capture(content);
        true
    }
}

fn yes_no(value: bool) -> String {
    if value { "yes" } else { "no" }.to_string()
}

pub fn format_timestamp(moment: Option<OffsetDateTime>) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]");
    moment
        .filter(|moment| *moment != OffsetDateTime::UNIX_EPOCH)
        .and_then(|moment| moment.format(&format).ok())
        .unwrap_or_else(|| "?".to_string())
}
