use crate::domain::{SessionRecord, WindowRecord};
use time::OffsetDateTime;

/// What a grid card shows. Built on demand for rendering and never fed back
/// into state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DisplayItem {
    pub title: String,
    pub subtitle: Vec<String>,
    pub indicator: bool,
}

pub trait CardSource {
    fn display_item(&self, now: OffsetDateTime) -> DisplayItem;
}

impl CardSource for SessionRecord {
    fn display_item(&self, now: OffsetDateTime) -> DisplayItem {
        let activity = match format_time_since(self.last_active, now).as_str() {
            "now" => "just now".to_string(),
            "?" => "? ago".to_string(),
            since => format!("{since} ago"),
        };
        DisplayItem {
            title: self.name.clone(),
            subtitle: vec![format!("{} wins", self.window_count), activity],
            indicator: self.attached,
        }
    }
}

impl CardSource for WindowRecord {
    fn display_item(&self, _now: OffsetDateTime) -> DisplayItem {
        DisplayItem {
            title: window_title(self),
            subtitle: vec![format!("{} pane(s)", self.pane_count)],
            indicator: self.active,
        }
    }
}

pub fn window_title(window: &WindowRecord) -> String {
    format!("{}: {}", window.index, window.name)
}

/// Compact relative age: `now`, `12m`, `3h`, `2d`, or `?` when unknown.
pub fn format_time_since(moment: Option<OffsetDateTime>, now: OffsetDateTime) -> String {
    let Some(moment) = moment else {
        return "?".to_string();
    };
    let seconds = (now - moment).whole_seconds().max(0);
    if seconds < 60 {
        return "now".to_string();
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h");
    }
    format!("{}d", hours / 24)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::Duration;

    fn session(last_active: Option<OffsetDateTime>) -> SessionRecord {
        SessionRecord {
            name: "proj".to_string(),
            window_count: 3,
            attached: true,
            created: None,
            last_active,
            width: 80,
            height: 24,
        }
    }

    #[test]
    fn session_card_shows_window_count_and_age() {
        let now = OffsetDateTime::UNIX_EPOCH + Duration::days(10);
        let item = session(Some(now - Duration::hours(5))).display_item(now);
        assert_eq!(item.title, "proj");
        assert_eq!(item.subtitle, vec!["3 wins".to_string(), "5h ago".to_string()]);
        assert!(item.indicator);
    }

    #[test]
    fn unknown_activity_uses_placeholder() {
        let now = OffsetDateTime::UNIX_EPOCH + Duration::days(1);
        let item = session(None).display_item(now);
        assert_eq!(item.subtitle[1], "? ago");
    }

    #[test]
    fn window_card_title_includes_index() {
        let window = WindowRecord {
            index: 2,
            name: "vim".to_string(),
            pane_count: 1,
            active: false,
            layout: String::new(),
            working_dir: String::new(),
        };
        let item = window.display_item(OffsetDateTime::UNIX_EPOCH);
        assert_eq!(item.title, "2: vim");
        assert_eq!(item.subtitle, vec!["1 pane(s)".to_string()]);
        assert!(!item.indicator);
    }

    #[test]
    fn relative_age_buckets() {
        let now = OffsetDateTime::UNIX_EPOCH + Duration::days(30);
        assert_eq!(format_time_since(Some(now - Duration::seconds(5)), now), "now");
        assert_eq!(format_time_since(Some(now - Duration::minutes(12)), now), "12m");
        assert_eq!(format_time_since(Some(now - Duration::days(3)), now), "3d");
        assert_eq!(format_time_since(Some(now + Duration::minutes(1)), now), "now");
    }
}
