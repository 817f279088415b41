use crate::domain::WindowRef;
use std::collections::BTreeMap;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MarkTarget {
    pub session: String,
    pub window: WindowRef,
}

impl MarkTarget {
    pub fn new(session: impl Into<String>, window: WindowRef) -> Self {
        Self {
            session: session.into(),
            window,
        }
    }

    fn is(&self, session: &str, window: WindowRef) -> bool {
        self.session == session && self.window == window
    }
}

/// Single-key bookmarks. Each target carries at most one key: setting a mark
/// drops any other key that pointed at the same target.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MarkRegistry {
    marks: BTreeMap<String, MarkTarget>,
}

impl MarkRegistry {
    /// Builds a registry from persisted entries. Duplicate targets keep the
    /// first key in key order.
    pub fn from_entries(entries: impl IntoIterator<Item = (String, MarkTarget)>) -> Self {
        let sorted = entries.into_iter().collect::<BTreeMap<_, _>>();
        let mut registry = Self::default();
        for (key, target) in sorted {
            let taken = registry
                .marks
                .values()
                .any(|existing| existing.is(&target.session, target.window));
            if taken {
                tracing::warn!(key = %key, session = %target.session, "dropping duplicate mark for target");
                continue;
            }
            registry.marks.insert(key, target);
        }
        registry
    }

    pub fn set_mark(&mut self, key: &str, session: &str, window: WindowRef) {
        self.marks
            .retain(|existing_key, target| existing_key == key || !target.is(session, window));
        self.marks
            .insert(key.to_string(), MarkTarget::new(session, window));
    }

    /// Deletes every key pointing at exactly this target; returns how many.
    pub fn remove_marks_for_target(&mut self, session: &str, window: WindowRef) -> usize {
        let before = self.marks.len();
        self.marks.retain(|_, target| !target.is(session, window));
        before - self.marks.len()
    }

    pub fn get_mark(&self, key: &str) -> Option<&MarkTarget> {
        self.marks.get(key)
    }

    pub fn has_mark(&self, key: &str) -> bool {
        self.marks.contains_key(key)
    }

    /// Keys whose target lives in `session`, at session or window level.
    pub fn session_marks(&self, session: &str) -> Vec<&str> {
        self.marks
            .iter()
            .filter(|(_, target)| target.session == session)
            .map(|(key, _)| key.as_str())
            .collect()
    }

    /// Keys pointing at one exact window of `session`.
    pub fn window_marks(&self, session: &str, index: u32) -> Vec<&str> {
        self.marks
            .iter()
            .filter(|(_, target)| target.is(session, WindowRef::Index(index)))
            .map(|(key, _)| key.as_str())
            .collect()
    }

    pub fn session_badge(&self, session: &str) -> Option<String> {
        join_badge(self.session_marks(session))
    }

    pub fn window_badge(&self, session: &str, index: u32) -> Option<String> {
        join_badge(self.window_marks(session, index))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MarkTarget)> {
        self.marks.iter()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

fn join_badge(keys: Vec<&str>) -> Option<String> {
    if keys.is_empty() {
        None
    } else {
        Some(keys.join(","))
    }
}
