use crate::domain::{SessionRecord, WindowRecord};
use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

/// Saved custom ordering of sessions and of windows within each session.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct OrderState {
    pub session_order: Vec<String>,
    pub window_order: BTreeMap<String, Vec<u32>>,
}

impl OrderState {
    pub fn apply_to_sessions(&self, sessions: Vec<SessionRecord>) -> Vec<SessionRecord> {
        apply_saved_order(sessions, &self.session_order, |session| {
            session.name.clone()
        })
    }

    pub fn apply_to_windows(&self, session: &str, windows: Vec<WindowRecord>) -> Vec<WindowRecord> {
        match self.window_order.get(session) {
            Some(order) => apply_saved_order(windows, order, |window| window.index),
            None => windows,
        }
    }

    pub fn set_session_order(&mut self, order: Vec<String>) {
        self.session_order = order;
    }

    pub fn set_window_order(&mut self, session: &str, order: Vec<u32>) {
        self.window_order.insert(session.to_string(), order);
    }
}

/// Saved keys first (stale ones skipped), then every unsaved live item in
/// its incoming order.
pub fn apply_saved_order<T, K, F>(items: Vec<T>, order: &[K], key_of: F) -> Vec<T>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    if order.is_empty() {
        return items;
    }

    let mut slots = items.into_iter().map(Some).collect::<Vec<_>>();
    let mut result = Vec::with_capacity(slots.len());
    for wanted in order {
        let found = slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|item| key_of(item) == *wanted));
        if let Some(position) = found {
            if let Some(item) = slots[position].take() {
                result.push(item);
            }
        }
    }
    result.extend(slots.into_iter().flatten());
    result
}

/// Writes the order of `displayed` (a reordered subset of `canonical`) back
/// into the canonical slots those items occupy. Items outside the subset
/// keep their positions.
pub fn merge_subset_order<T, K, F>(canonical: &[T], displayed: &[T], key_of: F) -> Vec<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let shown = displayed.iter().map(&key_of).collect::<HashSet<_>>();
    let mut replacements = displayed.iter();
    canonical
        .iter()
        .map(|item| {
            if shown.contains(&key_of(item)) {
                replacements.next().cloned().unwrap_or_else(|| item.clone())
            } else {
                item.clone()
            }
        })
        .collect()
}
