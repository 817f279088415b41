use crate::domain::{SessionRecord, WindowRecord};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use std::collections::BTreeMap;

/// Indices of `candidates` that match `query`, best score first. Equal
/// scores keep their input order.
pub fn fuzzy_find(query: &str, candidates: &[String]) -> Vec<usize> {
    let matcher = SkimMatcherV2::default();
    let mut scored = candidates
        .iter()
        .enumerate()
        .filter_map(|(index, candidate)| {
            matcher
                .fuzzy_match(candidate, query)
                .map(|score| (index, score))
        })
        .collect::<Vec<_>>();
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.into_iter().map(|(index, _)| index).collect()
}

/// Sessions whose name, or any of whose window names, match `term`.
pub fn filter_sessions(
    sessions: &[SessionRecord],
    term: &str,
    window_names: &BTreeMap<String, Vec<String>>,
) -> Vec<SessionRecord> {
    if term.is_empty() {
        return sessions.to_vec();
    }

    let haystacks = sessions
        .iter()
        .map(|session| {
            let mut haystack = session.name.clone();
            for name in window_names.get(&session.name).into_iter().flatten() {
                haystack.push(' ');
                haystack.push_str(name);
            }
            haystack
        })
        .collect::<Vec<_>>();

    fuzzy_find(term, &haystacks)
        .into_iter()
        .map(|index| sessions[index].clone())
        .collect()
}

pub fn filter_windows(windows: &[WindowRecord], term: &str) -> Vec<WindowRecord> {
    if term.is_empty() {
        return windows.to_vec();
    }

    let names = windows
        .iter()
        .map(|window| window.name.clone())
        .collect::<Vec<_>>();
    fuzzy_find(term, &names)
        .into_iter()
        .map(|index| windows[index].clone())
        .collect()
}
