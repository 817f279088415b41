use std::path::Path;

/// Session name for a directory: its basename with `.` and spaces turned into
/// `-` (tmux rejects dots in session names). Falls back to `parent-child`
/// when the basename normalizes to nothing.
pub fn normalize_session_name(dir: &Path) -> String {
    let base = dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = clean(&base);
    if !name.is_empty() {
        return name;
    }

    let parent = dir
        .parent()
        .and_then(Path::file_name)
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = clean(&format!("{parent}-{base}"));
    if name.is_empty() {
        "session".to_string()
    } else {
        name
    }
}

fn clean(name: &str) -> String {
    name.replace(['.', ' '], "-")
        .trim_start_matches('-')
        .to_string()
}
