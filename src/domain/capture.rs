use unicode_width::UnicodeWidthChar;

/// Cleans raw `capture-pane` output: drops carriage returns, right-trims the
/// width padding tmux adds to every line and removes trailing blank lines.
pub fn normalize_capture(raw: &str) -> String {
    let mut lines = raw
        .split('\n')
        .map(|line| line.replace('\r', "").trim_end().to_string())
        .collect::<Vec<_>>();
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Cuts `line` so its display width is at most `width` columns.
pub fn clip_to_width(line: &str, width: usize) -> &str {
    let mut used = 0usize;
    for (byte_index, ch) in line.char_indices() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + ch_width > width {
            return &line[..byte_index];
        }
        used += ch_width;
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_carriage_returns_and_padding() {
        assert_eq!(normalize_capture("foo   \r\nbar  \r\n"), "foo\nbar");
    }

    #[test]
    fn keeps_inner_blank_lines() {
        assert_eq!(normalize_capture("a\n\nb\n\n\n"), "a\n\nb");
    }

    #[test]
    fn clips_by_display_width() {
        assert_eq!(clip_to_width("hello", 3), "hel");
        assert_eq!(clip_to_width("日本語", 4), "日本");
        assert_eq!(clip_to_width("日本語", 5), "日本");
        assert_eq!(clip_to_width("ok", 10), "ok");
        assert_eq!(clip_to_width("ok", 0), "");
    }
}
