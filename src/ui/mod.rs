mod theme;

use crate::app::{
    AppModel, CARD_CHROME_WIDTH, CARD_GAP, CARD_HEIGHT, ConfirmChoice, Dialog, DialogKind,
    GridLayout, Level, Mode, PreviewBody, StatusKind, layout_sizes,
};
use crate::domain::{Action, CardSource, DisplayItem, KeyMap, PreviewMode, clip_to_width};
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::time::Instant;
use time::OffsetDateTime;
use unicode_width::UnicodeWidthStr;

const INDICATOR: &str = "● ";
const METADATA_LABEL_WIDTH: usize = 13;

pub fn render(frame: &mut Frame, model: &AppModel) {
    let area = frame.area();
    if area.width == 0 || area.height == 0 {
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(frame, chunks[0], model);
    render_body(frame, chunks[1], model);
    render_status_bar(frame, chunks[2], model);

    match &model.mode {
        Mode::Dialog(dialog) => render_dialog(frame, area, dialog),
        Mode::Help => render_help_overlay(frame, area, &model.keymap),
        _ => {}
    }
}

fn render_header(frame: &mut Frame, area: Rect, model: &AppModel) {
    let title_style = Style::default()
        .fg(theme::ACCENT)
        .add_modifier(Modifier::BOLD);
    let spans = match (model.level, &model.current_session) {
        (Level::Windows, Some(session)) => vec![
            Span::styled(" Sessions > ", Style::default().fg(theme::MUTED)),
            Span::styled(session.clone(), title_style),
        ],
        _ => vec![Span::styled(" Sessions", title_style)],
    };
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_body(frame: &mut Frame, area: Rect, model: &AppModel) {
    if area.height == 0 {
        return;
    }
    let sizes = layout_sizes(model.level, area.width, area.height.saturating_add(2));
    let grid_area = Rect {
        width: sizes.grid_width.min(area.width),
        ..area
    };
    let preview_x = area
        .x
        .saturating_add(sizes.grid_width)
        .saturating_add(CARD_GAP);
    let preview_area = Rect {
        x: preview_x,
        width: sizes.preview_width,
        ..area
    }
    .intersection(area);

    match (model.level, &model.current_session) {
        (Level::Sessions, _) => {
            let empty = empty_grid_text(model, "No tmux sessions");
            render_grid(frame, grid_area, &model.session_grid, empty, |session| {
                model.state.marks.session_badge(&session.name)
            });
        }
        (Level::Windows, session) => {
            let empty = empty_grid_text(model, "No windows");
            render_grid(frame, grid_area, &model.window_grid, empty, |window| {
                session.as_deref().and_then(|session| {
                    model.state.marks.window_badge(session, window.index)
                })
            });
        }
    }

    if !preview_area.is_empty() {
        render_preview(frame, preview_area, model);
    }
}

fn empty_grid_text<'a>(model: &AppModel, fallback: &'a str) -> &'a str {
    if model.filter_query().is_empty() {
        fallback
    } else {
        "No matches"
    }
}

fn render_grid<T: CardSource>(
    frame: &mut Frame,
    area: Rect,
    grid: &GridLayout<T>,
    empty: &str,
    badge: impl Fn(&T) -> Option<String>,
) {
    if grid.is_empty() {
        let paragraph = Paragraph::new(format!(" {empty}")).style(Style::default().fg(theme::DIM));
        frame.render_widget(paragraph, area);
        return;
    }

    let now = OffsetDateTime::now_utc();
    let card_width = grid.card_content_width().saturating_add(CARD_CHROME_WIDTH);
    let slot_width = card_width.saturating_add(CARD_GAP);
    let columns = grid.columns().max(1);

    for (index, item) in grid.visible_items() {
        let row = (index / columns).saturating_sub(grid.scroll_offset());
        let col = index % columns;
        let card = Rect {
            x: step(area.x, slot_width, col),
            y: step(area.y, CARD_HEIGHT, row),
            width: card_width,
            height: CARD_HEIGHT,
        }
        .intersection(area);
        if card.is_empty() {
            continue;
        }
        let focused = index == grid.focus_index();
        render_card(frame, card, &item.display_item(now), badge(item).as_deref(), focused);
    }
}

fn step(base: u16, size: u16, count: usize) -> u16 {
    let count = u16::try_from(count).unwrap_or(u16::MAX);
    base.saturating_add(size.saturating_mul(count))
}

fn render_card(frame: &mut Frame, area: Rect, item: &DisplayItem, badge: Option<&str>, focused: bool) {
    let border_style = if focused {
        Style::default().fg(theme::ACCENT)
    } else {
        Style::default().fg(theme::BORDER)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border_style)
        .padding(Padding::horizontal(1));
    let width = usize::from(block.inner(area).width);

    let mut lines = vec![compose_title_line(
        &item.title,
        item.indicator,
        badge,
        width,
        focused,
    )];
    for subtitle in &item.subtitle {
        lines.push(Line::styled(
            truncate_end(subtitle, width),
            Style::default().fg(theme::MUTED),
        ));
    }

    let mut paragraph = Paragraph::new(lines).block(block);
    if focused {
        paragraph = paragraph.style(Style::default().bg(theme::ACCENT_BG));
    }
    frame.render_widget(paragraph, area);
}

/// Title row of a card: optional indicator, the title truncated to what is
/// left, and a right-aligned `[badge]` separated by at least one space.
fn compose_title_line(
    title: &str,
    indicator: bool,
    badge: Option<&str>,
    width: usize,
    focused: bool,
) -> Line<'static> {
    let indicator_width = if indicator {
        UnicodeWidthStr::width(INDICATOR)
    } else {
        0
    };
    let badge = badge.map(|keys| format!("[{keys}]"));
    let badge_width = badge
        .as_deref()
        .map(|badge| UnicodeWidthStr::width(badge) + 1)
        .unwrap_or(0);

    let available = width.saturating_sub(indicator_width + badge_width);
    let title = truncate_end(title, available);
    let title_style = if focused {
        Style::default().fg(theme::FG).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme::FG)
    };

    let mut spans = Vec::new();
    if indicator {
        spans.push(Span::styled(INDICATOR, Style::default().fg(theme::SUCCESS)));
    }
    let used = indicator_width + UnicodeWidthStr::width(title.as_str());
    spans.push(Span::styled(title, title_style));
    if let Some(badge) = badge {
        let gap = width
            .saturating_sub(used + UnicodeWidthStr::width(badge.as_str()))
            .max(1);
        spans.push(Span::raw(" ".repeat(gap)));
        spans.push(Span::styled(
            badge,
            Style::default().fg(theme::MARK).add_modifier(Modifier::BOLD),
        ));
    }
    Line::from(spans)
}

fn render_preview(frame: &mut Frame, area: Rect, model: &AppModel) {
    let preview = &model.preview;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::BORDER))
        .padding(Padding::horizontal(1))
        .title(Span::styled(
            format!(" {} ", preview.title()),
            Style::default().fg(theme::MUTED),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let lines = preview_lines(
        preview.body(),
        preview.mode() == PreviewMode::Capture && model.focused_target().is_some(),
        usize::from(inner.width),
        usize::from(inner.height),
    );
    frame.render_widget(Paragraph::new(lines), inner);
}

fn preview_lines(body: &PreviewBody, loading: bool, width: usize, height: usize) -> Vec<Line<'static>> {
    match body {
        PreviewBody::Empty if loading => {
            vec![Line::styled("Loading…", Style::default().fg(theme::DIM))]
        }
        PreviewBody::Empty => Vec::new(),
        PreviewBody::Metadata { heading, fields } => {
            let mut lines = vec![
                Line::styled(
                    truncate_end(heading, width),
                    Style::default()
                        .fg(theme::ACCENT)
                        .add_modifier(Modifier::BOLD),
                ),
                Line::from(""),
            ];
            for (label, value) in fields {
                let text = format!("{label:<METADATA_LABEL_WIDTH$}{value}");
                lines.push(Line::styled(
                    clip_to_width(&text, width).to_string(),
                    Style::default().fg(theme::FG),
                ));
            }
            lines
        }
        PreviewBody::Capture(content) => content
            .lines()
            .take(height)
            .map(|line| Line::raw(clip_to_width(line, width).to_string()))
            .collect(),
    }
}

fn render_status_bar(frame: &mut Frame, area: Rect, model: &AppModel) {
    let base = Style::default().fg(theme::DIM).bg(theme::BAR_BG);
    let line = status_line(model, Instant::now());
    frame.render_widget(Paragraph::new(line).style(base), area);
}

fn status_line(model: &AppModel, now: Instant) -> Line<'static> {
    let hint_style = Style::default().fg(theme::DIM);
    let success_style = Style::default().fg(theme::SUCCESS);

    if model.mode == Mode::Filtering {
        return Line::from(vec![
            Span::styled(" /", hint_style),
            Span::styled(format!(" {}█", model.filter_query()), success_style),
            Span::styled("  esc:clear  enter:keep", hint_style),
        ]);
    }

    let mut spans = vec![Span::styled(
        format!(" {}", status_hints(&model.keymap, model.level)),
        hint_style,
    )];
    if !model.filter_query().is_empty() {
        spans.push(Span::styled(format!("  /{}", model.filter_query()), success_style));
    } else if model.mode == Mode::Marking {
        spans.push(Span::styled(
            "  Press a key to assign mark (ESC to cancel)",
            success_style,
        ));
    } else if let Some(status) = model.visible_status(now) {
        let style = match status.kind {
            StatusKind::Info => success_style,
            StatusKind::Error => Style::default().fg(theme::ERROR),
        };
        spans.push(Span::styled(format!("  {}", status.text), style));
    }
    Line::from(spans)
}

fn primary_key(keymap: &KeyMap, action: Action) -> String {
    keymap
        .keys_for(action)
        .first()
        .map(|key| (*key).to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn status_hints(keymap: &KeyMap, level: Level) -> String {
    let key = |action| primary_key(keymap, action);
    let nav = format!("{}/{}:nav", key(Action::MoveDown), key(Action::MoveUp));
    match level {
        Level::Sessions => format!(
            "{nav}  {}:select  {}:quick  {}:search  {}:new  {}:rename  {}:kill  {}:mark  {}:help  {}:quit",
            key(Action::Confirm),
            key(Action::QuickSwap),
            key(Action::Filter),
            key(Action::New),
            key(Action::Rename),
            key(Action::Kill),
            key(Action::StartMark),
            key(Action::ToggleHelp),
            key(Action::Quit),
        ),
        Level::Windows => format!(
            "{nav}  {}:switch  {}:search  {}:new  {}:rename  {}:kill  {}:mark  {}:back  {}:help  {}:quit",
            key(Action::Confirm),
            key(Action::Filter),
            key(Action::New),
            key(Action::Rename),
            key(Action::Kill),
            key(Action::StartMark),
            key(Action::Back),
            key(Action::ToggleHelp),
            key(Action::Quit),
        ),
    }
}

fn render_dialog(frame: &mut Frame, area: Rect, dialog: &Dialog) {
    let popup = centered_fixed(54, 7, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme::ACCENT))
        .padding(Padding::horizontal(1))
        .title(Span::styled(
            format!(" {} ", dialog.title),
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);
    let width = usize::from(inner.width);

    let mut lines = vec![Line::raw(truncate_end(&dialog.message, width)), Line::from("")];
    let hint = match &dialog.kind {
        DialogKind::Input { editor } => {
            let (before, after) = split_at_char(editor.text(), editor.cursor());
            lines.push(Line::from(vec![
                Span::styled("> ", Style::default().fg(theme::DIM)),
                Span::styled(before.to_string(), Style::default().fg(theme::FG)),
                Span::styled("█", Style::default().fg(theme::ACCENT)),
                Span::styled(after.to_string(), Style::default().fg(theme::FG)),
            ]));
            "enter:confirm  esc:cancel"
        }
        DialogKind::Confirm { choice } => {
            let button = |label: &'static str, selected: bool| {
                let style = if selected {
                    Style::default()
                        .fg(theme::ACCENT)
                        .add_modifier(Modifier::REVERSED | Modifier::BOLD)
                } else {
                    Style::default().fg(theme::MUTED)
                };
                Span::styled(label, style)
            };
            lines.push(
                Line::from(vec![
                    button("[ Yes ]", *choice == ConfirmChoice::Yes),
                    Span::raw("   "),
                    button("[ No ]", *choice == ConfirmChoice::No),
                ])
                .alignment(Alignment::Center),
            );
            "←/→ choose  enter confirm  y/n  esc cancel"
        }
    };
    lines.push(Line::from(""));
    lines.push(Line::styled(hint, Style::default().fg(theme::DIM)).alignment(Alignment::Center));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn split_at_char(text: &str, cursor: usize) -> (&str, &str) {
    let at = text
        .char_indices()
        .nth(cursor)
        .map(|(index, _)| index)
        .unwrap_or(text.len());
    text.split_at(at)
}

fn help_sections(keymap: &KeyMap) -> Vec<(&'static str, Vec<(String, &'static str)>)> {
    let label = |action| keymap.label_for(action);
    let group = |actions: &[Action]| {
        actions
            .iter()
            .map(|action| keymap.label_for(*action))
            .collect::<Vec<_>>()
            .join(" ")
    };
    vec![
        (
            "Navigation",
            vec![
                (
                    group(&[Action::MoveLeft, Action::MoveDown, Action::MoveUp, Action::MoveRight]),
                    "Move between cards",
                ),
                (label(Action::Confirm), "Drill into session / Switch to window"),
                (label(Action::QuickSwap), "Quick switch to session"),
                (label(Action::Back), "Go back / Quit"),
            ],
        ),
        (
            "Marks",
            vec![
                (
                    format!("{} + key", label(Action::StartMark)),
                    "Mark focused item with a key",
                ),
                ("key".to_string(), "Jump to marked session/window"),
            ],
        ),
        (
            "Management",
            vec![
                (label(Action::New), "New session / window"),
                (label(Action::Rename), "Rename session / window"),
                (label(Action::Kill), "Kill session / window"),
                (
                    group(&[
                        Action::ReorderLeft,
                        Action::ReorderDown,
                        Action::ReorderUp,
                        Action::ReorderRight,
                    ]),
                    "Move focused card",
                ),
                (label(Action::BrowseDirs), "Open a directory as a session"),
            ],
        ),
        (
            "Search & UI",
            vec![
                (label(Action::Filter), "Search (fuzzy filter)"),
                (label(Action::TogglePreview), "Toggle preview mode"),
                (label(Action::ToggleHelp), "Toggle this help"),
                (label(Action::Quit), "Quit"),
            ],
        ),
    ]
}

fn render_help_overlay(frame: &mut Frame, area: Rect, keymap: &KeyMap) {
    let popup = centered_rect(74, 80, area);
    frame.render_widget(Clear, popup);

    let sections = help_sections(keymap);
    let key_width = sections
        .iter()
        .flat_map(|(_, rows)| rows.iter())
        .map(|(keys, _)| UnicodeWidthStr::width(keys.as_str()))
        .max()
        .unwrap_or(0)
        + 2;

    let mut text = Vec::new();
    for (index, (title, rows)) in sections.into_iter().enumerate() {
        if index > 0 {
            text.push(Line::from(""));
        }
        text.push(Line::styled(
            title,
            Style::default()
                .fg(theme::ACCENT)
                .add_modifier(Modifier::BOLD),
        ));
        for (keys, description) in rows {
            text.push(Line::from(vec![
                Span::styled(format!("  {keys:<key_width$}"), Style::default().fg(theme::FG)),
                Span::styled(description, Style::default().fg(theme::MUTED)),
            ]));
        }
    }

    let close = format!(
        " tswitch help ({} to close) ",
        keymap.label_for(Action::ToggleHelp)
    );
    let paragraph = Paragraph::new(text).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::BORDER))
            .padding(Padding::horizontal(1))
            .title(close),
    );
    frame.render_widget(paragraph, popup);
}

fn truncate_end(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    let ellipsis = "…";
    let available = max_width.saturating_sub(UnicodeWidthStr::width(ellipsis));
    let mut out = clip_to_width(text, available).to_string();
    out.push_str(ellipsis);
    out
}

fn centered_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let width = width.min(r.width);
    let height = height.min(r.height);
    Rect {
        x: r.x + (r.width - width) / 2,
        y: r.y + (r.height - height) / 2,
        width,
        height,
    }
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
