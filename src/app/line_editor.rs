use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Single-line text buffer with a character-indexed cursor, shared by the
/// filter prompt and the name input dialogs.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LineEditor {
    text: String,
    cursor: usize,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    pub fn insert_char(&mut self, ch: char) {
        if ch.is_control() {
            return;
        }
        let at = byte_index(&self.text, self.cursor);
        self.text.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = byte_index(&self.text, self.cursor);
        self.text.remove(at);
    }

    pub fn delete_forward(&mut self) {
        if self.cursor >= self.text.chars().count() {
            return;
        }
        let at = byte_index(&self.text, self.cursor);
        self.text.remove(at);
    }

    /// Applies an editing key. Returns false for keys the editor ignores so
    /// the caller can treat them as commands (Enter, Esc, ...).
    pub fn handle_key(&mut self, key: &KeyEvent) -> bool {
        if key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
        {
            return match key.code {
                KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    self.clear();
                    true
                }
                _ => false,
            };
        }

        match key.code {
            KeyCode::Char(ch) => self.insert_char(ch),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete_forward(),
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(self.text.chars().count()),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.text.chars().count(),
            _ => return false,
        }
        true
    }
}

fn byte_index(text: &str, char_index: usize) -> usize {
    text.char_indices()
        .nth(char_index)
        .map_or(text.len(), |(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(editor: &mut LineEditor, code: KeyCode) -> bool {
        editor.handle_key(&KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn insert_and_backspace_behave_on_unicode() {
        let mut editor = LineEditor::new();
        press(&mut editor, KeyCode::Char('a'));
        press(&mut editor, KeyCode::Char('λ'));
        press(&mut editor, KeyCode::Char('b'));
        assert_eq!(editor.text(), "aλb");
        press(&mut editor, KeyCode::Left);
        press(&mut editor, KeyCode::Backspace);
        assert_eq!(editor.text(), "ab");
        assert_eq!(editor.cursor(), 1);
    }

    #[test]
    fn home_end_and_delete() {
        let mut editor = LineEditor::from_text("work");
        assert_eq!(editor.cursor(), 4);
        press(&mut editor, KeyCode::Home);
        press(&mut editor, KeyCode::Delete);
        assert_eq!(editor.text(), "ork");
        press(&mut editor, KeyCode::End);
        press(&mut editor, KeyCode::Char('s'));
        assert_eq!(editor.text(), "orks");
    }

    #[test]
    fn command_keys_are_not_consumed() {
        let mut editor = LineEditor::from_text("x");
        assert!(!press(&mut editor, KeyCode::Enter));
        assert!(!press(&mut editor, KeyCode::Esc));
        assert!(!editor.handle_key(&KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert_eq!(editor.text(), "x");
    }

    #[test]
    fn ctrl_u_clears_line() {
        let mut editor = LineEditor::from_text("hello");
        assert!(editor.handle_key(&KeyEvent::new(KeyCode::Char('u'), KeyModifiers::CONTROL)));
        assert!(editor.is_empty());
        assert_eq!(editor.cursor(), 0);
    }
}
