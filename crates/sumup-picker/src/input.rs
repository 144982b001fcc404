//! Single-line text input used for the search query

use crossterm::event::{KeyCode, KeyModifiers};

/// Maximum number of characters accepted in the search box
pub const SEARCH_CHAR_LIMIT: usize = 50;

/// Single-line text input with a byte-offset cursor and a character limit
#[derive(Debug, Clone)]
pub struct TextInput {
    text: String,
    cursor: usize,
    char_limit: usize,
}

impl Default for TextInput {
    fn default() -> Self {
        Self::with_char_limit(SEARCH_CHAR_LIMIT)
    }
}

impl TextInput {
    pub fn with_char_limit(char_limit: usize) -> Self {
        Self {
            text: String::new(),
            cursor: 0,
            char_limit,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Byte offset of the cursor in [`TextInput::text`]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn insert_char(&mut self, c: char) {
        if self.text.chars().count() >= self.char_limit {
            return;
        }
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    fn prev_boundary(&self) -> usize {
        self.text[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.text.len())
    }

    /// Start of the word before the cursor, skipping trailing whitespace
    fn word_start(&self) -> usize {
        let before = &self.text[..self.cursor];
        let trimmed = before.trim_end_matches(char::is_whitespace);
        trimmed
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(i, c)| i + c.len_utf8())
            .unwrap_or(0)
    }

    /// End of the word after the cursor, skipping leading whitespace
    fn word_end(&self) -> usize {
        let after = &self.text[self.cursor..];
        let skipped = after.len() - after.trim_start_matches(char::is_whitespace).len();
        let rest = &after[skipped..];
        let word = rest.find(char::is_whitespace).unwrap_or(rest.len());
        self.cursor + skipped + word
    }

    /// Apply an editing key. Returns false when the key is not an editing key.
    pub fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> bool {
        let ctrl = modifiers.contains(KeyModifiers::CONTROL);
        // macOS Option may report as SUPER
        let alt = modifiers.intersects(KeyModifiers::ALT | KeyModifiers::SUPER);

        match code {
            KeyCode::Char('u') if ctrl => self.clear(),
            KeyCode::Char('w') if ctrl => {
                let start = self.word_start();
                self.text.drain(start..self.cursor);
                self.cursor = start;
            }
            KeyCode::Backspace if alt => {
                let start = self.word_start();
                self.text.drain(start..self.cursor);
                self.cursor = start;
            }
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = self.text.len(),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = self.text.len(),
            KeyCode::Char('b') if alt => self.cursor = self.word_start(),
            KeyCode::Char('f') if alt => self.cursor = self.word_end(),
            KeyCode::Left if alt || ctrl => self.cursor = self.word_start(),
            KeyCode::Right if alt || ctrl => self.cursor = self.word_end(),
            KeyCode::Left => self.cursor = self.prev_boundary(),
            KeyCode::Right => self.cursor = self.next_boundary(),
            KeyCode::Backspace => {
                let prev = self.prev_boundary();
                self.text.drain(prev..self.cursor);
                self.cursor = prev;
            }
            KeyCode::Delete => {
                let next = self.next_boundary();
                self.text.drain(self.cursor..next);
            }
            KeyCode::Char(c) if !ctrl && !alt => self.insert_char(c),
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(input: &mut TextInput, s: &str) {
        for c in s.chars() {
            input.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn test_typing_and_backspace() {
        let mut input = TextInput::default();
        type_str(&mut input, "acmé");
        assert_eq!(input.text(), "acmé");
        assert_eq!(input.cursor(), "acmé".len());

        input.handle_key(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(input.text(), "acm");
        input.handle_key(KeyCode::Left, KeyModifiers::NONE);
        input.handle_key(KeyCode::Delete, KeyModifiers::NONE);
        assert_eq!(input.text(), "ac");
    }

    #[test]
    fn test_char_limit() {
        let mut input = TextInput::with_char_limit(3);
        type_str(&mut input, "abcdef");
        assert_eq!(input.text(), "abc");
    }

    #[test]
    fn test_word_editing() {
        let mut input = TextInput::default();
        type_str(&mut input, "acme shop  ");
        input.handle_key(KeyCode::Char('w'), KeyModifiers::CONTROL);
        assert_eq!(input.text(), "acme ");

        input.handle_key(KeyCode::Home, KeyModifiers::NONE);
        input.handle_key(KeyCode::Right, KeyModifiers::ALT);
        assert_eq!(input.cursor(), 4);

        input.handle_key(KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert!(input.is_empty());
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn test_non_editing_keys_are_not_consumed() {
        let mut input = TextInput::default();
        assert!(!input.handle_key(KeyCode::Up, KeyModifiers::NONE));
        assert!(!input.handle_key(KeyCode::Enter, KeyModifiers::NONE));
        assert!(!input.handle_key(KeyCode::Char('x'), KeyModifiers::CONTROL));
    }
}
