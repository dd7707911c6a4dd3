use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputResult {
    Continue,
    Submit,
    Cancel,
}

/// Chars that end a symbol while typing an item.
fn is_symbol_boundary(ch: char) -> bool {
    ch.is_whitespace() || matches!(ch, '.' | ',' | '→' | '>' | '•' | '·')
}

pub struct LineInput {
    text: String,
    /// Cursor position as a char index (0 = before first char).
    cursor: usize,
    /// Symbols offered by Tab completion.
    vocabulary: Vec<String>,
    completions: Vec<String>,
    completion_index: Option<usize>,
    /// Text snapshot when Tab was first pressed.
    completion_seed: String,
    /// True if the last Tab found nothing to complete.
    pub completion_miss: bool,
}

impl LineInput {
    pub fn new(text: &str) -> Self {
        let cursor = text.chars().count();
        Self {
            text: text.to_string(),
            cursor,
            vocabulary: Vec::new(),
            completions: Vec::new(),
            completion_index: None,
            completion_seed: String::new(),
            completion_miss: false,
        }
    }

    pub fn with_vocabulary(mut self, vocabulary: Vec<String>) -> Self {
        self.set_vocabulary(vocabulary);
        self
    }

    pub fn set_vocabulary(&mut self, mut vocabulary: Vec<String>) {
        vocabulary.sort();
        vocabulary.dedup();
        self.vocabulary = vocabulary;
        self.reset_completion();
    }

    pub fn value(&self) -> &str {
        &self.text
    }

    pub fn clear(&mut self) {
        self.reset_completion();
        self.text.clear();
        self.cursor = 0;
    }

    /// Returns (before_cursor, cursor_char, after_cursor) for styled rendering.
    /// When cursor is at end of text, cursor_char is None.
    pub fn render_parts(&self) -> (&str, Option<char>, &str) {
        let byte_offset = self.char_to_byte(self.cursor);
        match self.text[byte_offset..].chars().next() {
            Some(ch) => {
                let next_byte = byte_offset + ch.len_utf8();
                (&self.text[..byte_offset], Some(ch), &self.text[next_byte..])
            }
            None => (&self.text, None, ""),
        }
    }

    pub fn handle(&mut self, key: KeyEvent) -> InputResult {
        match key.code {
            KeyCode::Esc => return InputResult::Cancel,
            KeyCode::Enter => return InputResult::Submit,

            KeyCode::Left => {
                self.reset_completion();
                self.cursor = self.cursor.saturating_sub(1);
            }
            KeyCode::Right => {
                self.reset_completion();
                let len = self.text.chars().count();
                if self.cursor < len {
                    self.cursor += 1;
                }
            }
            KeyCode::Home => {
                self.reset_completion();
                self.cursor = 0;
            }
            KeyCode::End => {
                self.reset_completion();
                self.cursor = self.text.chars().count();
            }
            KeyCode::Backspace => {
                self.reset_completion();
                if self.cursor > 0 {
                    self.remove_char_at(self.cursor - 1);
                    self.cursor -= 1;
                }
            }
            KeyCode::Delete => {
                self.reset_completion();
                self.remove_char_at(self.cursor);
            }
            KeyCode::Tab => {
                self.tab_complete(true);
            }
            KeyCode::BackTab => {
                self.tab_complete(false);
            }
            KeyCode::Char('a') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset_completion();
                self.cursor = 0;
            }
            KeyCode::Char('e') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset_completion();
                self.cursor = self.text.chars().count();
            }
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.clear();
            }
            KeyCode::Char('w') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset_completion();
                self.delete_word_back();
            }
            KeyCode::Char(ch) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.reset_completion();
                let byte_offset = self.char_to_byte(self.cursor);
                self.text.insert(byte_offset, ch);
                self.cursor += 1;
            }
            _ => {}
        }
        InputResult::Continue
    }

    /// Convert char index to byte offset.
    fn char_to_byte(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(b, _)| b)
            .unwrap_or(self.text.len())
    }

    fn remove_char_at(&mut self, char_idx: usize) {
        let byte_offset = self.char_to_byte(char_idx);
        if let Some(ch) = self.text[byte_offset..].chars().next() {
            self.text
                .replace_range(byte_offset..byte_offset + ch.len_utf8(), "");
        }
    }

    /// Delete word before cursor (unix-word-rubout: skip whitespace, then non-whitespace).
    fn delete_word_back(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let chars: Vec<char> = self.text.chars().collect();
        let mut pos = self.cursor;

        while pos > 0 && chars[pos - 1].is_whitespace() {
            pos -= 1;
        }
        while pos > 0 && !chars[pos - 1].is_whitespace() {
            pos -= 1;
        }

        let start_byte = self.char_to_byte(pos);
        let end_byte = self.char_to_byte(self.cursor);
        self.text.replace_range(start_byte..end_byte, "");
        self.cursor = pos;
    }

    fn reset_completion(&mut self) {
        self.completions.clear();
        self.completion_index = None;
        self.completion_seed.clear();
        self.completion_miss = false;
    }

    fn tab_complete(&mut self, forward: bool) {
        // Only activate when cursor is at end of line
        let len = self.text.chars().count();
        if self.cursor < len {
            return;
        }

        match self.completion_index {
            None => {
                self.completion_seed = self.text.clone();
                self.completions = self.build_completions();
                if self.completions.is_empty() {
                    self.completion_miss = true;
                    return;
                }
                self.completion_index = Some(0);
                self.apply_completion(0);
            }
            Some(idx) if !self.completions.is_empty() => {
                let count = self.completions.len();
                let next = if forward {
                    (idx + 1) % count
                } else {
                    (idx + count - 1) % count
                };
                self.completion_index = Some(next);
                self.apply_completion(next);
            }
            Some(_) => {}
        }
    }

    fn apply_completion(&mut self, idx: usize) {
        self.text = self.completions[idx].clone();
        self.cursor = self.text.chars().count();
    }

    /// Completes the symbol being typed at the end of the line. Exact-case
    /// prefix matches come before case-folded ones.
    fn build_completions(&self) -> Vec<String> {
        let seed = &self.completion_seed;
        let split = seed
            .char_indices()
            .rev()
            .find(|&(_, ch)| is_symbol_boundary(ch))
            .map_or(0, |(i, ch)| i + ch.len_utf8());
        let (prefix, partial) = seed.split_at(split);
        if partial.is_empty() {
            return Vec::new();
        }

        let folded = partial.to_lowercase();
        let mut exact: Vec<&String> = Vec::new();
        let mut loose: Vec<&String> = Vec::new();
        for symbol in &self.vocabulary {
            if symbol.starts_with(partial) {
                exact.push(symbol);
            } else if symbol.to_lowercase().starts_with(&folded) {
                loose.push(symbol);
            }
        }

        exact
            .into_iter()
            .chain(loose)
            .take(100)
            .map(|symbol| format!("{prefix}{symbol}"))
            .collect()
    }
}
