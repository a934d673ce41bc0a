//! Single-line input buffer

/// An edit applied to the input buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEdit {
    Insert(char),
    InsertStr(String),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    Clear,
}

/// Text typed but not yet submitted
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputBuffer {
    text: String,
    /// Cursor position in chars (0..=len)
    cursor: usize,
}

impl InputBuffer {
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

    pub fn apply(&mut self, edit: InputEdit) {
        match edit {
            InputEdit::Insert(ch) => {
                // Control characters never belong on the command line
                if ch.is_control() {
                    return;
                }
                let at = self.byte_index(self.cursor);
                self.text.insert(at, ch);
                self.cursor += 1;
            }
            InputEdit::InsertStr(s) => {
                // Only the first line of a multi-line paste goes in
                let line = s.lines().next().unwrap_or("");
                for ch in line.chars() {
                    self.apply(InputEdit::Insert(ch));
                }
            }
            InputEdit::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.text.remove(at);
                }
            }
            InputEdit::Delete => {
                if self.cursor < self.char_len() {
                    let at = self.byte_index(self.cursor);
                    self.text.remove(at);
                }
            }
            InputEdit::Left => self.cursor = self.cursor.saturating_sub(1),
            InputEdit::Right => self.cursor = (self.cursor + 1).min(self.char_len()),
            InputEdit::Home => self.cursor = 0,
            InputEdit::End => self.cursor = self.char_len(),
            InputEdit::Clear => {
                self.text.clear();
                self.cursor = 0;
            }
        }
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }
}
