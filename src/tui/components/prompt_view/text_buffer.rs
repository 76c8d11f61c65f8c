//! The linear text buffer behind the PromptView.
//!
//! `TextBuffer` owns the whole transcript as one `String` plus a caret byte
//! offset. Every method keeps the caret on a UTF-8 character boundary.
//! Lines are separated by `'\n'`; the last line has no terminator.

/// Find the byte offset of the previous character boundary before `pos` in `text`.
pub(super) fn prev_char_boundary(text: &str, pos: usize) -> usize {
    text[..pos]
        .char_indices()
        .next_back()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Find the byte offset of the next character boundary after `pos` in `text`.
pub(super) fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .char_indices()
        .nth(1)
        .map(|(i, _)| pos + i)
        .unwrap_or(text.len())
}

/// Byte offset `chars` characters into `line`, clamped to its length.
fn byte_offset_of_column(line: &str, chars: usize) -> usize {
    line.char_indices()
        .nth(chars)
        .map(|(i, _)| i)
        .unwrap_or(line.len())
}

#[derive(Debug, Default)]
pub(super) struct TextBuffer {
    text: String,
    /// Caret position as byte offset in text (0..=text.len())
    caret: usize,
}

impl TextBuffer {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Byte offset where the line containing `pos` starts.
    pub fn line_start(&self, pos: usize) -> usize {
        self.text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
    }

    /// Byte offset where the line containing `pos` ends (its `'\n'` or end of text).
    pub fn line_end(&self, pos: usize) -> usize {
        self.text[pos..]
            .find('\n')
            .map(|i| pos + i)
            .unwrap_or(self.text.len())
    }

    /// Full text of the line the caret is on.
    pub fn current_line(&self) -> &str {
        &self.text[self.line_start(self.caret)..self.line_end(self.caret)]
    }

    /// Caret column in characters from the start of its line.
    pub fn column(&self) -> usize {
        self.text[self.line_start(self.caret)..self.caret]
            .chars()
            .count()
    }

    /// Zero-based index of the line the caret is on.
    pub fn caret_line(&self) -> usize {
        self.text[..self.caret].matches('\n').count()
    }

    pub fn last_line(&self) -> &str {
        &self.text[self.line_start(self.text.len())..]
    }

    // ── Programmatic appends ─────────────────────────────────────────────

    /// Add `line` as a new paragraph at the end of the text. The caret keeps
    /// its offset, which stays valid because nothing before it changes.
    pub fn append_line(&mut self, line: &str) {
        if !self.text.is_empty() {
            self.text.push('\n');
        }
        self.text.push_str(line);
    }

    pub fn move_to_end(&mut self) {
        self.caret = self.text.len();
    }

    // ── Editing at the caret ─────────────────────────────────────────────

    pub fn insert_char(&mut self, c: char) {
        self.text.insert(self.caret, c);
        self.caret += c.len_utf8();
    }

    pub fn insert_str(&mut self, s: &str) {
        self.text.insert_str(self.caret, s);
        self.caret += s.len();
    }

    /// Remove the character before the caret. Returns `false` at the start of the text.
    pub fn backspace(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        let prev = prev_char_boundary(&self.text, self.caret);
        self.text.drain(prev..self.caret);
        self.caret = prev;
        true
    }

    /// Remove the character after the caret. Returns `false` at the end of the text.
    pub fn delete(&mut self) -> bool {
        if self.caret >= self.text.len() {
            return false;
        }
        let next = next_char_boundary(&self.text, self.caret);
        self.text.drain(self.caret..next);
        true
    }

    // ── Caret motion (each returns whether the caret moved) ──────────────

    pub fn move_left(&mut self) -> bool {
        if self.caret == 0 {
            return false;
        }
        self.caret = prev_char_boundary(&self.text, self.caret);
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.caret >= self.text.len() {
            return false;
        }
        self.caret = next_char_boundary(&self.text, self.caret);
        true
    }

    pub fn move_home(&mut self) -> bool {
        let start = self.line_start(self.caret);
        if self.caret == start {
            return false;
        }
        self.caret = start;
        true
    }

    pub fn move_end(&mut self) -> bool {
        let end = self.line_end(self.caret);
        if self.caret == end {
            return false;
        }
        self.caret = end;
        true
    }

    /// Move to the previous line, keeping the character column where possible.
    pub fn move_up(&mut self) -> bool {
        let start = self.line_start(self.caret);
        if start == 0 {
            return false;
        }
        let column = self.column();
        let prev_start = self.line_start(start - 1);
        let prev_line = &self.text[prev_start..start - 1];
        self.caret = prev_start + byte_offset_of_column(prev_line, column);
        true
    }

    /// Move to the next line, keeping the character column where possible.
    pub fn move_down(&mut self) -> bool {
        let end = self.line_end(self.caret);
        if end >= self.text.len() {
            return false;
        }
        let column = self.column();
        let next_start = end + 1;
        let next_end = self.line_end(next_start);
        let next_line = &self.text[next_start..next_end];
        self.caret = next_start + byte_offset_of_column(next_line, column);
        true
    }
}
