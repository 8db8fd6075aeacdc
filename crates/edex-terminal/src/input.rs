use std::ops::Range;

/// Selection in a text target, in characters. `start` may exceed `end`
/// when the user selected backwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub start: usize,
    pub end: usize,
}

impl Selection {
    pub fn caret(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    /// The selected characters as an ordered range.
    pub fn range(&self) -> Range<usize> {
        self.start.min(self.end)..self.start.max(self.end)
    }
}

/// An editable line the key router writes into.
pub trait TextTarget {
    fn text(&self) -> &str;
    fn selection(&self) -> Selection;
    /// Replace the characters in `range` and put the caret after the insert.
    fn replace(&mut self, range: Range<usize>, replacement: &str);
    /// Replace the whole text and put the caret at the end.
    fn set_text(&mut self, text: &str);
    /// The user asked to run what has been typed.
    fn submit(&mut self);
}

/// The pending command line.
///
/// Positions are character indices, so multi-byte input edits cleanly.
#[derive(Debug, Default)]
pub struct LineBuffer {
    text: String,
    selection: Selection,
    submit_requested: bool,
}

impl Default for Selection {
    fn default() -> Self {
        Self::caret(0)
    }
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_offset(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Move the selection, clamped to the text.
    pub fn set_selection(&mut self, start: usize, end: usize) {
        let len = self.char_count();
        self.selection = Selection {
            start: start.min(len),
            end: end.min(len),
        };
    }

    /// Caret position in characters (the selection's `end`).
    pub fn caret(&self) -> usize {
        self.selection.end
    }

    /// Take a requested submission: the trimmed line if it has content,
    /// clearing the buffer. A blank line is left as typed.
    pub fn take_submission(&mut self) -> Option<String> {
        if !std::mem::take(&mut self.submit_requested) {
            return None;
        }
        let line = self.text.trim();
        if line.is_empty() {
            return None;
        }
        let line = line.to_string();
        self.set_text("");
        Some(line)
    }
}

impl TextTarget for LineBuffer {
    fn text(&self) -> &str {
        &self.text
    }

    fn selection(&self) -> Selection {
        self.selection
    }

    fn replace(&mut self, range: Range<usize>, replacement: &str) {
        let len = self.char_count();
        let start = range.start.min(len);
        let end = range.end.min(len).max(start);
        let bytes = self.byte_offset(start)..self.byte_offset(end);
        self.text.replace_range(bytes, replacement);
        self.selection = Selection::caret(start + replacement.chars().count());
    }

    fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
        self.selection = Selection::caret(self.char_count());
    }

    fn submit(&mut self) {
        self.submit_requested = true;
    }
}
