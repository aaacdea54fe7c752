//! Single text field with a character cap, shared by the tool forms.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Default)]
pub struct TextField {
    value: String,
    max_chars: Option<usize>,
    multiline: bool,
}

impl TextField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max(max_chars: usize) -> Self {
        Self {
            max_chars: Some(max_chars),
            ..Self::default()
        }
    }

    pub fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    pub fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    pub fn max_chars(&self) -> Option<usize> {
        self.max_chars
    }

    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Replace the content, truncated to the cap.
    pub fn set(&mut self, value: &str) {
        self.value.clear();
        self.insert_str(value);
    }

    pub fn push(&mut self, c: char) -> bool {
        if c == '\r' || (c == '\n' && !self.multiline) {
            return false;
        }
        if self.max_chars.is_some_and(|max| self.char_count() >= max) {
            return false;
        }
        self.value.push(c);
        true
    }

    pub fn pop(&mut self) -> bool {
        self.value.pop().is_some()
    }

    /// Insert pasted text. Newlines become spaces on single-line fields.
    pub fn insert_str(&mut self, text: &str) -> bool {
        let mut changed = false;
        for c in text.chars().filter(|c| *c != '\r') {
            let c = if c == '\n' && !self.multiline { ' ' } else { c };
            if !self.push(c) {
                break;
            }
            changed = true;
        }
        changed
    }

    /// Apply an editing key. Returns true when the value changed.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) || key.modifiers.contains(KeyModifiers::ALT) {
            return false;
        }
        match key.code {
            KeyCode::Char(c) => self.push(c),
            KeyCode::Enter if self.multiline => self.push('\n'),
            KeyCode::Backspace => self.pop(),
            _ => false,
        }
    }

    /// "12/200" style counter, empty when the field is uncapped.
    pub fn counter(&self) -> String {
        match self.max_chars {
            Some(max) => format!("{}/{}", self.char_count(), max),
            None => String::new(),
        }
    }
}
