//! Notes persisted under a single store key, with debounced auto-save.

use std::time::{Duration, Instant};

use chrono::{Local, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use serde::{Deserialize, Serialize};

use crate::action::Action;
use crate::config::Config;
use crate::input::TextField;
use crate::store::{Store, StoreError};
use crate::ui::{self, COPPER, OLIVE, SAPPHIRE, TEXT_MUTED, TEXT_PRIMARY, TEXT_SECONDARY};

pub const STORE_KEY: &str = "toolifast-notes";
pub const MAX_CONTENT: usize = 5000;

const NEW_NOTE_TITLE: &str = "New note";
const UNTITLED: &str = "Untitled";

pub const HINTS: &[(&str, &str)] = &[
    ("Tab", "focus"),
    ("Ctrl+S", "save"),
    ("Ctrl+N", "new"),
    ("Del", "delete"),
    ("Esc", "home"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    /// Creation time in ms, as a string
    pub id: String,
    pub title: String,
    pub content: String,
    pub date: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    List,
    Title,
    Content,
}

pub struct Notepad {
    store: Store,
    /// False when an unreadable notes file could not be moved aside
    writable: bool,
    notes: Vec<Note>,
    /// Index into `notes` of the note open in the editor
    selected: Option<usize>,
    /// List cursor, independent of the open note
    cursor: usize,
    title: TextField,
    content: TextField,
    focus: Focus,
    last_edit: Option<Instant>,
    saved_at: Option<Instant>,
    autosave_delay: Duration,
    marker_duration: Duration,
}

fn today() -> String {
    Local::now().format("%d/%m/%Y").to_string()
}

impl Notepad {
    /// Mount with the list read from `store`. An unreadable list is moved
    /// to a backup and the notepad starts empty. When even that fails,
    /// nothing is written for the rest of the session.
    pub fn load(store: Store, config: &Config) -> Self {
        let mut writable = true;
        let notes = match store.get::<Vec<Note>>(STORE_KEY) {
            Ok(notes) => notes.unwrap_or_default(),
            Err(e) => {
                tracing::error!(error = %e, "cannot read notes, starting empty");
                match store.back_up(STORE_KEY) {
                    Ok(backup) => tracing::warn!(backup = %backup.display(), "unreadable notes moved aside"),
                    Err(e) => {
                        tracing::error!(error = %e, "cannot back up notes, saving disabled");
                        writable = false;
                    }
                }
                Vec::new()
            }
        };
        tracing::debug!(count = notes.len(), "notes loaded");

        Self {
            store,
            writable,
            notes,
            selected: None,
            cursor: 0,
            title: TextField::with_max(100),
            content: TextField::with_max(MAX_CONTENT).multiline(),
            focus: Focus::Content,
            last_edit: None,
            saved_at: None,
            autosave_delay: Duration::from_millis(config.autosave_delay_ms),
            marker_duration: Duration::from_millis(config.saved_marker_ms),
        }
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn selected_note(&self) -> Option<&Note> {
        self.selected.and_then(|idx| self.notes.get(idx))
    }

    pub fn show_saved(&self) -> bool {
        self.saved_at.is_some()
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.store.set(STORE_KEY, &self.notes)
    }

    fn persist_or_report(&self) -> Action {
        if !self.writable {
            return Action::Status("Notes are read-only: the notes file could not be read".to_string());
        }
        match self.persist() {
            Ok(()) => Action::None,
            Err(e) => {
                tracing::error!(error = %e, "cannot write notes");
                Action::Status(format!("Could not save notes: {e}"))
            }
        }
    }

    /// Create when nothing is open, otherwise update the open note.
    pub fn save(&mut self, now: Instant) -> Action {
        if self.title.is_empty() && self.content.is_empty() {
            return Action::None;
        }
        match self.selected {
            Some(idx) => self.update(idx),
            None => {
                let title = if self.title.is_empty() { NEW_NOTE_TITLE } else { self.title.value() };
                let note = Note {
                    id: Utc::now().timestamp_millis().to_string(),
                    title: title.to_string(),
                    content: self.content.value().to_string(),
                    date: today(),
                };
                self.notes.insert(0, note);
                self.selected = Some(0);
                self.cursor = 0;
            }
        }
        self.last_edit = None;
        self.saved_at = Some(now);
        self.persist_or_report()
    }

    fn update(&mut self, idx: usize) {
        let title = if self.title.is_empty() { UNTITLED } else { self.title.value() };
        if let Some(note) = self.notes.get_mut(idx) {
            note.title = title.to_string();
            note.content = self.content.value().to_string();
            note.date = today();
        }
    }

    pub fn open(&mut self, idx: usize) {
        let Some(note) = self.notes.get(idx) else {
            return;
        };
        self.title.set(&note.title);
        self.content.set(&note.content);
        self.selected = Some(idx);
        self.cursor = idx;
        self.last_edit = None;
    }

    pub fn delete(&mut self, idx: usize) -> Action {
        if idx >= self.notes.len() {
            return Action::None;
        }
        self.notes.remove(idx);
        self.selected = match self.selected {
            Some(sel) if sel == idx => {
                self.title.clear();
                self.content.clear();
                self.last_edit = None;
                None
            }
            Some(sel) if sel > idx => Some(sel - 1),
            other => other,
        };
        self.cursor = self.cursor.min(self.notes.len().saturating_sub(1));
        // an empty list is written too
        self.persist_or_report()
    }

    pub fn new_note(&mut self) {
        self.selected = None;
        self.title.clear();
        self.content.clear();
        self.last_edit = None;
        self.focus = Focus::Title;
    }

    fn edited(&mut self, now: Instant) {
        if self.selected.is_some() {
            self.last_edit = Some(now);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('s') if ctrl => return self.save(now),
            KeyCode::Char('n') if ctrl => self.new_note(),
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::List => Focus::Title,
                    Focus::Title => Focus::Content,
                    Focus::Content => Focus::List,
                };
            }
            _ => match self.focus {
                Focus::List => return self.handle_list_key(key),
                Focus::Title => {
                    if key.code == KeyCode::Enter {
                        self.focus = Focus::Content;
                    } else if self.title.handle_key(key) {
                        self.edited(now);
                    }
                }
                Focus::Content => {
                    if self.content.handle_key(key) {
                        self.edited(now);
                    }
                }
            },
        }
        Action::None
    }

    fn handle_list_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Down => {
                self.cursor = (self.cursor + 1).min(self.notes.len().saturating_sub(1));
            }
            KeyCode::Enter => {
                self.open(self.cursor);
                self.focus = Focus::Content;
            }
            KeyCode::Delete | KeyCode::Char('d') => return self.delete(self.cursor),
            _ => {}
        }
        Action::None
    }

    pub fn handle_paste(&mut self, text: &str, now: Instant) {
        let changed = match self.focus {
            Focus::Title => self.title.insert_str(text),
            Focus::Content => self.content.insert_str(text),
            Focus::List => false,
        };
        if changed {
            self.edited(now);
        }
    }

    /// Auto-save once typing pauses, and expire the "Saved" marker.
    pub fn tick(&mut self, now: Instant) -> Action {
        if self.saved_at.is_some_and(|at| now.duration_since(at) >= self.marker_duration) {
            self.saved_at = None;
        }

        let due = self
            .last_edit
            .is_some_and(|at| now.duration_since(at) >= self.autosave_delay);
        match (due, self.selected) {
            (true, Some(idx)) => {
                self.last_edit = None;
                self.update(idx);
                self.saved_at = Some(now);
                tracing::debug!(idx, "auto-saved note");
                self.persist_or_report()
            }
            _ => Action::None,
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, anim_frame: usize) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(28), Constraint::Length(1), Constraint::Min(30)])
            .split(area);

        self.draw_list(frame, columns[0]);

        let editor = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
            .split(columns[2]);

        ui::draw_field(frame, editor[0], "Title", &self.title, self.focus == Focus::Title, anim_frame);

        let block = ui::panel("Content", self.focus == Focus::Content)
            .title_bottom(Line::from(self.content.counter()).right_aligned());
        let inner = block.inner(editor[1]);
        frame.render_widget(block, editor[1]);
        let cursor = if self.focus == Focus::Content { ui::cursor(anim_frame) } else { "" };
        frame.render_widget(
            Paragraph::new(format!("{}{}", self.content.value(), cursor))
                .style(Style::default().fg(TEXT_PRIMARY))
                .wrap(Wrap { trim: false }),
            inner,
        );

        let status = match (self.show_saved(), self.selected_note()) {
            (true, _) => Span::styled(" ✓ Saved", Style::default().fg(OLIVE)),
            (false, Some(note)) => Span::styled(format!(" Editing: {}", note.title), Style::default().fg(TEXT_MUTED)),
            (false, None) => Span::styled(" New note (Ctrl+S to save)", Style::default().fg(TEXT_MUTED)),
        };
        frame.render_widget(Paragraph::new(Line::from(status)), editor[2]);
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect) {
        let block = ui::panel("Notes", self.focus == Focus::List);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.notes.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(" No notes yet", Style::default().fg(TEXT_MUTED))),
                inner,
            );
            return;
        }

        let mut lines = Vec::new();
        let width = inner.width.saturating_sub(3) as usize;
        for (idx, note) in self.notes.iter().enumerate() {
            let open = self.selected == Some(idx);
            let under_cursor = self.focus == Focus::List && self.cursor == idx;
            let marker = if under_cursor { "▸ " } else { "  " };
            let title_style = if open {
                Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(TEXT_SECONDARY)
            };
            let title: String = note.title.chars().take(width).collect();
            lines.push(Line::from(vec![
                Span::styled(marker, Style::default().fg(COPPER)),
                Span::styled(title, title_style),
            ]));
            lines.push(Line::from(Span::styled(format!("  {}", note.date), Style::default().fg(TEXT_MUTED))));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notepad(dir: &std::path::Path) -> Notepad {
        Notepad::load(Store::new(dir), &Config::default())
    }

    fn type_text(pad: &mut Notepad, text: &str, now: Instant) {
        for c in text.chars() {
            pad.handle_key(KeyEvent::from(KeyCode::Char(c)), now);
        }
    }

    #[test]
    fn test_create_then_reload() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();

        let mut pad = notepad(dir.path());
        pad.new_note();
        type_text(&mut pad, "Groceries", now);
        pad.handle_key(KeyEvent::from(KeyCode::Tab), now);
        type_text(&mut pad, "milk", now);
        pad.save(now);
        drop(pad);

        let pad = notepad(dir.path());
        assert_eq!(pad.notes().len(), 1);
        assert_eq!(pad.notes()[0].title, "Groceries");
        assert_eq!(pad.notes()[0].content, "milk");
    }

    #[test]
    fn test_save_without_title_uses_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut pad = notepad(dir.path());
        pad.handle_paste("body only", Instant::now());
        pad.save(Instant::now());

        assert_eq!(pad.notes()[0].title, NEW_NOTE_TITLE);
        assert_eq!(pad.selected_note().map(|n| n.content.as_str()), Some("body only"));
    }

    #[test]
    fn test_save_empty_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut pad = notepad(dir.path());
        pad.save(Instant::now());
        assert!(pad.notes().is_empty());
        assert!(!dir.path().join(format!("{STORE_KEY}.json")).exists());
    }

    #[test]
    fn test_save_with_selection_updates() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let mut pad = notepad(dir.path());
        pad.handle_paste("first", now);
        pad.save(now);

        pad.title.clear();
        pad.content.set("second");
        pad.save(now);

        assert_eq!(pad.notes().len(), 1);
        assert_eq!(pad.notes()[0].title, UNTITLED);
        assert_eq!(pad.notes()[0].content, "second");
    }

    #[test]
    fn test_new_notes_are_prepended() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let mut pad = notepad(dir.path());
        for body in ["a", "b"] {
            pad.new_note();
            pad.focus = Focus::Content;
            pad.handle_paste(body, now);
            pad.save(now);
        }
        let contents: Vec<&str> = pad.notes().iter().map(|n| n.content.as_str()).collect();
        assert_eq!(contents, vec!["b", "a"]);
    }

    #[test]
    fn test_autosave_after_pause() {
        let dir = tempfile::tempdir().unwrap();
        let start = Instant::now();
        let mut pad = notepad(dir.path());
        pad.handle_paste("draft", start);
        pad.save(start);

        type_text(&mut pad, "!", start);
        pad.tick(start + Duration::from_millis(400));
        assert_eq!(pad.notes()[0].content, "draft");

        pad.tick(start + Duration::from_millis(1000));
        assert_eq!(pad.notes()[0].content, "draft!");
        assert!(pad.show_saved());

        let reloaded = notepad(dir.path());
        assert_eq!(reloaded.notes()[0].content, "draft!");
    }

    #[test]
    fn test_no_autosave_without_selection() {
        let dir = tempfile::tempdir().unwrap();
        let start = Instant::now();
        let mut pad = notepad(dir.path());
        type_text(&mut pad, "loose", start);
        pad.tick(start + Duration::from_secs(5));
        assert!(pad.notes().is_empty());
    }

    #[test]
    fn test_saved_marker_expires() {
        let dir = tempfile::tempdir().unwrap();
        let start = Instant::now();
        let mut pad = notepad(dir.path());
        pad.handle_paste("x", start);
        pad.save(start);
        assert!(pad.show_saved());

        pad.tick(start + Duration::from_millis(2000));
        assert!(!pad.show_saved());
    }

    #[test]
    fn test_delete_selected_clears_editor_and_persists_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mut pad = notepad(dir.path());
        pad.handle_paste("gone soon", Instant::now());
        pad.save(Instant::now());

        pad.delete(0);
        assert!(pad.notes().is_empty());
        assert!(pad.selected_note().is_none());
        assert!(pad.content.is_empty());

        let stored: Option<Vec<Note>> = Store::new(dir.path()).get(STORE_KEY).unwrap();
        assert_eq!(stored, Some(Vec::new()));
    }

    #[test]
    fn test_delete_before_selection_shifts_index() {
        let dir = tempfile::tempdir().unwrap();
        let now = Instant::now();
        let mut pad = notepad(dir.path());
        for body in ["old", "new"] {
            pad.new_note();
            pad.focus = Focus::Content;
            pad.handle_paste(body, now);
            pad.save(now);
        }
        pad.open(1);
        pad.delete(0);
        assert_eq!(pad.selected_note().map(|n| n.content.as_str()), Some("old"));
    }

    #[test]
    fn test_open_loads_editor() {
        let dir = tempfile::tempdir().unwrap();
        let note = Note {
            id: "1".into(),
            title: "T".into(),
            content: "C".into(),
            date: "01/01/2024".into(),
        };
        Store::new(dir.path()).set(STORE_KEY, &vec![note]).unwrap();

        let mut pad = notepad(dir.path());
        pad.focus = Focus::List;
        pad.handle_key(KeyEvent::from(KeyCode::Enter), Instant::now());

        assert_eq!(pad.title.value(), "T");
        assert_eq!(pad.content.value(), "C");
    }

    #[test]
    fn test_corrupt_store_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(format!("{STORE_KEY}.json")), "not json").unwrap();
        assert!(notepad(dir.path()).notes().is_empty());
    }

    #[test]
    fn test_corrupt_store_is_kept_as_backup() {
        let dir = tempfile::tempdir().unwrap();
        let backup = dir.path().join(format!("{STORE_KEY}.json.bak"));
        std::fs::write(dir.path().join(format!("{STORE_KEY}.json")), "not json").unwrap();
        let now = Instant::now();

        let mut pad = notepad(dir.path());
        pad.new_note();
        type_text(&mut pad, "Fresh", now);
        assert_eq!(pad.save(now), Action::None);

        assert_eq!(std::fs::read_to_string(&backup).unwrap(), "not json");
        assert_eq!(notepad(dir.path()).notes().len(), 1);
    }
}
