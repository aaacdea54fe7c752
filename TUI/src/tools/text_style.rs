//! Unicode "fancy text": maps ASCII letters onto styled alphabets.

use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::Action;
use crate::config::Config;
use crate::input::TextField;
use crate::ui::{self, COPPER, OLIVE, SAPPHIRE, TEXT_MUTED, TEXT_PRIMARY, TEXT_SECONDARY};

pub const MAX_INPUT: usize = 200;

pub const HINTS: &[(&str, &str)] = &[("↑↓", "style"), ("Enter", "copy"), ("Esc", "home")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Bold,
    Italic,
    Gothic,
    Monospace,
    Circles,
    Squares,
}

/// Math Italic leaves small h unassigned; the Planck constant sits in its place.
const ITALIC_SMALL_H: char = '\u{210E}';

impl TextStyle {
    pub const ALL: [TextStyle; 6] = [
        TextStyle::Bold,
        TextStyle::Italic,
        TextStyle::Gothic,
        TextStyle::Monospace,
        TextStyle::Circles,
        TextStyle::Squares,
    ];

    pub fn label(self) -> &'static str {
        match self {
            TextStyle::Bold => "Bold",
            TextStyle::Italic => "Italic",
            TextStyle::Gothic => "Gothic",
            TextStyle::Monospace => "Monospace",
            TextStyle::Circles => "Circles",
            TextStyle::Squares => "Squares",
        }
    }

    /// First code point of the upper and lower case runs.
    fn bases(self) -> (u32, u32) {
        match self {
            TextStyle::Bold => (0x1D400, 0x1D41A),
            TextStyle::Italic => (0x1D434, 0x1D44E),
            TextStyle::Gothic => (0x1D56C, 0x1D586),
            TextStyle::Monospace => (0x1D670, 0x1D68A),
            TextStyle::Circles => (0x24B6, 0x24D0),
            // case folds: both runs share the negative squared capitals
            TextStyle::Squares => (0x1F170, 0x1F170),
        }
    }

    pub fn is_reversible(self) -> bool {
        self != TextStyle::Squares
    }

    pub fn apply_char(self, c: char) -> char {
        let (upper, lower) = self.bases();
        let mapped = match c {
            'h' if self == TextStyle::Italic => return ITALIC_SMALL_H,
            'A'..='Z' => upper + (c as u32 - 'A' as u32),
            'a'..='z' => lower + (c as u32 - 'a' as u32),
            _ => return c,
        };
        char::from_u32(mapped).unwrap_or(c)
    }

    /// Inverse of [`apply_char`](Self::apply_char); unmapped chars pass through.
    fn revert_char(self, c: char) -> char {
        if self == TextStyle::Italic && c == ITALIC_SMALL_H {
            return 'h';
        }
        let (upper, lower) = self.bases();
        let code = c as u32;
        if (upper..upper + 26).contains(&code) {
            char::from_u32('A' as u32 + code - upper).unwrap_or(c)
        } else if (lower..lower + 26).contains(&code) {
            char::from_u32('a' as u32 + code - lower).unwrap_or(c)
        } else {
            c
        }
    }
}

pub fn stylize(text: &str, style: TextStyle) -> String {
    text.chars().map(|c| style.apply_char(c)).collect()
}

/// Recover ASCII from styled text. `None` for styles that lose information.
pub fn invert(text: &str, style: TextStyle) -> Option<String> {
    if !style.is_reversible() {
        return None;
    }
    Some(text.chars().map(|c| style.revert_char(c)).collect())
}

pub struct TextStyleTool {
    input: TextField,
    selected: usize,
    copied: Option<(TextStyle, Instant)>,
    marker_duration: Duration,
}

impl TextStyleTool {
    pub fn new(config: &Config) -> Self {
        Self {
            input: TextField::with_max(MAX_INPUT),
            selected: 0,
            copied: None,
            marker_duration: Duration::from_millis(config.saved_marker_ms),
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Up => {
                self.selected = self.selected.checked_sub(1).unwrap_or(TextStyle::ALL.len() - 1);
                Action::None
            }
            KeyCode::Down => {
                self.selected = (self.selected + 1) % TextStyle::ALL.len();
                Action::None
            }
            KeyCode::Enter => self.copy_selected(Instant::now()),
            _ => {
                self.input.handle_key(key);
                Action::None
            }
        }
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.input.insert_str(text);
    }

    fn copy_selected(&mut self, now: Instant) -> Action {
        if self.input.is_empty() {
            return Action::None;
        }
        let style = TextStyle::ALL[self.selected];
        self.copied = Some((style, now));
        Action::Copy {
            text: stylize(self.input.value(), style),
            label: format!("{} text", style.label()),
        }
    }

    pub fn tick(&mut self, now: Instant) {
        if let Some((_, at)) = self.copied {
            if now.duration_since(at) >= self.marker_duration {
                self.copied = None;
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, anim_frame: usize) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Input
                Constraint::Length(1), // Gap
                Constraint::Min(4),    // Styles
            ])
            .split(area);

        ui::draw_field(frame, chunks[0], "Your text", &self.input, true, anim_frame);

        let block = ui::panel("Styles", false);
        let inner = block.inner(chunks[2]);
        frame.render_widget(block, chunks[2]);

        let sample = if self.input.is_empty() { "Toolifast" } else { self.input.value() };
        let mut lines = Vec::new();
        for (idx, style) in TextStyle::ALL.iter().enumerate() {
            let selected = idx == self.selected;
            let marker = if selected { " ▸ " } else { "   " };
            let copied = matches!(self.copied, Some((s, _)) if s == *style);

            let mut spans = vec![
                Span::styled(marker, Style::default().fg(COPPER)),
                Span::styled(
                    format!("{:<10}", style.label()),
                    Style::default().fg(if selected { SAPPHIRE } else { TEXT_MUTED }).add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    stylize(sample, *style),
                    Style::default().fg(if self.input.is_empty() { TEXT_SECONDARY } else { TEXT_PRIMARY }),
                ),
            ];
            if copied {
                spans.push(Span::styled("  ✓ Copied", Style::default().fg(OLIVE)));
            }
            lines.push(Line::from(spans));
            lines.push(Line::from(""));
        }
        frame.render_widget(Paragraph::new(lines), inner);
    }
}
