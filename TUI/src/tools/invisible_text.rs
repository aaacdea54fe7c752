use crossterm::event::{KeyCode, KeyEvent};
use rand::seq::IndexedRandom;
use rand::Rng;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::action::Action;
use crate::ui::{self, COPPER, LAVENDER, SAPPHIRE, TEXT_MUTED, TEXT_PRIMARY, TEXT_SECONDARY};

/// Zero width space, ZWNJ, ZWJ, word joiner, no-break space
pub const INVISIBLE_CHARS: [char; 5] = ['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{00A0}'];

pub const MIN_LENGTH: usize = 1;
pub const MAX_LENGTH: usize = 100;
pub const PRESETS: [usize; 6] = [1, 3, 5, 10, 20, 50];

pub const HINTS: &[(&str, &str)] = &[
    ("←→", "length"),
    ("1-6", "preset"),
    ("Enter", "generate & copy"),
    ("Esc", "home"),
];

/// `n` chars drawn independently and uniformly from [`INVISIBLE_CHARS`].
pub fn generate<R: Rng + ?Sized>(n: usize, rng: &mut R) -> String {
    (0..n)
        .filter_map(|_| INVISIBLE_CHARS.choose(rng).copied())
        .collect()
}

pub struct InvisibleText {
    length: usize,
    last: Option<String>,
}

impl InvisibleText {
    pub fn new() -> Self {
        Self {
            length: PRESETS[1],
            last: None,
        }
    }

    pub fn length(&self) -> usize {
        self.length
    }

    fn set_length(&mut self, length: usize) {
        self.length = length.clamp(MIN_LENGTH, MAX_LENGTH);
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Left => self.set_length(self.length.saturating_sub(1)),
            KeyCode::Right => self.set_length(self.length + 1),
            KeyCode::Down => self.set_length(self.length.saturating_sub(10)),
            KeyCode::Up => self.set_length(self.length + 10),
            KeyCode::Char(c @ '1'..='6') => {
                let idx = c as usize - '1' as usize;
                self.set_length(PRESETS[idx]);
            }
            KeyCode::Enter => {
                // every copy gets a fresh string
                let text = generate(self.length, &mut rand::rng());
                self.last = Some(text.clone());
                return Action::Copy {
                    text,
                    label: format!("{} invisible characters", self.length),
                };
            }
            _ => {}
        }
        Action::None
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Length picker
                Constraint::Length(1),
                Constraint::Min(4), // Preview
            ])
            .split(area);

        let block = ui::panel("Length", true);
        let inner = block.inner(chunks[0]);
        frame.render_widget(block, chunks[0]);

        let filled = (self.length * inner.width.saturating_sub(12) as usize) / MAX_LENGTH;
        let presets: Vec<Span> = PRESETS
            .iter()
            .enumerate()
            .flat_map(|(idx, preset)| {
                let style = if *preset == self.length {
                    Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(TEXT_MUTED)
                };
                [
                    Span::styled(format!("[{}]", idx + 1), Style::default().fg(COPPER)),
                    Span::styled(format!(" {preset}  "), style),
                ]
            })
            .collect();

        let picker = Paragraph::new(vec![
            Line::from(vec![
                Span::styled(format!(" {:>3} ", self.length), Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD)),
                Span::styled("█".repeat(filled.max(1)), Style::default().fg(LAVENDER)),
            ]),
            Line::from(""),
            Line::from(presets),
        ]);
        frame.render_widget(picker, inner);

        let block = ui::panel("Last copied", false);
        let inner = block.inner(chunks[2]);
        frame.render_widget(block, chunks[2]);

        let body = match &self.last {
            Some(text) => {
                // invisible by definition, so show code points instead
                let points: Vec<String> = text.chars().map(|c| format!("U+{:04X}", c as u32)).collect();
                vec![
                    Line::from(Span::styled(
                        format!("{} characters on the clipboard:", text.chars().count()),
                        Style::default().fg(TEXT_SECONDARY),
                    )),
                    Line::from(""),
                    Line::from(Span::styled(points.join(" "), Style::default().fg(TEXT_MUTED))),
                ]
            }
            None => vec![Line::from(Span::styled(
                "Press Enter to generate and copy invisible text",
                Style::default().fg(TEXT_MUTED),
            ))],
        };
        frame.render_widget(
            Paragraph::new(body).alignment(Alignment::Left).wrap(Wrap { trim: true }),
            inner,
        );
    }
}

impl Default for InvisibleText {
    fn default() -> Self {
        Self::new()
    }
}
