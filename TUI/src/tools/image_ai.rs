use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use image::{DynamicImage, ImageFormat, RgbImage};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::action::Action;
use crate::backend::{image_url, BackendEvent, Reply, RequestId, RequestScope};
use crate::config::Config;
use crate::input::TextField;
use crate::tools::ToolContext;
use crate::ui::{self, BURGUNDY, COPPER, LAVENDER, SAPPHIRE, TEXT_MUTED, TEXT_SECONDARY};

pub const MAX_PROMPT: usize = 500;

/// Longest edge of the cached preview, in pixels
const PREVIEW_EDGE: u32 = 128;

pub const SUGGESTIONS: [&str; 6] = [
    "A space cat floating through the cosmos",
    "Cyberpunk landscape with neon lights",
    "A majestic dragon on a mountain",
    "Futuristic city under the sea",
    "A robot playing guitar",
    "Sunset on an alien planet",
];

pub const HINTS: &[(&str, &str)] = &[
    ("Enter", "generate"),
    ("F1-F6", "idea"),
    ("Tab", "history"),
    ("Ctrl+S", "save"),
    ("Esc", "home"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub prompt: String,
    pub url: String,
}

struct Generated {
    prompt: String,
    image: DynamicImage,
    preview: RgbImage,
}

/// A finished request, shown once its minimum wait has passed.
enum Outcome {
    Image(Generated, HistoryEntry),
    Failed(String),
}

pub struct ImageAi {
    prompt: TextField,
    history: Vec<HistoryEntry>,
    history_len: usize,
    history_focus: Option<usize>,
    current: Option<Generated>,
    /// Request in flight and the prompt it was issued for
    pending: Option<(RequestId, String)>,
    sent_at: Option<Instant>,
    held: Option<(Instant, Outcome)>,
    reveal_delay: Duration,
    error: Option<String>,
    image_size: u32,
    output_dir: PathBuf,
    scope: RequestScope,
}

/// File name for a saved image, keyed by the save time.
pub fn save_file_name(millis: i64) -> String {
    format!("toolifast-ai-image-{millis}.png")
}

impl ImageAi {
    pub fn new(config: &Config) -> Self {
        Self {
            prompt: TextField::with_max(MAX_PROMPT),
            history: Vec::new(),
            history_len: config.image_history_len,
            history_focus: None,
            current: None,
            pending: None,
            sent_at: None,
            held: None,
            reveal_delay: Duration::from_millis(config.image_reveal_delay_ms),
            error: None,
            image_size: config.image_size,
            output_dir: config.output_dir.clone(),
            scope: RequestScope::new(),
        }
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn is_generating(&self) -> bool {
        self.pending.is_some() || self.held.is_some()
    }

    pub fn generate(&mut self, ctx: &mut ToolContext) {
        let prompt = self.prompt.value().trim().to_string();
        if prompt.is_empty() || self.is_generating() {
            return;
        }
        let seed = Utc::now().timestamp_millis();
        let url = image_url(ctx.backend.image_endpoint(), &prompt, self.image_size, self.image_size, seed);
        self.fetch(url, prompt, ctx);
    }

    fn fetch(&mut self, url: String, prompt: String, ctx: &mut ToolContext) {
        tracing::info!(%url, "requesting image");
        self.error = None;
        let id = ctx.backend.fetch_image(url, &self.scope);
        self.pending = Some((id, prompt));
        self.sent_at = Some(Instant::now());
    }

    /// Re-fetch a history entry; the seed in its url reproduces the image.
    fn reload(&mut self, idx: usize, ctx: &mut ToolContext) {
        let Some(entry) = self.history.get(idx).cloned() else {
            return;
        };
        if self.is_generating() {
            return;
        }
        self.prompt.set(&entry.prompt);
        self.fetch(entry.url, entry.prompt, ctx);
    }

    fn remember(&mut self, entry: HistoryEntry) {
        self.history.retain(|e| e.url != entry.url);
        self.history.insert(0, entry);
        self.history.truncate(self.history_len);
    }

    pub fn on_backend_event(&mut self, event: BackendEvent) {
        let prompt = match &self.pending {
            Some((id, prompt)) if *id == event.id => prompt.clone(),
            _ => {
                tracing::debug!(id = event.id, "stale image reply ignored");
                return;
            }
        };
        self.pending = None;

        let outcome = match event.result {
            Ok(Reply::Image { url, bytes }) => match image::load_from_memory(&bytes) {
                Ok(image) => {
                    let preview = image.thumbnail(PREVIEW_EDGE, PREVIEW_EDGE).to_rgb8();
                    let entry = HistoryEntry {
                        prompt: prompt.clone(),
                        url,
                    };
                    Outcome::Image(Generated { prompt, image, preview }, entry)
                }
                Err(e) => {
                    tracing::warn!(error = %e, "image endpoint returned undecodable data");
                    Outcome::Failed("The generated image could not be read. Try again.".to_string())
                }
            },
            Ok(Reply::Text(_)) => Outcome::Failed("Unexpected reply from the image service.".to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "image generation failed");
                Outcome::Failed(format!("Could not generate the image: {e}"))
            }
        };
        match self.sent_at.take() {
            Some(sent) => self.held = Some((sent + self.reveal_delay, outcome)),
            None => self.show(outcome),
        }
    }

    /// Show a held outcome once its minimum wait has passed.
    pub fn tick(&mut self, now: Instant) {
        if matches!(self.held, Some((at, _)) if now >= at) {
            if let Some((_, outcome)) = self.held.take() {
                self.show(outcome);
            }
        }
    }

    fn show(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Image(generated, entry) => {
                self.remember(entry);
                self.current = Some(generated);
            }
            Outcome::Failed(message) => self.error = Some(message),
        }
    }

    /// Write the current image as PNG into `dir`.
    pub fn save_to(&self, dir: &Path, millis: i64) -> Result<Option<PathBuf>, image::ImageError> {
        let Some(current) = &self.current else {
            return Ok(None);
        };
        let path = dir.join(save_file_name(millis));
        current.image.save_with_format(&path, ImageFormat::Png)?;
        Ok(Some(path))
    }

    fn save(&self) -> Action {
        match self.save_to(&self.output_dir, Utc::now().timestamp_millis()) {
            Ok(Some(path)) => {
                tracing::info!(path = %path.display(), "image saved");
                Action::Status(format!("Saved {}", path.display()))
            }
            Ok(None) => Action::None,
            Err(e) => {
                tracing::error!(error = %e, "cannot save image");
                Action::Status(format!("Could not save image: {e}"))
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctx: &mut ToolContext) -> Action {
        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return self.save();
        }
        if key.code == KeyCode::Tab {
            self.history_focus = match self.history_focus {
                None if !self.history.is_empty() => Some(0),
                _ => None,
            };
            return Action::None;
        }

        if let Some(idx) = self.history_focus {
            match key.code {
                KeyCode::Up => self.history_focus = Some(idx.saturating_sub(1)),
                KeyCode::Down => {
                    self.history_focus = Some((idx + 1).min(self.history.len().saturating_sub(1)));
                }
                KeyCode::Enter => self.reload(idx, ctx),
                _ => {}
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Enter => self.generate(ctx),
            KeyCode::F(n @ 1..=6) => self.prompt.set(SUGGESTIONS[n as usize - 1]),
            _ => {
                self.prompt.handle_key(key);
            }
        }
        Action::None
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.history_focus.is_none() {
            self.prompt.insert_str(text);
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, anim_frame: usize) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(45), Constraint::Length(1), Constraint::Min(20)])
            .split(area);

        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5), // Prompt
                Constraint::Length(4), // Suggestions
                Constraint::Min(4),    // History
            ])
            .split(columns[0]);

        let prompt_block = ui::panel("Describe the image", self.history_focus.is_none())
            .title_bottom(Line::from(self.prompt.counter()).right_aligned());
        let inner = prompt_block.inner(left[0]);
        frame.render_widget(prompt_block, left[0]);
        let cursor = if self.history_focus.is_none() { ui::cursor(anim_frame) } else { "" };
        frame.render_widget(
            Paragraph::new(format!("{}{}", self.prompt.value(), cursor)).wrap(Wrap { trim: false }),
            inner,
        );

        let ideas: Vec<Line> = SUGGESTIONS
            .iter()
            .enumerate()
            .map(|(idx, idea)| {
                Line::from(vec![
                    Span::styled(format!(" F{} ", idx + 1), Style::default().fg(COPPER)),
                    Span::styled(*idea, Style::default().fg(TEXT_MUTED)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(ideas), left[1]);

        self.draw_history(frame, left[2]);
        self.draw_canvas(frame, columns[2], anim_frame);
    }

    fn draw_history(&self, frame: &mut Frame, area: Rect) {
        let block = ui::panel("Recent", self.history_focus.is_some());
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let width = inner.width.saturating_sub(3) as usize;
        let lines: Vec<Line> = self
            .history
            .iter()
            .enumerate()
            .map(|(idx, entry)| {
                let focused = self.history_focus == Some(idx);
                let prompt: String = entry.prompt.chars().take(width).collect();
                Line::from(vec![
                    Span::styled(if focused { " ▸ " } else { "   " }, Style::default().fg(COPPER)),
                    Span::styled(
                        prompt,
                        Style::default().fg(if focused { SAPPHIRE } else { TEXT_SECONDARY }),
                    ),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_canvas(&self, frame: &mut Frame, area: Rect, anim_frame: usize) {
        let block = ui::panel("Result", false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.is_generating() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    format!(" Painting{}", ui::dots(anim_frame)),
                    Style::default().fg(LAVENDER).add_modifier(Modifier::ITALIC),
                )),
                inner,
            );
            return;
        }
        if let Some(err) = &self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(err.clone(), Style::default().fg(BURGUNDY))).wrap(Wrap { trim: true }),
                inner,
            );
            return;
        }
        let Some(current) = &self.current else {
            frame.render_widget(
                Paragraph::new(Span::styled(" Your image will appear here", Style::default().fg(TEXT_MUTED))),
                inner,
            );
            return;
        };

        let rows = inner.height.saturating_sub(1);
        let mut lines = half_block_lines(&current.preview, inner.width, rows);
        lines.push(Line::from(Span::styled(
            format!("\"{}\"", current.prompt),
            Style::default().fg(TEXT_MUTED).add_modifier(Modifier::ITALIC),
        )));
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

/// Render `img` into at most `cols` x `rows` cells, two pixels per cell.
pub fn half_block_lines(img: &RgbImage, cols: u16, rows: u16) -> Vec<Line<'static>> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 || cols == 0 || rows == 0 {
        return Vec::new();
    }
    // fit inside the box keeping the aspect ratio (cells are two pixels tall)
    let scale = (cols as f64 / w as f64).min((rows as f64 * 2.0) / h as f64);
    let out_w = ((w as f64 * scale).round() as u32).max(1);
    let out_h = ((h as f64 * scale).round() as u32).max(2);

    let sample = |x: u32, y: u32| {
        let px = img.get_pixel((x * w / out_w).min(w - 1), (y * h / out_h).min(h - 1));
        Color::Rgb(px[0], px[1], px[2])
    };

    (0..out_h / 2)
        .map(|row| {
            let spans: Vec<Span> = (0..out_w)
                .map(|x| {
                    Span::styled(
                        "▀",
                        Style::default().fg(sample(x, row * 2)).bg(sample(x, row * 2 + 1)),
                    )
                })
                .collect();
            Line::from(spans)
        })
        .collect()
}
