use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::Action;
use crate::backend::{BackendEvent, Reply, RequestId, RequestScope};
use crate::config::Config;
use crate::input::TextField;
use crate::tools::ToolContext;
use crate::ui::{self, COPPER, CYAN_LIGHT, SAPPHIRE, TEXT_MUTED, TEXT_PRIMARY};

pub const MAX_INPUT: usize = 1000;

pub const GREETING: &str = "Hi! I'm your AI assistant. I can help you write, answer questions, \
create content and much more. What can I do for you today?";
const SHORT_GREETING: &str = "Hi! I'm your AI assistant. What can I do for you today?";
const ERROR_REPLY: &str = "Sorry, something went wrong. Please try again.";

pub const QUICK_PROMPTS: [&str; 6] = [
    "Write a poem about love",
    "Explain artificial intelligence to me",
    "Write a short story",
    "Give me study tips",
    "Write a professional email",
    "Help me with my homework",
];

pub const HINTS: &[(&str, &str)] = &[
    ("Enter", "send"),
    ("F1-F6", "quick prompt"),
    ("↑↓", "scroll"),
    ("Ctrl+L", "clear"),
    ("Esc", "home"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Local>,
}

impl ChatMessage {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Local::now(),
        }
    }
}

pub struct TextAi {
    messages: Vec<ChatMessage>,
    input: TextField,
    pending: Option<RequestId>,
    sent_at: Option<Instant>,
    /// Reply that arrived early, with the instant it may be shown
    held: Option<(Instant, String)>,
    reply_delay: Duration,
    scroll_offset: usize,
    scope: RequestScope,
}

impl TextAi {
    pub fn new(config: &Config) -> Self {
        Self {
            messages: vec![ChatMessage::new(Role::Assistant, GREETING)],
            input: TextField::with_max(MAX_INPUT),
            pending: None,
            sent_at: None,
            held: None,
            reply_delay: Duration::from_millis(config.chat_reply_delay_ms),
            scroll_offset: 0,
            scope: RequestScope::new(),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn is_waiting(&self) -> bool {
        self.pending.is_some() || self.held.is_some()
    }

    /// Quick prompts are offered until the first exchange.
    pub fn shows_quick_prompts(&self) -> bool {
        self.messages.len() == 1
    }

    pub fn clear(&mut self) {
        self.messages = vec![ChatMessage::new(Role::Assistant, SHORT_GREETING)];
        // a reply still in flight belongs to the old conversation
        self.scope = RequestScope::new();
        self.pending = None;
        self.sent_at = None;
        self.held = None;
        self.scroll_offset = 0;
    }

    pub fn send(&mut self, ctx: &mut ToolContext) {
        let prompt = self.input.value().trim().to_string();
        if prompt.is_empty() || self.is_waiting() {
            return;
        }
        self.input.clear();
        self.messages.push(ChatMessage::new(Role::User, prompt.clone()));
        self.pending = Some(ctx.backend.generate_text(&prompt, &self.scope));
        self.sent_at = Some(Instant::now());
        self.scroll_offset = 0;
    }

    pub fn on_backend_event(&mut self, event: BackendEvent) {
        if self.pending != Some(event.id) {
            tracing::debug!(id = event.id, "stale chat reply ignored");
            return;
        }
        self.pending = None;

        let content = match event.result {
            Ok(Reply::Text(text)) => text,
            Ok(Reply::Image { .. }) => ERROR_REPLY.to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "chat request failed");
                ERROR_REPLY.to_string()
            }
        };
        match self.sent_at.take() {
            Some(sent) => self.held = Some((sent + self.reply_delay, content)),
            None => self.push_reply(content),
        }
    }

    /// Show a held reply once its minimum wait has passed.
    pub fn tick(&mut self, now: Instant) {
        if matches!(self.held, Some((at, _)) if now >= at) {
            if let Some((_, content)) = self.held.take() {
                self.push_reply(content);
            }
        }
    }

    fn push_reply(&mut self, content: String) {
        self.messages.push(ChatMessage::new(Role::Assistant, content));
        self.scroll_offset = 0;
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctx: &mut ToolContext) -> Action {
        match key.code {
            KeyCode::Enter => self.send(ctx),
            KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => self.clear(),
            KeyCode::F(n @ 1..=6) if self.shows_quick_prompts() => {
                self.input.set(QUICK_PROMPTS[n as usize - 1]);
            }
            KeyCode::Up => self.scroll_up(ctx.config.scroll_step),
            KeyCode::Down => self.scroll_down(ctx.config.scroll_step),
            _ => {
                self.input.handle_key(key);
            }
        }
        Action::None
    }

    pub fn handle_paste(&mut self, text: &str) {
        self.input.insert_str(text);
    }

    pub fn scroll_up(&mut self, step: usize) {
        self.scroll_offset = self.scroll_offset.saturating_add(step);
    }

    pub fn scroll_down(&mut self, step: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(step);
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, anim_frame: usize) {
        let quick_height = if self.shows_quick_prompts() { 4 } else { 0 };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),               // Messages
                Constraint::Length(quick_height), // Quick prompts
                Constraint::Length(3),            // Input
            ])
            .split(area);

        self.draw_messages(frame, chunks[0], anim_frame);

        if self.shows_quick_prompts() {
            let lines: Vec<Line> = QUICK_PROMPTS
                .chunks(3)
                .enumerate()
                .map(|(row, prompts)| {
                    let spans: Vec<Span> = prompts
                        .iter()
                        .enumerate()
                        .flat_map(|(col, prompt)| {
                            [
                                Span::styled(format!(" F{} ", row * 3 + col + 1), Style::default().fg(COPPER)),
                                Span::styled(format!("{prompt}  "), Style::default().fg(TEXT_MUTED)),
                            ]
                        })
                        .collect();
                    Line::from(spans)
                })
                .collect();
            frame.render_widget(Paragraph::new(lines), chunks[1]);
        }

        ui::draw_field(frame, chunks[2], "Message", &self.input, true, anim_frame);
    }

    fn draw_messages(&self, frame: &mut Frame, area: Rect, anim_frame: usize) {
        let block = ui::panel("Chat", false);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let width = inner.width.saturating_sub(2) as usize;
        let mut lines: Vec<Line> = Vec::new();
        for msg in &self.messages {
            let (label, color) = match msg.role {
                Role::User => ("you", SAPPHIRE),
                Role::Assistant => ("assistant", COPPER),
            };
            lines.push(Line::from(vec![
                Span::styled(format!(" {label}"), Style::default().fg(color).add_modifier(Modifier::BOLD)),
                Span::styled(format!("  {}", msg.timestamp.format("%H:%M")), Style::default().fg(TEXT_MUTED)),
            ]));
            for content_line in msg.content.lines() {
                for wrapped in ui::wrap_text(content_line, width) {
                    lines.push(Line::from(Span::styled(format!(" {wrapped}"), Style::default().fg(TEXT_PRIMARY))));
                }
            }
            lines.push(Line::from(""));
        }
        if self.is_waiting() {
            lines.push(Line::from(Span::styled(
                format!(" assistant is typing{}", ui::dots(anim_frame)),
                Style::default().fg(CYAN_LIGHT).add_modifier(Modifier::ITALIC),
            )));
        }

        // offset counts lines up from the bottom
        let max_scroll = lines.len().saturating_sub(inner.height as usize);
        let scroll_pos = max_scroll.saturating_sub(self.scroll_offset.min(max_scroll));
        frame.render_widget(Paragraph::new(lines).scroll((scroll_pos as u16, 0)), inner);
    }
}
