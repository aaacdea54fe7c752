//! Tool widgets. Each owns its state; the shell holds at most one at a time.

pub mod date_calculator;
pub mod image_ai;
pub mod image_to_pdf;
pub mod invisible_text;
pub mod name_generator;
pub mod notepad;
pub mod text_ai;
pub mod text_style;
pub mod tiktok;

use std::time::Instant;

use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::action::Action;
use crate::backend::{Backend, BackendEvent};
use crate::config::Config;
use crate::registry::ToolId;
use crate::store::Store;

use date_calculator::DateCalculator;
use image_ai::ImageAi;
use image_to_pdf::ImageToPdf;
use invisible_text::InvisibleText;
use name_generator::NameGenerator;
use notepad::Notepad;
use text_ai::TextAi;
use text_style::TextStyleTool;
use tiktok::TiktokDownloader;

/// What a widget may touch while handling input.
pub struct ToolContext<'a> {
    pub backend: &'a mut Backend,
    pub config: &'a Config,
}

pub enum ToolWidget {
    TextStyle(TextStyleTool),
    InvisibleText(InvisibleText),
    ImageToPdf(ImageToPdf),
    TiktokDownloader(TiktokDownloader),
    Notepad(Notepad),
    NameGenerator(NameGenerator),
    DateCalculator(DateCalculator),
    ImageAi(ImageAi),
    TextAi(TextAi),
}

impl ToolWidget {
    /// Fresh widget for `id`. Adding a `ToolId` variant fails to compile here
    /// until it gets a widget.
    pub fn mount(id: ToolId, config: &Config, store: &Store) -> Self {
        match id {
            ToolId::TextStyle => ToolWidget::TextStyle(TextStyleTool::new(config)),
            ToolId::InvisibleText => ToolWidget::InvisibleText(InvisibleText::new()),
            ToolId::ImageToPdf => ToolWidget::ImageToPdf(ImageToPdf::new(config)),
            ToolId::TiktokDownloader => ToolWidget::TiktokDownloader(TiktokDownloader::new(config)),
            ToolId::Notepad => ToolWidget::Notepad(Notepad::load(store.clone(), config)),
            ToolId::NameGenerator => ToolWidget::NameGenerator(NameGenerator::new(config)),
            ToolId::DateCalculator => ToolWidget::DateCalculator(DateCalculator::new()),
            ToolId::ImageAi => ToolWidget::ImageAi(ImageAi::new(config)),
            ToolId::TextAi => ToolWidget::TextAi(TextAi::new(config)),
        }
    }

    pub fn id(&self) -> ToolId {
        match self {
            ToolWidget::TextStyle(_) => ToolId::TextStyle,
            ToolWidget::InvisibleText(_) => ToolId::InvisibleText,
            ToolWidget::ImageToPdf(_) => ToolId::ImageToPdf,
            ToolWidget::TiktokDownloader(_) => ToolId::TiktokDownloader,
            ToolWidget::Notepad(_) => ToolId::Notepad,
            ToolWidget::NameGenerator(_) => ToolId::NameGenerator,
            ToolWidget::DateCalculator(_) => ToolId::DateCalculator,
            ToolWidget::ImageAi(_) => ToolId::ImageAi,
            ToolWidget::TextAi(_) => ToolId::TextAi,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent, ctx: &mut ToolContext) -> Action {
        match self {
            ToolWidget::TextStyle(w) => w.handle_key(key),
            ToolWidget::InvisibleText(w) => w.handle_key(key),
            ToolWidget::ImageToPdf(w) => w.handle_key(key),
            ToolWidget::TiktokDownloader(w) => w.handle_key(key),
            ToolWidget::Notepad(w) => w.handle_key(key, Instant::now()),
            ToolWidget::NameGenerator(w) => w.handle_key(key, Instant::now()),
            ToolWidget::DateCalculator(w) => w.handle_key(key),
            ToolWidget::ImageAi(w) => w.handle_key(key, ctx),
            ToolWidget::TextAi(w) => w.handle_key(key, ctx),
        }
    }

    /// Bracketed paste or Ctrl+V, routed to the focused field.
    pub fn handle_paste(&mut self, text: &str) {
        match self {
            ToolWidget::TextStyle(w) => w.handle_paste(text),
            ToolWidget::ImageToPdf(w) => w.handle_paste(text),
            ToolWidget::TiktokDownloader(w) => w.handle_paste(text),
            ToolWidget::Notepad(w) => w.handle_paste(text, Instant::now()),
            ToolWidget::DateCalculator(w) => w.handle_paste(text),
            ToolWidget::ImageAi(w) => w.handle_paste(text),
            ToolWidget::TextAi(w) => w.handle_paste(text),
            ToolWidget::InvisibleText(_) | ToolWidget::NameGenerator(_) => {}
        }
    }

    pub fn handle_scroll(&mut self, up: bool, step: usize) {
        if let ToolWidget::TextAi(w) = self {
            if up {
                w.scroll_up(step);
            } else {
                w.scroll_down(step);
            }
        }
    }

    /// Fire deadlines (autosave, simulated delays, marker expiry).
    pub fn tick(&mut self, now: Instant) -> Action {
        match self {
            ToolWidget::TextStyle(w) => {
                w.tick(now);
                Action::None
            }
            ToolWidget::Notepad(w) => w.tick(now),
            ToolWidget::NameGenerator(w) => {
                w.tick(now, &mut rand::rng());
                Action::None
            }
            ToolWidget::TiktokDownloader(w) => {
                w.tick(now, chrono::Utc::now().timestamp_millis());
                Action::None
            }
            ToolWidget::TextAi(w) => {
                w.tick(now);
                Action::None
            }
            ToolWidget::ImageAi(w) => {
                w.tick(now);
                Action::None
            }
            _ => Action::None,
        }
    }

    pub fn on_backend_event(&mut self, event: BackendEvent) {
        match self {
            ToolWidget::TextAi(w) => w.on_backend_event(event),
            ToolWidget::ImageAi(w) => w.on_backend_event(event),
            other => tracing::debug!(tool = other.id().key(), id = event.id, "unexpected reply dropped"),
        }
    }

    /// Key hints for the footer
    pub fn hints(&self) -> &'static [(&'static str, &'static str)] {
        match self {
            ToolWidget::TextStyle(_) => text_style::HINTS,
            ToolWidget::InvisibleText(_) => invisible_text::HINTS,
            ToolWidget::ImageToPdf(_) => image_to_pdf::HINTS,
            ToolWidget::TiktokDownloader(_) => tiktok::HINTS,
            ToolWidget::Notepad(_) => notepad::HINTS,
            ToolWidget::NameGenerator(_) => name_generator::HINTS,
            ToolWidget::DateCalculator(_) => date_calculator::HINTS,
            ToolWidget::ImageAi(_) => image_ai::HINTS,
            ToolWidget::TextAi(_) => text_ai::HINTS,
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, anim_frame: usize) {
        match self {
            ToolWidget::TextStyle(w) => w.draw(frame, area, anim_frame),
            ToolWidget::InvisibleText(w) => w.draw(frame, area),
            ToolWidget::ImageToPdf(w) => w.draw(frame, area, anim_frame),
            ToolWidget::TiktokDownloader(w) => w.draw(frame, area, anim_frame),
            ToolWidget::Notepad(w) => w.draw(frame, area, anim_frame),
            ToolWidget::NameGenerator(w) => w.draw(frame, area, anim_frame),
            ToolWidget::DateCalculator(w) => w.draw(frame, area, anim_frame),
            ToolWidget::ImageAi(w) => w.draw(frame, area, anim_frame),
            ToolWidget::TextAi(w) => w.draw(frame, area, anim_frame),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TOOLS;

    #[test]
    fn test_mount_matches_every_id() {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::new(dir.path());
        let config = Config::default();

        for tool in &TOOLS {
            let widget = ToolWidget::mount(tool.id, &config, &store);
            assert_eq!(widget.id(), tool.id);
            assert!(!widget.hints().is_empty());
        }
    }
}
