use std::time::Instant;

use arboard::Clipboard;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};

use crate::action::Action;
use crate::backend::Backend;
use crate::command::CommandParser;
use crate::config::{Config, COMMANDS};
use crate::header;
use crate::registry::{ToolId, TOOLS};
use crate::store::Store;
use crate::tools::{ToolContext, ToolWidget};
use crate::ui;
use crate::ui_state::{Screen, UIState};

pub struct App {
    pub ui: UIState,
    pub widget: Option<ToolWidget>,
    pub config: Config,
    pub store: Store,
    pub backend: Backend,
    pub animation_frame: usize,
    pub animation_tick: u64,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: Config, backend: Backend) -> Self {
        let store = Store::new(config.data_dir.clone());
        Self {
            ui: UIState::new(),
            widget: None,
            config,
            store,
            backend,
            animation_frame: 0,
            animation_tick: 0,
            should_quit: false,
        }
    }

    /// Mount a fresh widget for `id`. The previous one, and any request it
    /// still has in flight, is dropped first.
    pub fn select(&mut self, id: ToolId) {
        self.widget = None;
        self.widget = Some(ToolWidget::mount(id, &self.config, &self.store));
        self.ui.screen = Screen::Tool(id);
        self.ui.catalog_selection = TOOLS.iter().position(|t| t.id == id).unwrap_or(0);
        tracing::info!(tool = id.key(), "tool opened");
    }

    pub fn navigate_home(&mut self) {
        if let Some(widget) = self.widget.take() {
            tracing::info!(tool = widget.id().key(), "tool closed");
        }
        self.ui.screen = Screen::Home;
    }

    pub fn set_status(&mut self, msg: impl Into<String>) {
        self.ui.status_message = Some(msg.into());
        self.ui.status_expires_tick = self.animation_tick + self.config.status_timeout_ticks;
    }

    pub fn tick(&mut self) {
        self.animation_tick += 1;
        // Using larger modulo for smoother color transitions
        self.animation_frame = (self.animation_frame + 1) % self.config.animation_frame_mod.max(1);

        if self.ui.status_message.is_some() && self.animation_tick >= self.ui.status_expires_tick {
            self.ui.status_message = None;
        }

        let action = self
            .widget
            .as_mut()
            .map_or(Action::None, |widget| widget.tick(Instant::now()));
        self.apply(action);

        for event in self.backend.poll() {
            match self.widget.as_mut() {
                Some(widget) => widget.on_backend_event(event),
                None => tracing::debug!(id = event.id, "reply after navigation dropped"),
            }
        }
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Home => self.navigate_home(),
            Action::Open(id) => self.select(id),
            Action::Help => self.ui.show_help = true,
            Action::Copy { text, label } => {
                if copy_to_clipboard(&text) {
                    self.set_status(format!("Copied {label}"));
                }
            }
            Action::Status(msg) => self.set_status(msg),
            Action::Quit => self.should_quit = true,
        }
    }

    /// Get filtered commands based on current command input
    pub fn get_filtered_commands(&self) -> Vec<(&'static str, &'static str)> {
        let Some(input) = self.ui.command_input.as_deref() else {
            return vec![];
        };
        if input.contains(' ') {
            return vec![];
        }
        let filter = input.strip_prefix('/').unwrap_or(input);
        COMMANDS
            .iter()
            .filter(|(cmd, _)| cmd[1..].starts_with(filter))
            .copied()
            .collect()
    }

    /// Move selection up in command popup
    pub fn command_select_up(&mut self) {
        let filtered = self.get_filtered_commands();
        if filtered.is_empty() {
            return;
        }

        // Cycle: None -> last command -> ... -> 0 -> None
        self.ui.command_selection = match self.ui.command_selection {
            None => Some(filtered.len() - 1),
            Some(0) => None,
            Some(n) => Some(n - 1),
        };
    }

    /// Move selection down in command popup
    pub fn command_select_down(&mut self) {
        let filtered = self.get_filtered_commands();
        if filtered.is_empty() {
            return;
        }

        // Cycle: None -> 0 -> 1 -> ... -> last -> None
        self.ui.command_selection = match self.ui.command_selection {
            None => Some(0),
            Some(n) if n >= filtered.len() - 1 => None,
            Some(n) => Some(n + 1),
        };
    }

    /// Apply selected command to input
    pub fn apply_command_selection(&mut self) {
        if let Some(idx) = self.ui.command_selection {
            if let Some((cmd, _)) = self.get_filtered_commands().get(idx) {
                // /open still needs its argument
                let text = if *cmd == "/open" { format!("{cmd} ") } else { cmd.to_string() };
                self.ui.command_input = Some(text);
            }
        }
        self.ui.command_selection = None;
    }

    fn submit_command(&mut self) {
        let Some(input) = self.ui.command_input.take() else {
            return;
        };
        self.ui.command_selection = None;
        match CommandParser::parse(&input) {
            Ok(action) => self.apply(action),
            Err(msg) => self.set_status(msg.replace('\n', " ")),
        }
    }

    fn handle_command_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.ui.command_input = None;
                self.ui.command_selection = None;
            }
            KeyCode::Enter => {
                if self.ui.command_selection.is_some() {
                    self.apply_command_selection();
                } else {
                    self.submit_command();
                }
            }
            KeyCode::Tab => self.apply_command_selection(),
            KeyCode::Up => self.command_select_up(),
            KeyCode::Down => self.command_select_down(),
            KeyCode::Backspace => {
                if let Some(input) = self.ui.command_input.as_mut() {
                    input.pop();
                    if input.is_empty() {
                        self.ui.command_input = None;
                    }
                }
                self.ui.command_selection = None;
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                if let Some(input) = self.ui.command_input.as_mut() {
                    input.push(c);
                }
                self.ui.command_selection = None;
            }
            _ => {}
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }
        if self.ui.show_help {
            self.ui.show_help = false;
            return;
        }
        if key.code == KeyCode::Char('v') && key.modifiers.contains(KeyModifiers::CONTROL) {
            match Clipboard::new().and_then(|mut clipboard| clipboard.get_text()) {
                Ok(text) => self.handle_paste(&text),
                Err(e) => tracing::warn!(error = %e, "clipboard read failed"),
            }
            return;
        }
        if self.ui.command_input.is_some() {
            self.handle_command_key(key);
            return;
        }

        match self.ui.screen {
            Screen::Home => self.handle_home_key(key),
            Screen::Tool(_) => {
                if key.code == KeyCode::Esc {
                    self.navigate_home();
                    return;
                }
                let mut ctx = ToolContext {
                    backend: &mut self.backend,
                    config: &self.config,
                };
                let action = match self.widget.as_mut() {
                    Some(widget) => widget.handle_key(key, &mut ctx),
                    None => Action::None,
                };
                self.apply(action);
            }
        }
    }

    fn handle_home_key(&mut self, key: KeyEvent) {
        let body = ui::shell_layout(self.ui.viewport).body;
        let cols = ui::catalog_columns(body.width);
        // arrows stay on cards that are actually drawn
        let last = ui::catalog_cards(body).len().clamp(1, TOOLS.len()) - 1;
        let sel = self.ui.catalog_selection.min(last);
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Left => self.ui.catalog_selection = sel.saturating_sub(1),
            KeyCode::Right => self.ui.catalog_selection = (sel + 1).min(last),
            KeyCode::Up => self.ui.catalog_selection = sel.saturating_sub(cols),
            KeyCode::Down => self.ui.catalog_selection = (sel + cols).min(last),
            KeyCode::Enter => self.select(TOOLS[sel].id),
            KeyCode::Char(c @ '1'..='9') => {
                let idx = c as usize - '1' as usize;
                if let Some(tool) = TOOLS.get(idx) {
                    self.select(tool.id);
                }
            }
            KeyCode::Char('/') => {
                self.ui.command_input = Some("/".to_string());
                self.ui.command_selection = None;
            }
            KeyCode::Char('?') => self.ui.show_help = true,
            _ => {}
        }
    }

    /// Bracketed paste goes to the command line when open, else the tool.
    pub fn handle_paste(&mut self, text: &str) {
        if let Some(input) = self.ui.command_input.as_mut() {
            input.extend(text.chars().filter(|c| *c != '\r').map(|c| if c == '\n' { ' ' } else { c }));
            return;
        }
        if let Some(widget) = self.widget.as_mut() {
            widget.handle_paste(text);
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let layout = ui::shell_layout(self.ui.viewport);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let mut go_home = false;
                if header::click(self.ui.screen, layout.header, mouse.column, mouse.row, || go_home = true) {
                    if go_home {
                        self.navigate_home();
                    }
                    return;
                }
                if self.ui.screen == Screen::Home && self.ui.command_input.is_none() && !self.ui.show_help {
                    let hit = ui::catalog_cards(layout.body).into_iter().position(|card| {
                        mouse.column >= card.x
                            && mouse.column < card.x + card.width
                            && mouse.row >= card.y
                            && mouse.row < card.y + card.height
                    });
                    if let Some(idx) = hit {
                        self.select(TOOLS[idx].id);
                    }
                }
            }
            MouseEventKind::ScrollUp | MouseEventKind::ScrollDown => {
                let up = matches!(mouse.kind, MouseEventKind::ScrollUp);
                let step = self.config.scroll_step;
                if let Some(widget) = self.widget.as_mut() {
                    widget.handle_scroll(up, step);
                }
            }
            _ => {}
        }
    }
}

/// Clipboard failures are logged and otherwise ignored.
fn copy_to_clipboard(text: &str) -> bool {
    match Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text.to_string())) {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "clipboard write failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::layout::Rect;

    fn app() -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = Config {
            data_dir: dir.path().to_path_buf(),
            output_dir: dir.path().to_path_buf(),
            offline: true,
            ..Config::default()
        };
        let backend = Backend::new(&config).unwrap();
        let mut app = App::new(config, backend);
        app.ui.viewport = Rect::new(0, 0, 120, 40);
        (app, dir)
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::from(code));
    }

    #[test]
    fn test_starts_home_without_widget() {
        let (app, _dir) = app();
        assert_eq!(app.ui.screen, Screen::Home);
        assert!(app.widget.is_none());
    }

    #[test]
    fn test_select_mounts_matching_widget() {
        let (mut app, _dir) = app();
        app.select(ToolId::DateCalculator);

        assert_eq!(app.ui.screen, Screen::Tool(ToolId::DateCalculator));
        assert_eq!(app.widget.as_ref().map(ToolWidget::id), Some(ToolId::DateCalculator));
    }

    #[test]
    fn test_navigation_drops_widget_and_reply() {
        let (mut app, _dir) = app();
        app.select(ToolId::TextAi);
        app.handle_paste("hello");
        press(&mut app, KeyCode::Enter);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.ui.screen, Screen::Home);
        assert!(app.widget.is_none());

        // the offline reply lands with nobody to receive it
        app.tick();
        assert!(app.widget.is_none());
        assert!(!app.should_quit);
    }

    #[test]
    fn test_digit_and_arrow_selection() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Down);
        // three columns at this width
        assert_eq!(app.ui.catalog_selection, 4);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.ui.screen, Screen::Tool(TOOLS[4].id));

        press(&mut app, KeyCode::Esc);
        press(&mut app, KeyCode::Char('9'));
        assert_eq!(app.ui.screen, Screen::Tool(ToolId::TextAi));
    }

    #[test]
    fn test_arrows_stay_on_visible_cards() {
        let (mut app, _dir) = app();
        // room for a single row of three cards
        app.ui.viewport = Rect::new(0, 0, 120, 15);
        assert_eq!(ui::catalog_cards(ui::shell_layout(app.ui.viewport).body).len(), 3);

        press(&mut app, KeyCode::Down);
        assert_eq!(app.ui.catalog_selection, 2);
        for _ in 0..5 {
            press(&mut app, KeyCode::Right);
        }
        assert_eq!(app.ui.catalog_selection, 2);

        // a selection left behind by a resize is pulled back in
        app.ui.catalog_selection = 7;
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.ui.screen, Screen::Tool(TOOLS[2].id));
    }

    #[test]
    fn test_esc_quits_from_home() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Esc);
        assert!(app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_anywhere() {
        let (mut app, _dir) = app();
        app.select(ToolId::Notepad);
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_open_command() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('/'));
        app.handle_paste("open notepad");
        press(&mut app, KeyCode::Enter);

        assert!(app.ui.command_input.is_none());
        assert_eq!(app.ui.screen, Screen::Tool(ToolId::Notepad));
    }

    #[test]
    fn test_unknown_command_sets_status() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Enter);

        assert_eq!(app.ui.screen, Screen::Home);
        assert!(app.ui.status_message.as_deref().unwrap().contains("Unknown command"));
    }

    #[test]
    fn test_command_selection_cycles() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.get_filtered_commands().len(), COMMANDS.len());

        press(&mut app, KeyCode::Char('h'));
        let filtered = app.get_filtered_commands();
        assert_eq!(filtered.iter().map(|(c, _)| *c).collect::<Vec<_>>(), vec!["/home", "/help"]);

        press(&mut app, KeyCode::Down);
        press(&mut app, KeyCode::Down);
        assert_eq!(app.ui.command_selection, Some(1));
        press(&mut app, KeyCode::Down);
        assert_eq!(app.ui.command_selection, None);

        press(&mut app, KeyCode::Up);
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.ui.command_input.as_deref(), Some("/help"));
    }

    #[test]
    fn test_backspace_closes_empty_command_line() {
        let (mut app, _dir) = app();
        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Backspace);
        assert!(app.ui.command_input.is_none());
    }

    #[test]
    fn test_status_expires() {
        let (mut app, _dir) = app();
        app.set_status("Saved");
        for _ in 0..app.config.status_timeout_ticks - 1 {
            app.tick();
        }
        assert!(app.ui.status_message.is_some());
        app.tick();
        assert!(app.ui.status_message.is_none());
    }

    #[test]
    fn test_click_card_then_header() {
        let (mut app, _dir) = app();
        let layout = ui::shell_layout(app.ui.viewport);
        let card = ui::catalog_cards(layout.body)[2];

        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: card.x + 2,
            row: card.y + 2,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(app.ui.screen, Screen::Tool(TOOLS[2].id));

        app.handle_mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 1,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(app.ui.screen, Screen::Home);
    }
}
