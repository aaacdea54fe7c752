use ratatui::layout::Rect;

use crate::registry::ToolId;

/// What the shell shows below the header. Exactly one tool is mounted at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Home,
    Tool(ToolId),
}

#[derive(Default)]
pub struct UIState {
    pub screen: Screen,

    // Highlighted catalog card
    pub catalog_selection: usize,

    // Command line, open while `Some`
    pub command_input: Option<String>,
    pub command_selection: Option<usize>,

    pub status_message: Option<String>,
    pub status_expires_tick: u64,

    pub show_help: bool,

    // Last frame size, for mouse hit-testing
    pub viewport: Rect,
}

impl UIState {
    pub fn new() -> Self {
        Self::default()
    }
}
