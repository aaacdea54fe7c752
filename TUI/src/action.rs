use crate::registry::ToolId;

/// User actions that can be triggered by commands, keys or tool widgets.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Nothing for the shell to do
    None,
    /// Back to the catalog
    Home,
    /// Mount a tool
    Open(ToolId),
    /// Show help overlay
    Help,
    /// Put text on the system clipboard
    Copy { text: String, label: String },
    /// Footer status message
    Status(String),
    /// Quit application
    Quit,
}
