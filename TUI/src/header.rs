//! Top bar: brand mark, plus a home button away from the catalog.
//!
//! Holds no state. Both the drawing and the hit-testing derive everything
//! from the current screen and the header area.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthStr;

use crate::ui::{BORDER_DIM, COPPER, SAPPHIRE, TEXT_PRIMARY};
use crate::ui_state::Screen;

const HOME_LABEL: &str = "[ ← Home ]";

fn brand_rect(area: Rect) -> Rect {
    Rect {
        x: area.x + 2,
        y: area.y + 1,
        width: ("⚡ ".width() as u16 + "Toolifast".width() as u16).min(area.width.saturating_sub(4)),
        height: 1.min(area.height),
    }
}

fn home_rect(area: Rect) -> Rect {
    let width = (HOME_LABEL.width() as u16).min(area.width.saturating_sub(4));
    Rect {
        x: area.x + area.width.saturating_sub(width + 2),
        y: area.y + 1,
        width,
        height: 1.min(area.height),
    }
}

fn contains(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

pub fn render(frame: &mut Frame, area: Rect, screen: Screen) {
    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_DIM));
    frame.render_widget(block, area);

    let brand = Line::from(vec![
        Span::raw("⚡ "),
        Span::styled("Tooli", Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD)),
        Span::styled("fast", Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD)),
    ]);
    frame.render_widget(Paragraph::new(brand), brand_rect(area));

    if screen != Screen::Home {
        let home = Span::styled(HOME_LABEL, Style::default().fg(COPPER).add_modifier(Modifier::BOLD));
        frame.render_widget(Paragraph::new(home), home_rect(area));
    }
}

/// Runs `on_home` when the click lands on the brand, or on the home button
/// while it is shown. Returns whether the click was consumed.
pub fn click(screen: Screen, area: Rect, col: u16, row: u16, on_home: impl FnOnce()) -> bool {
    let hit = contains(brand_rect(area), col, row)
        || (screen != Screen::Home && contains(home_rect(area), col, row));
    if hit {
        on_home();
    }
    hit
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ToolId;
    use ratatui::{backend::TestBackend, Terminal};

    fn rendered(screen: Screen) -> String {
        let mut terminal = Terminal::new(TestBackend::new(60, 3)).unwrap();
        terminal
            .draw(|frame| render(frame, frame.area(), screen))
            .unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn test_home_button_only_away_from_home() {
        let home = rendered(Screen::Home);
        assert!(home.contains("Tooli"));
        assert!(!home.contains("Home"));

        let tool = rendered(Screen::Tool(ToolId::Notepad));
        assert!(tool.contains("Tooli"));
        assert!(tool.contains("Home"));
    }

    #[test]
    fn test_click_home_button() {
        let area = Rect::new(0, 0, 60, 3);
        let button = home_rect(area);
        let mut called = false;

        assert!(click(Screen::Tool(ToolId::TextAi), area, button.x + 1, 1, || called = true));
        assert!(called);
    }

    #[test]
    fn test_hidden_button_ignores_clicks() {
        let area = Rect::new(0, 0, 60, 3);
        let button = home_rect(area);
        let mut called = false;

        assert!(!click(Screen::Home, area, button.x + 1, 1, || called = true));
        assert!(!called);
    }

    #[test]
    fn test_brand_always_clickable() {
        let area = Rect::new(0, 0, 60, 3);
        let mut calls = 0;
        click(Screen::Home, area, 3, 1, || calls += 1);
        click(Screen::Tool(ToolId::Notepad), area, 3, 1, || calls += 1);
        click(Screen::Home, area, 3, 2, || calls += 1);
        assert_eq!(calls, 2);
    }
}
