use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::app::App;
use crate::config::COMMANDS;
use crate::header;
use crate::input::TextField;
use crate::registry::{ColorScheme, ToolDescriptor, TOOLS};
use crate::ui_state::Screen;

// Copper Sapphire Morning color palette
pub const BG_DARK: Color = Color::Rgb(12, 12, 16);           // Deep background
pub const BG_PANEL: Color = Color::Rgb(18, 18, 24);          // Slightly lighter for panels

// Sapphire blues
pub const SAPPHIRE: Color = Color::Rgb(101, 150, 243);       // #6596F3 - Primary accent
pub const CYAN_LIGHT: Color = Color::Rgb(178, 220, 226);     // #B2DCE2 - Light cyan

// Copper/warm tones
pub const COPPER: Color = Color::Rgb(138, 72, 38);           // #8A4826 - Copper
pub const PALE_YELLOW: Color = Color::Rgb(234, 208, 148);    // #EAD094 - Pale yellow

// Accent colors
pub const BURGUNDY: Color = Color::Rgb(204, 92, 68);         // #CC5C44 - Warnings/errors
pub const OLIVE: Color = Color::Rgb(131, 179, 102);          // #83B366 - Success/green
pub const LAVENDER: Color = Color::Rgb(211, 164, 234);       // #D3A4EA - Purple accent

// Text colors
pub const TEXT_PRIMARY: Color = Color::Rgb(240, 240, 245);   // Near white
pub const TEXT_SECONDARY: Color = Color::Rgb(180, 180, 190); // Light gray
pub const TEXT_MUTED: Color = Color::Rgb(105, 116, 133);     // #697485 - Medium gray

// Border colors (subtle)
pub const BORDER_DIM: Color = Color::Rgb(45, 50, 60);        // Dim border
pub const BORDER_ACCENT: Color = Color::Rgb(70, 85, 110);    // Accent border

const TAGLINE: &str = "Handy everyday tools. Fast, easy and free.";
const CARD_HEIGHT: u16 = 5;
const LANDING_HEIGHT: u16 = 4;

pub const HOME_HINTS: &[(&str, &str)] = &[
    ("←↑↓→", "select"),
    ("Enter", "open"),
    ("1-9", "jump"),
    ("/", "cmds"),
    ("?", "help"),
    ("Esc", "quit"),
];

/// Regions of the shell, shared by drawing and mouse hit-testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellLayout {
    pub header: Rect,
    pub body: Rect,
    pub footer: Rect,
}

pub fn shell_layout(area: Rect) -> ShellLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(3),    // Catalog or tool
            Constraint::Length(1), // Status / hints
        ])
        .split(area);
    ShellLayout {
        header: chunks[0],
        body: Rect {
            x: chunks[1].x + 1,
            y: chunks[1].y,
            width: chunks[1].width.saturating_sub(2),
            height: chunks[1].height,
        },
        footer: chunks[2],
    }
}

pub fn catalog_columns(width: u16) -> usize {
    match width {
        w if w >= 96 => 3,
        w if w >= 60 => 2,
        _ => 1,
    }
}

/// Card rectangles in registry order. Cards that do not fit vertically are
/// left out, so hit-testing never matches an invisible card.
pub fn catalog_cards(body: Rect) -> Vec<Rect> {
    let grid = Rect {
        y: body.y + LANDING_HEIGHT.min(body.height),
        height: body.height.saturating_sub(LANDING_HEIGHT),
        ..body
    };
    let cols = catalog_columns(grid.width);
    let card_width = grid.width / cols as u16;

    (0..TOOLS.len())
        .map_while(|idx| {
            let row = (idx / cols) as u16;
            let col = (idx % cols) as u16;
            let y = grid.y + row * CARD_HEIGHT;
            if y + CARD_HEIGHT > grid.y + grid.height {
                return None;
            }
            Some(Rect {
                x: grid.x + col * card_width,
                y,
                width: card_width,
                height: CARD_HEIGHT,
            })
        })
        .collect()
}

pub fn cursor(anim_frame: usize) -> &'static str {
    if anim_frame % 30 < 15 { "|" } else { " " }
}

pub fn dots(anim_frame: usize) -> &'static str {
    match (anim_frame / 20) % 4 {
        0 => "",
        1 => ".",
        2 => "..",
        _ => "...",
    }
}

/// Rounded panel used by every tool form.
pub fn panel(title: &str, focused: bool) -> Block<'static> {
    let (border, title_color) = if focused { (SAPPHIRE, SAPPHIRE) } else { (BORDER_DIM, TEXT_SECONDARY) };
    Block::default()
        .title(Span::styled(
            format!(" {title} "),
            Style::default().fg(title_color).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border))
}

/// Single-line input box with a blinking cursor and, for capped fields, a
/// character counter in the bottom border.
pub fn draw_field(frame: &mut Frame, area: Rect, title: &str, field: &TextField, focused: bool, anim_frame: usize) {
    let mut block = panel(title, focused);
    if field.max_chars().is_some() {
        block = block.title_bottom(
            Line::from(Span::styled(field.counter(), Style::default().fg(TEXT_MUTED))).right_aligned(),
        );
    }
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let cursor = if focused { cursor(anim_frame) } else { "" };
    // keep the tail visible once the text outgrows the box
    let visible = tail_fitting(field.value(), inner.width.saturating_sub(4) as usize);
    let input = Paragraph::new(format!(" > {visible}{cursor}")).style(Style::default().fg(TEXT_PRIMARY));
    frame.render_widget(input, inner);
}

fn tail_fitting(text: &str, width: usize) -> &str {
    let mut used = 0;
    let mut start = text.len();
    for (idx, c) in text.char_indices().rev() {
        used += c.width().unwrap_or(0);
        if used > width {
            break;
        }
        start = idx;
    }
    &text[start..]
}

/// Greedy word wrap by display width. Words wider than `max_width` are split.
pub fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_string()];
    }
    let mut result = Vec::new();
    let mut current_line = String::new();
    let mut current_width = 0;

    for word in text.split_whitespace() {
        let word_width = word.width();
        if current_width > 0 && current_width + 1 + word_width <= max_width {
            current_line.push(' ');
            current_line.push_str(word);
            current_width += 1 + word_width;
            continue;
        }
        if current_width > 0 {
            result.push(std::mem::take(&mut current_line));
            current_width = 0;
        }
        for c in word.chars() {
            let w = c.width().unwrap_or(0);
            if current_width + w > max_width && current_width > 0 {
                result.push(std::mem::take(&mut current_line));
                current_width = 0;
            }
            current_line.push(c);
            current_width += w;
        }
    }
    if !current_line.is_empty() {
        result.push(current_line);
    }
    if result.is_empty() {
        result.push(String::new());
    }
    result
}

fn lerp(from: (u8, u8, u8), to: (u8, u8, u8), t: f64) -> Color {
    let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t) as u8;
    Color::Rgb(mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2))
}

/// Text colored along a descriptor's two-stop gradient.
pub fn gradient_spans(text: &str, scheme: ColorScheme, bold: bool) -> Vec<Span<'static>> {
    let count = text.chars().count().max(2) - 1;
    text.chars()
        .enumerate()
        .map(|(i, ch)| {
            let mut style = Style::default().fg(lerp(scheme.from, scheme.to, i as f64 / count as f64));
            if bold {
                style = style.add_modifier(Modifier::BOLD);
            }
            Span::styled(ch.to_string(), style)
        })
        .collect()
}

pub fn draw(frame: &mut Frame, app: &App) {
    // Fill entire background
    let bg = Block::default().style(Style::default().bg(BG_DARK));
    frame.render_widget(bg, frame.area());

    let layout = shell_layout(frame.area());
    header::render(frame, layout.header, app.ui.screen);

    match (app.ui.screen, app.widget.as_ref()) {
        (Screen::Tool(id), Some(widget)) => {
            let desc = id.descriptor();
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Length(2), Constraint::Min(3)])
                .split(layout.body);
            draw_tool_heading(frame, chunks[0], desc);
            widget.draw(frame, chunks[1], app.animation_frame);
        }
        _ => draw_home(frame, app, layout.body),
    }

    draw_footer(frame, app, layout.footer);

    if app.ui.command_input.is_some() {
        draw_command_popup(frame, app, layout.body);
    }
    if app.ui.show_help {
        draw_help(frame, frame.area());
    }
}

fn draw_tool_heading(frame: &mut Frame, area: Rect, desc: &ToolDescriptor) {
    let mut spans = vec![Span::raw(format!("{} ", desc.icon))];
    spans.extend(gradient_spans(desc.title, desc.color, true));
    spans.push(Span::styled(format!("  {}", desc.description), Style::default().fg(TEXT_MUTED)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_home(frame: &mut Frame, app: &App, area: Rect) {
    // Subtle background pattern
    draw_background_pattern(frame, area, app.animation_frame);

    let landing = Rect {
        height: LANDING_HEIGHT.min(area.height),
        ..area
    };
    draw_landing(frame, landing, app.animation_frame);

    for (idx, card) in catalog_cards(area).into_iter().enumerate() {
        draw_card(frame, card, &TOOLS[idx], idx, idx == app.ui.catalog_selection, app.animation_frame);
    }
}

fn draw_landing(frame: &mut Frame, area: Rect, anim_frame: usize) {
    let mut title: Vec<Span> = Vec::new();
    for (char_idx, ch) in "T O O L I F A S T".chars().enumerate() {
        // Wave effect with sapphire-copper gradient, "TOOLI" in sapphire like the brand mark
        let wave = ((anim_frame as f64 / 25.0) + (char_idx as f64 / 6.0)).sin() * 0.5 + 0.5;
        let color = if char_idx < 10 {
            lerp((101, 150, 243), (178, 220, 226), wave * 0.6)
        } else {
            lerp((240, 240, 245), (216, 180, 169), wave * 0.6)
        };
        title.push(Span::styled(
            ch.to_string(),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ));
    }

    let lines = vec![
        Line::from(""),
        Line::from(title),
        Line::from(Span::styled(TAGLINE, Style::default().fg(TEXT_SECONDARY))),
    ];
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), area);
}

fn draw_card(frame: &mut Frame, area: Rect, desc: &ToolDescriptor, idx: usize, selected: bool, anim_frame: usize) {
    let border_color = if selected {
        // Glow between the tool's two gradient stops
        let t = (anim_frame as f64 / 60.0).sin() * 0.5 + 0.5;
        lerp(desc.color.from, desc.color.to, t)
    } else {
        BORDER_DIM
    };
    let block = Block::default()
        .title(Span::styled(format!(" {} ", idx + 1), Style::default().fg(TEXT_MUTED)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(if selected { BG_PANEL } else { BG_DARK }));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut heading = vec![Span::raw(format!(" {} ", desc.icon))];
    heading.extend(gradient_spans(desc.title, desc.color, true));

    let mut lines = vec![Line::from(heading)];
    let width = inner.width.saturating_sub(2) as usize;
    for wrapped in wrap_text(desc.description, width).into_iter().take(inner.height.saturating_sub(1) as usize) {
        lines.push(Line::from(Span::styled(format!(" {wrapped}"), Style::default().fg(TEXT_MUTED))));
    }
    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_background_pattern(frame: &mut Frame, area: Rect, anim_frame: usize) {
    let pattern_offset = (anim_frame / 30) % 4;

    // Simple twinkling starfield background
    let mut lines: Vec<Line> = Vec::new();

    for y in 0..area.height as usize {
        let mut spans: Vec<Span> = Vec::new();
        for x in 0..area.width as usize {
            let show_star = ((x + pattern_offset) % 12 == 0) && ((y + pattern_offset) % 6 == 0);
            if show_star {
                let brightness = 25 + ((anim_frame as f64 / 60.0 + (x as f64 / 12.0)).sin().abs() * 15.0) as u8;
                let color = Color::Rgb(brightness, brightness + 2, brightness + 5);
                spans.push(Span::styled(".", Style::default().fg(color)));
            } else {
                spans.push(Span::raw(" "));
            }
        }
        lines.push(Line::from(spans));
    }

    let pattern = Paragraph::new(lines).style(Style::default().bg(BG_DARK));
    frame.render_widget(pattern, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    if let Some(msg) = &app.ui.status_message {
        let status = Paragraph::new(Span::styled(format!(" {msg}"), Style::default().fg(PALE_YELLOW)));
        frame.render_widget(status, area);
        return;
    }

    let hints = match &app.widget {
        Some(widget) => widget.hints(),
        None => HOME_HINTS,
    };
    let mut spans: Vec<Span> = Vec::new();
    for (key, desc) in hints {
        spans.push(Span::styled(format!(" {key}"), Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD)));
        spans.push(Span::styled(format!(" {desc} "), Style::default().fg(TEXT_MUTED)));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_command_popup(frame: &mut Frame, app: &App, body: Rect) {
    let input = app.ui.command_input.as_deref().unwrap_or_default();
    let filtered = app.get_filtered_commands();

    // +1 for the input line, +2 for borders
    let popup_height = (filtered.len() + 3) as u16;
    let popup_width = 48.min(body.width.saturating_sub(4));
    let popup_area = Rect {
        x: body.x + 2,
        y: body.y + body.height.saturating_sub(popup_height + 1),
        width: popup_width,
        height: popup_height.min(body.height),
    };

    // Clear area behind popup
    frame.render_widget(Clear, popup_area);

    let block = Block::default()
        .title(Span::styled(" Commands ", Style::default().fg(COPPER).add_modifier(Modifier::BOLD)))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(COPPER))
        .style(Style::default().bg(BG_PANEL));

    let inner = block.inner(popup_area);
    frame.render_widget(block, popup_area);

    // First option: current typed input (selected when command_selection is None)
    let input_selected = app.ui.command_selection.is_none();
    let input_style = if input_selected {
        Style::default().fg(CYAN_LIGHT).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(TEXT_SECONDARY)
    };
    let indicator = if input_selected { ">" } else { " " };
    let mut lines = vec![Line::from(vec![
        Span::styled(format!("{} {}{} ", indicator, input, cursor(app.animation_frame)), input_style),
        Span::styled("(your input)", Style::default().fg(TEXT_MUTED).add_modifier(Modifier::ITALIC)),
    ])];

    for (i, (cmd, desc)) in filtered.iter().enumerate() {
        let is_selected = app.ui.command_selection == Some(i);
        let style = if is_selected {
            Style::default().fg(CYAN_LIGHT).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(TEXT_SECONDARY)
        };
        let indicator = if is_selected { ">" } else { " " };

        lines.push(Line::from(vec![
            Span::styled(format!("{} {} ", indicator, cmd), style),
            Span::styled(format!("- {}", desc), Style::default().fg(TEXT_MUTED)),
        ]));
    }

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_help(frame: &mut Frame, area: Rect) {
    let width = 62.min(area.width.saturating_sub(4));
    let height = (12 + COMMANDS.len() as u16).min(area.height.saturating_sub(2));
    let popup = Rect {
        x: area.x + area.width.saturating_sub(width) / 2,
        y: area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    };
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .title(Span::styled(" Help ", Style::default().fg(LAVENDER).add_modifier(Modifier::BOLD)))
        .title_bottom(Line::from(Span::styled(" any key closes ", Style::default().fg(TEXT_MUTED))).right_aligned())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(BORDER_ACCENT))
        .style(Style::default().bg(BG_PANEL));
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let key_line = |key: &str, desc: &str| {
        Line::from(vec![
            Span::styled(format!(" {key:<10}"), Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD)),
            Span::styled(desc.to_string(), Style::default().fg(TEXT_SECONDARY)),
        ])
    };

    let mut lines = vec![
        Line::from(Span::styled(" Keys", Style::default().fg(COPPER).add_modifier(Modifier::BOLD))),
        key_line("Esc", "back to the catalog, or quit from it"),
        key_line("Ctrl+C", "quit"),
        key_line("Ctrl+V", "paste into the focused field"),
        key_line("1-9", "open a tool from the catalog"),
        key_line("Mouse", "click a card or the header to navigate"),
        Line::from(""),
        Line::from(Span::styled(" Commands", Style::default().fg(COPPER).add_modifier(Modifier::BOLD))),
    ];
    lines.extend(COMMANDS.iter().map(|(cmd, desc)| key_line(cmd, desc)));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" Tool keys: {}", TOOLS.iter().map(|t| t.id.key()).collect::<Vec<_>>().join(" ")),
        Style::default().fg(TEXT_MUTED),
    )));
    frame.render_widget(Paragraph::new(lines), inner);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_text_by_words() {
        assert_eq!(wrap_text("the quick brown fox", 9), vec!["the quick", "brown fox"]);
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }

    #[test]
    fn test_wrap_text_breaks_long_words() {
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn test_wrap_text_counts_display_width() {
        // each CJK char is two columns wide
        assert_eq!(wrap_text("日本語です", 4), vec!["日本", "語で", "す"]);
    }

    #[test]
    fn test_tail_fitting_keeps_end() {
        assert_eq!(tail_fitting("hello world", 5), "world");
        assert_eq!(tail_fitting("hi", 5), "hi");
    }

    #[test]
    fn test_catalog_cards_follow_registry_order() {
        let body = Rect::new(0, 0, 120, 40);
        let cards = catalog_cards(body);

        assert_eq!(cards.len(), TOOLS.len());
        assert_eq!(cards[0].y, cards[2].y);
        assert!(cards[0].x < cards[1].x && cards[1].x < cards[2].x);
        assert!(cards[3].y > cards[0].y);
        assert!(cards.iter().all(|c| c.y >= LANDING_HEIGHT));
    }

    #[test]
    fn test_catalog_cards_clipped_to_height() {
        let body = Rect::new(0, 0, 40, LANDING_HEIGHT + CARD_HEIGHT * 2);
        assert_eq!(catalog_cards(body).len(), 2);
    }

    #[test]
    fn test_gradient_spans_hit_both_stops() {
        let scheme = ColorScheme { from: (0, 0, 0), to: (200, 100, 50) };
        let spans = gradient_spans("abc", scheme, false);
        assert_eq!(spans[0].style.fg, Some(Color::Rgb(0, 0, 0)));
        assert_eq!(spans[2].style.fg, Some(Color::Rgb(200, 100, 50)));
    }
}
