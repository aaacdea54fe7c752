use std::sync::LazyLock;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};
use regex::Regex;

use crate::action::Action;
use crate::config::Config;
use crate::input::TextField;
use crate::ui::{self, BURGUNDY, COPPER, CYAN_LIGHT, PALE_YELLOW, TEXT_MUTED, TEXT_PRIMARY, TEXT_SECONDARY};

pub const HINTS: &[(&str, &str)] = &[("Enter", "look up"), ("Ctrl+D", "download"), ("Esc", "home")];

static URL_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [
        r"^https?://(www\.)?tiktok\.com/@[A-Za-z0-9_.-]+/video/[0-9]+",
        r"^https?://vm\.tiktok\.com/[A-Za-z0-9_]+",
        r"^https?://vt\.tiktok\.com/[A-Za-z0-9_]+",
        r"^https?://www\.tiktok\.com/t/[A-Za-z0-9_]+",
    ]
    .iter()
    .filter_map(|p| Regex::new(p).ok())
    .collect()
});

static VIDEO_ID: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"/video/([0-9]+)").ok());

const THUMBNAIL_BASE: &str = "https://readdy.ai/api/search-image?query=tiktok%20video%20screenshot%20mobile%20app%20interface&width=300&height=400";

pub fn is_valid_url(url: &str) -> bool {
    let url = url.trim();
    !url.is_empty() && URL_PATTERNS.iter().any(|re| re.is_match(url))
}

/// Numeric id from `/video/<digits>`. Short links carry none.
pub fn extract_video_id(url: &str) -> Option<&str> {
    VIDEO_ID
        .as_ref()?
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoInfo {
    pub title: String,
    pub author: String,
    pub duration: String,
    pub views: String,
    pub likes: String,
    pub thumbnail: String,
}

/// Placeholder metadata. The thumbnail is keyed by the video id, or by
/// `now_ms` for links without one.
pub fn mock_info(video_id: Option<&str>, now_ms: i64) -> VideoInfo {
    let seq = video_id.map_or_else(|| now_ms.to_string(), str::to_string);
    VideoInfo {
        title: "TikTok video".to_string(),
        author: "@tiktok_user".to_string(),
        duration: "00:15".to_string(),
        views: "123.4K".to_string(),
        likes: "12.3K".to_string(),
        thumbnail: format!("{THUMBNAIL_BASE}&seq=tiktok-{seq}&orientation=portrait"),
    }
}

pub struct TiktokDownloader {
    url: TextField,
    lookup: Option<(Instant, String)>,
    info: Option<VideoInfo>,
    error: Option<String>,
    delay: Duration,
}

impl TiktokDownloader {
    pub fn new(config: &Config) -> Self {
        Self {
            url: TextField::new(),
            lookup: None,
            info: None,
            error: None,
            delay: Duration::from_millis(config.tiktok_lookup_delay_ms),
        }
    }

    pub fn info(&self) -> Option<&VideoInfo> {
        self.info.as_ref()
    }

    pub fn is_processing(&self) -> bool {
        self.lookup.is_some()
    }

    pub fn submit(&mut self, now: Instant) {
        let url = self.url.value().trim().to_string();
        if url.is_empty() || self.is_processing() {
            return;
        }
        if !is_valid_url(&url) {
            self.error = Some("Please enter a valid TikTok URL".to_string());
            return;
        }
        self.error = None;
        self.info = None;
        self.lookup = Some((now + self.delay, url));
    }

    pub fn tick(&mut self, now: Instant, now_ms: i64) {
        let due = matches!(&self.lookup, Some((deadline, _)) if now >= *deadline);
        if !due {
            return;
        }
        if let Some((_, url)) = self.lookup.take() {
            tracing::debug!(%url, "tiktok lookup finished");
            self.info = Some(mock_info(extract_video_id(&url), now_ms));
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Enter => self.submit(Instant::now()),
            KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                if self.info.is_some() {
                    return Action::Status("A real implementation would download the video here".to_string());
                }
            }
            _ => {
                if self.url.handle_key(key) {
                    self.error = None;
                }
            }
        }
        Action::None
    }

    pub fn handle_paste(&mut self, text: &str) {
        if self.url.insert_str(text.trim()) {
            self.error = None;
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, anim_frame: usize) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // URL
                Constraint::Length(1), // Status line
                Constraint::Min(7),    // Video info
                Constraint::Length(6), // Instructions
            ])
            .split(area);

        ui::draw_field(frame, chunks[0], "TikTok video URL", &self.url, true, anim_frame);

        let status = if self.is_processing() {
            Span::styled(format!(" Processing{}", ui::dots(anim_frame)), Style::default().fg(CYAN_LIGHT))
        } else if let Some(err) = &self.error {
            Span::styled(format!(" {err}"), Style::default().fg(BURGUNDY))
        } else {
            Span::styled(" https://www.tiktok.com/@user/video/...", Style::default().fg(TEXT_MUTED))
        };
        frame.render_widget(Paragraph::new(Line::from(status)), chunks[1]);

        let block = ui::panel("Video details", false);
        let inner = block.inner(chunks[2]);
        frame.render_widget(block, chunks[2]);
        if let Some(info) = &self.info {
            let label = Style::default().fg(TEXT_SECONDARY).add_modifier(Modifier::BOLD);
            let value = Style::default().fg(TEXT_PRIMARY);
            let lines = vec![
                Line::from(vec![Span::styled(" Title:  ", label), Span::styled(info.title.clone(), value)]),
                Line::from(vec![Span::styled(" Author: ", label), Span::styled(info.author.clone(), value)]),
                Line::from(vec![
                    Span::styled(format!(" ⏱ {}", info.duration), Style::default().fg(PALE_YELLOW)),
                    Span::styled(format!("   👁 {}", info.views), Style::default().fg(PALE_YELLOW)),
                    Span::styled(format!("   ♥ {}", info.likes), Style::default().fg(PALE_YELLOW)),
                ]),
                Line::from(Span::styled(format!(" {}", info.thumbnail), Style::default().fg(TEXT_MUTED))),
                Line::from(""),
                Line::from(vec![
                    Span::styled(" Ctrl+D ", Style::default().fg(COPPER).add_modifier(Modifier::BOLD)),
                    Span::styled("download video", value),
                ]),
            ];
            frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), inner);
        }

        let steps = [
            "Copy the TikTok video URL",
            "Paste it in the field above",
            "Press Enter to process it",
            "Download the video without watermark",
        ];
        let mut lines = vec![Line::from(Span::styled(
            " Instructions",
            Style::default().fg(BURGUNDY).add_modifier(Modifier::BOLD),
        ))];
        lines.extend(steps.iter().enumerate().map(|(i, step)| {
            Line::from(Span::styled(format!(" {}. {step}", i + 1), Style::default().fg(TEXT_MUTED)))
        }));
        frame.render_widget(Paragraph::new(lines), chunks[3]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_patterns() {
        assert!(is_valid_url("https://www.tiktok.com/@some.user_1/video/7234567890123"));
        assert!(is_valid_url("http://tiktok.com/@user/video/1"));
        assert!(is_valid_url("https://vm.tiktok.com/ZMabc123/"));
        assert!(is_valid_url("https://vt.tiktok.com/ZSxyz/"));
        assert!(is_valid_url("https://www.tiktok.com/t/ZTR4nd0m/"));

        assert!(!is_valid_url(""));
        assert!(!is_valid_url("https://youtube.com/watch?v=abc"));
        assert!(!is_valid_url("https://www.tiktok.com/@user"));
        assert!(!is_valid_url("tiktok.com/@user/video/123"));

        // word and digit classes are ASCII only
        assert!(!is_valid_url("https://vm.tiktok.com/ñ"));
        assert!(!is_valid_url("https://www.tiktok.com/@user/video/١٢٣"));
        assert!(!is_valid_url("https://www.tiktok.com/@пользователь/video/1"));
    }

    #[test]
    fn test_video_id_extraction() {
        assert_eq!(extract_video_id("https://www.tiktok.com/@u/video/98765?lang=en"), Some("98765"));
        assert_eq!(extract_video_id("https://vm.tiktok.com/ZMabc123/"), None);
        assert_eq!(extract_video_id("https://www.tiktok.com/@user/video/١٢٣"), None);
    }

    #[test]
    fn test_thumbnail_keyed_by_id_or_timestamp() {
        assert!(mock_info(Some("42"), 1).thumbnail.contains("seq=tiktok-42&"));
        assert!(mock_info(None, 1_700_000_000_000).thumbnail.contains("seq=tiktok-1700000000000&"));
    }

    #[test]
    fn test_invalid_url_shows_error_without_lookup() {
        let mut tool = TiktokDownloader::new(&Config::default());
        tool.handle_paste("https://example.com/video/1");
        tool.submit(Instant::now());

        assert!(tool.error.is_some());
        assert!(!tool.is_processing());
    }

    #[test]
    fn test_info_appears_after_delay() {
        let mut tool = TiktokDownloader::new(&Config::default());
        tool.handle_paste("https://www.tiktok.com/@user/video/555");
        let start = Instant::now();
        tool.submit(start);
        assert!(tool.is_processing());

        tool.tick(start + Duration::from_millis(500), 0);
        assert!(tool.info().is_none());

        tool.tick(start + Duration::from_millis(2000), 0);
        assert!(!tool.is_processing());
        assert!(tool.info().unwrap().thumbnail.contains("tiktok-555"));
    }

    #[test]
    fn test_download_only_reports() {
        let mut tool = TiktokDownloader::new(&Config::default());
        let ctrl_d = KeyEvent::new(KeyCode::Char('d'), KeyModifiers::CONTROL);
        assert_eq!(tool.handle_key(ctrl_d), Action::None);

        tool.info = Some(mock_info(Some("1"), 0));
        assert!(matches!(tool.handle_key(ctrl_d), Action::Status(_)));
    }
}
