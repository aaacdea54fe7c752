use std::fs;
use std::path::{Path, PathBuf};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::action::Action;
use crate::config::Config;
use crate::input::TextField;
use crate::pdf;
use crate::ui::{self, BURGUNDY, COPPER, OLIVE, SAPPHIRE, TEXT_MUTED, TEXT_SECONDARY};

pub const OUTPUT_FILE: &str = "converted-images.pdf";

pub const HINTS: &[(&str, &str)] = &[
    ("Enter", "add path"),
    ("Tab", "list"),
    ("Del", "remove"),
    ("Ctrl+P", "convert"),
    ("Esc", "home"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub size_bytes: u64,
}

impl SelectedFile {
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / 1024.0 / 1024.0
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Notice {
    Info(String),
    Error(String),
}

pub struct ImageToPdf {
    path_input: TextField,
    files: Vec<SelectedFile>,
    list_focus: Option<usize>,
    output_dir: PathBuf,
    notice: Option<Notice>,
}

/// Accept `~/`, surrounding quotes, and percent-encoded `file://` URLs from
/// drag-and-drop.
fn normalize_path(raw: &str) -> Option<PathBuf> {
    let raw = raw.trim().trim_matches(|c| c == '"' || c == '\'');
    let raw = match raw.strip_prefix("file://") {
        // plain paths may contain a literal '%', only urls are decoded
        Some(url) => urlencoding::decode(url).map_or_else(|_| url.to_string(), |decoded| decoded.into_owned()),
        None => raw.to_string(),
    };
    if raw.is_empty() {
        return None;
    }
    match raw.strip_prefix("~/") {
        Some(rest) => dirs::home_dir().map(|home| home.join(rest)),
        None => Some(PathBuf::from(&raw)),
    }
}

impl ImageToPdf {
    pub fn new(config: &Config) -> Self {
        Self {
            path_input: TextField::new(),
            files: Vec::new(),
            list_focus: None,
            output_dir: config.output_dir.clone(),
            notice: None,
        }
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    /// Add one path. Non-image and unreadable paths are reported, not added.
    pub fn add_path(&mut self, raw: &str) -> bool {
        let Some(path) = normalize_path(raw) else {
            return false;
        };
        if !pdf::is_image_path(&path) {
            self.notice = Some(Notice::Error(format!("{} is not an image", path.display())));
            return false;
        }
        let size_bytes = match fs::metadata(&path) {
            Ok(meta) if meta.is_file() => meta.len(),
            Ok(_) => {
                self.notice = Some(Notice::Error(format!("{} is not a file", path.display())));
                return false;
            }
            Err(e) => {
                self.notice = Some(Notice::Error(format!("{}: {e}", path.display())));
                return false;
            }
        };
        tracing::debug!(path = %path.display(), size_bytes, "image selected");
        self.files.push(SelectedFile { path, size_bytes });
        self.notice = None;
        true
    }

    pub fn remove(&mut self, idx: usize) {
        if idx < self.files.len() {
            self.files.remove(idx);
        }
        self.list_focus = match self.files.len() {
            0 => None,
            len => self.list_focus.map(|f| f.min(len - 1)),
        };
    }

    /// Write every selected image, in order, into one PDF inside `dir`.
    pub fn convert_into(&mut self, dir: &Path) -> Result<(PathBuf, usize), pdf::PdfError> {
        let paths: Vec<PathBuf> = self.files.iter().map(|f| f.path.clone()).collect();
        if paths.is_empty() {
            return Err(pdf::PdfError::NoImages);
        }
        let output = dir.join(OUTPUT_FILE);
        let pages = pdf::convert_files(&paths, &output)?;
        Ok((output, pages))
    }

    fn convert(&mut self) -> Action {
        if self.files.is_empty() {
            return Action::None;
        }
        let dir = self.output_dir.clone();
        match self.convert_into(&dir) {
            Ok((output, pages)) => {
                let msg = format!("{pages} page PDF written to {}", output.display());
                self.notice = Some(Notice::Info(msg.clone()));
                Action::Status(msg)
            }
            Err(e) => {
                tracing::error!(error = %e, "pdf conversion failed");
                self.notice = Some(Notice::Error(format!("Conversion failed: {e}")));
                Action::None
            }
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.code == KeyCode::Char('p') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return self.convert();
        }
        if key.code == KeyCode::Tab {
            self.list_focus = match self.list_focus {
                None if !self.files.is_empty() => Some(0),
                _ => None,
            };
            return Action::None;
        }

        if let Some(idx) = self.list_focus {
            match key.code {
                KeyCode::Up => self.list_focus = Some(idx.saturating_sub(1)),
                KeyCode::Down => self.list_focus = Some((idx + 1).min(self.files.len().saturating_sub(1))),
                KeyCode::Delete | KeyCode::Backspace | KeyCode::Char('d') => self.remove(idx),
                _ => {}
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Enter => {
                let raw = self.path_input.value().to_string();
                if self.add_path(&raw) {
                    self.path_input.clear();
                }
            }
            _ => {
                self.path_input.handle_key(key);
            }
        }
        Action::None
    }

    /// Pasted text may carry several paths, one per line.
    pub fn handle_paste(&mut self, text: &str) {
        let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
        if lines.len() <= 1 {
            self.path_input.insert_str(text.trim());
            return;
        }
        for line in lines {
            self.add_path(line);
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, anim_frame: usize) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Path field
                Constraint::Length(2), // Notice
                Constraint::Min(4),    // Selected files
            ])
            .split(area);

        ui::draw_field(
            frame,
            chunks[0],
            "Image path (png, jpg, gif, webp, bmp)",
            &self.path_input,
            self.list_focus.is_none(),
            anim_frame,
        );

        let notice = match &self.notice {
            Some(Notice::Info(msg)) => Span::styled(format!(" ✓ {msg}"), Style::default().fg(OLIVE)),
            Some(Notice::Error(msg)) => Span::styled(format!(" {msg}"), Style::default().fg(BURGUNDY)),
            None => Span::styled(
                format!(" Output: {}", self.output_dir.join(OUTPUT_FILE).display()),
                Style::default().fg(TEXT_MUTED),
            ),
        };
        frame.render_widget(Paragraph::new(Line::from(notice)).wrap(Wrap { trim: true }), chunks[1]);

        let title = format!("Selected images ({})", self.files.len());
        let block = ui::panel(&title, self.list_focus.is_some());
        let inner = block.inner(chunks[2]);
        frame.render_widget(block, chunks[2]);

        if self.files.is_empty() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    " Type or paste image paths above; each becomes one page",
                    Style::default().fg(TEXT_MUTED),
                )),
                inner,
            );
            return;
        }

        let lines: Vec<Line> = self
            .files
            .iter()
            .enumerate()
            .map(|(idx, file)| {
                let focused = self.list_focus == Some(idx);
                let name = file
                    .path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| file.path.display().to_string());
                Line::from(vec![
                    Span::styled(if focused { " ▸ " } else { "   " }, Style::default().fg(COPPER)),
                    Span::styled(format!("{:>2}. ", idx + 1), Style::default().fg(TEXT_MUTED)),
                    Span::styled(
                        name,
                        if focused {
                            Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD)
                        } else {
                            Style::default().fg(TEXT_SECONDARY)
                        },
                    ),
                    Span::styled(format!("  {:.2} MB", file.size_mb()), Style::default().fg(TEXT_MUTED)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_png(dir: &Path, name: &str, width: u32) -> PathBuf {
        let path = dir.join(name);
        RgbImage::from_pixel(width, 6, Rgb([0, 0, 255])).save(&path).unwrap();
        path
    }

    fn tool(output: &Path) -> ImageToPdf {
        let config = Config {
            output_dir: output.to_path_buf(),
            ..Config::default()
        };
        ImageToPdf::new(&config)
    }

    #[test]
    fn test_non_images_are_filtered() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        fs::write(&txt, "hi").unwrap();

        let mut tool = tool(dir.path());
        assert!(!tool.add_path(txt.to_str().unwrap()));
        assert!(tool.files().is_empty());
        assert!(matches!(tool.notice, Some(Notice::Error(_))));
    }

    #[test]
    fn test_file_url_is_percent_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let photo = write_png(dir.path(), "My Photo.png", 4);
        let url = format!("file://{}", dir.path().join("My%20Photo.png").display());

        let mut tool = tool(dir.path());
        assert!(tool.add_path(&url));
        assert_eq!(tool.files()[0].path, photo);
    }

    #[test]
    fn test_plain_path_keeps_percent() {
        assert_eq!(normalize_path("/tmp/100%25.png"), Some(PathBuf::from("/tmp/100%25.png")));
    }

    #[test]
    fn test_missing_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut tool = tool(dir.path());
        assert!(!tool.add_path(dir.path().join("ghost.png").to_str().unwrap()));
    }

    #[test]
    fn test_quoted_paste_of_several_paths() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_png(dir.path(), "a.png", 4);
        let b = write_png(dir.path(), "b.png", 8);

        let mut tool = tool(dir.path());
        tool.handle_paste(&format!("'{}'\n\"{}\"\n", a.display(), b.display()));

        let names: Vec<PathBuf> = tool.files().iter().map(|f| f.path.clone()).collect();
        assert_eq!(names, vec![a, b]);
        assert!(tool.files()[0].size_bytes > 0);
    }

    #[test]
    fn test_convert_writes_one_page_per_image() {
        let dir = tempfile::tempdir().unwrap();
        let mut tool = tool(dir.path());
        for (name, width) in [("1.png", 5), ("2.png", 6), ("3.png", 7)] {
            let path = write_png(dir.path(), name, width);
            assert!(tool.add_path(path.to_str().unwrap()));
        }

        let (output, pages) = tool.convert_into(dir.path()).unwrap();

        assert_eq!(pages, 3);
        assert_eq!(output.file_name().unwrap(), OUTPUT_FILE);
        let doc = lopdf::Document::load(&output).unwrap();
        assert_eq!(doc.get_pages().len(), 3);
    }

    #[test]
    fn test_convert_with_nothing_selected() {
        let dir = tempfile::tempdir().unwrap();
        let mut tool = tool(dir.path());
        assert!(matches!(tool.convert_into(dir.path()), Err(pdf::PdfError::NoImages)));
    }

    #[test]
    fn test_remove_keeps_focus_in_range() {
        let dir = tempfile::tempdir().unwrap();
        let mut tool = tool(dir.path());
        let a = write_png(dir.path(), "a.png", 2);
        let b = write_png(dir.path(), "b.png", 2);
        tool.add_path(a.to_str().unwrap());
        tool.add_path(b.to_str().unwrap());

        tool.list_focus = Some(1);
        tool.remove(1);
        assert_eq!(tool.list_focus, Some(0));
        tool.remove(0);
        assert_eq!(tool.list_focus, None);
        assert!(tool.files().is_empty());
    }

    #[test]
    fn test_size_in_megabytes() {
        let file = SelectedFile {
            path: PathBuf::from("x.png"),
            size_bytes: 3 * 1024 * 1024 / 2,
        };
        assert!((file.size_mb() - 1.5).abs() < f64::EPSILON);
    }
}
