/// Application configuration and constants.
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// File inside the data dir that may override the defaults below
pub const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Main loop tick rate in milliseconds (target 60 FPS = ~16ms)
    pub tick_rate_ms: u64,

    /// How many ticks to show status messages (180 = ~3s at 60fps)
    pub status_timeout_ticks: u64,

    /// Modulo for animation frame counter
    pub animation_frame_mod: usize,

    /// Notepad auto-save fires this long after the last keystroke
    pub autosave_delay_ms: u64,

    /// How long "Saved" / "Copied" markers stay visible
    pub saved_marker_ms: u64,

    /// Simulated work before names appear
    pub name_generation_delay_ms: u64,

    /// Simulated lookup before TikTok details appear
    pub tiktok_lookup_delay_ms: u64,

    /// Minimum wait between sending a chat message and showing the reply
    pub chat_reply_delay_ms: u64,

    /// Minimum wait between requesting an image and showing it
    pub image_reveal_delay_ms: u64,

    /// Plain-text generation endpoint (prompt is appended as a path segment)
    pub text_endpoint: String,

    /// Image generation endpoint (`/prompt/<prompt>` is appended)
    pub image_endpoint: String,

    /// Requested edge length of generated images, in pixels
    pub image_size: u32,

    /// Number of generated images remembered in history
    pub image_history_len: usize,

    /// Lines to scroll per key press
    pub scroll_step: usize,

    /// Where persistent key-value data and the log file live
    #[serde(skip)]
    pub data_dir: PathBuf,

    /// Where generated PDFs and saved images are written
    #[serde(skip)]
    pub output_dir: PathBuf,

    /// Network tools report "offline" instead of calling out
    #[serde(skip)]
    pub offline: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tick_rate_ms: 16,
            status_timeout_ticks: 180,
            animation_frame_mod: 360,
            autosave_delay_ms: 1000,
            saved_marker_ms: 2000,
            name_generation_delay_ms: 1000,
            tiktok_lookup_delay_ms: 2000,
            chat_reply_delay_ms: 1500,
            image_reveal_delay_ms: 2000,
            text_endpoint: "https://text.pollinations.ai".to_string(),
            image_endpoint: "https://image.pollinations.ai".to_string(),
            image_size: 512,
            image_history_len: 5,
            scroll_step: 3,
            data_dir: default_data_dir(),
            output_dir: default_output_dir(),
            offline: false,
        }
    }
}

impl Config {
    /// Defaults, overridden by `config.json` in `data_dir` when present.
    ///
    /// A malformed file is logged and ignored rather than aborting startup.
    pub fn load(data_dir: &Path) -> Self {
        let path = data_dir.join(CONFIG_FILE);
        let mut config = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<Config>(&raw) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "ignoring malformed config");
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        };
        config.data_dir = data_dir.to_path_buf();
        config
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("toolifast")
}

fn default_output_dir() -> PathBuf {
    dirs::download_dir()
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Commands accepted on the catalog command line
pub const COMMANDS: &[(&str, &str)] = &[
    ("/open", "Open a tool by key"),
    ("/home", "Back to the catalog"),
    ("/help", "Show keys and commands"),
    ("/quit", "Exit Toolifast"),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_without_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path());

        assert_eq!(config.autosave_delay_ms, 1000);
        assert_eq!(config.image_size, 512);
        assert_eq!(config.data_dir, dir.path());
    }

    #[test]
    fn test_load_partial_override() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(CONFIG_FILE),
            r#"{"text_endpoint": "http://localhost:9000", "image_size": 256}"#,
        )
        .unwrap();

        let config = Config::load(dir.path());

        assert_eq!(config.text_endpoint, "http://localhost:9000");
        assert_eq!(config.image_size, 256);
        // untouched fields keep their defaults
        assert_eq!(config.tick_rate_ms, 16);
        assert_eq!(config.image_endpoint, "https://image.pollinations.ai");
    }

    #[test]
    fn test_load_malformed_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();

        let config = Config::load(dir.path());
        assert_eq!(config.status_timeout_ticks, 180);
    }
}
