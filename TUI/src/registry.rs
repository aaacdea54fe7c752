//! Static catalog of tools shown on the home screen.

/// Identifier of a tool. The set is closed: every variant has exactly one
/// descriptor in [`TOOLS`] and one widget in `tools::ToolWidget::mount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolId {
    TextStyle,
    InvisibleText,
    ImageToPdf,
    TiktokDownloader,
    Notepad,
    NameGenerator,
    DateCalculator,
    ImageAi,
    TextAi,
}

impl ToolId {
    /// Stable string key, also accepted by `/open <key>`.
    pub const fn key(self) -> &'static str {
        match self {
            ToolId::TextStyle => "text-style",
            ToolId::InvisibleText => "invisible-text",
            ToolId::ImageToPdf => "image-to-pdf",
            ToolId::TiktokDownloader => "tiktok-downloader",
            ToolId::Notepad => "notepad",
            ToolId::NameGenerator => "name-generator",
            ToolId::DateCalculator => "date-calculator",
            ToolId::ImageAi => "image-ai",
            ToolId::TextAi => "text-ai",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        TOOLS.iter().map(|t| t.id).find(|id| id.key() == key)
    }

    pub fn descriptor(self) -> &'static ToolDescriptor {
        // TOOLS is built in declaration order, see test_catalog_order_matches_ids
        &TOOLS[self as usize]
    }
}

/// Two-stop gradient used for a tool's icon badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorScheme {
    pub from: (u8, u8, u8),
    pub to: (u8, u8, u8),
}

#[derive(Debug, Clone, Copy)]
pub struct ToolDescriptor {
    pub id: ToolId,
    pub title: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub color: ColorScheme,
}

const PURPLE: (u8, u8, u8) = (168, 85, 247);
const PINK: (u8, u8, u8) = (236, 72, 153);
const BLUE: (u8, u8, u8) = (59, 130, 246);
const CYAN: (u8, u8, u8) = (6, 182, 212);
const GREEN: (u8, u8, u8) = (34, 197, 94);
const EMERALD: (u8, u8, u8) = (16, 185, 129);
const RED: (u8, u8, u8) = (239, 68, 68);
const ORANGE: (u8, u8, u8) = (249, 115, 22);
const YELLOW: (u8, u8, u8) = (234, 179, 8);
const AMBER: (u8, u8, u8) = (245, 158, 11);
const INDIGO: (u8, u8, u8) = (99, 102, 241);
const TEAL: (u8, u8, u8) = (20, 184, 166);
const ROSE: (u8, u8, u8) = (244, 63, 94);
const VIOLET: (u8, u8, u8) = (139, 92, 246);

pub const TOOLS: [ToolDescriptor; 9] = [
    ToolDescriptor {
        id: ToolId::TextStyle,
        title: "Fancy Text Generator",
        description: "Turn plain text into stylized letters for TikTok, Instagram, Free Fire",
        icon: "🎨",
        color: ColorScheme { from: PURPLE, to: PINK },
    },
    ToolDescriptor {
        id: ToolId::InvisibleText,
        title: "Invisible Text",
        description: "Generate invisible characters for names or messages",
        icon: "👻",
        color: ColorScheme { from: BLUE, to: CYAN },
    },
    ToolDescriptor {
        id: ToolId::ImageToPdf,
        title: "Image to PDF",
        description: "Convert images into a single PDF document",
        icon: "📄",
        color: ColorScheme { from: GREEN, to: EMERALD },
    },
    ToolDescriptor {
        id: ToolId::TiktokDownloader,
        title: "TikTok Downloader",
        description: "Check a TikTok link and preview its video details",
        icon: "📱",
        color: ColorScheme { from: RED, to: ORANGE },
    },
    ToolDescriptor {
        id: ToolId::Notepad,
        title: "Notepad",
        description: "Text editor with local storage",
        icon: "📝",
        color: ColorScheme { from: YELLOW, to: AMBER },
    },
    ToolDescriptor {
        id: ToolId::NameGenerator,
        title: "Name Generator",
        description: "Create unique, epic names for profiles and games",
        icon: "⚡",
        color: ColorScheme { from: INDIGO, to: PURPLE },
    },
    ToolDescriptor {
        id: ToolId::DateCalculator,
        title: "Date Calculator",
        description: "Work out dates, ages and time remaining",
        icon: "📅",
        color: ColorScheme { from: TEAL, to: BLUE },
    },
    ToolDescriptor {
        id: ToolId::ImageAi,
        title: "AI Image Generator",
        description: "Create striking images with artificial intelligence",
        icon: "🎭",
        color: ColorScheme { from: ROSE, to: PINK },
    },
    ToolDescriptor {
        id: ToolId::TextAi,
        title: "AI Chat",
        description: "Chat with an advanced AI model",
        icon: "🤖",
        color: ColorScheme { from: VIOLET, to: PURPLE },
    },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_order_matches_ids() {
        for (idx, tool) in TOOLS.iter().enumerate() {
            assert_eq!(tool.id as usize, idx, "{} out of place", tool.id.key());
            assert_eq!(tool.id.descriptor().id, tool.id);
        }
    }

    #[test]
    fn test_keys_are_unique_and_round_trip() {
        let keys: HashSet<&str> = TOOLS.iter().map(|t| t.id.key()).collect();
        assert_eq!(keys.len(), TOOLS.len());

        for tool in &TOOLS {
            assert_eq!(ToolId::from_key(tool.id.key()), Some(tool.id));
        }
    }

    #[test]
    fn test_from_key_unknown() {
        assert_eq!(ToolId::from_key("home"), None);
        assert_eq!(ToolId::from_key(""), None);
        assert_eq!(ToolId::from_key("Notepad"), None);
    }

    #[test]
    fn test_descriptors_have_content() {
        for tool in &TOOLS {
            assert!(!tool.title.is_empty());
            assert!(!tool.description.is_empty());
            assert!(!tool.icon.is_empty());
        }
    }
}
