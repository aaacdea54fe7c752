use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent};
use rand::seq::IndexedRandom;
use rand::Rng;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::Action;
use crate::config::Config;
use crate::ui::{self, COPPER, OLIVE, SAPPHIRE, TEXT_MUTED, TEXT_PRIMARY};

pub const NAMES_PER_RUN: usize = 8;

pub const HINTS: &[(&str, &str)] = &[
    ("←→", "category"),
    ("g", "generate"),
    ("↑↓", "select"),
    ("Enter", "copy"),
    ("Esc", "home"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Gaming,
    Fantasy,
    Business,
    Social,
}

pub struct Vocabulary {
    pub prefixes: &'static [&'static str],
    pub suffixes: &'static [&'static str],
    pub words: &'static [&'static str],
}

const GAMING: Vocabulary = Vocabulary {
    prefixes: &[
        "Dark", "Shadow", "Fire", "Ice", "Storm", "Lightning", "Phantom", "Cyber", "Neon", "Toxic", "Blade", "Ghost",
        "Frost", "Rage", "Steel",
    ],
    suffixes: &[
        "Hunter", "Slayer", "Warrior", "Master", "Killer", "Destroyer", "Lord", "King", "Sniper", "Ninja", "Reaper",
        "Beast", "Wolf", "Dragon", "Phoenix",
    ],
    words: &["Venom", "Apex", "Savage", "Rampage", "Chaos", "Nexus", "Void", "Titan", "Omega", "Alpha"],
};

const FANTASY: Vocabulary = Vocabulary {
    prefixes: &[
        "Aether", "Lunar", "Solar", "Mystic", "Ancient", "Elder", "Crystal", "Starlight", "Moonbeam", "Ember",
        "Twilight", "Dawn", "Raven", "Silver", "Golden",
    ],
    suffixes: &[
        "whisper", "song", "heart", "soul", "wind", "moon", "star", "fire", "water", "earth", "light", "shadow",
        "dream", "spell", "magic",
    ],
    words: &[
        "Zephyr", "Seraph", "Celestial", "Arcane", "Enchanted", "Ethereal", "Mystical", "Legendary", "Divine",
        "Sacred",
    ],
};

const BUSINESS: Vocabulary = Vocabulary {
    prefixes: &[
        "Pro", "Elite", "Prime", "Ultra", "Mega", "Super", "Max", "Optimal", "Peak", "Advanced", "Premium", "Expert",
        "Master", "Top", "Best",
    ],
    suffixes: &[
        "Solutions", "Systems", "Tech", "Works", "Labs", "Studio", "Group", "Corp", "Inc", "Pro", "Hub", "Center",
        "Zone", "Base", "Point",
    ],
    words: &[
        "Innovation", "Digital", "Smart", "Future", "Global", "Dynamic", "Strategic", "Creative", "Innovative",
        "Modern",
    ],
};

const SOCIAL: Vocabulary = Vocabulary {
    prefixes: &[
        "Cool", "Sweet", "Cute", "Happy", "Sunny", "Bright", "Fresh", "Pure", "Soft", "Gentle", "Warm", "Cozy",
        "Lovely", "Pretty", "Fancy",
    ],
    suffixes: &[
        "vibes", "mood", "life", "style", "soul", "heart", "spirit", "energy", "aura", "glow", "shine", "spark",
        "bloom", "dream", "flow",
    ],
    words: &[
        "Aesthetic", "Minimal", "Pastel", "Vintage", "Retro", "Trendy", "Chic", "Elegant", "Graceful", "Serene",
    ],
};

impl Category {
    pub const ALL: [Category; 4] = [Category::Gaming, Category::Fantasy, Category::Business, Category::Social];

    pub fn label(self) -> &'static str {
        match self {
            Category::Gaming => "Gaming",
            Category::Fantasy => "Fantasy",
            Category::Business => "Business",
            Category::Social => "Social",
        }
    }

    pub fn vocabulary(self) -> &'static Vocabulary {
        match self {
            Category::Gaming => &GAMING,
            Category::Fantasy => &FANTASY,
            Category::Business => &BUSINESS,
            Category::Social => &SOCIAL,
        }
    }
}

fn pick<R: Rng + ?Sized>(list: &'static [&'static str], rng: &mut R) -> &'static str {
    list.choose(rng).copied().unwrap_or_default()
}

/// One name from one of three shapes, chosen uniformly.
fn generate_name<R: Rng + ?Sized>(vocab: &Vocabulary, rng: &mut R) -> String {
    match rng.random_range(0..3) {
        0 => format!("{}{}", pick(vocab.prefixes, rng), pick(vocab.suffixes, rng)),
        1 => format!("{}{}", pick(vocab.words, rng), rng.random_range(1..=999)),
        _ => format!("{}{}", pick(vocab.prefixes, rng), pick(vocab.words, rng)),
    }
}

pub fn generate_names<R: Rng + ?Sized>(category: Category, rng: &mut R) -> Vec<String> {
    let vocab = category.vocabulary();
    (0..NAMES_PER_RUN).map(|_| generate_name(vocab, rng)).collect()
}

pub struct NameGenerator {
    category: usize,
    names: Vec<String>,
    selected: usize,
    /// Names appear once this passes
    pending: Option<Instant>,
    delay: Duration,
}

impl NameGenerator {
    pub fn new(config: &Config) -> Self {
        Self {
            category: 0,
            names: Vec::new(),
            selected: 0,
            pending: None,
            delay: Duration::from_millis(config.name_generation_delay_ms),
        }
    }

    pub fn category(&self) -> Category {
        Category::ALL[self.category]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_generating(&self) -> bool {
        self.pending.is_some()
    }

    pub fn handle_key(&mut self, key: KeyEvent, now: Instant) -> Action {
        match key.code {
            KeyCode::Left => {
                self.category = self.category.checked_sub(1).unwrap_or(Category::ALL.len() - 1);
            }
            KeyCode::Right => self.category = (self.category + 1) % Category::ALL.len(),
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down if !self.names.is_empty() => {
                self.selected = (self.selected + 1).min(self.names.len() - 1);
            }
            KeyCode::Char('g') | KeyCode::Char(' ') if !self.is_generating() => {
                self.pending = Some(now + self.delay);
            }
            KeyCode::Enter => {
                if let Some(name) = self.names.get(self.selected) {
                    return Action::Copy {
                        text: name.clone(),
                        label: name.clone(),
                    };
                }
                if !self.is_generating() {
                    self.pending = Some(now + self.delay);
                }
            }
            _ => {}
        }
        Action::None
    }

    pub fn tick<R: Rng + ?Sized>(&mut self, now: Instant, rng: &mut R) {
        if self.pending.is_some_and(|due| now >= due) {
            self.pending = None;
            self.names = generate_names(self.category(), rng);
            self.selected = 0;
            tracing::debug!(category = self.category().label(), "names generated");
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, anim_frame: usize) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Length(1), Constraint::Min(4)])
            .split(area);

        let tabs: Vec<Span> = Category::ALL
            .iter()
            .enumerate()
            .map(|(idx, category)| {
                let style = if idx == self.category {
                    Style::default().fg(SAPPHIRE).add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
                } else {
                    Style::default().fg(TEXT_MUTED)
                };
                Span::styled(format!("  {}  ", category.label()), style)
            })
            .collect();
        let block = ui::panel("Category", true);
        let inner = block.inner(chunks[0]);
        frame.render_widget(block, chunks[0]);
        frame.render_widget(Paragraph::new(Line::from(tabs)), inner);

        let block = ui::panel("Names", false);
        let inner = block.inner(chunks[2]);
        frame.render_widget(block, chunks[2]);

        let lines: Vec<Line> = if self.is_generating() {
            vec![Line::from(Span::styled(
                format!("Generating{}", ui::dots(anim_frame)),
                Style::default().fg(COPPER).add_modifier(Modifier::ITALIC),
            ))]
        } else if self.names.is_empty() {
            vec![Line::from(Span::styled(
                "Press g to generate names",
                Style::default().fg(TEXT_MUTED),
            ))]
        } else {
            self.names
                .iter()
                .enumerate()
                .map(|(idx, name)| {
                    if idx == self.selected {
                        Line::from(vec![
                            Span::styled(" ▸ ", Style::default().fg(OLIVE)),
                            Span::styled(name.clone(), Style::default().fg(TEXT_PRIMARY).add_modifier(Modifier::BOLD)),
                        ])
                    } else {
                        Line::from(Span::styled(format!("   {name}"), Style::default().fg(TEXT_MUTED)))
                    }
                })
                .collect()
        };
        frame.render_widget(Paragraph::new(lines), inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Strip a known vocabulary word from the front of `rest`.
    fn strip_any<'a>(rest: &'a str, list: &[&str]) -> Option<&'a str> {
        list.iter().find_map(|w| rest.strip_prefix(w))
    }

    fn is_from_vocabulary(name: &str, vocab: &Vocabulary) -> bool {
        let prefix_suffix = strip_any(name, vocab.prefixes)
            .and_then(|rest| strip_any(rest, vocab.suffixes))
            .is_some_and(str::is_empty);
        let prefix_word = strip_any(name, vocab.prefixes)
            .and_then(|rest| strip_any(rest, vocab.words))
            .is_some_and(str::is_empty);
        let word_number = strip_any(name, vocab.words).is_some_and(|digits| {
            digits
                .parse::<u32>()
                .is_ok_and(|n| (1..=999).contains(&n))
        });
        prefix_suffix || prefix_word || word_number
    }

    #[test]
    fn test_eight_names_from_vocabulary() {
        let mut rng = StdRng::seed_from_u64(3);
        for category in Category::ALL {
            for _ in 0..20 {
                let names = generate_names(category, &mut rng);
                assert_eq!(names.len(), NAMES_PER_RUN);
                for name in &names {
                    assert!(!name.is_empty());
                    assert!(
                        is_from_vocabulary(name, category.vocabulary()),
                        "{name} not built from {} words",
                        category.label()
                    );
                }
            }
        }
    }

    #[test]
    fn test_all_shapes_show_up() {
        let mut rng = StdRng::seed_from_u64(11);
        let names: Vec<String> = (0..10).flat_map(|_| generate_names(Category::Gaming, &mut rng)).collect();
        assert!(names.iter().any(|n| n.ends_with(|c: char| c.is_ascii_digit())));
        assert!(names.iter().any(|n| !n.ends_with(|c: char| c.is_ascii_digit())));
    }

    #[test]
    fn test_names_appear_after_delay() {
        let mut tool = NameGenerator::new(&Config::default());
        let mut rng = StdRng::seed_from_u64(5);
        let start = Instant::now();

        tool.handle_key(KeyEvent::from(KeyCode::Char('g')), start);
        assert!(tool.is_generating());

        tool.tick(start + Duration::from_millis(500), &mut rng);
        assert!(tool.names().is_empty());

        tool.tick(start + Duration::from_millis(1000), &mut rng);
        assert!(!tool.is_generating());
        assert_eq!(tool.names().len(), NAMES_PER_RUN);
    }

    #[test]
    fn test_category_cycles() {
        let mut tool = NameGenerator::new(&Config::default());
        let now = Instant::now();
        tool.handle_key(KeyEvent::from(KeyCode::Left), now);
        assert_eq!(tool.category(), Category::Social);
        tool.handle_key(KeyEvent::from(KeyCode::Right), now);
        assert_eq!(tool.category(), Category::Gaming);
    }

    #[test]
    fn test_enter_copies_selected_name() {
        let mut tool = NameGenerator::new(&Config::default());
        let mut rng = StdRng::seed_from_u64(9);
        let start = Instant::now();
        tool.handle_key(KeyEvent::from(KeyCode::Char('g')), start);
        tool.tick(start + Duration::from_secs(2), &mut rng);
        tool.handle_key(KeyEvent::from(KeyCode::Down), start);

        let expected = tool.names()[1].clone();
        match tool.handle_key(KeyEvent::from(KeyCode::Enter), start) {
            Action::Copy { text, .. } => assert_eq!(text, expected),
            other => panic!("expected copy, got {other:?}"),
        }
    }
}
