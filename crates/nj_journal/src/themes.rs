//! Cosmetic theme selection: every journal entry and image-less article gets
//! a picture and a caption picked by keyword overlap with its text.

use nj_core::RandomSource;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Theme {
    pub name: &'static str,
    pub keywords: &'static [&'static str],
    pub image_url: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThemeImage {
    pub theme: &'static str,
    pub image_url: String,
    pub description: String,
}

impl From<&Theme> for ThemeImage {
    fn from(theme: &Theme) -> Self {
        Self {
            theme: theme.name,
            image_url: theme.image_url.to_string(),
            description: theme.description.to_string(),
        }
    }
}

pub const THEMES: &[Theme] = &[
    Theme {
        name: "wisdom",
        keywords: &["wisdom", "wise", "knowledge", "learn", "truth", "understand", "mind", "think"],
        image_url: "https://images.unsplash.com/photo-1481627834876-b7833e8f5570",
        description: "Rows of old books in a quiet library",
    },
    Theme {
        name: "nature",
        keywords: &["nature", "tree", "forest", "river", "mountain", "earth", "sky", "sea", "flower"],
        image_url: "https://images.unsplash.com/photo-1441974231531-c6227db76b6e",
        description: "Sunlight falling through a green forest",
    },
    Theme {
        name: "success",
        keywords: &["success", "win", "achieve", "goal", "work", "effort", "ambition", "dream"],
        image_url: "https://images.unsplash.com/photo-1454165804606-c3d57bc86b40",
        description: "A desk covered with plans and notes",
    },
    Theme {
        name: "love",
        keywords: &["love", "heart", "friend", "kind", "together", "family", "compassion"],
        image_url: "https://images.unsplash.com/photo-1518199266791-5375a83190b7",
        description: "Two hands holding each other",
    },
    Theme {
        name: "happiness",
        keywords: &["happy", "happiness", "joy", "smile", "laugh", "peace", "content"],
        image_url: "https://images.unsplash.com/photo-1506869640319-fe1a24fd76dc",
        description: "A bright field of sunflowers",
    },
    Theme {
        name: "courage",
        keywords: &["courage", "brave", "fear", "risk", "strength", "bold", "dare"],
        image_url: "https://images.unsplash.com/photo-1464822759023-fed622ff2c3b",
        description: "A climber on a snowy summit",
    },
    Theme {
        name: "time",
        keywords: &["time", "moment", "future", "past", "today", "tomorrow", "change"],
        image_url: "https://images.unsplash.com/photo-1501139083538-0139583c060f",
        description: "An old pocket watch on a wooden table",
    },
    Theme {
        name: "technology",
        keywords: &["technology", "science", "computer", "future", "invent", "data", "machine"],
        image_url: "https://images.unsplash.com/photo-1518770660439-4636190af475",
        description: "Close-up of a circuit board",
    },
    Theme {
        name: "inspiration",
        keywords: &["inspire", "hope", "believe", "possible", "start", "begin"],
        image_url: "https://images.unsplash.com/photo-1470252649378-9c29740c9fa8",
        description: "Sunrise over a misty valley",
    },
    Theme {
        name: "life",
        keywords: &["life", "live", "living", "journey", "world", "people", "day"],
        image_url: "https://images.unsplash.com/photo-1500530855697-b586d89ba3ee",
        description: "A winding road through open country",
    },
];

pub fn find_theme(name: &str) -> Option<&'static Theme> {
    THEMES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
}

fn score(theme: &Theme, haystack: &str) -> f64 {
    let hits = theme.keywords.iter().filter(|k| haystack.contains(*k)).count();
    hits as f64 / theme.keywords.len() as f64
}

/// Pick the best theme for a text and its tags.
///
/// The highest keyword-overlap ratio wins, ties going to the earlier theme.
/// With no overlap at all the first tag is tried against theme names and
/// keywords, and failing that a random theme is returned.
pub fn resolve_theme(text: &str, tags: &[String], rng: &dyn RandomSource) -> ThemeImage {
    let haystack = format!("{} {}", text, tags.join(" ")).to_lowercase();

    let mut best: Option<(&Theme, f64)> = None;
    for theme in THEMES {
        let s = score(theme, &haystack);
        if best.map_or(true, |(_, top)| s > top) {
            best = Some((theme, s));
        }
    }

    if let Some((theme, s)) = best {
        if s > 0.0 {
            return theme.into();
        }
    }

    if let Some(tag) = tags.first().map(|t| t.trim().to_lowercase()).filter(|t| !t.is_empty()) {
        let by_tag = find_theme(&tag).or_else(|| {
            THEMES
                .iter()
                .find(|t| tag.len() >= 3 && t.keywords.iter().any(|k| k.contains(tag.as_str())))
        });
        if let Some(theme) = by_tag {
            return theme.into();
        }
    }

    (&THEMES[rng.below(THEMES.len())]).into()
}
