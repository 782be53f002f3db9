use chrono::{DateTime, Duration, Utc};
use nj_core::{Article, RandomSource, RawQuote, JOURNAL_CATEGORY};
use uuid::Uuid;

use crate::themes::resolve_theme;

const TITLE_WORDS: usize = 8;
const BACKDATE_WINDOW_SECS: i64 = 7 * 24 * 60 * 60;
const TRENDING_PROBABILITY: f64 = 0.3;

pub fn make_title(text: &str) -> String {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.len() > TITLE_WORDS {
        format!("{}...", words[..TITLE_WORDS].join(" "))
    } else {
        words.join(" ")
    }
}

fn expand_body(text: &str, author: &str, theme: &str) -> String {
    format!(
        "Today's entry turns to {theme}, through the words of {author}:\n\n\
         \"{text}\"\n\n\
         Short lines like this one tend to stay with us longer than we expect. \
         {author} put into a single sentence something most of us only circle around, \
         and it is worth sitting with for a few minutes before the day fills up.\n\n\
         Some questions to take with you:\n\n\
         1. Where does {theme} show up in your own life right now?\n\
         2. What would change this week if you took these words as a guide?\n\
         3. What is one small thing you could do before tonight that honours this thought?\n\n\
         Write down whatever comes first. The answers do not need to be finished, \
         only honest."
    )
}

/// Turn a raw quote into a journal entry.
///
/// Randomness is drawn in a fixed order: theme fallback (only when nothing
/// matched), back-dating offset, then the trending flag.
pub fn synthesize(raw: &RawQuote, rng: &dyn RandomSource, now: DateTime<Utc>) -> Article {
    let text = raw.content.trim();
    let image = resolve_theme(text, &raw.tags, rng);
    let offset = Duration::seconds((rng.next_f64() * BACKDATE_WINDOW_SECS as f64) as i64);
    let trending = rng.chance(TRENDING_PROBABILITY);

    Article {
        id: format!("journal-{}", Uuid::new_v4()),
        title: make_title(text),
        author: raw.author.clone(),
        summary: text.to_string(),
        content: expand_body(text, &raw.author, image.theme),
        published_at: now - offset,
        image_url: image.image_url,
        image_description: image.description,
        categories: vec![JOURNAL_CATEGORY.to_string()],
        trending,
        api_source: None,
        url: None,
    }
}

pub fn synthesize_all(raws: &[RawQuote], rng: &dyn RandomSource, now: DateTime<Utc>) -> Vec<Article> {
    raws.iter()
        .filter(|raw| !raw.content.trim().is_empty())
        .map(|raw| synthesize(raw, rng, now))
        .collect()
}
