use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use nj_core::{Article, ContentProvider, Error, QuoteSource, RawQuote, Result};

pub fn news(id: &str, category: &str, trending: bool) -> Article {
    Article {
        id: id.to_string(),
        title: format!("Story {}", id),
        author: "Newsdesk".to_string(),
        summary: format!("Summary for {}", id),
        content: format!("Full text for {}", id),
        published_at: Utc::now(),
        image_url: "https://img.example.com/story.jpg".to_string(),
        image_description: format!("Story {}", id),
        categories: vec![category.to_string()],
        trending,
        api_source: None,
        url: Some(format!("https://news.example.com/{}", id)),
    }
}

/// Serves a fixed set of articles until told to fail.
pub struct MockProvider {
    name: &'static str,
    articles: Vec<Article>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl MockProvider {
    pub fn new(name: &'static str, articles: Vec<Article>) -> Self {
        Self {
            name,
            articles,
            failing: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn answer<P: Fn(&Article) -> bool>(&self, predicate: P, limit: usize) -> Result<Vec<Article>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(Error::Status {
                provider: self.name.to_string(),
                status: 500,
            });
        }
        Ok(self.articles.iter().filter(|a| predicate(*a)).take(limit).cloned().collect())
    }
}

#[async_trait]
impl ContentProvider for MockProvider {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch_latest(&self, category: Option<&str>, limit: usize) -> Result<Vec<Article>> {
        self.answer(|a| category.map_or(true, |c| a.has_category(c)), limit)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>> {
        self.answer(|a| a.matches_query(query), limit)
    }
}

/// Quote source whose answer can be swapped between calls.
pub struct ScriptedQuotes {
    quotes: Mutex<Vec<RawQuote>>,
}

impl ScriptedQuotes {
    pub fn new(quotes: Vec<(&str, &str)>) -> Self {
        Self {
            quotes: Mutex::new(to_raw(quotes)),
        }
    }

    pub fn replace(&self, quotes: Vec<(&str, &str)>) {
        *self.quotes.lock().unwrap() = to_raw(quotes);
    }
}

fn to_raw(quotes: Vec<(&str, &str)>) -> Vec<RawQuote> {
    quotes
        .into_iter()
        .map(|(content, author)| RawQuote {
            id: None,
            content: content.to_string(),
            author: author.to_string(),
            tags: vec![],
        })
        .collect()
}

#[async_trait]
impl QuoteSource for ScriptedQuotes {
    async fn fetch_quotes(&self, limit: usize) -> Result<Vec<RawQuote>> {
        Ok(self.quotes.lock().unwrap().iter().take(limit).cloned().collect())
    }
}
