use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use nj_core::{Article, ContentProvider, QuoteSource, RandomSource, RawQuote, Result, JOURNAL_CATEGORY};
use nj_journal::synth::synthesize_all;
use reqwest::Client;
use serde::Deserialize;

use super::{endpoint, get_text, parse_json};

pub const NAME: &str = "quotable";
const BASE_URL: &str = "https://api.quotable.io";

#[derive(Debug, Deserialize)]
struct QuotableQuote {
    #[serde(rename = "_id", default)]
    id: Option<String>,
    content: String,
    author: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<QuotableQuote>,
}

impl From<QuotableQuote> for RawQuote {
    fn from(q: QuotableQuote) -> Self {
        RawQuote {
            id: q.id,
            content: q.content,
            author: q.author,
            tags: q.tags,
        }
    }
}

pub fn parse_random(body: &str) -> Result<Vec<RawQuote>> {
    let quotes: Vec<QuotableQuote> = parse_json(NAME, body)?;
    Ok(quotes.into_iter().map(RawQuote::from).collect())
}

pub fn parse_search(body: &str) -> Result<Vec<RawQuote>> {
    let response: SearchResponse = parse_json(NAME, body)?;
    Ok(response.results.into_iter().map(RawQuote::from).collect())
}

/// The quote service that feeds the daily journal.
#[derive(Clone)]
pub struct QuotableClient {
    client: Client,
    base_url: String,
    rng: Arc<dyn RandomSource>,
}

impl QuotableClient {
    pub fn new(client: Client, rng: Arc<dyn RandomSource>) -> Self {
        Self {
            client,
            base_url: BASE_URL.to_string(),
            rng,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn random_quotes(&self, tag: Option<&str>, limit: usize) -> Result<Vec<RawQuote>> {
        let mut params = vec![("limit", limit.to_string())];
        if let Some(tag) = tag {
            params.push(("tags", tag.to_string()));
        }
        let url = endpoint(&self.base_url, "/quotes/random", &params)?;
        parse_random(&get_text(&self.client, NAME, url).await?)
    }
}

#[async_trait]
impl QuoteSource for QuotableClient {
    async fn fetch_quotes(&self, limit: usize) -> Result<Vec<RawQuote>> {
        self.random_quotes(None, limit).await
    }
}

#[async_trait]
impl ContentProvider for QuotableClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch_latest(&self, category: Option<&str>, limit: usize) -> Result<Vec<Article>> {
        let tag = category.filter(|c| !c.eq_ignore_ascii_case(JOURNAL_CATEGORY));
        let quotes = self.random_quotes(tag, limit).await?;
        Ok(synthesize_all(&quotes, self.rng.as_ref(), Utc::now()))
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>> {
        let params = [("query", query.to_string()), ("limit", limit.to_string())];
        let url = endpoint(&self.base_url, "/search/quotes", &params)?;
        let quotes = parse_search(&get_text(&self.client, NAME, url).await?)?;
        Ok(synthesize_all(&quotes, self.rng.as_ref(), Utc::now()))
    }
}
