use std::sync::Arc;

use async_trait::async_trait;
use nj_core::{dedupe_by_id, Article, ContentProvider, Error, RandomSource, Result};
use reqwest::Client;
use serde::Deserialize;

use super::{
    endpoint, get_text, image_or_theme, non_empty, parse_json, parse_timestamp, require_key, strip_truncation_marker,
    TRENDING_HEADLINES,
};

pub const NAME: &str = "newsapi";
const BASE_URL: &str = "https://newsapi.org";
const CATEGORIES: &[&str] = &[
    "business",
    "entertainment",
    "general",
    "health",
    "science",
    "sports",
    "technology",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Response {
    status: Option<String>,
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    source: Option<Source>,
    author: Option<String>,
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    url_to_image: Option<String>,
    published_at: Option<String>,
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Source {
    name: Option<String>,
}

/// NewsAPI's fixed category list; anything else falls back to "general".
pub fn map_category(category: Option<&str>) -> &'static str {
    category
        .map(|c| c.to_lowercase())
        .and_then(|c| CATEGORIES.iter().find(|known| **known == c).copied())
        .unwrap_or("general")
}

/// Normalize a NewsAPI payload. Removed stories and entries without a title
/// or URL are dropped; the first `TRENDING_HEADLINES` of a headlines response
/// are flagged as trending.
pub fn parse_articles(
    body: &str,
    category: &str,
    headlines: bool,
    rng: &dyn RandomSource,
) -> Result<Vec<Article>> {
    let response: Response = parse_json(NAME, body)?;
    if response.status.as_deref() == Some("error") {
        let message = response.message.unwrap_or_else(|| "unknown error".to_string());
        return Err(Error::Parse(format!("{}: {}", NAME, message)));
    }
    let categories = vec![category.to_string()];

    let articles = response
        .articles
        .into_iter()
        .filter_map(|raw| {
            let title = non_empty(raw.title).filter(|t| t != "[Removed]")?;
            let url = non_empty(raw.url)?;
            let description = non_empty(raw.description).unwrap_or_default();
            let summary = if description.is_empty() { title.clone() } else { description.clone() };
            let content = non_empty(raw.content)
                .map(|c| strip_truncation_marker(&c))
                .unwrap_or_else(|| summary.clone());
            let source_name = raw.source.and_then(|s| non_empty(s.name));
            let author = non_empty(raw.author)
                .or_else(|| source_name.clone())
                .unwrap_or_else(|| "NewsAPI".to_string());
            let (image_url, image_description) =
                image_or_theme(raw.url_to_image, &title, &description, &categories, rng);

            Some(Article {
                id: url.clone(),
                title,
                summary,
                author,
                content,
                published_at: parse_timestamp(raw.published_at.as_deref()),
                image_url,
                image_description,
                categories: categories.clone(),
                trending: false,
                api_source: None,
                url: Some(url),
            })
        })
        .collect::<Vec<_>>();

    let mut articles = dedupe_by_id(articles);
    if headlines {
        for article in articles.iter_mut().take(TRENDING_HEADLINES) {
            article.trending = true;
        }
    }
    Ok(articles)
}

#[derive(Clone)]
pub struct NewsApiClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    rng: Arc<dyn RandomSource>,
}

impl NewsApiClient {
    pub fn new(client: Client, api_key: Option<String>, rng: Arc<dyn RandomSource>) -> Self {
        Self {
            client,
            api_key,
            base_url: BASE_URL.to_string(),
            rng,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[async_trait]
impl ContentProvider for NewsApiClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch_latest(&self, category: Option<&str>, limit: usize) -> Result<Vec<Article>> {
        let key = require_key(NAME, &self.api_key)?;
        let category = map_category(category);
        let url = endpoint(
            &self.base_url,
            "/v2/top-headlines",
            &[
                ("country", "us".to_string()),
                ("category", category.to_string()),
                ("pageSize", limit.to_string()),
                ("apiKey", key.to_string()),
            ],
        )?;
        let body = get_text(&self.client, NAME, url).await?;
        let mut articles = parse_articles(&body, category, true, self.rng.as_ref())?;
        articles.truncate(limit);
        Ok(articles)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>> {
        let key = require_key(NAME, &self.api_key)?;
        let url = endpoint(
            &self.base_url,
            "/v2/everything",
            &[
                ("q", query.to_string()),
                ("language", "en".to_string()),
                ("sortBy", "publishedAt".to_string()),
                ("pageSize", limit.to_string()),
                ("apiKey", key.to_string()),
            ],
        )?;
        let body = get_text(&self.client, NAME, url).await?;
        let mut articles = parse_articles(&body, "general", false, self.rng.as_ref())?;
        articles.truncate(limit);
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nj_core::SequenceRandom;

    const BODY: &str = r#"{
        "status": "ok",
        "totalResults": 4,
        "articles": [
            {"source": {"id": null, "name": "Reuters"}, "author": null, "title": "Markets rally",
             "description": "Stocks rose sharply.", "url": "https://example.com/markets",
             "urlToImage": "https://example.com/markets.jpg", "publishedAt": "2024-05-01T10:00:00Z",
             "content": "Stocks rose sharply on Monday… [+1520 chars]"},
            {"source": {"id": null, "name": "[Removed]"}, "author": null, "title": "[Removed]",
             "description": null, "url": "https://removed.com", "urlToImage": null, "publishedAt": null, "content": null},
            {"source": {"name": "AP"}, "author": "Sam Reporter", "title": "New telescope images",
             "description": null, "url": "https://example.com/space", "urlToImage": null,
             "publishedAt": "2024-05-01T09:00:00Z", "content": null},
            {"source": {"name": "AP"}, "author": "Sam Reporter", "title": "Duplicate",
             "description": "dup", "url": "https://example.com/space", "urlToImage": null,
             "publishedAt": "2024-05-01T09:00:00Z", "content": null}
        ]
    }"#;

    #[test]
    fn test_map_category() {
        assert_eq!(map_category(Some("Technology")), "technology");
        assert_eq!(map_category(Some("politics")), "general");
        assert_eq!(map_category(None), "general");
    }

    #[test]
    fn test_parse_articles() {
        let rng = SequenceRandom::new(vec![0.0]);
        let articles = parse_articles(BODY, "science", true, &rng).unwrap();

        assert_eq!(articles.len(), 2);
        let first = &articles[0];
        assert_eq!(first.id, "https://example.com/markets");
        assert_eq!(first.author, "Reuters");
        assert_eq!(first.content, "Stocks rose sharply on Monday…");
        assert_eq!(first.image_url, "https://example.com/markets.jpg");
        assert_eq!(first.categories, vec!["science".to_string()]);
        assert!(first.trending);

        let second = &articles[1];
        assert_eq!(second.summary, "New telescope images");
        assert_eq!(second.content, second.summary);
        assert!(!second.image_url.is_empty());
        assert_eq!(second.author, "Sam Reporter");
    }

    #[test]
    fn test_search_results_are_not_trending() {
        let rng = SequenceRandom::new(vec![0.0]);
        let articles = parse_articles(BODY, "general", false, &rng).unwrap();
        assert!(articles.iter().all(|a| !a.trending));
    }

    #[test]
    fn test_error_status_is_a_parse_error() {
        let rng = SequenceRandom::new(vec![0.0]);
        let body = r#"{"status":"error","code":"apiKeyInvalid","message":"Your API key is invalid."}"#;
        match parse_articles(body, "general", true, &rng) {
            Err(Error::Parse(message)) => assert!(message.contains("Your API key is invalid.")),
            other => panic!("expected a parse error, got {:?}", other.map(|a| a.len())),
        }

        let empty = r#"{"status":"ok","totalResults":0,"articles":[]}"#;
        assert!(parse_articles(empty, "general", true, &rng).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let client = NewsApiClient::new(Client::new(), None, Arc::new(SequenceRandom::new(vec![0.0])));
        let err = client.fetch_latest(None, 5).await.unwrap_err();
        assert!(matches!(err, nj_core::Error::Config(_)));
    }
}
