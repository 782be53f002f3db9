use std::sync::Arc;

use async_trait::async_trait;
use nj_core::{dedupe_by_id, Article, ContentProvider, RandomSource, Result};
use reqwest::Client;
use serde::Deserialize;

use super::{
    endpoint, get_text, image_or_theme, non_empty, parse_json, parse_timestamp, require_key, TRENDING_HEADLINES,
};

pub const NAME: &str = "gnews";
const BASE_URL: &str = "https://gnews.io";
const CATEGORIES: &[&str] = &[
    "general",
    "world",
    "nation",
    "business",
    "technology",
    "entertainment",
    "sports",
    "science",
    "health",
];

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Response {
    #[serde(default)]
    articles: Vec<GNewsArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GNewsArticle {
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    content: Option<String>,
    url: Option<String>,
    image: Option<String>,
    published_at: Option<String>,
    source: Option<Source>,
}

#[derive(Debug, Deserialize)]
struct Source {
    name: Option<String>,
}

pub fn map_category(category: Option<&str>) -> &'static str {
    match category.map(|c| c.to_lowercase()).as_deref() {
        Some("politics") => "nation",
        Some(c) => CATEGORIES.iter().find(|known| **known == c).copied().unwrap_or("general"),
        None => "general",
    }
}

pub fn parse_articles(body: &str, category: &str, headlines: bool, rng: &dyn RandomSource) -> Result<Vec<Article>> {
    let response: Response = parse_json(NAME, body)?;
    let categories = vec![category.to_string()];

    let articles: Vec<Article> = response
        .articles
        .into_iter()
        .filter_map(|raw| {
            let title = non_empty(raw.title)?;
            let url = non_empty(raw.url)?;
            let summary = non_empty(raw.description).unwrap_or_else(|| title.clone());
            let content = non_empty(raw.content).unwrap_or_else(|| summary.clone());
            let author = raw
                .source
                .and_then(|s| non_empty(s.name))
                .unwrap_or_else(|| "GNews".to_string());
            let (image_url, image_description) = image_or_theme(raw.image, &title, &summary, &categories, rng);

            Some(Article {
                id: non_empty(raw.id).unwrap_or_else(|| url.clone()),
                title,
                author,
                summary,
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
        .collect();

    let mut articles = dedupe_by_id(articles);
    if headlines {
        articles.iter_mut().take(TRENDING_HEADLINES).for_each(|a| a.trending = true);
    }
    Ok(articles)
}

#[derive(Clone)]
pub struct GNewsClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    rng: Arc<dyn RandomSource>,
}

impl GNewsClient {
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
impl ContentProvider for GNewsClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch_latest(&self, category: Option<&str>, limit: usize) -> Result<Vec<Article>> {
        let key = require_key(NAME, &self.api_key)?;
        let category = map_category(category);
        let url = endpoint(
            &self.base_url,
            "/api/v4/top-headlines",
            &[
                ("category", category.to_string()),
                ("lang", "en".to_string()),
                ("max", limit.to_string()),
                ("apikey", key.to_string()),
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
            "/api/v4/search",
            &[
                ("q", query.to_string()),
                ("lang", "en".to_string()),
                ("max", limit.to_string()),
                ("apikey", key.to_string()),
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

    #[test]
    fn test_map_category() {
        assert_eq!(map_category(Some("politics")), "nation");
        assert_eq!(map_category(Some("WORLD")), "world");
        assert_eq!(map_category(Some("cooking")), "general");
        assert_eq!(map_category(None), "general");
    }

    #[test]
    fn test_parse_articles() {
        let body = r#"{
            "totalArticles": 2,
            "articles": [
                {"id": "g-1", "title": "Heatwave grips Europe", "description": "Temperatures soar.",
                 "content": "Temperatures soared across Europe.", "url": "https://example.com/heat",
                 "image": "https://example.com/heat.jpg", "publishedAt": "2024-07-01T12:00:00Z",
                 "source": {"name": "BBC", "url": "https://bbc.co.uk"}},
                {"title": "", "url": "https://example.com/untitled"},
                {"title": "Chip shortage eases", "description": null, "content": null,
                 "url": "https://example.com/chips", "image": null, "publishedAt": "2024-07-01T11:00:00Z",
                 "source": null}
            ]
        }"#;
        let rng = SequenceRandom::new(vec![0.0]);
        let articles = parse_articles(body, "world", true, &rng).unwrap();

        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].id, "g-1");
        assert_eq!(articles[0].author, "BBC");
        assert_eq!(articles[1].id, "https://example.com/chips");
        assert_eq!(articles[1].author, "GNews");
        assert_eq!(articles[1].content, "Chip shortage eases");
        assert!(articles.iter().all(|a| a.trending));
        assert!(articles.iter().all(|a| a.categories == vec!["world".to_string()]));
    }

    #[test]
    fn test_malformed_payload() {
        let rng = SequenceRandom::new(vec![0.0]);
        assert!(parse_articles("<html>rate limited</html>", "general", true, &rng).is_err());
    }
}
