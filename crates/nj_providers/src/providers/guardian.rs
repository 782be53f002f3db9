use std::sync::Arc;

use async_trait::async_trait;
use nj_core::{dedupe_by_id, Article, ContentProvider, RandomSource, Result};
use reqwest::Client;
use scraper::Html;
use serde::Deserialize;

use super::{
    endpoint, get_text, image_or_theme, non_empty, parse_json, parse_timestamp, require_key, TRENDING_HEADLINES,
};

pub const NAME: &str = "guardian";
const BASE_URL: &str = "https://content.guardianapis.com";
const SHOW_FIELDS: &str = "thumbnail,trailText,bodyText,byline";

#[derive(Debug, Deserialize)]
struct Envelope {
    response: Option<Response>,
}

#[derive(Debug, Deserialize)]
struct Response {
    #[serde(default)]
    results: Vec<GuardianItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianItem {
    id: String,
    section_id: Option<String>,
    web_publication_date: Option<String>,
    web_title: Option<String>,
    web_url: Option<String>,
    fields: Option<Fields>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Fields {
    thumbnail: Option<String>,
    trail_text: Option<String>,
    body_text: Option<String>,
    byline: Option<String>,
}

/// Guardian section for a news category, if it has one.
pub fn map_section(category: Option<&str>) -> Option<&'static str> {
    match category?.to_lowercase().as_str() {
        "sports" | "sport" => Some("sport"),
        "entertainment" | "culture" => Some("culture"),
        "health" => Some("society"),
        "business" => Some("business"),
        "technology" => Some("technology"),
        "science" => Some("science"),
        "politics" => Some("politics"),
        "world" => Some("world"),
        "environment" => Some("environment"),
        _ => None,
    }
}

/// Trail text arrives as HTML fragments, entities included.
fn strip_tags(text: &str) -> String {
    let fragment = Html::parse_fragment(text);
    fragment.root_element().text().collect::<String>().trim().to_string()
}

pub fn parse_articles(
    body: &str,
    category: &str,
    headlines: bool,
    rng: &dyn RandomSource,
) -> Result<Vec<Article>> {
    let envelope: Envelope = parse_json(NAME, body)?;
    let results = envelope.response.map(|r| r.results).unwrap_or_default();

    let articles = results
        .into_iter()
        .filter_map(|item| {
            let title = non_empty(item.web_title)?;
            let fields = item.fields.unwrap_or_default();
            let summary = non_empty(fields.trail_text.map(|t| strip_tags(&t)))
                .unwrap_or_else(|| title.clone());
            let content = non_empty(fields.body_text).unwrap_or_else(|| summary.clone());
            let author = non_empty(fields.byline).unwrap_or_else(|| "The Guardian".to_string());
            let mut categories = vec![category.to_string()];
            if let Some(section) = non_empty(item.section_id).filter(|s| s != category) {
                categories.push(section);
            }
            let (image_url, image_description) =
                image_or_theme(fields.thumbnail, &title, &summary, &categories, rng);

            Some(Article {
                id: item.id,
                title,
                author,
                summary,
                content,
                published_at: parse_timestamp(item.web_publication_date.as_deref()),
                image_url,
                image_description,
                categories,
                trending: false,
                api_source: None,
                url: non_empty(item.web_url),
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
pub struct GuardianClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    rng: Arc<dyn RandomSource>,
}

impl GuardianClient {
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

    fn params(&self, key: &str, limit: usize) -> Vec<(&'static str, String)> {
        vec![
            ("page-size", limit.to_string()),
            ("show-fields", SHOW_FIELDS.to_string()),
            ("order-by", "newest".to_string()),
            ("api-key", key.to_string()),
        ]
    }
}

#[async_trait]
impl ContentProvider for GuardianClient {
    fn name(&self) -> &str {
        NAME
    }

    async fn fetch_latest(&self, category: Option<&str>, limit: usize) -> Result<Vec<Article>> {
        let key = require_key(NAME, &self.api_key)?;
        let mut params = self.params(key, limit);
        let section = map_section(category);
        if let Some(section) = section {
            params.push(("section", section.to_string()));
        }
        let url = endpoint(&self.base_url, "/search", &params)?;
        let body = get_text(&self.client, NAME, url).await?;
        let label = category.map(|c| c.to_lowercase()).unwrap_or_else(|| "general".to_string());
        let mut articles = parse_articles(&body, &label, true, self.rng.as_ref())?;
        articles.truncate(limit);
        Ok(articles)
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>> {
        let key = require_key(NAME, &self.api_key)?;
        let mut params = self.params(key, limit);
        params.push(("q", query.to_string()));
        let url = endpoint(&self.base_url, "/search", &params)?;
        let body = get_text(&self.client, NAME, url).await?;
        let mut articles = parse_articles(&body, "general", false, self.rng.as_ref())?;
        articles.truncate(limit);
        Ok(articles)
    }
}
