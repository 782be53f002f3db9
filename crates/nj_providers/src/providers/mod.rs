use std::sync::Arc;

use chrono::{DateTime, Utc};
use nj_core::{Config, ContentProvider, Error, RandomSource, Result};
use nj_journal::resolve_theme;
use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

pub mod gnews;
pub mod guardian;
pub mod newsapi;
pub mod quotable;

pub use gnews::GNewsClient;
pub use guardian::GuardianClient;
pub use newsapi::NewsApiClient;
pub use quotable::QuotableClient;

/// How many of a top-headlines response are flagged as trending.
pub const TRENDING_HEADLINES: usize = 3;

const USER_AGENT: &str = concat!("nj/", env!("CARGO_PKG_VERSION"));

pub fn build_client(config: &Config) -> Result<Client> {
    Ok(Client::builder()
        .timeout(config.request_timeout)
        .user_agent(USER_AGENT)
        .build()?)
}

/// News providers in the configured priority order.
pub fn get_default_providers(
    config: &Config,
    client: Client,
    rng: Arc<dyn RandomSource>,
) -> Vec<Arc<dyn ContentProvider>> {
    config
        .provider_priority
        .iter()
        .filter_map(|name| -> Option<Arc<dyn ContentProvider>> {
            let client = client.clone();
            let rng = rng.clone();
            match name.as_str() {
                newsapi::NAME => Some(Arc::new(NewsApiClient::new(client, config.newsapi_key.clone(), rng))),
                gnews::NAME => Some(Arc::new(GNewsClient::new(client, config.gnews_key.clone(), rng))),
                guardian::NAME => Some(Arc::new(GuardianClient::new(client, config.guardian_key.clone(), rng))),
                _ => None,
            }
        })
        .collect()
}

pub(crate) fn endpoint(base: &str, path: &str, params: &[(&str, String)]) -> Result<Url> {
    let url = Url::parse(base)?.join(path)?;
    Ok(Url::parse_with_params(url.as_str(), params)?)
}

pub(crate) fn require_key<'a>(provider: &str, key: &'a Option<String>) -> Result<&'a str> {
    key.as_deref()
        .ok_or_else(|| Error::Config(format!("{} API key is not configured", provider)))
}

/// GET a document body, mapping non-2xx statuses to errors.
pub(crate) async fn get_text(client: &Client, provider: &str, url: Url) -> Result<String> {
    tracing::debug!("🌐 {} GET {}", provider, url.path());
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            provider: provider.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(response.text().await?)
}

pub(crate) fn parse_json<T: DeserializeOwned>(provider: &str, body: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|e| Error::Parse(format!("{}: {}", provider, e)))
}

pub(crate) fn parse_timestamp(value: Option<&str>) -> DateTime<Utc> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

/// Image and caption for an article, falling back to a theme picture.
pub(crate) fn image_or_theme(
    image: Option<String>,
    title: &str,
    text: &str,
    categories: &[String],
    rng: &dyn RandomSource,
) -> (String, String) {
    match image.filter(|url| !url.trim().is_empty()) {
        Some(url) => (url, title.to_string()),
        None => {
            let theme = resolve_theme(&format!("{} {}", title, text), categories, rng);
            (theme.image_url, theme.description)
        }
    }
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// NewsAPI appends a "[+1234 chars]" marker to truncated content.
pub(crate) fn strip_truncation_marker(content: &str) -> String {
    match content.rfind("[+") {
        Some(idx) if content.trim_end().ends_with("chars]") => content[..idx].trim_end().to_string(),
        _ => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nj_core::SequenceRandom;

    #[test]
    fn test_endpoint_encodes_params() {
        let url = endpoint("https://newsapi.org", "/v2/everything", &[("q", "climate & energy".to_string())]).unwrap();
        assert_eq!(url.as_str(), "https://newsapi.org/v2/everything?q=climate+%26+energy");
    }

    #[test]
    fn test_require_key() {
        assert!(require_key("gnews", &None).is_err());
        assert_eq!(require_key("gnews", &Some("k".to_string())).unwrap(), "k");
    }

    #[test]
    fn test_parse_timestamp() {
        let parsed = parse_timestamp(Some("2024-05-01T10:30:00Z"));
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T10:30:00+00:00");
        let fallback = parse_timestamp(Some("yesterday"));
        assert!(fallback <= Utc::now());
    }

    #[test]
    fn test_image_or_theme() {
        let rng = SequenceRandom::new(vec![0.0]);
        let (url, caption) = image_or_theme(Some("https://img/x.jpg".to_string()), "Title", "", &[], &rng);
        assert_eq!(url, "https://img/x.jpg");
        assert_eq!(caption, "Title");

        let (url, caption) = image_or_theme(Some(" ".to_string()), "Forest fires spread", "", &[], &rng);
        assert!(url.starts_with("https://images.unsplash.com/"));
        assert!(!caption.is_empty());
    }

    #[test]
    fn test_strip_truncation_marker() {
        assert_eq!(strip_truncation_marker("Some text… [+2310 chars]"), "Some text…");
        assert_eq!(strip_truncation_marker("No marker here"), "No marker here");
    }

    #[test]
    fn test_default_providers_follow_priority() {
        let config = Config {
            provider_priority: vec!["guardian".to_string(), "newsapi".to_string()],
            ..Config::default()
        };
        let client = build_client(&config).unwrap();
        let providers = get_default_providers(&config, client, Arc::new(SequenceRandom::new(vec![0.0])));
        let names: Vec<&str> = providers.iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["guardian", "newsapi"]);
    }
}
