use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use nj_core::{dedupe_by_id, shuffle, Article, ContentProvider, Error, RandomSource, ThreadRandom};

use crate::logging::Logger;

/// Tries providers one after another until one of them has something to say.
pub struct ProviderAggregator {
    providers: Vec<Arc<dyn ContentProvider>>,
    priority: Vec<String>,
    rng: Arc<dyn RandomSource>,
    last_results: Mutex<HashMap<String, Vec<Article>>>,
    last_successful: Mutex<Option<String>>,
    logger: Logger,
}

impl ProviderAggregator {
    /// Default priority is the order the providers were given in.
    pub fn new(providers: Vec<Arc<dyn ContentProvider>>) -> Self {
        let priority = providers.iter().map(|p| p.name().to_string()).collect();
        Self {
            providers,
            priority,
            rng: Arc::new(ThreadRandom),
            last_results: Mutex::new(HashMap::new()),
            last_successful: Mutex::new(None),
            logger: Logger::new().with_prefix("[aggregator]".to_string()),
        }
    }

    pub fn with_priority(mut self, priority: Vec<String>) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_random(mut self, rng: Arc<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    pub fn providers(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    pub fn priority(&self) -> &[String] {
        &self.priority
    }

    /// What `provider` last returned on a successful fetch or search.
    pub fn last_results(&self, provider: &str) -> Option<Vec<Article>> {
        self.last_results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(provider)
            .cloned()
    }

    pub fn last_successful(&self) -> Option<String> {
        self.last_successful.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn provider(&self, name: &str) -> Option<&Arc<dyn ContentProvider>> {
        self.providers.iter().find(|p| p.name() == name)
    }

    fn remember(&self, provider: &str, articles: &[Article]) {
        self.last_results
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(provider.to_string(), articles.to_vec());
        *self.last_successful.lock().unwrap_or_else(|e| e.into_inner()) = Some(provider.to_string());
    }

    pub async fn fetch(&self, category: Option<&str>, limit: usize) -> Vec<Article> {
        self.fetch_from_all_sources(category, limit, &self.priority).await
    }

    pub async fn search(&self, query: &str, limit: usize) -> Vec<Article> {
        self.search_from_all_sources(query, limit, &self.priority).await
    }

    /// First non-empty answer in `priority` order. Failures and empty answers
    /// move on to the next provider; nothing left means an empty vec.
    pub async fn fetch_from_all_sources(
        &self,
        category: Option<&str>,
        limit: usize,
        priority: &[String],
    ) -> Vec<Article> {
        for name in priority {
            let Some(provider) = self.provider(name) else {
                self.logger.debug(&format!("⏭️ Unknown provider {}", name));
                continue;
            };
            let logger = self.logger.clone().with_prefix(format!("[{}]", name));
            match provider.fetch_latest(category, limit).await {
                Ok(articles) if articles.is_empty() => {
                    logger.info("📭 No articles, trying next provider");
                }
                Ok(articles) => {
                    logger.info(&format!("📰 Got {} articles", articles.len()));
                    self.remember(name, &articles);
                    return articles;
                }
                Err(e) => report(&logger, "Fetch", &e),
            }
        }
        self.logger.warn("🚫 Every provider failed or came back empty");
        Vec::new()
    }

    pub async fn search_from_all_sources(
        &self,
        query: &str,
        limit: usize,
        priority: &[String],
    ) -> Vec<Article> {
        for name in priority {
            let Some(provider) = self.provider(name) else {
                continue;
            };
            let logger = self.logger.clone().with_prefix(format!("[{}]", name));
            match provider.search(query, limit).await {
                Ok(articles) if articles.is_empty() => {
                    logger.debug(&format!("📭 Nothing for '{}'", query));
                }
                Ok(articles) => {
                    logger.info(&format!("🔍 {} results for '{}'", articles.len(), query));
                    self.remember(name, &articles);
                    return articles;
                }
                Err(e) => report(&logger, "Search", &e),
            }
        }
        Vec::new()
    }

    /// Trending items from every provider, topped up with non-trending ones
    /// when there are fewer than `limit`. Order is random on every call.
    pub async fn fetch_trending_from_all_sources(&self, limit: usize) -> Vec<Article> {
        let mut all = Vec::new();
        for provider in &self.providers {
            match provider.fetch_latest(None, limit).await {
                Ok(articles) => {
                    all.extend(articles.into_iter().map(|mut article| {
                        article.api_source = Some(provider.name().to_string());
                        article
                    }));
                }
                Err(e) => {
                    let logger = self.logger.clone().with_prefix(format!("[{}]", provider.name()));
                    report(&logger, "Trending fetch", &e);
                }
            }
        }

        let (mut trending, rest): (Vec<Article>, Vec<Article>) =
            dedupe_by_id(all).into_iter().partition(|a| a.trending);
        if trending.len() < limit {
            let missing = limit - trending.len();
            trending.extend(shuffle(rest, self.rng.as_ref()).into_iter().take(missing));
        }

        let mut result = shuffle(trending, self.rng.as_ref());
        result.truncate(limit);
        self.logger.debug(&format!("🔥 {} trending articles", result.len()));
        result
    }
}

/// Upstream hiccups are warnings; anything else points at our side.
fn report(logger: &Logger, what: &str, error: &Error) {
    if error.is_transport() {
        logger.warn(&format!("❌ {} failed: {}", what, error));
    } else {
        logger.error(&format!("❌ {} failed: {}", what, error));
    }
}
