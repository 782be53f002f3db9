use std::sync::{Arc, Mutex};

use nj_core::{dedupe_by_id, shuffle, Article, RandomSource, ThreadRandom, JOURNAL_CATEGORY};
use nj_journal::{DailyJournal, Registry, Subscription};
use nj_providers::ProviderAggregator;
use tracing::{debug, info};

use crate::offline::{shares_category, OfflineDataset, StaticDataset};

/// Upper bound on the last-known-good set kept in memory.
pub const MAX_REMEMBERED: usize = 200;

/// One place to ask for articles, whatever is reachable right now.
///
/// News reads try the providers first, then the last articles they managed
/// to fetch, then the offline dataset. Today's journal entries are merged on
/// top of whichever of those served. Reads never fail; the worst case is an
/// empty list.
pub struct ArticleService {
    aggregator: Arc<ProviderAggregator>,
    journal: Arc<DailyJournal>,
    dataset: Arc<dyn OfflineDataset>,
    rng: Arc<dyn RandomSource>,
    latest_articles: Arc<Mutex<Vec<Article>>>,
    registry: Registry<Vec<Article>>,
    journal_subscription: Mutex<Option<Subscription>>,
}

impl ArticleService {
    pub fn new(aggregator: Arc<ProviderAggregator>, journal: Arc<DailyJournal>) -> Self {
        Self {
            aggregator,
            journal,
            dataset: Arc::new(StaticDataset::builtin()),
            rng: Arc::new(ThreadRandom),
            latest_articles: Arc::new(Mutex::new(Vec::new())),
            registry: Registry::new(),
            journal_subscription: Mutex::new(None),
        }
    }

    pub fn with_dataset(mut self, dataset: Arc<dyn OfflineDataset>) -> Self {
        self.dataset = dataset;
        self
    }

    pub fn with_random(mut self, rng: Arc<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    pub fn journal(&self) -> &Arc<DailyJournal> {
        &self.journal
    }

    pub fn aggregator(&self) -> &Arc<ProviderAggregator> {
        &self.aggregator
    }

    /// Start following the journal. Calling it again is a no-op.
    pub fn init(&self) {
        let mut subscription = self.journal_subscription.lock().unwrap_or_else(|e| e.into_inner());
        if subscription.is_some() {
            return;
        }

        let latest = self.latest_articles.clone();
        let registry = self.registry.clone();
        *subscription = Some(self.journal.subscribe(move |entries: &Vec<Article>| {
            let merged = {
                let mut latest = latest.lock().unwrap_or_else(|e| e.into_inner());
                let mut merged = entries.clone();
                merged.extend(latest.iter().filter(|a| !a.is_journal()).cloned());
                let merged = dedupe_by_id(merged);
                *latest = merged.clone();
                merged
            };
            info!("🔄 Journal changed, republishing {} articles", merged.len());
            registry.publish(&merged);
        }));
        debug!("📡 Article service subscribed to journal updates");
    }

    /// Stop following the journal; `init` may be called again afterwards.
    pub fn shutdown(&self) {
        let subscription = self.journal_subscription.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(subscription) = subscription {
            subscription.unsubscribe();
            debug!("📴 Article service unsubscribed from journal updates");
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.journal_subscription.lock().unwrap_or_else(|e| e.into_inner()).is_some()
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Vec<Article>) + Send + Sync + 'static,
    {
        self.registry.subscribe(listener)
    }

    /// Snapshot of the last-known-good set.
    pub fn latest(&self) -> Vec<Article> {
        self.latest_articles.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn remember(&self, articles: &[Article]) {
        let mut latest = self.latest_articles.lock().unwrap_or_else(|e| e.into_inner());
        let mut merged = articles.to_vec();
        merged.append(&mut latest);
        let mut merged = dedupe_by_id(merged);
        merged.truncate(MAX_REMEMBERED);
        *latest = merged;
    }

    fn from_latest<P>(&self, predicate: P, limit: usize) -> Vec<Article>
    where
        P: Fn(&Article) -> bool,
    {
        self.latest_articles
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|a| predicate(*a))
            .take(limit)
            .cloned()
            .collect()
    }

    /// Live result if there is one, otherwise the remembered articles
    /// matching `predicate`, otherwise the offline dataset.
    fn degrade<P, F>(
        &self,
        what: &str,
        live: Vec<Article>,
        limit: usize,
        predicate: P,
        offline: F,
    ) -> Vec<Article>
    where
        P: Fn(&Article) -> bool,
        F: FnOnce(&dyn OfflineDataset) -> Vec<Article>,
    {
        if !live.is_empty() {
            let mut live = live;
            live.truncate(limit);
            self.remember(&live);
            return live;
        }

        let cached = self.from_latest(predicate, limit);
        if !cached.is_empty() {
            info!("💾 Serving {} {} from memory", cached.len(), what);
            return cached;
        }

        let mut offline = offline(self.dataset.as_ref());
        offline.truncate(limit);
        info!("📦 Serving {} {} from the offline dataset", offline.len(), what);
        offline
    }

    /// Journal entries and the latest news, newest first.
    pub async fn get_all(&self, limit: usize) -> Vec<Article> {
        let news = self.aggregator.fetch(None, limit).await;
        let news = self.degrade("articles", news, limit, |a| !a.is_journal(), |d| d.all());

        let mut all = with_journal(self.journal.get_daily_entries().await, news);
        all.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        all.truncate(limit);
        all
    }

    /// `"journal"` only ever comes from the daily journal.
    pub async fn get_by_category(&self, category: &str, limit: usize) -> Vec<Article> {
        if category.eq_ignore_ascii_case(JOURNAL_CATEGORY) {
            let mut entries = self.journal.get_daily_entries().await;
            entries.truncate(limit);
            return entries;
        }

        let live = self.aggregator.fetch(Some(category), limit).await;
        self.degrade(
            "category articles",
            live,
            limit,
            |a| a.has_category(category),
            |d| d.by_category(category),
        )
    }

    /// Trending news plus trending journal entries, in random order.
    pub async fn get_trending(&self, limit: usize) -> Vec<Article> {
        let news = self.aggregator.fetch_trending_from_all_sources(limit).await;
        let news = self.degrade(
            "trending articles",
            news,
            limit,
            |a| a.trending && !a.is_journal(),
            |d| d.trending(),
        );

        let entries = self.journal.get_daily_entries().await;
        let trending = with_journal(entries.into_iter().filter(|a| a.trending).collect(), news);
        let mut trending = shuffle(trending, self.rng.as_ref());
        trending.truncate(limit);
        trending
    }

    pub async fn search(&self, query: &str, limit: usize) -> Vec<Article> {
        if query.trim().is_empty() {
            return Vec::new();
        }

        let news = self.aggregator.search(query, limit).await;
        let news = self.degrade(
            "search results",
            news,
            limit,
            |a| !a.is_journal() && a.matches_query(query),
            |d| d.search(query),
        );

        let entries = self.journal.get_daily_entries().await;
        let matches = entries.into_iter().filter(|a| a.matches_query(query)).collect();
        let mut results = with_journal(matches, news);
        results.truncate(limit);
        results
    }

    /// Providers have no lookup by id, so the live path is the journal plus
    /// whatever the providers last returned.
    pub async fn get_by_id(&self, id: &str) -> Option<Article> {
        let journal_hit = self.journal.get_daily_entries().await.into_iter().find(|a| a.id == id);
        let live = journal_hit.or_else(|| {
            self.aggregator
                .providers()
                .into_iter()
                .filter_map(|name| self.aggregator.last_results(name))
                .flatten()
                .find(|a| a.id == id)
        });

        live.or_else(|| self.from_latest(|a| a.id == id, 1).into_iter().next())
            .or_else(|| self.dataset.by_id(id))
    }

    /// Articles on the same subject: other journal entries for a journal
    /// entry, otherwise the latest news in the article's first category.
    pub async fn get_related(&self, id: &str, limit: usize) -> Vec<Article> {
        let Some(target) = self.get_by_id(id).await else {
            debug!("🤷 No article {} to relate to", id);
            return Vec::new();
        };

        let live = if target.is_journal() {
            self.journal.get_daily_entries().await
        } else {
            match target.categories.first() {
                Some(category) => self.aggregator.fetch(Some(category), limit + 1).await,
                None => Vec::new(),
            }
        };
        let live: Vec<Article> = live.into_iter().filter(|a| a.id != target.id).collect();

        self.degrade(
            "related articles",
            live,
            limit,
            |a| a.id != target.id && shares_category(a, &target),
            |d| d.related(&target, limit),
        )
    }
}

/// Journal entries first, then news, without duplicate ids.
fn with_journal(entries: Vec<Article>, news: Vec<Article>) -> Vec<Article> {
    let mut merged = entries;
    merged.extend(news);
    dedupe_by_id(merged)
}

impl Drop for ArticleService {
    fn drop(&mut self) {
        self.shutdown();
    }
}
