use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, NaiveDate, Utc};
use nj_core::{
    Article, CacheRecord, Clock, Error, KeyValueStore, QuoteSource, RandomSource, Result, SystemClock, ThreadRandom,
};
use tracing::{debug, info, warn};

use crate::notify::{Subscription, UpdateNotifier};
use crate::synth::synthesize_all;

pub const CACHE_KEY: &str = "daily_journal_entries";
pub const DEFAULT_ENTRIES: usize = 5;
pub const DEFAULT_DEBOUNCE_SECS: i64 = 30;

/// Day-keyed journal cache sitting in front of the quote service.
pub struct DailyJournal {
    source: Arc<dyn QuoteSource>,
    store: Arc<dyn KeyValueStore>,
    notifier: UpdateNotifier,
    clock: Arc<dyn Clock>,
    rng: Arc<dyn RandomSource>,
    limit: usize,
    debounce: Duration,
    last_check: Mutex<Option<DateTime<Utc>>>,
}

impl DailyJournal {
    pub fn new(source: Arc<dyn QuoteSource>, store: Arc<dyn KeyValueStore>, notifier: UpdateNotifier) -> Self {
        Self {
            source,
            store,
            notifier,
            clock: Arc::new(SystemClock),
            rng: Arc::new(ThreadRandom),
            limit: DEFAULT_ENTRIES,
            debounce: Duration::seconds(DEFAULT_DEBOUNCE_SECS),
            last_check: Mutex::new(None),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_random(mut self, rng: Arc<dyn RandomSource>) -> Self {
        self.rng = rng;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn notifier(&self) -> &UpdateNotifier {
        &self.notifier
    }

    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&Vec<Article>) + Send + Sync + 'static,
    {
        self.notifier.subscribe_articles(listener)
    }

    /// The persisted record, if there is one and it parses.
    pub fn cached_record(&self) -> Option<CacheRecord> {
        match self.load_cache() {
            Ok(record) => Some(record),
            Err(e) => {
                debug!("No usable journal cache: {}", e);
                None
            }
        }
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.store.remove(CACHE_KEY)
    }

    fn load_cache(&self) -> Result<CacheRecord> {
        let raw = self
            .store
            .get(CACHE_KEY)?
            .ok_or_else(|| Error::CacheMiss(CACHE_KEY.to_string()))?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save_cache(&self, date: NaiveDate, entries: &[Article]) {
        let record = CacheRecord::new(date, entries.to_vec());
        let result = serde_json::to_string(&record)
            .map_err(Error::from)
            .and_then(|raw| self.store.set(CACHE_KEY, &raw));
        if let Err(e) = result {
            warn!("⚠️ Failed to persist journal cache: {}", e);
        }
    }

    async fn fetch_fresh(&self) -> Result<Vec<Article>> {
        let quotes = self.source.fetch_quotes(self.limit).await?;
        let entries = synthesize_all(&quotes, self.rng.as_ref(), self.clock.now());
        if entries.is_empty() {
            return Err(Error::Parse("quote service returned no usable quotes".to_string()));
        }
        Ok(entries)
    }

    /// Today's journal entries.
    ///
    /// Served from the cache without touching the network when it holds a
    /// non-empty record for today. Otherwise the quote service is asked and
    /// the cache replaced; if that fails, whatever is cached is returned
    /// regardless of its date, and an empty list when nothing is.
    pub async fn get_daily_entries(&self) -> Vec<Article> {
        let today = self.clock.today();
        let cached = self.load_cache();

        if let Ok(record) = &cached {
            if record.is_for(today) && !record.entries.is_empty() {
                debug!("📓 Serving {} journal entries from today's cache", record.entries.len());
                return record.entries.clone();
            }
        }

        match self.fetch_fresh().await {
            Ok(entries) => {
                info!("📓 Fetched {} fresh journal entries", entries.len());
                self.save_cache(today, &entries);
                entries
            }
            Err(e) => {
                warn!("⚠️ Failed to fetch journal entries: {}", e);
                match cached {
                    Ok(record) => {
                        info!("📓 Falling back to journal cache from {}", record.date);
                        record.entries
                    }
                    Err(_) => Vec::new(),
                }
            }
        }
    }

    /// Re-fetch and compare against the cache. Returns true when new content
    /// was found, in which case the cache is replaced and article listeners
    /// are notified. Calls within the debounce window return false at once.
    pub async fn check_for_changes(&self) -> bool {
        let now = self.clock.now();
        {
            let mut last = self.last_check.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(previous) = *last {
                if now - previous < self.debounce {
                    debug!("⏳ Skipping change check, last one ran at {}", previous);
                    return false;
                }
            }
            *last = Some(now);
        }

        match self.detect_changes().await {
            Ok(changed) => changed,
            Err(e) => {
                warn!("⚠️ Change check failed: {}", e);
                false
            }
        }
    }

    async fn detect_changes(&self) -> Result<bool> {
        let fresh = self.fetch_fresh().await?;
        let cached = self.cached_record().map(|r| r.entries).unwrap_or_default();

        let unchanged = !cached.is_empty()
            && cached.iter().all(|old| fresh.iter().any(|new| new.same_content(old)));
        if unchanged {
            debug!("📓 Journal unchanged");
            return Ok(false);
        }

        info!("🆕 New journal content found ({} entries)", fresh.len());
        self.save_cache(self.clock.today(), &fresh);
        self.notifier.publish_articles(&fresh);
        Ok(true)
    }
}
