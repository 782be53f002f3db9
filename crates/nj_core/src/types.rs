use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub const JOURNAL_CATEGORY: &str = "journal";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    pub author: String,
    pub summary: String,
    pub content: String,
    pub published_at: DateTime<Utc>,
    pub image_url: String,
    pub image_description: String,
    pub categories: Vec<String>,
    pub trending: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl Article {
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|c| c.eq_ignore_ascii_case(category))
    }

    pub fn is_journal(&self) -> bool {
        self.has_category(JOURNAL_CATEGORY)
    }

    /// Case-insensitive substring match over the human-readable fields.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return false;
        }
        [&self.title, &self.summary, &self.content, &self.author]
            .iter()
            .any(|field| field.to_lowercase().contains(&query))
            || self.categories.iter().any(|c| c.to_lowercase().contains(&query))
    }

    /// Same summary and author; used to tell whether a refresh brought anything new.
    pub fn same_content(&self, other: &Article) -> bool {
        self.summary == other.summary && self.author == other.author
    }
}

/// A quote as returned by the quote service, before it is turned into a journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    #[serde(default)]
    pub id: Option<String>,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// The persisted daily journal: one record, replaced wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    pub date: String,
    pub entries: Vec<Article>,
}

impl CacheRecord {
    pub fn new(date: NaiveDate, entries: Vec<Article>) -> Self {
        Self {
            date: day_key(date),
            entries,
        }
    }

    pub fn is_for(&self, date: NaiveDate) -> bool {
        self.date == day_key(date)
    }
}

/// Keep the first article for every id, preserving order.
pub fn dedupe_by_id(articles: Vec<Article>) -> Vec<Article> {
    let mut seen = std::collections::HashSet::new();
    articles.into_iter().filter(|a| seen.insert(a.id.clone())).collect()
}

pub fn day_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn article() -> Article {
        Article {
            id: "a1".to_string(),
            title: "Rivers rise after storm".to_string(),
            author: "Jane Doe".to_string(),
            summary: "Heavy rain swelled the rivers.".to_string(),
            content: "Heavy rain swelled the rivers overnight.".to_string(),
            published_at: Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap(),
            image_url: "https://example.com/river.jpg".to_string(),
            image_description: "A river".to_string(),
            categories: vec!["Science".to_string()],
            trending: false,
            api_source: None,
            url: None,
        }
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(article()).unwrap();
        assert!(json.get("publishedAt").is_some());
        assert!(json.get("imageUrl").is_some());
        assert!(json.get("apiSource").is_none());
    }

    #[test]
    fn test_matches_query() {
        let a = article();
        assert!(a.matches_query("RIVERS"));
        assert!(a.matches_query("science"));
        assert!(a.matches_query("jane"));
        assert!(!a.matches_query("volcano"));
        assert!(!a.matches_query("   "));
    }

    #[test]
    fn test_cache_record_day_key() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        let record = CacheRecord::new(date, vec![]);
        assert_eq!(record.date, "2024-03-07");
        assert!(record.is_for(date));
        assert!(!record.is_for(date.succ_opt().unwrap()));
    }

    #[test]
    fn test_dedupe_by_id_keeps_first() {
        let a = article();
        let mut b = article();
        b.title = "Duplicate".to_string();
        let mut c = article();
        c.id = "a2".to_string();

        let deduped = dedupe_by_id(vec![a.clone(), b, c.clone()]);
        assert_eq!(deduped, vec![a, c]);
    }

    #[test]
    fn test_same_content() {
        let a = article();
        let mut b = article();
        b.id = "other".to_string();
        b.title = "Different".to_string();
        assert!(a.same_content(&b));
        b.author = "Someone Else".to_string();
        assert!(!a.same_content(&b));
    }
}
