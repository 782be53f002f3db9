use chrono::{DateTime, TimeZone, Utc};
use nj_core::{Article, JOURNAL_CATEGORY};

/// The last line of defence: a local collection that is always available.
pub trait OfflineDataset: Send + Sync {
    fn all(&self) -> Vec<Article>;

    fn by_category(&self, category: &str) -> Vec<Article> {
        self.all().into_iter().filter(|a| a.has_category(category)).collect()
    }

    fn trending(&self) -> Vec<Article> {
        self.all().into_iter().filter(|a| a.trending).collect()
    }

    fn search(&self, query: &str) -> Vec<Article> {
        self.all().into_iter().filter(|a| a.matches_query(query)).collect()
    }

    fn by_id(&self, id: &str) -> Option<Article> {
        self.all().into_iter().find(|a| a.id == id)
    }

    /// Articles sharing a category with `article`, excluding it.
    fn related(&self, article: &Article, limit: usize) -> Vec<Article> {
        self.all()
            .into_iter()
            .filter(|a| a.id != article.id && shares_category(a, article))
            .take(limit)
            .collect()
    }
}

pub fn shares_category(a: &Article, b: &Article) -> bool {
    a.categories.iter().any(|c| b.has_category(c))
}

#[derive(Debug, Clone)]
pub struct StaticDataset {
    articles: Vec<Article>,
}

impl StaticDataset {
    pub fn new(articles: Vec<Article>) -> Self {
        Self { articles }
    }

    pub fn builtin() -> Self {
        Self::new(builtin_articles())
    }
}

impl Default for StaticDataset {
    fn default() -> Self {
        Self::builtin()
    }
}

impl OfflineDataset for StaticDataset {
    fn all(&self) -> Vec<Article> {
        self.articles.clone()
    }
}

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).single().unwrap_or_else(Utc::now)
}

#[allow(clippy::too_many_arguments)]
fn entry(
    id: &str,
    title: &str,
    author: &str,
    summary: &str,
    content: &str,
    published: i64,
    image: &str,
    category: &str,
    trending: bool,
) -> Article {
    Article {
        id: id.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        summary: summary.to_string(),
        content: content.to_string(),
        published_at: at(published),
        image_url: format!("https://images.unsplash.com/{}", image),
        image_description: title.to_string(),
        categories: vec![category.to_string()],
        trending,
        api_source: None,
        url: None,
    }
}

fn builtin_articles() -> Vec<Article> {
    vec![
        entry(
            "offline-technology-1",
            "Open hardware finds a second wind",
            "Priya Natarajan",
            "Small manufacturers are publishing their board designs again.",
            "A growing number of small manufacturers are publishing schematics and firmware for their devices, betting that repairability will win customers back.",
            1_714_550_400,
            "photo-1518770660439-4636190af475",
            "technology",
            true,
        ),
        entry(
            "offline-technology-2",
            "Why your laptop battery ages",
            "Tomás Ferreira",
            "Heat and full charges do more damage than charge cycles.",
            "Battery chemists explain that keeping a cell at full charge in a warm room wears it faster than daily cycling.",
            1_714_464_000,
            "photo-1496181133206-80ce9b88a853",
            "technology",
            false,
        ),
        entry(
            "offline-science-1",
            "A comet returns after 70 years",
            "Helen Okafor",
            "Observers in the northern hemisphere can spot it at dusk.",
            "The comet last passed close to the sun in the 1950s. Astronomers expect it to be visible with binoculars for two weeks.",
            1_714_377_600,
            "photo-1446776811953-b23d57bd21aa",
            "science",
            true,
        ),
        entry(
            "offline-business-1",
            "Local bakeries band together",
            "Marta Kowalski",
            "A shared delivery network cuts costs for independent shops.",
            "Twelve independent bakeries now share vans and drivers, cutting delivery costs by nearly a third.",
            1_714_291_200,
            "photo-1509440159596-0249088772ff",
            "business",
            false,
        ),
        entry(
            "offline-health-1",
            "Short walks after meals",
            "Daniel Mensah",
            "Ten minutes of walking helps keep blood sugar steady.",
            "Several small studies suggest that a brief walk after eating flattens the rise in blood sugar that follows a meal.",
            1_714_204_800,
            "photo-1476480862126-209bfaa8edc8",
            "health",
            false,
        ),
        entry(
            "offline-journal-1",
            "The journey of a thousand miles begins...",
            "Lao Tzu",
            "The journey of a thousand miles begins with one step.",
            "Every large undertaking starts small. Which first step have you been putting off?",
            1_714_118_400,
            "photo-1500530855697-b586d89ba3ee",
            JOURNAL_CATEGORY,
            true,
        ),
    ]
}
