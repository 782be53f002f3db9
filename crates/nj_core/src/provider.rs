use async_trait::async_trait;
use crate::types::{Article, RawQuote};
use crate::Result;

#[async_trait]
pub trait ContentProvider: Send + Sync {
    /// Short stable name, also used as the bookkeeping tag on trending results
    fn name(&self) -> &str;

    /// Latest articles, optionally restricted to a category
    async fn fetch_latest(&self, category: Option<&str>, limit: usize) -> Result<Vec<Article>>;

    /// Articles matching a free-text query
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<Article>>;
}

#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Fetch up to `limit` raw quotes
    async fn fetch_quotes(&self, limit: usize) -> Result<Vec<RawQuote>>;
}
