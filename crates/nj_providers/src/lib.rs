pub mod aggregator;
pub mod logging;
pub mod providers;

pub use aggregator::ProviderAggregator;
pub use logging::{init_logging, Logger};
pub use providers::{build_client, get_default_providers, GNewsClient, GuardianClient, NewsApiClient, QuotableClient};

pub mod prelude {
    pub use super::{ProviderAggregator, QuotableClient};
    pub use nj_core::{Article, ContentProvider, Error, QuoteSource, Result};
}
