pub mod clock;
pub mod config;
pub mod error;
pub mod provider;
pub mod random;
pub mod storage;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use provider::{ContentProvider, QuoteSource};
pub use random::{shuffle, RandomSource, SequenceRandom, ThreadRandom};
pub use storage::KeyValueStore;
pub use types::{day_key, dedupe_by_id, Article, CacheRecord, RawQuote, JOURNAL_CATEGORY};
