use std::path::PathBuf;
use std::time::Duration;

use crate::{Error, Result};

pub const DEFAULT_PRIORITY: &[&str] = &["newsapi", "gnews", "guardian"];

#[derive(Debug, Clone)]
pub struct Config {
    pub newsapi_key: Option<String>,
    pub gnews_key: Option<String>,
    pub guardian_key: Option<String>,
    /// Directory holding the persisted key/value file
    pub data_dir: PathBuf,
    pub poll_interval: Duration,
    /// Order in which news providers are tried
    pub provider_priority: Vec<String>,
    pub request_timeout: Duration,
    /// Number of quotes pulled for each daily journal refresh
    pub journal_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            newsapi_key: None,
            gnews_key: None,
            guardian_key: None,
            data_dir: PathBuf::from(".nj"),
            poll_interval: Duration::from_secs(60),
            provider_priority: DEFAULT_PRIORITY.iter().map(|s| s.to_string()).collect(),
            request_timeout: Duration::from_secs(15),
            journal_size: 5,
        }
    }
}

impl Config {
    /// Lowercases the provider list and drops blank API keys, then validates.
    pub fn normalized(mut self) -> Result<Self> {
        let blank_to_none = |key: Option<String>| key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty());
        self.newsapi_key = blank_to_none(self.newsapi_key);
        self.gnews_key = blank_to_none(self.gnews_key);
        self.guardian_key = blank_to_none(self.guardian_key);
        self.provider_priority = self
            .provider_priority
            .iter()
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::Config("poll interval must be greater than zero".to_string()));
        }
        if self.journal_size == 0 {
            return Err(Error::Config("journal size must be at least 1".to_string()));
        }
        if let Some(unknown) = self
            .provider_priority
            .iter()
            .find(|p| !DEFAULT_PRIORITY.contains(&p.as_str()))
        {
            return Err(Error::Config(format!("unknown provider in priority list: {}", unknown)));
        }
        Ok(())
    }
}
