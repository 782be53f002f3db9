//! Settings shared by every subcommand. Each flag can also come from the
//! environment or a `.env` file.

use std::path::PathBuf;
use std::time::Duration;

use nj_core::Config;

#[derive(clap::Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(long, env = "NEWSAPI_KEY", hide_env_values = true)]
    pub newsapi_key: Option<String>,

    #[arg(long, env = "GNEWS_KEY", hide_env_values = true)]
    pub gnews_key: Option<String>,

    #[arg(long, env = "GUARDIAN_KEY", hide_env_values = true)]
    pub guardian_key: Option<String>,

    /// Directory for the file backend
    #[arg(long, env = "NJ_DATA_DIR", default_value = ".nj")]
    pub data_dir: PathBuf,

    /// Seconds between journal checks when polling
    #[arg(long, env = "NJ_POLL_INTERVAL_SECS", default_value_t = 60)]
    pub poll_interval_secs: u64,

    /// Comma separated provider order, e.g. guardian,newsapi
    #[arg(
        long = "providers",
        env = "NJ_PROVIDER_PRIORITY",
        value_delimiter = ',',
        default_value = "newsapi,gnews,guardian"
    )]
    pub provider_priority: Vec<String>,

    #[arg(long, env = "NJ_REQUEST_TIMEOUT_SECS", default_value_t = 15)]
    pub request_timeout_secs: u64,

    /// Quotes pulled for each daily journal refresh
    #[arg(long, env = "NJ_JOURNAL_SIZE", default_value_t = 5)]
    pub journal_size: usize,
}

impl ConfigArgs {
    pub fn into_config(self) -> nj_core::Result<Config> {
        Config {
            newsapi_key: self.newsapi_key,
            gnews_key: self.gnews_key,
            guardian_key: self.guardian_key,
            data_dir: self.data_dir,
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            provider_priority: self.provider_priority,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            journal_size: self.journal_size,
        }
        .normalized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        config: ConfigArgs,
    }

    #[test]
    fn test_flags_build_config() {
        let harness = Harness::try_parse_from([
            "nj",
            "--providers",
            "Guardian,newsapi",
            "--poll-interval-secs",
            "30",
            "--guardian-key",
            " key ",
            "--data-dir",
            "/tmp/nj",
        ])
        .unwrap();
        let config = harness.config.into_config().unwrap();

        assert_eq!(config.provider_priority, vec!["guardian", "newsapi"]);
        assert_eq!(config.poll_interval, Duration::from_secs(30));
        assert_eq!(config.guardian_key.as_deref(), Some("key"));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/nj"));
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let harness = Harness::try_parse_from(["nj", "--poll-interval-secs", "0"]).unwrap();
        assert!(harness.config.into_config().is_err());

        let harness = Harness::try_parse_from(["nj", "--providers", "bing"]).unwrap();
        assert!(harness.config.into_config().is_err());

        assert!(Harness::try_parse_from(["nj", "--journal-size", "many"]).is_err());
    }
}
