mod config;

use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use nj_articles::ArticleService;
use nj_core::{Article, Config, RandomSource, ThreadRandom};
use nj_journal::{DailyJournal, Poller, UpdateNotifier};
use nj_providers::{build_client, get_default_providers, init_logging, ProviderAggregator, QuotableClient};
use nj_web::AppState;
use tracing::info;

use crate::config::ConfigArgs;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_number = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    'd' => total_seconds += num * 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_number = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // a bare trailing number counts as seconds
        if !current_number.is_empty() {
            total_seconds += current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            has_number = true;
        }

        if !has_number {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(name = "nj", author, version, about = "News and daily journal aggregator", long_about = None)]
pub struct Cli {
    /// Key/value backend for the journal cache: memory or file
    #[arg(long, default_value = "file")]
    storage: String,
    #[command(flatten)]
    config: ConfigArgs,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Journal entries and the latest news
    List {
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Articles in one category ("journal" for the daily journal)
    Category {
        category: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    Trending {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    Search {
        query: String,
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Print one article in full
    Show { id: String },
    Related {
        id: String,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
    /// Poll the journal and print new entries as they arrive (e.g. 30s, 1m, 1h15m)
    Watch {
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: SocketAddr,
        /// Also poll the journal in the background
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
}

struct App {
    journal: Arc<DailyJournal>,
    service: Arc<ArticleService>,
}

fn build(cli: &Cli, config: &Config) -> anyhow::Result<App> {
    let store = nj_storage::create_storage(&cli.storage, &config.data_dir)?;
    let client = build_client(config)?;
    let rng: Arc<dyn RandomSource> = Arc::new(ThreadRandom);

    let quotes = Arc::new(QuotableClient::new(client.clone(), rng.clone()));
    let journal = Arc::new(
        DailyJournal::new(quotes, store, UpdateNotifier::new())
            .with_random(rng.clone())
            .with_limit(config.journal_size),
    );

    let providers = get_default_providers(config, client, rng.clone());
    let aggregator = ProviderAggregator::new(providers)
        .with_priority(config.provider_priority.clone())
        .with_random(rng);
    info!("📡 News providers: {}", aggregator.providers().join(", "));

    let service = Arc::new(ArticleService::new(Arc::new(aggregator), journal.clone()));
    service.init();
    Ok(App { journal, service })
}

fn print_list(articles: &[Article]) {
    if articles.is_empty() {
        println!("Nothing to show.");
        return;
    }
    for article in articles {
        let flag = if article.trending { "🔥" } else { "  " };
        println!(
            "{} {}  {}  [{}]  {}",
            flag,
            article.published_at.format("%Y-%m-%d"),
            article.title,
            article.categories.join(","),
            article.id
        );
    }
}

fn print_article(article: &Article) {
    println!("{}", article.title);
    println!("by {} on {}", article.author, article.published_at.format("%Y-%m-%d %H:%M"));
    if let Some(url) = &article.url {
        println!("{}", url);
    }
    println!();
    println!("{}", article.content);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    let cli = Cli::parse();
    let logger = init_logging(if cli.verbose { "debug" } else { "info" });
    let config = cli.config.clone().into_config()?;
    let app = build(&cli, &config)?;

    match cli.command {
        Commands::List { limit } => print_list(&app.service.get_all(limit).await),
        Commands::Category { ref category, limit } => {
            print_list(&app.service.get_by_category(category, limit).await)
        }
        Commands::Trending { limit } => print_list(&app.service.get_trending(limit).await),
        Commands::Search { ref query, limit } => print_list(&app.service.search(query, limit).await),
        Commands::Show { ref id } => match app.service.get_by_id(id).await {
            Some(article) => print_article(&article),
            None => anyhow::bail!("no article with id {}", id),
        },
        Commands::Related { ref id, limit } => print_list(&app.service.get_related(id, limit).await),
        Commands::Watch { interval } => {
            let interval = interval.map(|i| i.0).unwrap_or(config.poll_interval);
            let poller = Poller::new(app.journal.clone());
            let _updates = app.service.subscribe(|articles: &Vec<Article>| {
                println!("🆕 {} articles after a journal update", articles.len());
                print_list(articles);
            });
            let _status = poller.subscribe_checking(|checking: &bool| {
                tracing::debug!("{}", if *checking { "🔎 Checking for new entries" } else { "💤 Idle" });
            });

            print_list(&app.service.get_by_category(nj_core::JOURNAL_CATEGORY, config.journal_size).await);
            poller.start_polling(interval);
            logger.info(&format!(
                "👀 Watching for journal changes every {}s, Ctrl-C to stop",
                interval.as_secs()
            ));
            tokio::signal::ctrl_c().await?;
            poller.stop_polling();
        }
        Commands::Serve { addr, interval } => {
            let poller = Poller::new(app.journal.clone());
            if let Some(interval) = interval {
                poller.start_polling(interval.0);
            }
            tokio::select! {
                result = nj_web::serve(addr, AppState::new(app.service.clone())) => result?,
                _ = tokio::signal::ctrl_c() => logger.info("👋 Shutting down"),
            }
            poller.stop_polling();
        }
    }

    app.service.shutdown();
    Ok(())
}
