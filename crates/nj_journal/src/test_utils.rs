use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use nj_core::{Error, QuoteSource, RawQuote, Result};

pub fn quote(content: &str, author: &str) -> RawQuote {
    RawQuote {
        id: None,
        content: content.to_string(),
        author: author.to_string(),
        tags: vec![],
    }
}

/// Quote source that replays scripted responses, then repeats a default.
pub struct MockQuotes {
    scripted: Mutex<VecDeque<Result<Vec<RawQuote>>>>,
    default: Option<Vec<RawQuote>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl MockQuotes {
    pub fn always(quotes: Vec<RawQuote>) -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            default: Some(quotes),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            scripted: Mutex::new(VecDeque::new()),
            default: None,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn then(self, response: Result<Vec<RawQuote>>) -> Self {
        self.scripted.lock().unwrap().push_back(response);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QuoteSource for MockQuotes {
    async fn fetch_quotes(&self, limit: usize) -> Result<Vec<RawQuote>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let scripted = self.scripted.lock().unwrap().pop_front();
        match scripted {
            Some(response) => response,
            None => match &self.default {
                Some(quotes) => Ok(quotes.iter().take(limit).cloned().collect()),
                None => Err(Error::Parse("quote service unavailable".to_string())),
            },
        }
    }
}
