pub mod daily;
pub mod notify;
pub mod poller;
pub mod synth;
pub mod themes;

#[cfg(test)]
pub(crate) mod test_utils;

pub use daily::{DailyJournal, CACHE_KEY};
pub use notify::{Registry, Subscription, UpdateNotifier};
pub use poller::Poller;
pub use synth::synthesize;
pub use themes::{resolve_theme, Theme, ThemeImage, THEMES};

pub mod prelude {
    pub use super::{DailyJournal, Poller, Subscription, UpdateNotifier};
    pub use nj_core::{Article, Error, Result};
}
