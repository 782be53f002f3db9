pub mod offline;
pub mod service;

#[cfg(test)]
pub(crate) mod test_utils;

pub use offline::{OfflineDataset, StaticDataset};
pub use service::ArticleService;

pub mod prelude {
    pub use super::{ArticleService, OfflineDataset};
    pub use nj_core::{Article, Result};
}
