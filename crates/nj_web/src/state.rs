use std::sync::Arc;

use nj_articles::ArticleService;

pub struct AppState {
    pub service: Arc<ArticleService>,
}

impl AppState {
    pub fn new(service: Arc<ArticleService>) -> Self {
        Self { service }
    }
}
