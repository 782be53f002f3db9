use std::net::SocketAddr;
use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;
use tracing::info;

pub mod handlers;
pub mod state;

pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/api/articles", get(handlers::list_articles))
        .route("/api/articles/:id", get(handlers::get_article))
        .route("/api/articles/:id/related", get(handlers::get_related_articles))
        .route("/api/categories/:category", get(handlers::get_category))
        .route("/api/trending", get(handlers::get_trending))
        .route("/api/search", get(handlers::search_articles))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Bind `addr` and serve until the process is stopped.
pub async fn serve(addr: SocketAddr, state: AppState) -> nj_core::Result<()> {
    let app = create_app(state).await;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("🌍 Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use crate::AppState;
    pub use nj_core::{Article, Error, Result};
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use nj_articles::ArticleService;
    use nj_core::{Article, Error, QuoteSource, RawQuote};
    use nj_journal::{DailyJournal, UpdateNotifier};
    use nj_providers::ProviderAggregator;
    use nj_storage::MemoryStore;
    use tower::ServiceExt;

    struct Offline;

    #[async_trait]
    impl QuoteSource for Offline {
        async fn fetch_quotes(&self, _limit: usize) -> nj_core::Result<Vec<RawQuote>> {
            Err(Error::Parse("offline".to_string()))
        }
    }

    async fn app() -> Router {
        let journal = Arc::new(DailyJournal::new(
            Arc::new(Offline),
            Arc::new(MemoryStore::new()),
            UpdateNotifier::new(),
        ));
        let aggregator = Arc::new(ProviderAggregator::new(Vec::new()));
        let service = Arc::new(ArticleService::new(aggregator, journal));
        create_app(AppState::new(service)).await
    }

    async fn get(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .await
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_list_serves_offline_dataset() {
        let (status, body) = get("/api/articles?limit=4").await;
        assert_eq!(status, StatusCode::OK);
        let articles: Vec<Article> = serde_json::from_value(body).unwrap();
        assert_eq!(articles.len(), 4);
    }

    #[tokio::test]
    async fn test_article_by_id() {
        let (status, body) = get("/api/articles/offline-science-1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "offline-science-1");
        assert!(body.get("publishedAt").is_some());

        let (status, body) = get("/api/articles/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("nope"));
    }

    #[tokio::test]
    async fn test_category_trending_and_search() {
        let (_, body) = get("/api/categories/technology").await;
        assert_eq!(body.as_array().unwrap().len(), 2);

        let (_, body) = get("/api/trending").await;
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (_, body) = get("/api/search?q=comet").await;
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (_, body) = get("/api/search").await;
        assert!(body.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_related() {
        let (status, body) = get("/api/articles/offline-technology-1/related").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["id"], "offline-technology-2");
    }
}
