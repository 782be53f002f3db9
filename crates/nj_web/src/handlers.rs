use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use nj_core::Article;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::AppState;

pub const DEFAULT_LIMIT: usize = 20;
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<usize>,
}

impl LimitParams {
    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
    pub limit: Option<usize>,
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Json<Vec<Article>> {
    Json(state.service.get_all(params.limit()).await)
}

pub async fn get_article(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> impl IntoResponse {
    match state.service.get_by_id(&id).await {
        Some(article) => (StatusCode::OK, Json(json!(article))),
        None => {
            debug!("🤷 Article {} not found", id);
            (StatusCode::NOT_FOUND, Json(json!({ "error": format!("article {} not found", id) })))
        }
    }
}

pub async fn get_related_articles(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<LimitParams>,
) -> Json<Vec<Article>> {
    Json(state.service.get_related(&id, params.limit()).await)
}

pub async fn get_category(
    State(state): State<Arc<AppState>>,
    Path(category): Path<String>,
    Query(params): Query<LimitParams>,
) -> Json<Vec<Article>> {
    Json(state.service.get_by_category(&category, params.limit()).await)
}

pub async fn get_trending(
    State(state): State<Arc<AppState>>,
    Query(params): Query<LimitParams>,
) -> Json<Vec<Article>> {
    Json(state.service.get_trending(params.limit()).await)
}

pub async fn search_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Article>> {
    let limit = LimitParams { limit: params.limit }.limit();
    Json(state.service.search(&params.q, limit).await)
}
