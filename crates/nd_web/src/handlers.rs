use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use nd_core::{ArticleQuery, StoredArticle, DEFAULT_LIST_LIMIT};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{error, info};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub company: Option<String>,
    pub limit: Option<usize>,
}

impl From<ListParams> for ArticleQuery {
    fn from(params: ListParams) -> Self {
        ArticleQuery {
            company: params.company.filter(|c| !c.trim().is_empty()),
            limit: params.limit.unwrap_or(DEFAULT_LIST_LIMIT),
        }
    }
}

pub async fn list_articles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<StoredArticle>>, ApiError> {
    let articles = state.storage.list_articles(&params.into()).await?;
    Ok(Json(articles))
}

pub async fn get_article(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<StoredArticle>, ApiError> {
    state
        .storage
        .get_article(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Article {} not found", id)))
}

pub async fn list_companies(State(state): State<Arc<AppState>>) -> Json<Vec<String>> {
    Json(state.manager.config().companies.clone())
}

/// Starts a cycle in the background. Only one cycle runs at a time.
pub async fn trigger_ingest(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let guard = match state.ingest_lock.clone().try_lock_owned() {
        Ok(guard) => guard,
        Err(_) => {
            return (
                StatusCode::CONFLICT,
                Json(json!({ "message": "Ingestion already running" })),
            )
        }
    };

    let manager = state.manager.clone();
    tokio::spawn(async move {
        let _guard = guard;
        match manager.ingest().await {
            Ok(report) => info!(stored = report.stored, "Background ingestion finished"),
            Err(e) => error!(error = %e, "Background ingestion failed"),
        }
    });

    (StatusCode::OK, Json(json!({ "message": "Ingestion started" })))
}
