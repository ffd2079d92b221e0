use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub mod error;
pub mod handlers;
pub mod state;

pub use error::ApiError;
pub use state::AppState;

pub async fn create_app(state: AppState) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .route("/articles", get(handlers::list_articles))
        .route("/articles/:id", get(handlers::get_article))
        .route("/companies", get(handlers::list_companies))
        .route("/ingest", post(handlers::trigger_ingest))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Binds `addr` and serves the API until the process stops.
pub async fn serve(state: AppState, addr: &str) -> nd_core::Result<()> {
    let app = create_app(state).await;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "🌐 Serving API");
    axum::serve(listener, app).await?;
    Ok(())
}

pub mod prelude {
    pub use nd_core::{StoredArticle, Result, Error};
    pub use crate::{create_app, serve, AppState};
}
