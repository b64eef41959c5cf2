// src/server/mod.rs
pub mod api_error;
pub mod handlers;
pub mod state;

pub use api_error::ApiError;
pub use state::AppState;

use anyhow::{Context, Result};
use axum::routing::{get, post};
use axum::Router;
use log::info;
use std::sync::Arc;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(handlers::home))
        .route("/meta", get(handlers::meta))
        .route("/predict", post(handlers::predict))
        .route("/interpretation/rows", get(handlers::interpretation_rows))
        .with_state(state)
}

pub async fn serve(state: AppState, bind_addr: &str) -> Result<()> {
    let app = router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("🚀 Listening on {}", bind_addr);
    axum::serve(listener, app).await.context("HTTP server stopped")?;
    Ok(())
}
