//! HTTP surface: `POST /predict`

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{DefaultBodyLimit, State};
use axum::routing::post;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::ServiceError;
use crate::models::inference::InferenceEngine;
use crate::types::{PredictRequest, PredictResponse};

#[derive(Clone)]
pub struct ApiState {
    pub engine: Arc<InferenceEngine>,
}

/// Build the application router over a loaded engine.
///
/// Messages have no length limit, so axum's default body limit is lifted.
pub fn router(engine: Arc<InferenceEngine>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .with_state(ApiState { engine })
        .layer(DefaultBodyLimit::disable())
        .layer(TraceLayer::new_for_http())
}

/// Bind the listener and serve until Ctrl-C
pub async fn serve(config: &ServerConfig, engine: Arc<InferenceEngine>) -> Result<()> {
    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(addr = %addr, "Listening for prediction requests");

    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Server stopped");
    Ok(())
}

async fn predict(
    State(state): State<ApiState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<PredictResponse>, ServiceError> {
    let engine = state.engine.clone();
    let label = tokio::task::spawn_blocking(move || engine.predict(&request.msg))
        .await?
        .map_err(ServiceError::Inference)?;

    Ok(Json(PredictResponse::from(label)))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
