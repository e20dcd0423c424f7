//! Request-time failures and their HTTP representation

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

/// Failures after a request passed validation.
///
/// Every variant maps to the same generic 500 so artifact errors never reach the caller.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("inference failed: {0:#}")]
    Inference(anyhow::Error),

    #[error("inference task aborted: {0}")]
    Task(#[from] JoinError),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        error!(error = %self, "Prediction failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "internal server error" })),
        )
            .into_response()
    }
}
