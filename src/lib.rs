//! Sentiment Service Library
//!
//! Serves a pre-trained text classifier (optionally paired with a separate
//! vectorizer) over a single HTTP endpoint.

pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod types;

pub use config::AppConfig;
pub use error::ServiceError;
pub use models::inference::InferenceEngine;
pub use types::{PredictRequest, PredictResponse};
