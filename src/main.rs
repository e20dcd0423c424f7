//! Sentiment Service - Main Entry Point
//!
//! Loads the model artifacts once, then serves `POST /predict` until interrupted.

use anyhow::Result;
use sentiment_service::config::{AppConfig, ArtifactLayout, LoggingConfig};
use sentiment_service::{http, InferenceEngine};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging)?;

    info!("Starting Sentiment Service");

    let vectorizer = match config.artifacts.layout {
        ArtifactLayout::Split => config.artifacts.vectorizer_path.as_str(),
        ArtifactLayout::Bundled => "none",
    };
    info!(
        layout = ?config.artifacts.layout,
        classifier = %config.artifacts.classifier_path,
        vectorizer = %vectorizer,
        "Configuration loaded successfully"
    );

    // Artifacts must be ready before the listener is bound
    let engine = Arc::new(InferenceEngine::new(&config)?);

    http::serve(&config.server, engine).await
}

fn init_tracing(logging: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::from_default_env()
        .add_directive(format!("sentiment_service={}", logging.level).parse()?)
        .add_directive(format!("tower_http={}", logging.level).parse()?);

    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if logging.is_json() {
        subscriber.json().init();
    } else {
        subscriber.init();
    }

    Ok(())
}
