//! Configuration management for the sentiment service

use anyhow::{Context, Result};
use config::{Config, Environment, File, Map};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::Path;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "config/config.toml";

/// Which artifacts make up the model
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactLayout {
    /// Separate vectorizer and classifier artifacts
    Split,
    /// A single classifier that accepts raw text
    Bundled,
}

/// Main application configuration
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub artifacts: ArtifactsConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Bind port
    pub port: u16,
}

impl ServerConfig {
    /// Socket address to bind; `host` must be an IPv4 or IPv6 literal
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self
            .host
            .parse()
            .with_context(|| format!("Invalid bind host {}", self.host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
        }
    }
}

/// Model artifact configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArtifactsConfig {
    /// Artifact layout: "split" (vectorizer + classifier) or "bundled"
    pub layout: ArtifactLayout,
    /// Path to the classifier ONNX file
    pub classifier_path: String,
    /// Path to the vectorizer ONNX file (split layout only)
    pub vectorizer_path: String,
    /// Number of intra-op threads per ONNX session
    pub onnx_threads: usize,
}

impl Default for ArtifactsConfig {
    fn default() -> Self {
        Self {
            layout: ArtifactLayout::Split,
            classifier_path: "models/model.onnx".to_string(),
            vectorizer_path: "models/vectorizer.onnx".to_string(),
            onnx_threads: 1,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Log format (json, pretty)
    pub format: String,
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default file, if present, plus environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration from a specific path.
    ///
    /// A missing file is not an error: defaults fill every key that neither the
    /// file nor a `SENTIMENT_*` variable sets.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Load from `path`, reading overrides from `env` instead of the process
    /// environment when given.
    fn load_with_env<P: AsRef<Path>>(path: P, env: Option<Map<String, String>>) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(
                Environment::with_prefix("SENTIMENT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .source(env),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}
