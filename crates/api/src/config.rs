//! Service configuration
//!
//! Read from an optional TOML file, then overridden by `PHISHING__*`
//! environment variables (`PHISHING__SERVER__BIND_ADDR=0.0.0.0:8080`).

use config::{Config, ConfigError, Environment, File};
use inference_engine::ModelConfig;
use serde::Deserialize;

use crate::rate_limit::RateLimitConfig;

/// Top-level service configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub server: ServerConfig,
    pub model: ModelConfig,
    pub rate_limit: RateLimitConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    /// Allow cross-origin requests from browser front-ends
    pub cors: bool,
    /// Predictions kept in the in-memory history
    pub history_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:5000".to_string(),
            cors: true,
            history_size: 10_000,
        }
    }
}

/// Log output settings; `RUST_LOG` takes precedence over `level`
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl ServiceConfig {
    /// Load configuration; a given file path must exist
    pub fn load(path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        builder
            .add_source(Environment::with_prefix("PHISHING").separator("__"))
            .build()?
            .try_deserialize()
    }
}
