//! Phishing Detector - Main Entry Point
//!
//! Usage: `phishing-detector [config.toml]`

use api::{init_logging, run_server, ServiceConfig};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1);
    let config = ServiceConfig::load(config_path.as_deref())?;
    init_logging(&config.logging)?;

    info!("=== Phishing Detector v{} ===", env!("CARGO_PKG_VERSION"));
    if let Some(path) = &config_path {
        info!("Configuration loaded from {}", path);
    }

    run_server(config).await?;

    Ok(())
}
