//! `docchat serve` — Start the HTTP gateway.

use std::path::{Path, PathBuf};

use docchat_config::AppConfig;

pub async fn run(
    config_path: Option<&Path>,
    port: Option<u16>,
    source_dir: Option<PathBuf>,
    static_dir: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load(config_path).map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port {
        config.gateway.port = port;
    }
    if let Some(dir) = source_dir {
        config.documents.source_dir = dir;
    }
    if let Some(dir) = static_dir {
        config.gateway.static_dir = dir;
    }

    println!("📚 docchat gateway");
    println!("   Listening: http://{}:{}", config.gateway.host, config.gateway.port);
    println!("   Documents: {}", config.documents.source_dir.display());
    println!("   Provider:  {} ({})", config.default_provider, config.default_model);
    if !config.has_api_key() {
        println!("   ⚠️  No API key configured — chat requests will fail");
    }

    docchat_gateway::start(config).await?;

    Ok(())
}
