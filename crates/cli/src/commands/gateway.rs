//! `stickermatch gateway` — Start the HTTP API server.

use tracing::info;

use stickermatch_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        info!(port, "Overriding gateway port from the command line");
        config.gateway.port = port;
    }

    println!("🏷️  StickerMatch Gateway");
    println!("   Listening:    {}:{}", config.gateway.host, config.gateway.port);
    println!("   Embedder:     {}", config.embedder.provider);
    println!("   Vector store: {}", config.vector_store.backend);
    println!("   Endpoints:    /recommend, /api/recommend, /health");

    stickermatch_gateway::start(config).await?;

    Ok(())
}
