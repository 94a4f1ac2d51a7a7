//! `stickermatch status` — Show the effective configuration.

use stickermatch_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    let model = config.embedder.model.as_deref().unwrap_or("(provider default)");
    let credentials = if config.has_cloudflare_credentials() {
        "configured"
    } else {
        "missing"
    };

    println!("🏷️  StickerMatch Status");
    println!("======================");
    println!("  Config dir:     {}", AppConfig::config_dir().display());
    println!("  Gateway:        {}:{}", config.gateway.host, config.gateway.port);
    println!("  CORS origins:   {}", config.gateway.cors_allowed_origins.join(", "));
    println!("  Embedder:       {}", config.embedder.provider);
    println!("  Model:          {model}");
    println!("  Vector store:   {}", config.vector_store.backend);
    match config.vector_store.backend.as_str() {
        "vectorize" => println!("  Index:          {}", config.vector_store.index_name),
        "in_memory" => println!(
            "  Catalog:        {}",
            config.vector_store.catalog_path.as_deref().unwrap_or("(unset)")
        ),
        _ => {}
    }
    println!("  Query limit:    {}", config.vector_store.max_query_limit);
    println!("  Cloudflare:     {credentials}");
    println!(
        "  Recency:        {} built-in, {} extra pattern(s)",
        if config.recency.builtin_patterns { "with" } else { "without" },
        config.recency.extra_patterns.len()
    );

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `stickermatch onboard` first");
    }

    Ok(())
}
