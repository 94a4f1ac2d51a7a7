//! `stickermatch onboard` — First-time setup.

use stickermatch_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("🏷️  StickerMatch — First-Time Setup");
    println!("===================================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if config_path.exists() {
        println!("\n⚠️  Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
        return Ok(());
    }

    std::fs::write(&config_path, AppConfig::default_toml())?;
    println!("✅ Created config.toml at: {}", config_path.display());
    println!("\n📝 Next steps:");
    println!("   1. Set cloudflare.account_id and cloudflare.api_token");
    println!("      (or CLOUDFLARE_ACCOUNT_ID / CLOUDFLARE_API_TOKEN)");
    println!("   2. Or point vector_store at a local catalog:");
    println!("      backend = \"in_memory\", catalog_path = \"stickers.json\"");
    println!("   3. Run: stickermatch recommend \"good morning\"\n");

    Ok(())
}
