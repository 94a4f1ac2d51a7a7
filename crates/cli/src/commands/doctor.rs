//! `stickermatch doctor` — Diagnose configuration problems.

use std::path::Path;

use stickermatch_config::AppConfig;
use stickermatch_search::{InMemoryStore, RecencyExtractor};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("🩺 StickerMatch Doctor — Configuration Diagnostics");
    println!("=================================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_dir().join("config.toml");
    if !config_path.exists() {
        println!("  ⚠️  No config file — defaults apply; run `stickermatch onboard`");
        issues += 1;
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  ✅ Configuration valid");
            config
        }
        Err(e) => {
            println!("  ❌ Configuration invalid: {e}");
            println!("\n  ⚠️  Fix the configuration and re-run doctor.");
            return Ok(());
        }
    };

    // Embedder
    match config.embedder.provider.as_str() {
        "none" => {
            println!("  ⚠️  Embedder disabled — recommendations will fail");
            issues += 1;
        }
        "workers_ai" if !config.has_cloudflare_credentials() => {
            println!("  ❌ Workers AI embedder needs cloudflare.account_id and cloudflare.api_token");
            issues += 1;
        }
        "openai" if config.embedder.api_key.is_none() => {
            println!("  ❌ OpenAI embedder needs an API key (STICKERMATCH_API_KEY or OPENAI_API_KEY)");
            issues += 1;
        }
        provider => println!("  ✅ Embedder configured ({provider})"),
    }

    // Vector store
    match config.vector_store.backend.as_str() {
        "vectorize" if config.has_cloudflare_credentials() => {
            println!(
                "  ✅ Vectorize index configured ({})",
                config.vector_store.index_name
            );
        }
        "vectorize" => {
            println!("  ❌ Vectorize needs Cloudflare credentials — /recommend will answer 503");
            issues += 1;
        }
        "in_memory" => {
            let path = config.vector_store.catalog_path.as_deref().unwrap_or_default();
            match InMemoryStore::from_file(Path::new(path)) {
                Ok(store) if store.is_empty() => {
                    println!("  ⚠️  Catalog {path} has no usable stickers");
                    issues += 1;
                }
                Ok(store) => println!("  ✅ Catalog loaded ({} stickers)", store.len()),
                Err(e) => {
                    println!("  ❌ {e}");
                    issues += 1;
                }
            }
        }
        _ => {
            println!("  ⚠️  No vector store — /recommend will answer 503");
            issues += 1;
        }
    }

    // Recency patterns
    match RecencyExtractor::new(
        config.recency.builtin_patterns,
        &config.recency.extra_patterns,
    ) {
        Ok(_) => println!("  ✅ Recency patterns compile"),
        Err(e) => {
            println!("  ❌ {e}");
            issues += 1;
        }
    }

    println!();
    if issues == 0 {
        println!("  🎉 All checks passed!");
    } else {
        println!("  ⚠️  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
