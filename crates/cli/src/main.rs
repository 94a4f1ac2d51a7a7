//! StickerMatch CLI — the main entry point.
//!
//! Commands:
//! - `onboard`    — Write a default config file
//! - `gateway`    — Start the HTTP recommendation server
//! - `recommend`  — Run one recommendation and print the envelope
//! - `status`     — Show the effective configuration
//! - `doctor`     — Diagnose configuration problems

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "stickermatch",
    about = "StickerMatch — semantic sticker recommendations",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Onboard,

    /// Start the HTTP gateway server
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Recommend stickers for a single prompt
    Recommend {
        /// Text to find stickers for
        prompt: String,

        /// Number of stickers to return (1-20, default 5)
        #[arg(short = 'k', long)]
        top_k: Option<i64>,

        /// Comma-separated sticker identifiers to leave out
        #[arg(short, long, value_delimiter = ',')]
        exclude: Option<Vec<String>>,
    },

    /// Show configuration status
    Status,

    /// Diagnose configuration problems
    Doctor,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);
    if cli.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Recommend {
            prompt,
            top_k,
            exclude,
        } => commands::recommend::run(prompt, top_k, exclude).await?,
        Commands::Status => commands::status::run().await?,
        Commands::Doctor => commands::doctor::run().await?,
    }

    Ok(())
}
