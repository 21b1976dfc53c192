//! Tessera CLI binary.
//!
//! Boots the Discord ticket bot: loads the token from the environment,
//! verifies the persisted entry-point document, and runs the client until
//! shutdown.

use clap::Parser;
use std::sync::Arc;
use tessera_core::{EntryPointRegistrar, EntryPointStore};
use tessera_discord::TicketBot;
use tessera_store::{DEFAULT_DATA_FILE, JsonFileStore};
use tracing::info;

/// Support-ticket workflow for Discord guilds.
#[derive(Debug, Parser)]
#[command(name = "tessera", version, about)]
struct Cli {
    /// Path to the entry-point persistence file.
    #[arg(long, default_value = DEFAULT_DATA_FILE)]
    data_file: String,

    /// Enable debug logging.
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing
    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    // Token comes from the environment, optionally via .env
    dotenvy::dotenv().ok();
    let token = std::env::var("DISCORD_TOKEN")
        .map_err(|_| "DISCORD_TOKEN environment variable not set")?;

    let store: Arc<dyn EntryPointStore> = Arc::new(JsonFileStore::new(&cli.data_file));

    // Fail fast on a malformed document before touching the network.
    let registrar = EntryPointRegistrar::new(store.clone());
    let controls = registrar.replay().await?;
    info!(
        data_file = %cli.data_file,
        entry_count = controls.len(),
        "Entry-point store verified"
    );

    let mut bot = TicketBot::new(token, store).await?;
    bot.start().await?;

    Ok(())
}
