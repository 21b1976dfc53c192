//! Discord bot client setup and lifecycle management.
//!
//! This module provides the TicketBot struct which wires the store, gateway,
//! lifecycle engine, and event handler into a serenity client.

use crate::{DiscordError, DiscordErrorKind, SerenityGateway, TicketHandler};
use serenity::Client;
use std::sync::Arc;
use tessera_core::{EntryPointStore, LifecycleEngine};
use tracing::{info, instrument};

/// Main Discord bot client for Tessera.
///
/// # Example
/// ```rust,ignore
/// use tessera_discord::TicketBot;
/// use tessera_store::JsonFileStore;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let token = std::env::var("DISCORD_TOKEN")?;
///     let store = Arc::new(JsonFileStore::new("ticket_data.json"));
///
///     let mut bot = TicketBot::new(token, store).await?;
///     bot.start().await?;
///     Ok(())
/// }
/// ```
pub struct TicketBot {
    client: Client,
}

impl TicketBot {
    /// Create a new TicketBot instance.
    ///
    /// # Errors
    /// Returns an error if the token is invalid or the serenity client fails
    /// to initialize.
    #[instrument(skip(token, store), fields(token_len = token.len()))]
    pub async fn new(
        token: String,
        store: Arc<dyn EntryPointStore>,
    ) -> Result<Self, DiscordError> {
        info!("Initializing Tessera ticket bot");

        let gateway = Arc::new(SerenityGateway::new(&token));
        let engine = Arc::new(LifecycleEngine::new(gateway));
        let handler = TicketHandler::new(engine, store);

        let intents = TicketHandler::intents();
        info!("Building serenity client with intents: {:?}", intents);

        let client = Client::builder(&token, intents)
            .event_handler(handler)
            .await
            .map_err(|e| {
                DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                    "Failed to build client: {}",
                    e
                )))
            })?;

        info!("Serenity client built successfully");

        Ok(Self { client })
    }

    /// Start the Discord bot.
    ///
    /// This method blocks until the bot is shut down (e.g., via Ctrl+C).
    ///
    /// # Errors
    /// Returns an error if the client fails to start or encounters a fatal
    /// error.
    #[instrument(skip(self))]
    pub async fn start(&mut self) -> Result<(), DiscordError> {
        info!("Starting ticket bot");

        self.client.start().await.map_err(|e| {
            DiscordError::new(DiscordErrorKind::ConnectionFailed(format!(
                "Client error: {}",
                e
            )))
        })?;

        Ok(())
    }
}
