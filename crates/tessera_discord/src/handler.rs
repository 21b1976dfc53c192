//! Serenity event handler for the ticket bot.
//!
//! Routes ready and interaction events into the lifecycle engine: slash
//! commands (`/setup`, `/close`), the persistent creation button, the
//! in-channel close button, and the ephemeral confirm/cancel controls.

use crate::commands::{self, respond_ephemeral, user_message};
use serenity::async_trait;
use serenity::builder::{
    CreateActionRow, CreateButton, CreateEmbed, CreateInteractionResponse,
    CreateInteractionResponseMessage,
};
use serenity::client::{Context, EventHandler};
use serenity::model::application::{ButtonStyle, ComponentInteraction, Interaction};
use serenity::model::colour::Colour;
use serenity::model::gateway::{GatewayIntents, Ready};
use std::collections::HashMap;
use std::sync::Arc;
use tessera_core::{
    CANCEL_CONTROL_ID, CLOSE_CONTROL_ID, CONFIRM_CONTROL_ID, ChannelId, EntryPointRegistrar,
    EntryPointStore, GuildId, LifecycleEngine, MessageId, TicketEntryPoint, UserId,
    category_for_control,
};
use tessera_error::TicketErrorKind;
use tokio::sync::RwLock;
use tracing::{error, info, warn};

/// Event handler wiring Discord interactions to the lifecycle engine.
pub struct TicketHandler {
    engine: Arc<LifecycleEngine>,
    store: Arc<dyn EntryPointStore>,
    /// Creation controls keyed by control id, replayed from the store at
    /// ready time and refreshed by `/setup`.
    entry_points: RwLock<HashMap<String, TicketEntryPoint>>,
}

impl TicketHandler {
    /// Create a handler over the engine and store.
    pub fn new(engine: Arc<LifecycleEngine>, store: Arc<dyn EntryPointStore>) -> Self {
        Self {
            engine,
            store,
            entry_points: RwLock::new(HashMap::new()),
        }
    }

    /// Required gateway intents for the bot.
    pub fn intents() -> GatewayIntents {
        GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MEMBERS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT
    }

    /// Send an ephemeral text response to a component interaction.
    async fn respond_component(
        &self,
        ctx: &Context,
        component: &ComponentInteraction,
        content: &str,
    ) {
        let response = CreateInteractionResponse::Message(
            CreateInteractionResponseMessage::new()
                .content(content)
                .ephemeral(true),
        );
        if let Err(e) = component.create_response(&ctx.http, response).await {
            error!(error = %e, "Failed to respond to component interaction");
        }
    }

    /// Acknowledge a component interaction with no visible effect.
    async fn acknowledge_component(&self, ctx: &Context, component: &ComponentInteraction) {
        if let Err(e) = component
            .create_response(&ctx.http, CreateInteractionResponse::Acknowledge)
            .await
        {
            error!(error = %e, "Failed to acknowledge component interaction");
        }
    }

    /// Creation button pressed: open a ticket for the presser.
    async fn on_create_pressed(&self, ctx: &Context, component: &ComponentInteraction) {
        let entry = {
            let controls = self.entry_points.read().await;
            controls.get(&component.data.custom_id).cloned()
        };
        let Some(entry) = entry else {
            warn!(control_id = %component.data.custom_id, "No entry point bound to control");
            self.acknowledge_component(ctx, component).await;
            return;
        };

        let requester = UserId(component.user.id.get());
        match self
            .engine
            .open_ticket(&entry, requester, &component.user.name)
            .await
        {
            Ok(opened) => {
                let link = format!("Your ticket has been created: <#{}>", opened.channel());
                self.respond_component(ctx, component, &link).await;
            }
            Err(err) if err.is_user_facing() => {
                self.respond_component(ctx, component, user_message(err.kind()))
                    .await;
            }
            Err(err) => {
                error!(error = %err, "Ticket creation failed");
                self.respond_component(ctx, component, user_message(err.kind()))
                    .await;
            }
        }
    }

    /// Close button pressed: open the confirm/cancel prompt.
    async fn on_close_pressed(&self, ctx: &Context, component: &ComponentInteraction) {
        let Some(guild_id) = component.guild_id else {
            self.acknowledge_component(ctx, component).await;
            return;
        };
        let guild = GuildId(guild_id.get());
        let channel = ChannelId(component.channel_id.get());
        let requester = UserId(component.user.id.get());

        match self.engine.request_close(guild, channel, requester).await {
            Ok(_prompt) => {
                let embed = CreateEmbed::new()
                    .title("Confirm Closure")
                    .description("Are you sure you want to close this ticket?")
                    .colour(Colour::ORANGE);
                let buttons = vec![
                    CreateButton::new(CONFIRM_CONTROL_ID)
                        .label("Confirm")
                        .style(ButtonStyle::Danger),
                    CreateButton::new(CANCEL_CONTROL_ID)
                        .label("Cancel")
                        .style(ButtonStyle::Secondary),
                ];
                let response = CreateInteractionResponse::Message(
                    CreateInteractionResponseMessage::new()
                        .embed(embed)
                        .components(vec![CreateActionRow::Buttons(buttons)])
                        .ephemeral(true),
                );
                if let Err(e) = component.create_response(&ctx.http, response).await {
                    error!(error = %e, "Failed to render close prompt");
                    return;
                }
                // Remember the rendered prompt message for later retirement.
                if let Ok(message) = component.get_response(&ctx.http).await {
                    self.engine
                        .attach_prompt_message(channel, MessageId(message.id.get()));
                }
            }
            Err(err) if err.is_user_facing() => {
                self.respond_component(ctx, component, user_message(err.kind()))
                    .await;
            }
            Err(err) => {
                error!(error = %err, "Close request failed");
                self.respond_component(ctx, component, user_message(err.kind()))
                    .await;
            }
        }
    }

    /// Confirm pressed: deliver the transcript and tear the channel down.
    async fn on_confirm_pressed(&self, ctx: &Context, component: &ComponentInteraction) {
        let Some(guild_id) = component.guild_id else {
            self.acknowledge_component(ctx, component).await;
            return;
        };
        let guild = GuildId(guild_id.get());
        let channel = ChannelId(component.channel_id.get());

        // Acknowledge first: the channel (and with it the interaction's
        // anchor) is about to disappear.
        self.acknowledge_component(ctx, component).await;

        match self.engine.confirm_close(guild, channel).await {
            Ok(closed) => {
                info!(
                    channel_id = %closed.channel(),
                    transcript_delivered = closed.transcript_delivered(),
                    "Ticket closed via confirmation"
                );
            }
            Err(err) if matches!(err.kind(), TicketErrorKind::PromptExpired) => {
                // Silent expiry: the prompt is simply no longer actionable.
            }
            Err(err) => {
                error!(error = %err, "Confirmed close failed");
            }
        }
    }

    /// Cancel pressed: retire the prompt, ticket stays open.
    async fn on_cancel_pressed(&self, ctx: &Context, component: &ComponentInteraction) {
        let channel = ChannelId(component.channel_id.get());

        match self.engine.cancel_close(channel) {
            Ok(_prompt) => {
                // Ephemeral prompts cannot be deleted outright; update the
                // prompt in place so it is gone as an actionable control and
                // the requester is privately informed.
                let response = CreateInteractionResponse::UpdateMessage(
                    CreateInteractionResponseMessage::new()
                        .content("Ticket closure cancelled.")
                        .embeds(vec![])
                        .components(vec![]),
                );
                if let Err(e) = component.create_response(&ctx.http, response).await {
                    error!(error = %e, "Failed to retire close prompt");
                }
            }
            Err(_expired) => {
                self.acknowledge_component(ctx, component).await;
            }
        }
    }
}

#[async_trait]
impl EventHandler for TicketHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(bot = %ready.user.name, "Connected to Discord");

        // Register the command surface.
        for definition in commands::command_definitions() {
            if let Err(e) =
                serenity::model::application::Command::create_global_command(&ctx.http, definition)
                    .await
            {
                error!(error = %e, "Failed to register command");
            }
        }

        // Replay persisted entry points so buttons rendered before a restart
        // keep resolving. A malformed store is fatal.
        let registrar = EntryPointRegistrar::new(self.store.clone());
        match registrar.replay().await {
            Ok(controls) => {
                *self.entry_points.write().await = controls;
            }
            Err(err) => {
                // Persistence load failure is not recoverable in-process.
                error!(error = %err, "Entry-point replay failed, cannot continue");
                std::process::exit(1);
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::Command(command) => {
                let result = match command.data.name.as_str() {
                    "setup" => {
                        commands::handle_setup(&ctx, &command, &self.store, &self.entry_points)
                            .await
                    }
                    "close" => commands::handle_close(&ctx, &command, &self.engine).await,
                    other => {
                        warn!(command = other, "Unknown command");
                        respond_ephemeral(&ctx, &command, "Unknown command.").await
                    }
                };
                if let Err(e) = result {
                    error!(command = %command.data.name, error = %e, "Command handling failed");
                }
            }
            Interaction::Component(component) => {
                let custom_id = component.data.custom_id.clone();
                if category_for_control(&custom_id).is_some() {
                    self.on_create_pressed(&ctx, &component).await;
                } else if custom_id == CLOSE_CONTROL_ID {
                    self.on_close_pressed(&ctx, &component).await;
                } else if custom_id == CONFIRM_CONTROL_ID {
                    self.on_confirm_pressed(&ctx, &component).await;
                } else if custom_id == CANCEL_CONTROL_ID {
                    self.on_cancel_pressed(&ctx, &component).await;
                } else {
                    warn!(control_id = %custom_id, "Unknown component control");
                }
            }
            _ => {}
        }
    }
}
