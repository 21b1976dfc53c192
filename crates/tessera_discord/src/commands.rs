//! Slash command surface.
//!
//! Defines the `/setup` and `/close` commands and translates their
//! invocations into lifecycle engine calls. All user-visible errors are
//! delivered as ephemeral responses so they never leak into the shared
//! channel.

use serenity::builder::{
    CreateActionRow, CreateButton, CreateCommand, CreateCommandOption, CreateEmbed,
    CreateInteractionResponse, CreateInteractionResponseMessage, CreateMessage,
};
use serenity::client::Context;
use serenity::model::application::{
    ButtonStyle, CommandInteraction, CommandOptionType, ResolvedOption, ResolvedValue,
};
use serenity::model::colour::Colour;
use std::collections::HashMap;
use std::sync::Arc;
use tessera_core::{
    EntryPointStore, GuildId, LifecycleEngine, TicketEntryPoint, TicketEntryPointBuilder, UserId,
};
use tessera_error::{TicketError, TicketErrorKind};
use tracing::{error, info, instrument, warn};

use crate::{DiscordError, DiscordErrorKind, DiscordResult};

/// Build the global command definitions.
pub fn command_definitions() -> Vec<CreateCommand> {
    vec![
        CreateCommand::new("setup")
            .description("Set up the ticket system")
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "title", "Title of the embed")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(CommandOptionType::String, "text", "Text of the embed")
                    .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "button_name",
                    "Name of the ticket button",
                )
                .required(true),
            )
            .add_option(
                CreateCommandOption::new(
                    CommandOptionType::String,
                    "category",
                    "Name of the ticket category",
                )
                .required(true),
            ),
        CreateCommand::new("close").description("Close the current ticket"),
    ]
}

/// Extract a required string option by name.
pub(crate) fn option_str<'a>(options: &'a [ResolvedOption<'a>], name: &str) -> Option<&'a str> {
    options.iter().find_map(|option| match option {
        ResolvedOption {
            name: option_name,
            value: ResolvedValue::String(value),
            ..
        } if *option_name == name => Some(*value),
        _ => None,
    })
}

/// Wording of user-facing lifecycle errors, matching the bot's voice.
pub(crate) fn user_message(kind: &TicketErrorKind) -> &'static str {
    match kind {
        TicketErrorKind::DuplicateTicket(_) => "You already have an open ticket!",
        TicketErrorKind::Unauthorized => {
            "Only the ticket creator or staff can close this ticket."
        }
        TicketErrorKind::PermissionDenied => {
            "You need administrator permissions to use this command."
        }
        TicketErrorKind::NotATicketChannel => {
            "This command can only be used in ticket channels."
        }
        _ => "Something went wrong handling this ticket action.",
    }
}

/// Send an ephemeral text response to a command interaction.
pub(crate) async fn respond_ephemeral(
    ctx: &Context,
    command: &CommandInteraction,
    content: &str,
) -> DiscordResult<()> {
    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(content)
                    .ephemeral(true),
            ),
        )
        .await
        .map_err(|e| DiscordError::new(DiscordErrorKind::InteractionFailed(e.to_string())))
}

/// Handle `/setup`: post the entry-point message and persist its definition.
///
/// Administrator-only; a non-administrator invocation yields a private
/// `PermissionDenied` notice and no mutation.
#[instrument(skip_all, fields(guild_id, invoker = %command.user.id))]
pub async fn handle_setup(
    ctx: &Context,
    command: &CommandInteraction,
    store: &Arc<dyn EntryPointStore>,
    entry_points: &tokio::sync::RwLock<HashMap<String, TicketEntryPoint>>,
) -> DiscordResult<()> {
    let Some(guild_id) = command.guild_id else {
        respond_ephemeral(ctx, command, "This command can only be used in a server.").await?;
        return Ok(());
    };
    tracing::Span::current().record("guild_id", guild_id.get());

    let is_admin = command
        .member
        .as_ref()
        .and_then(|member| member.permissions)
        .is_some_and(|permissions| permissions.administrator());
    if !is_admin {
        let denied = TicketError::new(TicketErrorKind::PermissionDenied);
        warn!(error = %denied, "Setup refused");
        respond_ephemeral(ctx, command, user_message(denied.kind())).await?;
        return Ok(());
    }

    let options = command.data.options();
    let (Some(title), Some(text), Some(button_name), Some(category)) = (
        option_str(&options, "title"),
        option_str(&options, "text"),
        option_str(&options, "button_name"),
        option_str(&options, "category"),
    ) else {
        respond_ephemeral(ctx, command, "Missing required options.").await?;
        return Ok(());
    };

    let entry = TicketEntryPointBuilder::default()
        .guild_id(GuildId(guild_id.get()))
        .title(title.to_string())
        .text(text.to_string())
        .button_name(button_name.to_string())
        .category(category.to_string())
        .build()
        .map_err(|e| DiscordError::new(DiscordErrorKind::ConfigurationError(e.to_string())))?;

    // Post the entry-point message with its creation control.
    let embed = CreateEmbed::new()
        .title(entry.title().as_str())
        .description(entry.text().as_str())
        .colour(Colour::BLUE);
    let button = CreateButton::new(entry.creation_control_id())
        .label(entry.button_name().as_str())
        .style(ButtonStyle::Primary);
    command
        .channel_id
        .send_message(
            &ctx.http,
            CreateMessage::new()
                .embed(embed)
                .components(vec![CreateActionRow::Buttons(vec![button])]),
        )
        .await?;

    // Persist: full-document overwrite for this guild.
    let mut entries = store
        .load()
        .await
        .map_err(|e| DiscordError::new(DiscordErrorKind::ConfigurationError(e.to_string())))?;
    entries.insert(GuildId(guild_id.get()), entry.clone());
    store
        .save(&entries)
        .await
        .map_err(|e| DiscordError::new(DiscordErrorKind::ConfigurationError(e.to_string())))?;

    // Refresh the live control registry: the old control id for this guild
    // must stop resolving once the document no longer references it.
    {
        let mut controls = entry_points.write().await;
        controls.retain(|_, existing| existing.guild_id() != entry.guild_id());
        controls.insert(entry.creation_control_id(), entry);
    }

    info!("Ticket system configured");
    respond_ephemeral(ctx, command, "Ticket system has been set up!").await
}

/// Handle `/close`: the synchronous close path, skipping confirmation.
#[instrument(skip_all, fields(guild_id, channel_id = %command.channel_id, invoker = %command.user.id))]
pub async fn handle_close(
    ctx: &Context,
    command: &CommandInteraction,
    engine: &Arc<LifecycleEngine>,
) -> DiscordResult<()> {
    let Some(guild_id) = command.guild_id else {
        respond_ephemeral(ctx, command, "This command can only be used in a server.").await?;
        return Ok(());
    };
    tracing::Span::current().record("guild_id", guild_id.get());

    let guild = GuildId(guild_id.get());
    let channel = tessera_core::ChannelId(command.channel_id.get());
    let requester = UserId(command.user.id.get());

    // Authorize before acknowledging so rejections stay private and the
    // "closing" notice is only ever sent for a close that will happen.
    if let Err(err) = engine.authorize_close(guild, channel, requester).await {
        if !err.is_user_facing() {
            error!(error = %err, "Close authorization failed");
        }
        respond_ephemeral(ctx, command, user_message(err.kind())).await?;
        return Ok(());
    }

    respond_ephemeral(ctx, command, "Closing ticket...").await?;

    if let Err(err) = engine.close_now(guild, channel, requester).await {
        error!(error = %err, "Synchronous close failed");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_definitions_cover_surface() {
        let definitions = command_definitions();
        assert_eq!(definitions.len(), 2);
    }

    #[test]
    fn test_user_message_copy() {
        assert_eq!(
            user_message(&TicketErrorKind::DuplicateTicket("Support".into())),
            "You already have an open ticket!"
        );
        assert_eq!(
            user_message(&TicketErrorKind::Unauthorized),
            "Only the ticket creator or staff can close this ticket."
        );
        assert_eq!(
            user_message(&TicketErrorKind::NotATicketChannel),
            "This command can only be used in ticket channels."
        );
        assert_eq!(
            user_message(&TicketErrorKind::PermissionDenied),
            "You need administrator permissions to use this command."
        );
    }
}
