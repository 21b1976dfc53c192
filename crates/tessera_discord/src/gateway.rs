//! Serenity implementation of the ticket gateway.
//!
//! Backs the core [`TicketGateway`] capability with Discord REST calls over
//! an independent HTTP client. Channel ownership is encoded in the channel
//! topic as the creator's user id; this module owns the encode/decode.

use crate::{DiscordError, DiscordErrorKind};
use async_trait::async_trait;
use serenity::builder::{
    CreateActionRow, CreateButton, CreateChannel, CreateEmbed, CreateEmbedFooter, CreateMessage,
    GetMessages,
};
use serenity::http::Http;
use serenity::model::channel::{ChannelType, PermissionOverwrite, PermissionOverwriteType};
use serenity::model::colour::Colour;
use serenity::model::permissions::Permissions;
use std::sync::Arc;
use tessera_core::{
    CLOSE_CONTROL_ID, ChannelId, ChannelRecord, GuildId, MessageId, NewTicketChannel,
    TicketGateway, TranscriptMessage, UserId,
};
use tessera_error::{TicketError, TicketErrorKind, TicketResult};
use tracing::{debug, instrument};

/// Discord can return at most this many messages per history request.
const HISTORY_PAGE_SIZE: u8 = 100;

/// HTTP-backed Discord gateway.
pub struct SerenityGateway {
    http: Arc<Http>,
}

impl SerenityGateway {
    /// Create a gateway with an independent HTTP client for the given token.
    pub fn new(token: impl AsRef<str>) -> Self {
        Self {
            http: Arc::new(Http::new(token.as_ref())),
        }
    }

    /// Create a gateway sharing an existing HTTP client.
    pub fn with_http(http: Arc<Http>) -> Self {
        Self { http }
    }

    fn platform_err(context: &str, err: impl std::fmt::Display) -> TicketError {
        TicketError::new(TicketErrorKind::Platform(format!("{context}: {err}")))
    }

    fn record_from(channel: &serenity::model::channel::GuildChannel) -> ChannelRecord {
        let owner = channel
            .topic
            .as_deref()
            .and_then(|topic| topic.parse::<u64>().ok())
            .map(UserId);
        ChannelRecord::new(ChannelId(channel.id.get()), channel.name.clone(), owner)
    }
}

#[async_trait]
impl TicketGateway for SerenityGateway {
    #[instrument(skip(self), fields(guild_id = %guild, category = name))]
    async fn ensure_category(&self, guild: GuildId, name: &str) -> TicketResult<ChannelId> {
        let guild_id = serenity::model::id::GuildId::new(guild.0);
        let channels = self
            .http
            .get_channels(guild_id)
            .await
            .map_err(|e| Self::platform_err("Failed to fetch channels", e))?;

        if let Some(category) = channels
            .iter()
            .find(|c| c.kind == ChannelType::Category && c.name == name)
        {
            return Ok(ChannelId(category.id.get()));
        }

        debug!("Category absent, creating it");
        let created = guild_id
            .create_channel(
                &self.http,
                CreateChannel::new(name).kind(ChannelType::Category),
            )
            .await
            .map_err(|e| Self::platform_err("Failed to create category", e))?;

        Ok(ChannelId(created.id.get()))
    }

    #[instrument(skip(self), fields(guild_id = %guild, category_id = %category))]
    async fn category_channels(
        &self,
        guild: GuildId,
        category: ChannelId,
    ) -> TicketResult<Vec<ChannelRecord>> {
        let guild_id = serenity::model::id::GuildId::new(guild.0);
        let channels = self
            .http
            .get_channels(guild_id)
            .await
            .map_err(|e| Self::platform_err("Failed to fetch channels", e))?;

        Ok(channels
            .iter()
            .filter(|c| {
                c.kind == ChannelType::Text
                    && c.parent_id.map(|p| p.get()) == Some(category.0)
            })
            .map(Self::record_from)
            .collect())
    }

    #[instrument(skip(self), fields(guild_id = %guild, channel_id = %channel))]
    async fn channel_record(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> TicketResult<Option<ChannelRecord>> {
        let guild_id = serenity::model::id::GuildId::new(guild.0);
        let channels = self
            .http
            .get_channels(guild_id)
            .await
            .map_err(|e| Self::platform_err("Failed to fetch channels", e))?;

        Ok(channels
            .iter()
            .find(|c| c.id.get() == channel.0)
            .map(Self::record_from))
    }

    #[instrument(
        skip(self, request),
        fields(guild_id = %request.guild(), category_id = %request.category(), owner = %request.owner())
    )]
    async fn create_ticket_channel(
        &self,
        request: &NewTicketChannel,
    ) -> TicketResult<ChannelRecord> {
        let guild_id = serenity::model::id::GuildId::new(request.guild().0);
        let bot_user = self
            .http
            .get_current_user()
            .await
            .map_err(|e| Self::platform_err("Failed to fetch bot identity", e))?;

        // Hide the channel from @everyone; grant the creator and the bot.
        let everyone = serenity::model::id::RoleId::new(request.guild().0);
        let overwrites = vec![
            PermissionOverwrite {
                allow: Permissions::empty(),
                deny: Permissions::VIEW_CHANNEL,
                kind: PermissionOverwriteType::Role(everyone),
            },
            PermissionOverwrite {
                allow: Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(serenity::model::id::UserId::new(
                    request.owner().0,
                )),
            },
            PermissionOverwrite {
                allow: Permissions::VIEW_CHANNEL | Permissions::SEND_MESSAGES,
                deny: Permissions::empty(),
                kind: PermissionOverwriteType::Member(bot_user.id),
            },
        ];

        let created = guild_id
            .create_channel(
                &self.http,
                CreateChannel::new(request.name().as_str())
                    .kind(ChannelType::Text)
                    .category(serenity::model::id::ChannelId::new(request.category().0))
                    .topic(request.owner().to_string())
                    .permissions(overwrites),
            )
            .await
            .map_err(|e| Self::platform_err("Failed to create ticket channel", e))?;

        debug!(channel_id = %created.id, "Created ticket channel");
        Ok(Self::record_from(&created))
    }

    #[instrument(skip(self), fields(channel_id = %channel))]
    async fn delete_channel(&self, channel: ChannelId) -> TicketResult<()> {
        serenity::model::id::ChannelId::new(channel.0)
            .delete(&self.http)
            .await
            .map_err(|e| Self::platform_err("Failed to delete channel", e))?;
        Ok(())
    }

    #[instrument(skip(self), fields(channel_id = %channel))]
    async fn send_welcome(
        &self,
        channel: ChannelId,
        creator_name: &str,
    ) -> TicketResult<MessageId> {
        let embed = CreateEmbed::new()
            .title("Support Ticket")
            .description(
                "Thank you for creating a ticket. Support staff will be with you shortly.\n\n\
                 Use `/close` to close this ticket.",
            )
            .colour(Colour::BLUE)
            .footer(CreateEmbedFooter::new(format!("Created by {creator_name}")));

        let close_button = CreateButton::new(CLOSE_CONTROL_ID)
            .label("Close Ticket")
            .style(serenity::model::application::ButtonStyle::Danger);

        let message = serenity::model::id::ChannelId::new(channel.0)
            .send_message(
                &self.http,
                CreateMessage::new()
                    .embed(embed)
                    .components(vec![CreateActionRow::Buttons(vec![close_button])]),
            )
            .await
            .map_err(|e| Self::platform_err("Failed to send welcome message", e))?;

        Ok(MessageId(message.id.get()))
    }

    #[instrument(skip(self), fields(channel_id = %channel, limit))]
    async fn channel_history(
        &self,
        channel: ChannelId,
        limit: usize,
    ) -> TicketResult<Vec<TranscriptMessage>> {
        let channel_id = serenity::model::id::ChannelId::new(channel.0);

        // The API pages at 100 messages; walk backwards until the cap.
        let mut collected = Vec::new();
        let mut before: Option<serenity::model::id::MessageId> = None;
        while collected.len() < limit {
            let page_size = (limit - collected.len()).min(HISTORY_PAGE_SIZE as usize) as u8;
            let mut request = GetMessages::new().limit(page_size);
            if let Some(before_id) = before {
                request = request.before(before_id);
            }

            let page = channel_id
                .messages(&self.http, request)
                .await
                .map_err(|e| Self::platform_err("Failed to fetch channel history", e))?;
            if page.is_empty() {
                break;
            }

            before = page.last().map(|m| m.id);
            let page_len = page.len();
            collected.extend(page);
            if page_len < page_size as usize {
                break;
            }
        }

        // Pages arrive newest first; the transcript wants oldest first.
        collected.reverse();
        Ok(collected
            .into_iter()
            .map(|m| TranscriptMessage::new(m.author.name.clone(), m.content.clone()))
            .collect())
    }

    #[instrument(skip(self, text), fields(user_id = %user, text_len = text.len()))]
    async fn direct_message(&self, user: UserId, text: &str) -> TicketResult<()> {
        let dm = serenity::model::id::UserId::new(user.0)
            .create_dm_channel(&self.http)
            .await
            .map_err(|e| {
                let err = DiscordError::new(DiscordErrorKind::SerenityError(e.to_string()));
                TicketError::new(TicketErrorKind::TranscriptDeliveryFailed(err.to_string()))
            })?;

        dm.id
            .say(&self.http, text)
            .await
            .map_err(|e| {
                TicketError::new(TicketErrorKind::TranscriptDeliveryFailed(e.to_string()))
            })?;
        Ok(())
    }

    #[instrument(skip(self), fields(guild_id = %guild, user_id = %user))]
    async fn has_staff_permission(&self, guild: GuildId, user: UserId) -> TicketResult<bool> {
        let guild_id = serenity::model::id::GuildId::new(guild.0);
        let user_id = serenity::model::id::UserId::new(user.0);

        let partial = self
            .http
            .get_guild(guild_id)
            .await
            .map_err(|e| Self::platform_err("Failed to fetch guild", e))?;
        if partial.owner_id == user_id {
            return Ok(true);
        }

        // REST-fetched members carry no resolved permission set, so compute
        // from the member's roles.
        let member = self
            .http
            .get_member(guild_id, user_id)
            .await
            .map_err(|e| Self::platform_err("Failed to fetch member", e))?;
        let roles = self
            .http
            .get_guild_roles(guild_id)
            .await
            .map_err(|e| Self::platform_err("Failed to fetch roles", e))?;

        Ok(roles.iter().any(|role| {
            member.roles.contains(&role.id)
                && (role.permissions.manage_messages() || role.permissions.administrator())
        }))
    }
}
