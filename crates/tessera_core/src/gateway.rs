//! Messaging-platform capability trait and boundary types.
//!
//! The lifecycle engine never talks to the platform SDK directly. It drives
//! this trait, which the binding crate implements; tests implement it with an
//! in-memory mock.

use crate::{ChannelId, GuildId, MessageId, TranscriptMessage, UserId};
use async_trait::async_trait;
use derive_getters::Getters;
use tessera_error::TicketResult;

/// A guild channel as the engine sees it.
///
/// `owner` is the ticket creator decoded from the channel's ownership field
/// (the topic, on Discord). A channel without an owner is not a ticket
/// channel.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ChannelRecord {
    /// Channel identifier.
    id: ChannelId,
    /// Channel name.
    name: String,
    /// Ticket creator, if this channel is a ticket channel.
    owner: Option<UserId>,
}

impl ChannelRecord {
    /// Create a new channel record.
    pub fn new(id: ChannelId, name: impl Into<String>, owner: Option<UserId>) -> Self {
        Self {
            id,
            name: name.into(),
            owner,
        }
    }
}

/// Request to create a private ticket channel.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct NewTicketChannel {
    /// Guild to create the channel in.
    guild: GuildId,
    /// Parent category.
    category: ChannelId,
    /// Channel name, e.g. `ticket-<username>`.
    name: String,
    /// Ticket creator; becomes the channel's ownership field and the only
    /// member besides the bot with visibility.
    owner: UserId,
}

impl NewTicketChannel {
    /// Create a new ticket-channel request.
    pub fn new(guild: GuildId, category: ChannelId, name: impl Into<String>, owner: UserId) -> Self {
        Self {
            guild,
            category,
            name: name.into(),
            owner,
        }
    }
}

/// Capability interface required from the messaging platform binding.
///
/// Every method maps to one platform call; no retries are attempted at this
/// layer or above. Failures propagate as `TicketErrorKind::Platform` except
/// where the engine explicitly swallows them (transcript delivery).
#[async_trait]
pub trait TicketGateway: Send + Sync {
    /// Look up the category with the given name, creating it if absent.
    async fn ensure_category(&self, guild: GuildId, name: &str) -> TicketResult<ChannelId>;

    /// List the text channels under a category, with decoded ownership.
    async fn category_channels(
        &self,
        guild: GuildId,
        category: ChannelId,
    ) -> TicketResult<Vec<ChannelRecord>>;

    /// Resolve a single channel to a record, if it exists in the guild.
    async fn channel_record(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> TicketResult<Option<ChannelRecord>>;

    /// Create a private ticket channel visible only to the owner and the bot.
    async fn create_ticket_channel(&self, request: &NewTicketChannel)
        -> TicketResult<ChannelRecord>;

    /// Delete a channel. Atomic and terminal on the platform side.
    async fn delete_channel(&self, channel: ChannelId) -> TicketResult<()>;

    /// Post the welcome message (with the close control) into a new ticket
    /// channel. Returns the message id.
    async fn send_welcome(&self, channel: ChannelId, creator_name: &str)
        -> TicketResult<MessageId>;

    /// Retrieve up to `limit` messages of channel history, oldest first.
    async fn channel_history(
        &self,
        channel: ChannelId,
        limit: usize,
    ) -> TicketResult<Vec<TranscriptMessage>>;

    /// Send a direct message to a user.
    async fn direct_message(&self, user: UserId, text: &str) -> TicketResult<()>;

    /// Whether the member holds staff-level (message-management) permission
    /// in the guild.
    async fn has_staff_permission(&self, guild: GuildId, user: UserId) -> TicketResult<bool>;
}
