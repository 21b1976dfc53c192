//! Ticket lifecycle state machine.
//!
//! States: `NoTicket → Open → ClosePending → Closed`. A ticket is Open while
//! its channel exists, ClosePending while a confirm/cancel prompt is active,
//! and Closed once the channel is deleted. The engine receives its
//! collaborators by construction and holds no process-wide state.

use crate::{
    ChannelId, ChannelRecord, ClosePrompt, GuildId, MessageId, NewTicketChannel, PromptTable,
    TicketEntryPoint, TicketGateway, TicketRegistry, UserId, transcript,
    transcript::TRANSCRIPT_MESSAGE_LIMIT,
};
use derive_getters::Getters;
use std::sync::Arc;
use std::time::Duration;
use tessera_error::{TicketError, TicketErrorKind, TicketResult};
use tracing::{debug, info, instrument, warn};

/// Delay between the synchronous close acknowledgment and channel deletion,
/// so the "closing" notice is visibly ordered before the channel disappears.
pub const CLOSE_ACK_DELAY: Duration = Duration::from_secs(1);

/// Outcome of a successful ticket creation.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct OpenedTicket {
    /// The new ticket channel.
    channel: ChannelId,
    /// Channel name, for the private acknowledgment link.
    name: String,
    /// Welcome message carrying the close control.
    welcome_message: MessageId,
}

/// Outcome of a completed closure.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ClosedTicket {
    /// The deleted channel.
    channel: ChannelId,
    /// Whether every transcript chunk reached the creator. Delivery failure
    /// never blocks teardown; this flag exists for logging.
    transcript_delivered: bool,
}

/// The ticket lifecycle engine.
///
/// Drives creation, close-request, confirmation, cancellation, and the
/// synchronous close path against an injected [`TicketGateway`].
pub struct LifecycleEngine {
    gateway: Arc<dyn TicketGateway>,
    registry: TicketRegistry,
    prompts: PromptTable,
}

impl LifecycleEngine {
    /// Create an engine over the given messaging gateway.
    pub fn new(gateway: Arc<dyn TicketGateway>) -> Self {
        Self {
            gateway,
            registry: TicketRegistry::new(),
            prompts: PromptTable::new(),
        }
    }

    /// The injected messaging gateway.
    pub fn gateway(&self) -> &Arc<dyn TicketGateway> {
        &self.gateway
    }

    /// Create a ticket: `NoTicket → Open`.
    ///
    /// Ensures the configured category exists, rejects a requester who
    /// already owns an open ticket in it, then creates the private channel
    /// and posts the welcome message with the close control.
    ///
    /// # Errors
    ///
    /// `DuplicateTicket` when the requester already has an open ticket in the
    /// category (or a creation for it is in flight); `Platform` on gateway
    /// faults.
    #[instrument(
        skip(self, entry),
        fields(guild_id = %entry.guild_id(), category = %entry.category(), requester = %requester)
    )]
    pub async fn open_ticket(
        &self,
        entry: &TicketEntryPoint,
        requester: UserId,
        requester_name: &str,
    ) -> TicketResult<OpenedTicket> {
        let guild = *entry.guild_id();
        let category = self.gateway.ensure_category(guild, entry.category()).await?;

        // Claim held across the duplicate scan and channel creation; released
        // on drop whether creation succeeds or fails.
        let _claim = self
            .registry
            .claim(guild, category, requester)
            .ok_or_else(|| {
                TicketError::new(TicketErrorKind::DuplicateTicket(entry.category().clone()))
            })?;

        if self
            .registry
            .find_open_ticket(self.gateway.as_ref(), guild, category, requester)
            .await?
            .is_some()
        {
            debug!("Requester already owns an open ticket");
            return Err(TicketError::new(TicketErrorKind::DuplicateTicket(
                entry.category().clone(),
            )));
        }

        let request = NewTicketChannel::new(
            guild,
            category,
            format!("ticket-{requester_name}"),
            requester,
        );
        let record = self.gateway.create_ticket_channel(&request).await?;
        let welcome_message = self
            .gateway
            .send_welcome(*record.id(), requester_name)
            .await?;

        info!(channel_id = %record.id(), "Ticket opened");

        Ok(OpenedTicket {
            channel: *record.id(),
            name: record.name().clone(),
            welcome_message,
        })
    }

    /// Authorize a close attempt against a channel's ownership field.
    ///
    /// # Errors
    ///
    /// `NotATicketChannel` when the channel is missing or carries no
    /// ownership field; `Unauthorized` when the requester is neither the
    /// creator nor staff.
    #[instrument(skip(self), fields(guild_id = %guild, channel_id = %channel, requester = %requester))]
    pub async fn authorize_close(
        &self,
        guild: GuildId,
        channel: ChannelId,
        requester: UserId,
    ) -> TicketResult<ChannelRecord> {
        let record = self
            .gateway
            .channel_record(guild, channel)
            .await?
            .ok_or_else(|| TicketError::new(TicketErrorKind::NotATicketChannel))?;

        let owner = (*record.owner())
            .ok_or_else(|| TicketError::new(TicketErrorKind::NotATicketChannel))?;

        if owner == requester {
            return Ok(record);
        }

        if self.gateway.has_staff_permission(guild, requester).await? {
            debug!("Close authorized via staff permission");
            return Ok(record);
        }

        Err(TicketError::new(TicketErrorKind::Unauthorized))
    }

    /// Request closure: `Open → ClosePending`.
    ///
    /// On success a [`ClosePrompt`] with a 30 second expiry is pending; the
    /// surface renders the confirm/cancel controls and may attach the prompt
    /// message via [`LifecycleEngine::attach_prompt_message`].
    #[instrument(skip(self), fields(guild_id = %guild, channel_id = %channel, requester = %requester))]
    pub async fn request_close(
        &self,
        guild: GuildId,
        channel: ChannelId,
        requester: UserId,
    ) -> TicketResult<ClosePrompt> {
        let record = self.authorize_close(guild, channel, requester).await?;
        let prompt = self.prompts.open(*record.id(), requester);
        info!(expires_at = %prompt.expires_at(), "Close prompt opened");
        Ok(prompt)
    }

    /// Record the rendered prompt message for a pending close prompt.
    pub fn attach_prompt_message(&self, channel: ChannelId, message: MessageId) {
        self.prompts.attach_message(channel, message);
    }

    /// Confirm closure: `ClosePending → Closed`.
    ///
    /// Assembles and delivers the transcript, then deletes the channel.
    /// Terminal.
    ///
    /// # Errors
    ///
    /// `PromptExpired` when no active prompt exists for the channel, in which
    /// case nothing happens; the surface treats it as silent expiry.
    #[instrument(skip(self), fields(guild_id = %guild, channel_id = %channel))]
    pub async fn confirm_close(
        &self,
        guild: GuildId,
        channel: ChannelId,
    ) -> TicketResult<ClosedTicket> {
        self.prompts
            .take_active(channel)
            .ok_or_else(|| TicketError::new(TicketErrorKind::PromptExpired))?;

        let record = self
            .gateway
            .channel_record(guild, channel)
            .await?
            .ok_or_else(|| TicketError::new(TicketErrorKind::NotATicketChannel))?;

        self.complete_close(&record, false).await
    }

    /// Cancel closure: `ClosePending → Open`.
    ///
    /// Removes the pending prompt and returns it so the surface can retire
    /// the prompt message. No other side effects; the channel stays open.
    ///
    /// # Errors
    ///
    /// `PromptExpired` when no active prompt exists for the channel.
    #[instrument(skip(self), fields(channel_id = %channel))]
    pub fn cancel_close(&self, channel: ChannelId) -> TicketResult<ClosePrompt> {
        let prompt = self
            .prompts
            .take_active(channel)
            .ok_or_else(|| TicketError::new(TicketErrorKind::PromptExpired))?;
        info!("Close cancelled, ticket stays open");
        Ok(prompt)
    }

    /// Synchronous close: authorization, transcript, a brief delay, then
    /// deletion, skipping the confirmation step.
    ///
    /// The delay orders the caller's "closing" acknowledgment visibly before
    /// the channel disappears.
    #[instrument(skip(self), fields(guild_id = %guild, channel_id = %channel, requester = %requester))]
    pub async fn close_now(
        &self,
        guild: GuildId,
        channel: ChannelId,
        requester: UserId,
    ) -> TicketResult<ClosedTicket> {
        let record = self.authorize_close(guild, channel, requester).await?;

        // Any pending prompt is moot once the channel is going away.
        let _ = self.prompts.take_active(channel);

        self.complete_close(&record, true).await
    }

    async fn complete_close(
        &self,
        record: &ChannelRecord,
        delayed: bool,
    ) -> TicketResult<ClosedTicket> {
        let transcript_delivered = match record.owner() {
            Some(owner) => self.deliver_transcript(*record.id(), *owner).await?,
            None => false,
        };

        if delayed {
            tokio::time::sleep(CLOSE_ACK_DELAY).await;
        }

        self.gateway.delete_channel(*record.id()).await?;
        info!(channel_id = %record.id(), transcript_delivered, "Ticket closed");

        Ok(ClosedTicket {
            channel: *record.id(),
            transcript_delivered,
        })
    }

    /// Build the transcript and direct-message it to the creator in wrapped
    /// chunks. Delivery failure is swallowed; history retrieval failure
    /// propagates.
    async fn deliver_transcript(&self, channel: ChannelId, owner: UserId) -> TicketResult<bool> {
        let history = self
            .gateway
            .channel_history(channel, TRANSCRIPT_MESSAGE_LIMIT)
            .await?;

        let text = transcript::render(&history);

        for chunk in transcript::chunk(&text) {
            if let Err(e) = self.gateway.direct_message(owner, &transcript::wrap(&chunk)).await {
                warn!(owner = %owner, error = %e, "Transcript delivery failed, proceeding with teardown");
                return Ok(false);
            }
        }

        debug!(owner = %owner, transcript_len = text.len(), "Transcript delivered");
        Ok(true)
    }
}
