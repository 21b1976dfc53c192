//! Close-confirmation prompt state.
//!
//! The close flow presents an ephemeral confirm/cancel prompt with a 30
//! second expiry. Rather than a captured callback, the prompt is an explicit
//! short-lived record keyed by channel, so expiry and cancellation are
//! data-driven and testable without a live event binding.

use crate::{ChannelId, MessageId, UserId};
use chrono::{DateTime, Duration, Utc};
use derive_getters::Getters;
use std::collections::HashMap;
use std::sync::Mutex;

/// How long a close prompt stays actionable.
pub const PROMPT_EXPIRY_SECONDS: i64 = 30;

/// A pending close confirmation for one ticket channel.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct ClosePrompt {
    /// Ticket channel the prompt belongs to.
    channel: ChannelId,
    /// User who requested closure.
    requester: UserId,
    /// Ephemeral prompt message, once the binding has rendered it.
    prompt_message: Option<MessageId>,
    /// Instant after which the prompt is inert.
    expires_at: DateTime<Utc>,
}

impl ClosePrompt {
    /// Whether the prompt is still actionable at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }
}

/// In-memory table of pending close prompts, keyed by channel.
///
/// At most one prompt exists per channel; a new close request replaces any
/// stale one. Expiry is lazy: expired records are purged when touched, with
/// no background reaper.
#[derive(Debug, Default)]
pub struct PromptTable {
    prompts: Mutex<HashMap<ChannelId, ClosePrompt>>,
}

impl PromptTable {
    /// Create an empty prompt table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a prompt for a channel, replacing any existing one.
    pub fn open(&self, channel: ChannelId, requester: UserId) -> ClosePrompt {
        let prompt = ClosePrompt {
            channel,
            requester,
            prompt_message: None,
            expires_at: Utc::now() + Duration::seconds(PROMPT_EXPIRY_SECONDS),
        };
        self.prompts
            .lock()
            .expect("prompt table lock poisoned")
            .insert(channel, prompt.clone());
        prompt
    }

    /// Record the rendered prompt message for a pending prompt.
    pub fn attach_message(&self, channel: ChannelId, message: MessageId) {
        let mut prompts = self.prompts.lock().expect("prompt table lock poisoned");
        if let Some(prompt) = prompts.get_mut(&channel) {
            prompt.prompt_message = Some(message);
        }
    }

    /// Remove and return the prompt for a channel if it is still active.
    ///
    /// An absent or expired prompt returns `None`; expired records are
    /// dropped either way.
    pub fn take_active(&self, channel: ChannelId) -> Option<ClosePrompt> {
        let mut prompts = self.prompts.lock().expect("prompt table lock poisoned");
        let prompt = prompts.remove(&channel)?;
        prompt.is_active(Utc::now()).then_some(prompt)
    }

    /// Number of pending prompts, active or not.
    pub fn len(&self) -> usize {
        self.prompts.lock().expect("prompt table lock poisoned").len()
    }

    /// Whether no prompts are pending.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn open_expired(&self, channel: ChannelId, requester: UserId) {
        let prompt = ClosePrompt {
            channel,
            requester,
            prompt_message: None,
            expires_at: Utc::now() - Duration::seconds(1),
        };
        self.prompts
            .lock()
            .expect("prompt table lock poisoned")
            .insert(channel, prompt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_then_take() {
        let table = PromptTable::new();
        let prompt = table.open(ChannelId(5), UserId(9));
        assert!(prompt.is_active(Utc::now()));

        let taken = table.take_active(ChannelId(5)).expect("prompt present");
        assert_eq!(*taken.requester(), UserId(9));
        assert!(table.is_empty());
    }

    #[test]
    fn test_take_is_one_shot() {
        let table = PromptTable::new();
        table.open(ChannelId(5), UserId(9));
        assert!(table.take_active(ChannelId(5)).is_some());
        assert!(table.take_active(ChannelId(5)).is_none());
    }

    #[test]
    fn test_expired_prompt_is_inert_and_purged() {
        let table = PromptTable::new();
        table.open_expired(ChannelId(5), UserId(9));
        assert!(table.take_active(ChannelId(5)).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_reopen_replaces_prompt() {
        let table = PromptTable::new();
        table.open(ChannelId(5), UserId(9));
        table.open(ChannelId(5), UserId(10));
        assert_eq!(table.len(), 1);

        let taken = table.take_active(ChannelId(5)).expect("prompt present");
        assert_eq!(*taken.requester(), UserId(10));
    }

    #[test]
    fn test_attach_message() {
        let table = PromptTable::new();
        table.open(ChannelId(5), UserId(9));
        table.attach_message(ChannelId(5), MessageId(77));

        let taken = table.take_active(ChannelId(5)).expect("prompt present");
        assert_eq!(*taken.prompt_message(), Some(MessageId(77)));
    }
}
