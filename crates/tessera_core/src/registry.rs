//! Derived ticket registry and creation guard.
//!
//! There is no durable ticket index: an open ticket is exactly a channel in
//! the configured category whose ownership field names its creator. The
//! registry derives "one open ticket per creator" from a category scan, and
//! closes the scan-then-create race with an in-memory claim per
//! (guild, category, creator) held across the sequence.

use crate::{ChannelId, ChannelRecord, GuildId, TicketGateway, UserId};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use tessera_error::TicketResult;
use tracing::debug;

type CreationKey = (GuildId, ChannelId, UserId);

/// Claim on a (guild, category, creator) creation slot.
///
/// Released when dropped, whether channel creation succeeded or failed.
#[derive(Debug)]
pub struct CreationClaim {
    key: CreationKey,
    claims: Arc<Mutex<HashSet<CreationKey>>>,
}

impl Drop for CreationClaim {
    fn drop(&mut self) {
        self.claims
            .lock()
            .expect("creation claim lock poisoned")
            .remove(&self.key);
    }
}

/// Derived mapping from active ticket channels to their creators.
#[derive(Debug, Default)]
pub struct TicketRegistry {
    claims: Arc<Mutex<HashSet<CreationKey>>>,
}

impl TicketRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the creation slot for a creator in a category.
    ///
    /// Returns `None` when another creation for the same slot is already in
    /// flight, which callers treat as a duplicate ticket.
    pub fn claim(
        &self,
        guild: GuildId,
        category: ChannelId,
        creator: UserId,
    ) -> Option<CreationClaim> {
        let key = (guild, category, creator);
        let mut claims = self.claims.lock().expect("creation claim lock poisoned");
        if !claims.insert(key) {
            debug!(%guild, %category, %creator, "Creation slot already claimed");
            return None;
        }
        Some(CreationClaim {
            key,
            claims: Arc::clone(&self.claims),
        })
    }

    /// Find the creator's open ticket channel in a category, if any.
    ///
    /// Scans the category's channels and compares the stored ownership field.
    pub async fn find_open_ticket(
        &self,
        gateway: &dyn TicketGateway,
        guild: GuildId,
        category: ChannelId,
        creator: UserId,
    ) -> TicketResult<Option<ChannelRecord>> {
        let channels = gateway.category_channels(guild, category).await?;
        Ok(channels
            .into_iter()
            .find(|record| record.owner() == &Some(creator)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_is_exclusive_per_slot() {
        let registry = TicketRegistry::new();
        let first = registry.claim(GuildId(1), ChannelId(2), UserId(3));
        assert!(first.is_some());
        assert!(registry.claim(GuildId(1), ChannelId(2), UserId(3)).is_none());

        // A different creator is a different slot.
        assert!(registry.claim(GuildId(1), ChannelId(2), UserId(4)).is_some());
    }

    #[test]
    fn test_claim_released_on_drop() {
        let registry = TicketRegistry::new();
        {
            let _claim = registry.claim(GuildId(1), ChannelId(2), UserId(3));
        }
        assert!(registry.claim(GuildId(1), ChannelId(2), UserId(3)).is_some());
    }
}
