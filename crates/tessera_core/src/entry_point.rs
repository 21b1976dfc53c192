//! Entry-point configuration and its persistence seam.
//!
//! An entry point is the persisted, re-postable message+button configuration
//! that lets any guild member start a ticket. One entry point exists per
//! guild; re-running configuration overwrites it wholesale.

use crate::GuildId;
use async_trait::async_trait;
use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tessera_error::StoreResult;

/// Prefix for creation control identifiers.
///
/// The control id is derived deterministically from the category name so the
/// same rendered button resolves identically across process restarts.
pub const CREATE_CONTROL_PREFIX: &str = "ticket_";

/// Control identifier for the in-channel close button.
pub const CLOSE_CONTROL_ID: &str = "close_ticket";

/// Control identifier for the confirm button on the close prompt.
pub const CONFIRM_CONTROL_ID: &str = "confirm_close";

/// Control identifier for the cancel button on the close prompt.
pub const CANCEL_CONTROL_ID: &str = "cancel_close";

/// Persisted ticket entry-point definition for one guild.
///
/// Created by the `setup` command, persisted keyed by guild id, and mutated
/// only by re-running configuration. Absence means the feature is disabled
/// for that guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, Builder)]
pub struct TicketEntryPoint {
    /// Guild this entry point configures.
    guild_id: GuildId,

    /// Title of the entry-point embed.
    title: String,

    /// Body text of the entry-point embed.
    text: String,

    /// Label rendered on the creation button.
    button_name: String,

    /// Category name under which ticket channels are created.
    category: String,
}

impl TicketEntryPoint {
    /// Deterministic identifier for this entry point's creation control.
    ///
    /// Derived from the category name, never from a live control instance,
    /// so buttons rendered before a restart remain resolvable afterwards.
    pub fn creation_control_id(&self) -> String {
        format!("{CREATE_CONTROL_PREFIX}{}", self.category)
    }
}

/// Extract the category name from a creation control identifier.
///
/// Returns `None` for control ids that do not belong to the creation flow.
pub fn category_for_control(control_id: &str) -> Option<&str> {
    control_id.strip_prefix(CREATE_CONTROL_PREFIX)
}

/// Durable mapping from guild to its configured entry point.
///
/// Implementations must treat missing backing storage as an empty mapping and
/// must perform a full-mapping overwrite on save. A malformed document on
/// load is an error the host surfaces as fatal at startup.
#[async_trait]
pub trait EntryPointStore: Send + Sync {
    /// Load the full guild-to-entry-point mapping.
    async fn load(&self) -> StoreResult<HashMap<GuildId, TicketEntryPoint>>;

    /// Overwrite the backing document with the given mapping.
    async fn save(&self, entries: &HashMap<GuildId, TicketEntryPoint>) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(category: &str) -> TicketEntryPoint {
        TicketEntryPointBuilder::default()
            .guild_id(GuildId(1))
            .title("Support".to_string())
            .text("Press the button".to_string())
            .button_name("Open Ticket".to_string())
            .category(category.to_string())
            .build()
            .expect("valid entry point")
    }

    #[test]
    fn test_control_id_is_category_derived() {
        assert_eq!(entry("Support").creation_control_id(), "ticket_Support");
        assert_eq!(entry("help desk").creation_control_id(), "ticket_help desk");
    }

    #[test]
    fn test_category_for_control() {
        assert_eq!(category_for_control("ticket_Support"), Some("Support"));
        assert_eq!(category_for_control("close_ticket"), None);
        assert_eq!(category_for_control("confirm_close"), None);
    }
}
