//! Startup replay of persisted entry points.
//!
//! The messaging platform drops in-memory bindings for interactive controls
//! across restarts but preserves their identifiers. The registrar rebuilds
//! the control-id to entry-point mapping from the persistence store at
//! process start, so previously rendered creation buttons remain clickable.

use crate::{EntryPointStore, TicketEntryPoint};
use std::collections::HashMap;
use std::sync::Arc;
use tessera_error::TicketResult;
use tracing::{info, instrument};

/// Re-attaches persisted creation controls at startup.
#[derive(Clone)]
pub struct EntryPointRegistrar {
    store: Arc<dyn EntryPointStore>,
}

impl EntryPointRegistrar {
    /// Create a registrar over the given store.
    pub fn new(store: Arc<dyn EntryPointStore>) -> Self {
        Self { store }
    }

    /// Replay the store into a mapping keyed by creation control id.
    ///
    /// The key is derived from the category name, matching the id under which
    /// the button was originally rendered. A load failure is fatal at
    /// startup and propagates.
    #[instrument(skip(self), fields(entry_count))]
    pub async fn replay(&self) -> TicketResult<HashMap<String, TicketEntryPoint>> {
        let entries = self.store.load().await?;

        let controls: HashMap<String, TicketEntryPoint> = entries
            .into_values()
            .map(|entry| (entry.creation_control_id(), entry))
            .collect();

        tracing::Span::current().record("entry_count", controls.len());
        info!(entry_count = controls.len(), "Replayed persisted entry points");

        Ok(controls)
    }
}
