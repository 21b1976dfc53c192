//! JSON-file persistence for Tessera entry points.
//!
//! Backs the [`EntryPointStore`] seam with a single keyed document:
//!
//! ```json
//! {
//!   "123456789": {
//!     "ticket_message": {
//!       "title": "Support",
//!       "text": "Press the button below to open a ticket.",
//!       "button_name": "Open Ticket",
//!       "category": "Support"
//!     }
//!   }
//! }
//! ```
//!
//! A missing file is an empty mapping; a malformed file is an error the host
//! must surface as fatal at startup. Saves overwrite the whole document.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tessera_core::{EntryPointStore, GuildId, TicketEntryPoint, TicketEntryPointBuilder};
use tessera_error::{StoreError, StoreErrorKind, StoreResult};
use tracing::{debug, instrument};

/// Default backing file name.
pub const DEFAULT_DATA_FILE: &str = "ticket_data.json";

/// On-disk shape of one guild's entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GuildDocument {
    ticket_message: TicketMessageDocument,
}

/// On-disk shape of the entry-point record.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TicketMessageDocument {
    title: String,
    text: String,
    button_name: String,
    category: String,
}

/// File-backed entry-point store.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Create a store over the given file path.
    ///
    /// The file need not exist yet; it is created on first save.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The backing file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parse(&self, raw: &str) -> StoreResult<HashMap<GuildId, TicketEntryPoint>> {
        let document: HashMap<String, GuildDocument> = serde_json::from_str(raw)
            .map_err(|e| StoreError::new(StoreErrorKind::Malformed(e.to_string())))?;

        let mut entries = HashMap::with_capacity(document.len());
        for (key, guild_doc) in document {
            let guild_id: u64 = key.parse().map_err(|_| {
                StoreError::new(StoreErrorKind::Malformed(format!(
                    "guild key is not a snowflake: {key}"
                )))
            })?;
            let record = guild_doc.ticket_message;
            let entry = TicketEntryPointBuilder::default()
                .guild_id(GuildId(guild_id))
                .title(record.title)
                .text(record.text)
                .button_name(record.button_name)
                .category(record.category)
                .build()
                .map_err(|e| StoreError::new(StoreErrorKind::Malformed(e.to_string())))?;
            entries.insert(GuildId(guild_id), entry);
        }
        Ok(entries)
    }

    fn render(entries: &HashMap<GuildId, TicketEntryPoint>) -> StoreResult<String> {
        let document: HashMap<String, GuildDocument> = entries
            .iter()
            .map(|(guild_id, entry)| {
                (
                    guild_id.to_string(),
                    GuildDocument {
                        ticket_message: TicketMessageDocument {
                            title: entry.title().clone(),
                            text: entry.text().clone(),
                            button_name: entry.button_name().clone(),
                            category: entry.category().clone(),
                        },
                    },
                )
            })
            .collect();

        serde_json::to_string_pretty(&document)
            .map_err(|e| StoreError::new(StoreErrorKind::Serialize(e.to_string())))
    }
}

#[async_trait]
impl EntryPointStore for JsonFileStore {
    #[instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> StoreResult<HashMap<GuildId, TicketEntryPoint>> {
        if !self.path.exists() {
            debug!("No backing file, treating as empty mapping");
            return Ok(HashMap::new());
        }

        let raw = fs::read_to_string(&self.path)
            .map_err(|e| StoreError::new(StoreErrorKind::Io(e.to_string())))?;
        let entries = self.parse(&raw)?;
        debug!(entry_count = entries.len(), "Loaded entry points");
        Ok(entries)
    }

    #[instrument(skip(self, entries), fields(path = %self.path.display(), entry_count = entries.len()))]
    async fn save(&self, entries: &HashMap<GuildId, TicketEntryPoint>) -> StoreResult<()> {
        let rendered = Self::render(entries)?;
        fs::write(&self.path, rendered)
            .map_err(|e| StoreError::new(StoreErrorKind::Io(e.to_string())))?;
        debug!("Saved entry points");
        Ok(())
    }
}
