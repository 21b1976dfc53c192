//! Unified interface for the Tessera ticket workflow.
//!
//! Re-exports the workspace crates under one facade:
//! - [`core`](tessera_core) — lifecycle engine, registry, registrar, seams
//! - [`store`](tessera_store) — JSON-file entry-point persistence
//! - [`discord`](tessera_discord) — serenity binding and bot client
//! - [`error`](tessera_error) — foundation error types

#![warn(missing_docs)]

pub use tessera_core as core;
pub use tessera_discord as discord;
pub use tessera_error as error;
pub use tessera_store as store;
