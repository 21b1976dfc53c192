//! Discord integration for Tessera.
//!
//! This crate binds the platform-agnostic ticket lifecycle to Discord using
//! the serenity library:
//!
//! - **gateway**: [`SerenityGateway`], the HTTP-backed implementation of the
//!   core messaging capability
//! - **commands**: the `/setup` and `/close` slash command surface
//! - **handler**: the serenity EventHandler routing interactions into the
//!   lifecycle engine
//! - **client**: [`TicketBot`], client setup and lifecycle management
//! - **error**: Discord-specific error types

#![warn(missing_docs)]

mod client;
mod commands;
mod error;
mod gateway;
mod handler;

pub use client::TicketBot;
pub use commands::command_definitions;
pub use error::{DiscordError, DiscordErrorKind, DiscordResult};
pub use gateway::SerenityGateway;
pub use handler::TicketHandler;
