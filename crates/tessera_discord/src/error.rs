//! Discord-specific error types.
//!
//! This module provides error handling for the serenity binding, covering
//! API failures, connection issues, and interaction faults.

use derive_getters::Getters;
use tessera_error::{TicketError, TicketErrorKind};

/// Discord error variants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum DiscordErrorKind {
    /// Serenity API error (HTTP error, gateway error, rate limit).
    #[display("Serenity API error: {_0}")]
    SerenityError(String),

    /// Connection to the Discord gateway failed.
    #[display("Connection failed: {_0}")]
    ConnectionFailed(String),

    /// An interaction (slash command, button) could not be answered.
    #[display("Interaction failed: {_0}")]
    InteractionFailed(String),

    /// Configuration error (missing token, invalid settings).
    #[display("Configuration error: {_0}")]
    ConfigurationError(String),
}

/// Discord error with source location tracking.
///
/// Captures the error kind along with the file and line where the error
/// occurred.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, Getters)]
#[display("Discord Error: {} at line {} in {}", kind, line, file)]
pub struct DiscordError {
    kind: DiscordErrorKind,
    line: u32,
    file: &'static str,
}

impl DiscordError {
    /// Create a new DiscordError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: DiscordErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Result type for Discord operations.
pub type DiscordResult<T> = Result<T, DiscordError>;

impl From<serenity::Error> for DiscordError {
    #[track_caller]
    fn from(err: serenity::Error) -> Self {
        DiscordError::new(DiscordErrorKind::SerenityError(err.to_string()))
    }
}

impl From<DiscordError> for TicketError {
    #[track_caller]
    fn from(err: DiscordError) -> Self {
        TicketError::new(TicketErrorKind::Platform(err.to_string()))
    }
}
