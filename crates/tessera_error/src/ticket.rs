//! Ticket lifecycle error types.
//!
//! This module provides error handling for the ticket lifecycle engine,
//! covering authorization failures, duplicate-ticket rejections, and
//! propagated platform faults.

use crate::{StoreError, StoreErrorKind};
use derive_getters::Getters;

/// Ticket error variants.
///
/// Represents the error conditions that can occur while driving the ticket
/// lifecycle. The user-visible variants carry no payload; the surface layer
/// decides how to word them.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, derive_more::Display)]
pub enum TicketErrorKind {
    /// The requester already has an open ticket in this category.
    #[display("Requester already has an open ticket in category: {_0}")]
    DuplicateTicket(String),

    /// The requester is neither the ticket creator nor staff.
    #[display("Requester is not the ticket creator or staff")]
    Unauthorized,

    /// An administrator-gated command was invoked without administrator rights.
    #[display("Administrator permission required")]
    PermissionDenied,

    /// The operation targets a channel that is not an owned ticket channel.
    #[display("Not a ticket channel")]
    NotATicketChannel,

    /// A confirm or cancel arrived for a prompt that no longer exists or has
    /// expired.
    #[display("Close prompt is absent or expired")]
    PromptExpired,

    /// Direct delivery of the transcript to the creator failed.
    ///
    /// Callers swallow this variant: it is logged and never blocks teardown.
    #[display("Transcript delivery failed: {_0}")]
    TranscriptDeliveryFailed(String),

    /// The persistence store could not be loaded at startup.
    #[display("Persistence load failed: {_0}")]
    PersistenceLoadFailed(String),

    /// A messaging-platform call failed.
    #[display("Platform error: {_0}")]
    Platform(String),
}

/// Ticket error with source location tracking.
///
/// Captures the error kind along with the file and line where the error
/// occurred.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error, Getters)]
#[display("Ticket Error: {} at line {} in {}", kind, line, file)]
pub struct TicketError {
    kind: TicketErrorKind,
    line: u32,
    #[getter(skip)]
    file: &'static str,
}

impl TicketError {
    /// Create a new TicketError with automatic location tracking.
    ///
    /// # Example
    /// ```
    /// use tessera_error::{TicketError, TicketErrorKind};
    ///
    /// let err = TicketError::new(TicketErrorKind::Unauthorized);
    /// ```
    #[track_caller]
    pub fn new(kind: TicketErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Get field `file` from instance of `TicketError`.
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// Whether this error should be shown to the invoking user as a private
    /// response rather than logged as a fault.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self.kind,
            TicketErrorKind::DuplicateTicket(_)
                | TicketErrorKind::Unauthorized
                | TicketErrorKind::PermissionDenied
                | TicketErrorKind::NotATicketChannel
        )
    }
}

/// Result type for ticket lifecycle operations.
pub type TicketResult<T> = Result<T, TicketError>;

impl From<StoreError> for TicketError {
    #[track_caller]
    fn from(err: StoreError) -> Self {
        let kind = match err.kind() {
            StoreErrorKind::Io(msg) => TicketErrorKind::PersistenceLoadFailed(msg.clone()),
            StoreErrorKind::Malformed(msg) => TicketErrorKind::PersistenceLoadFailed(msg.clone()),
            StoreErrorKind::Serialize(msg) => TicketErrorKind::PersistenceLoadFailed(msg.clone()),
        };
        TicketError::new(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_facing_classification() {
        assert!(TicketError::new(TicketErrorKind::Unauthorized).is_user_facing());
        assert!(TicketError::new(TicketErrorKind::DuplicateTicket("Support".into()))
            .is_user_facing());
        assert!(!TicketError::new(TicketErrorKind::Platform("boom".into())).is_user_facing());
        assert!(!TicketError::new(TicketErrorKind::PromptExpired).is_user_facing());
    }

    #[test]
    fn test_location_capture() {
        let err = TicketError::new(TicketErrorKind::NotATicketChannel);
        assert!(err.file().ends_with("ticket.rs"));
        assert!(*err.line() > 0);
    }
}
