//! Platform-agnostic core of the Tessera ticket workflow.
//!
//! This crate models the ticket lifecycle as a self-contained component
//! driven by inbound events (button press, close request, confirm/cancel)
//! that calls out to a small capability interface for messaging and channel
//! operations.
//!
//! # Architecture
//!
//! - **entry_point**: the persisted creation-button configuration and the
//!   [`EntryPointStore`] persistence seam
//! - **gateway**: the [`TicketGateway`] capability trait the platform binding
//!   implements
//! - **registry**: derived "one open ticket per creator" enforcement and the
//!   creation guard
//! - **prompt**: explicit close-confirmation records with expiry
//! - **engine**: the [`LifecycleEngine`] state machine
//! - **registrar**: startup replay so persisted buttons survive restarts
//! - **transcript**: transcript rendering and chunked delivery format

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod engine;
mod entry_point;
mod gateway;
mod ids;
mod prompt;
mod registrar;
mod registry;
pub mod transcript;

pub use engine::{CLOSE_ACK_DELAY, ClosedTicket, LifecycleEngine, OpenedTicket};
pub use entry_point::{
    CANCEL_CONTROL_ID, CLOSE_CONTROL_ID, CONFIRM_CONTROL_ID, CREATE_CONTROL_PREFIX,
    EntryPointStore, TicketEntryPoint, TicketEntryPointBuilder, category_for_control,
};
pub use gateway::{ChannelRecord, NewTicketChannel, TicketGateway};
pub use ids::{ChannelId, GuildId, MessageId, UserId};
pub use prompt::{ClosePrompt, PROMPT_EXPIRY_SECONDS, PromptTable};
pub use registrar::EntryPointRegistrar;
pub use registry::{CreationClaim, TicketRegistry};
pub use transcript::{TRANSCRIPT_CHUNK_LEN, TRANSCRIPT_MESSAGE_LIMIT, TranscriptMessage};
