//! Error types for the Tessera ticket workflow.
//!
//! This crate provides the foundation error types used throughout the Tessera
//! workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error
//! handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use tessera_error::{TicketError, TicketErrorKind, TicketResult};
//!
//! fn close_ticket(owner: u64, requester: u64) -> TicketResult<()> {
//!     if owner != requester {
//!         return Err(TicketError::new(TicketErrorKind::Unauthorized));
//!     }
//!     Ok(())
//! }
//!
//! assert!(close_ticket(1, 2).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod store;
mod ticket;

pub use store::{StoreError, StoreErrorKind, StoreResult};
pub use ticket::{TicketError, TicketErrorKind, TicketResult};
