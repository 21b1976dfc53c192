//! Platform-agnostic identifier newtypes.
//!
//! Discord snowflakes are 64-bit unsigned integers. The core crate never
//! touches the platform SDK, so it carries ids as thin newtypes; the binding
//! crate converts at the boundary.

use serde::{Deserialize, Serialize};

/// Guild (server) identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    derive_more::Display,
)]
#[display("{}", _0)]
pub struct GuildId(pub u64);

/// Channel identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    derive_more::Display,
)]
#[display("{}", _0)]
pub struct ChannelId(pub u64);

/// User identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    derive_more::Display,
)]
#[display("{}", _0)]
pub struct UserId(pub u64);

/// Message identifier.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
    derive_more::Display,
)]
#[display("{}", _0)]
pub struct MessageId(pub u64);
