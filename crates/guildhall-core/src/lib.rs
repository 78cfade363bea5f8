//! Guildhall Core - Foundation types and collaborator traits.
//!
//! This crate provides:
//! - Platform handle newtypes (`MessageId`, `ChannelId`, `GuildId`, `UserId`)
//! - The resolved [`AccessLevel`] of an actor inside a guild
//! - The [`ChatTransport`] trait the engine consumes from the chat platform
//! - The [`Notifier`] trait and [`Diagnostic`] events for operator alerts
//!
//! Everything here is shared by the interactive engine and the paged store;
//! neither depends on the other.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod access;
pub mod diagnostic;
pub mod ids;
pub mod transport;

pub use access::AccessLevel;
pub use diagnostic::{Diagnostic, DiagnosticMetadata, Notifier};
pub use ids::{ChannelId, GuildId, MessageId, UserId};
pub use transport::{
    ChatTransport, MessageInfo, ReactionEvent, TransportError, TransportResult,
};
