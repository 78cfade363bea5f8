//! The chat-platform transport collaborator.
//!
//! The engine never talks to the platform directly. The hosting process
//! supplies a [`ChatTransport`] implementation that resolves the identities
//! referenced by an inbound [`ReactionEvent`] and performs the outbound calls
//! handlers need (sending and editing messages, adding reaction markers).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::access::AccessLevel;
use crate::ids::{ChannelId, GuildId, MessageId, UserId};

/// A raw reaction-add event as delivered by the platform.
///
/// Only additions are delivered to the engine; the platform may omit
/// reaction removals entirely.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReactionEvent {
    /// The message that was reacted to.
    pub message_id: MessageId,
    /// The channel containing the message.
    pub channel_id: ChannelId,
    /// The user who added the reaction.
    pub actor_id: UserId,
    /// The reaction symbol (emoji name or equivalent).
    pub symbol: String,
    /// Whether the platform flagged the actor as this process itself.
    pub actor_is_self: bool,
}

impl ReactionEvent {
    /// Create a reaction event from a user other than this process.
    #[must_use]
    pub fn new(
        message_id: MessageId,
        channel_id: ChannelId,
        actor_id: UserId,
        symbol: impl Into<String>,
    ) -> Self {
        Self {
            message_id,
            channel_id,
            actor_id,
            symbol: symbol.into(),
            actor_is_self: false,
        }
    }

    /// Mark the event as originating from this process.
    #[must_use]
    pub fn marked_self(mut self) -> Self {
        self.actor_is_self = true;
        self
    }
}

/// What the transport knows about a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageInfo {
    /// Author of the message.
    pub author_id: UserId,
    /// Guild the message lives in, if it is a guild channel.
    pub guild_id: Option<GuildId>,
}

/// Errors returned by transport calls.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The referenced message, channel or user does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The bot lacks permission for the call.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The platform rate-limited the call.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited {
        /// Suggested back-off before retrying.
        retry_after_ms: u64,
    },

    /// Any other platform failure.
    #[error("transport error: {0}")]
    Platform(String),
}

/// Convenience alias for transport calls.
pub type TransportResult<T> = Result<T, TransportError>;

/// Interface to the chat platform consumed by the engine and its handlers.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// The user identity of this process on the platform.
    fn self_id(&self) -> UserId;

    /// Resolve the author and guild of a message.
    ///
    /// Returns `None` if the message cannot be resolved.
    async fn resolve_message(&self, channel: ChannelId, message: MessageId)
    -> Option<MessageInfo>;

    /// Resolve the access level of `user` inside `guild`.
    ///
    /// Returns `None` if the user is not a resolvable member.
    async fn resolve_access_level(&self, guild: GuildId, user: UserId) -> Option<AccessLevel>;

    /// Send a new message and return its identifier.
    async fn send_message(&self, channel: ChannelId, content: &str) -> TransportResult<MessageId>;

    /// Replace the content of an existing message.
    async fn edit_message(
        &self,
        channel: ChannelId,
        message: MessageId,
        content: &str,
    ) -> TransportResult<()>;

    /// Delete a message.
    async fn delete_message(&self, channel: ChannelId, message: MessageId) -> TransportResult<()>;

    /// Add a reaction marker so users can click it.
    async fn add_reaction(
        &self,
        channel: ChannelId,
        message: MessageId,
        symbol: &str,
    ) -> TransportResult<()>;
}
