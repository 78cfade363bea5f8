//! Per-event interaction snapshots.

use chrono::{DateTime, Utc};
use guildhall_core::{AccessLevel, ChannelId, GuildId, MessageId, UserId};

/// An immutable snapshot of one reaction, fully resolved.
///
/// Only well-formed contexts exist as this type: actor, location, message
/// and symbol all resolved. Events that could not be resolved stay a
/// [`PartialContext`] and are dropped before dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionContext {
    /// User who reacted.
    pub actor_id: UserId,
    /// The actor's access level in `guild_id`; [`AccessLevel::Everyone`] if
    /// it could not be resolved.
    pub access_level: AccessLevel,
    /// Channel containing the message.
    pub channel_id: ChannelId,
    /// Guild containing the channel.
    pub guild_id: GuildId,
    /// The reacted-to message.
    pub message_id: MessageId,
    /// The reaction symbol.
    pub symbol: String,
    /// When the event was resolved.
    pub received_at: DateTime<Utc>,
}

/// A context under construction, as far as the transport could resolve it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartialContext {
    /// Author of the reacted-to message.
    pub author_id: Option<UserId>,
    /// User who reacted.
    pub actor_id: Option<UserId>,
    /// The actor's access level.
    pub access_level: Option<AccessLevel>,
    /// Channel containing the message.
    pub channel_id: Option<ChannelId>,
    /// Guild containing the channel.
    pub guild_id: Option<GuildId>,
    /// The reacted-to message.
    pub message_id: Option<MessageId>,
    /// The reaction symbol.
    pub symbol: Option<String>,
}

impl PartialContext {
    /// Whether every field needed for dispatch resolved.
    ///
    /// The access level is not required; an unresolved one grants the least
    /// privilege.
    #[must_use]
    pub fn is_well_formed(&self) -> bool {
        self.actor_id.is_some()
            && self.channel_id.is_some()
            && self.guild_id.is_some()
            && self.message_id.is_some()
            && self.symbol.as_deref().is_some_and(|s| !s.is_empty())
    }

    /// Finish the context, or `None` if any field is missing.
    #[must_use]
    pub fn into_context(self) -> Option<InteractionContext> {
        if !self.is_well_formed() {
            return None;
        }
        Some(InteractionContext {
            actor_id: self.actor_id?,
            access_level: self.access_level.unwrap_or_default(),
            channel_id: self.channel_id?,
            guild_id: self.guild_id?,
            message_id: self.message_id?,
            symbol: self.symbol?,
            received_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> PartialContext {
        PartialContext {
            author_id: Some(UserId(1)),
            actor_id: Some(UserId(2)),
            access_level: Some(AccessLevel::Member),
            channel_id: Some(ChannelId(3)),
            guild_id: Some(GuildId(4)),
            message_id: Some(MessageId(5)),
            symbol: Some("✅".to_string()),
        }
    }

    #[test]
    fn complete_partial_becomes_context() {
        let ctx = complete().into_context().unwrap();
        assert_eq!(ctx.actor_id, UserId(2));
        assert_eq!(ctx.guild_id, GuildId(4));
        assert_eq!(ctx.symbol, "✅");
    }

    #[test]
    fn missing_guild_is_malformed() {
        let partial = PartialContext {
            guild_id: None,
            ..complete()
        };
        assert!(!partial.is_well_formed());
        assert!(partial.into_context().is_none());
    }

    #[test]
    fn missing_access_level_grants_least_privilege() {
        let partial = PartialContext {
            access_level: None,
            ..complete()
        };
        assert!(partial.is_well_formed());
        let ctx = partial.into_context().unwrap();
        assert_eq!(ctx.access_level, AccessLevel::Everyone);
    }

    #[test]
    fn empty_symbol_is_malformed() {
        let partial = PartialContext {
            symbol: Some(String::new()),
            ..complete()
        };
        assert!(partial.into_context().is_none());
    }

    #[test]
    fn author_is_not_required_for_dispatch() {
        let partial = PartialContext {
            author_id: None,
            ..complete()
        };
        assert!(partial.is_well_formed());
    }
}
