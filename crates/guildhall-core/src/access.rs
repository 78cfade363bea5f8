//! Actor access levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The access level of a user within a guild, as resolved by the transport
/// from the user's roles and permissions.
///
/// Levels are totally ordered, so handlers can gate actions with a simple
/// comparison (`ctx.access_level >= AccessLevel::Moderator`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    /// Any user who can see the message.
    #[default]
    Everyone,
    /// A registered member of the guild.
    Member,
    /// A member holding a moderation role.
    Moderator,
    /// A guild administrator.
    Administrator,
    /// The guild owner.
    Owner,
}

impl AccessLevel {
    /// Whether this level satisfies `required`.
    #[must_use]
    pub fn at_least(self, required: Self) -> bool {
        self >= required
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Everyone => "everyone",
            Self::Member => "member",
            Self::Moderator => "moderator",
            Self::Administrator => "administrator",
            Self::Owner => "owner",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_are_ordered() {
        assert!(AccessLevel::Owner > AccessLevel::Administrator);
        assert!(AccessLevel::Moderator.at_least(AccessLevel::Member));
        assert!(!AccessLevel::Everyone.at_least(AccessLevel::Member));
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&AccessLevel::Administrator).unwrap();
        assert_eq!(json, "\"administrator\"");
    }
}
