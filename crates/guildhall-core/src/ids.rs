//! Opaque platform handles.
//!
//! The chat platform assigns every message, channel, guild and user a 64-bit
//! snowflake. Each kind gets its own newtype so a channel ID can never be
//! passed where a message ID is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! platform_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Wrap a raw platform snowflake.
            #[must_use]
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// The raw platform snowflake.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

platform_id!(
    /// Identifier of a message on the chat platform.
    MessageId
);
platform_id!(
    /// Identifier of a text channel.
    ChannelId
);
platform_id!(
    /// Identifier of a guild (server).
    GuildId
);
platform_id!(
    /// Identifier of a user account, including the bot's own account.
    UserId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_is_raw_snowflake() {
        assert_eq!(MessageId::new(1_234_567_890).to_string(), "1234567890");
        assert_eq!(UserId::from(7).to_string(), "7");
    }

    #[test]
    fn serializes_transparently() {
        let json = serde_json::to_string(&GuildId::new(42)).unwrap();
        assert_eq!(json, "42");

        let parsed: ChannelId = serde_json::from_str("99").unwrap();
        assert_eq!(parsed, ChannelId::new(99));
    }

    #[test]
    fn ordering_follows_raw_value() {
        assert!(MessageId::new(1) < MessageId::new(2));
        assert_eq!(MessageId::new(5).get(), 5);
    }
}
